use serde::{Deserialize, Serialize};

use crate::dispatch::Priority;
use crate::domain::config::MatchConfig;
use crate::domain::MatchId;
use crate::engine::actions::Action;
use crate::ports::session::SessionHandle;

/// Команда верхнего уровня (state-changing).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Command {
    /// Создать новый матч.
    CreateMatch(CreateMatchCommand),

    /// Подать действие в существующий матч.
    SubmitAction(SubmitActionCommand),
}

/// Команда создания матча.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CreateMatchCommand {
    pub match_id: MatchId,
    pub config: MatchConfig,
}

/// Подача действия. Session handle обязателен: без валидной сессии
/// действие не дойдёт даже до валидатора.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SubmitActionCommand {
    pub handle: SessionHandle,
    pub match_id: MatchId,
    pub action: Action,
    pub priority: Priority,
}
