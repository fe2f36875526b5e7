use serde::{Deserialize, Serialize};

use crate::domain::card::Card;
use crate::domain::chips::Chips;
use crate::domain::{ActionId, Nonce, ParticipantId};

/// Тип действия участника.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum ActionKind {
    /// Войти в матч с указанным buy-in. Identity – внешний handle
    /// (адрес кошелька, ник), для ядра это непрозрачная строка.
    Join { buy_in: Chips, identity: String },
    /// Bet в раунде, где уровень ещё нулевой. Amount – новый уровень.
    Wager(Chips),
    /// Raise существующего уровня. Amount – новый суммарный уровень.
    Raise(Chips),
    /// Уравнять текущий уровень.
    Call,
    /// Обычный fold – взнос остаётся в банке целиком.
    Fold,
    /// Strategic fold: участник выходит из борьбы, но получает назад
    /// ровно половину (floor) своей текущей ставки.
    StrategicFold,
    /// Check – возможен только при уравнянном уровне.
    Check,
    /// Вскрыть закрытые карты в фазе reveal.
    Reveal(Vec<Card>),
}

impl ActionKind {
    /// Короткое имя для ошибок и логов.
    pub fn name(&self) -> &'static str {
        match self {
            ActionKind::Join { .. } => "join",
            ActionKind::Wager(_) => "wager",
            ActionKind::Raise(_) => "raise",
            ActionKind::Call => "call",
            ActionKind::Fold => "fold",
            ActionKind::StrategicFold => "strategic-fold",
            ActionKind::Check => "check",
            ActionKind::Reveal(_) => "reveal",
        }
    }
}

/// Конкретное действие участника.
///
/// Пара (id, nonce) – ключ идемпотентности: повторная подача
/// того же действия не применяется второй раз.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Action {
    pub id: ActionId,
    pub participant_id: ParticipantId,
    pub kind: ActionKind,
    /// Момент подачи (мс). Движок время не читает – только записывает.
    pub timestamp_ms: u64,
    pub nonce: Nonce,
}

impl Action {
    pub fn new(
        id: ActionId,
        participant_id: ParticipantId,
        kind: ActionKind,
        timestamp_ms: u64,
        nonce: Nonce,
    ) -> Self {
        Self {
            id,
            participant_id,
            kind,
            timestamp_ms,
            nonce,
        }
    }
}
