use serde::{Deserialize, Serialize};

use crate::domain::{MatchId, Nonce, ParticipantId};
use crate::engine::actions::Action;
use crate::ports::ledger::SubmitReceipt;

/// Приоритет запроса. Critical минует периодический drain
/// и уходит немедленно.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

/// Запрос на отправку действия в tier.
/// Nonce задаёт вызывающий – он же ключ идемпотентности.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubmissionRequest {
    pub nonce: Nonce,
    pub match_id: MatchId,
    pub action: Action,
    pub signers: Vec<ParticipantId>,
}

/// Статус запроса, видимый через status query.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum SubmissionStatus {
    /// В очереди, ещё не отправлялся.
    Pending,
    /// Ждёт повторной попытки после неудачи.
    Retrying {
        attempts: u32,
        next_attempt_at_ms: u64,
    },
    /// Успешно отправлен; квитанция tier'а.
    Succeeded(SubmitReceipt),
    /// Попытки исчерпаны. Компенсация – забота вызывающего.
    Failed { attempts: u32, last_error: String },
}

impl SubmissionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SubmissionStatus::Succeeded(_) | SubmissionStatus::Failed { .. }
        )
    }
}
