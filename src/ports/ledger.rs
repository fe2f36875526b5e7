use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{MatchId, ParticipantId};
use crate::engine::actions::Action;
use crate::infra::hashing::{hash_payload, SnapshotHash};

/// Какой tier дал снапшот.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TierSource {
    /// Быстрый tier: мгновенное, но предварительное подтверждение.
    FastTier,
    /// Медленный авторитетный tier: финальная истина.
    Authoritative,
}

/// Квитанция о submit'е. Handle непрозрачен для ядра.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubmitReceipt {
    pub confirmation_id: String,
    pub state_handle: String,
}

/// Снапшот состояния, как его видит tier. Ядро смотрит только
/// на hash и captured_at, payload не интерпретирует.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LedgerSnapshot {
    pub payload: serde_json::Value,
    pub hash: SnapshotHash,
    pub captured_at_ms: u64,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Submit отклонён tier'ом: {0}")]
    SubmitRejected(String),

    #[error("Tier недоступен: {0}")]
    Unavailable(String),
}

/// Клиент одного tier'а. Fast-tier и authoritative используют один и
/// тот же контракт, различается только реализация и latency.
pub trait LedgerClient {
    fn submit(
        &mut self,
        match_id: MatchId,
        action: &Action,
        signers: &[ParticipantId],
    ) -> Result<SubmitReceipt, LedgerError>;

    fn get_state(&self, match_id: MatchId) -> Result<Option<LedgerSnapshot>, LedgerError>;
}

/// In-memory tier для тестов: хранит последний payload per match,
/// хэширует его так же, как боевой адаптер.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    states: HashMap<MatchId, LedgerSnapshot>,
    submissions: u64,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Напрямую подложить состояние (тестовый хук: эмулирует то, что tier
    /// уже исполнил submit и состояние поменялось).
    pub fn set_state(&mut self, match_id: MatchId, payload: serde_json::Value, at_ms: u64) {
        let hash = hash_payload(&payload);
        self.states.insert(
            match_id,
            LedgerSnapshot {
                payload,
                hash,
                captured_at_ms: at_ms,
            },
        );
    }

    pub fn submissions(&self) -> u64 {
        self.submissions
    }
}

impl LedgerClient for InMemoryLedger {
    fn submit(
        &mut self,
        match_id: MatchId,
        action: &Action,
        _signers: &[ParticipantId],
    ) -> Result<SubmitReceipt, LedgerError> {
        self.submissions += 1;
        Ok(SubmitReceipt {
            confirmation_id: format!("conf-{}-{}", match_id, action.nonce),
            state_handle: format!("state-{match_id}"),
        })
    }

    fn get_state(&self, match_id: MatchId) -> Result<Option<LedgerSnapshot>, LedgerError> {
        Ok(self.states.get(&match_id).cloned())
    }
}
