use std::sync::atomic::{AtomicU64, Ordering};

use crate::domain::{ActionId, MatchId, Nonce, ParticipantId};

/// Генерация ID на монотонных счётчиках.
/// Для локальных запусков и тестов; в проде ID обычно приходят снаружи
/// (клиент сам подписывает action id и nonce).
#[derive(Debug)]
pub struct IdGenerator {
    match_counter: AtomicU64,
    participant_counter: AtomicU64,
    action_counter: AtomicU64,
    nonce_counter: AtomicU64,
}

impl IdGenerator {
    /// Все счётчики стартуют с 1.
    pub fn new() -> Self {
        Self {
            match_counter: AtomicU64::new(1),
            participant_counter: AtomicU64::new(1),
            action_counter: AtomicU64::new(1),
            nonce_counter: AtomicU64::new(1),
        }
    }

    #[inline]
    pub fn next_match_id(&self) -> MatchId {
        self.match_counter.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn next_participant_id(&self) -> ParticipantId {
        self.participant_counter.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn next_action_id(&self) -> ActionId {
        self.action_counter.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn next_nonce(&self) -> Nonce {
        self.nonce_counter.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
