//! Часы и таймер хода.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::domain::ParticipantId;

/// Источник времени. Ядро никогда не читает системные часы напрямую –
/// только через этот trait, чтобы тесты были детерминированными.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Боевые часы: системное время в мс от эпохи.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// Ручные часы для тестов: время двигается только явным `advance`.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(start_ms)),
        }
    }

    pub fn advance(&self, delta_ms: u64) {
        self.now.fetch_add(delta_ms, Ordering::SeqCst);
    }

    pub fn set(&self, now_ms: u64) {
        self.now.store(now_ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Таймер текущего хода одного матча.
///
/// Дедлайн выставляется при передаче хода; когда `now` перевалил за него,
/// движок синтезирует fold вместо того, чтобы блокировать матч.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TurnClock {
    /// Чей сейчас ход (None – хода нет, таймер спит).
    pub current: Option<ParticipantId>,
    /// Абсолютный дедлайн хода в мс.
    pub deadline_ms: u64,
}

impl TurnClock {
    pub fn idle() -> Self {
        Self {
            current: None,
            deadline_ms: 0,
        }
    }

    /// Начать ход участника с таймаутом из конфига.
    pub fn start_turn(&mut self, participant: ParticipantId, now_ms: u64, timeout_ms: u64) {
        self.current = Some(participant);
        self.deadline_ms = now_ms.saturating_add(timeout_ms);
    }

    pub fn clear(&mut self) {
        self.current = None;
        self.deadline_ms = 0;
    }

    /// Кто просрочил ход (если просрочил).
    pub fn expired(&self, now_ms: u64) -> Option<ParticipantId> {
        match self.current {
            Some(p) if now_ms >= self.deadline_ms => Some(p),
            _ => None,
        }
    }
}

impl Default for TurnClock {
    fn default() -> Self {
        Self::idle()
    }
}
