use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::MatchId;
use crate::infra::rng_seed::RngSeed;

/// Контекст запроса seed'а: из чего randomness-сервис его выводит.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeedContext {
    pub match_id: MatchId,
    pub round: u32,
    pub version: u64,
}

/// Выданный seed + опциональное доказательство (VRF proof и т.п. –
/// ядро его не интерпретирует, только протаскивает).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeedGrant {
    pub seed: RngSeed,
    pub proof: Option<Vec<u8>>,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RandomnessError {
    /// Сервис не ответил за отведённый таймаут. Восстановимо:
    /// движок переходит на локальный fallback-seed и помечает матч.
    #[error("Randomness-сервис не ответил за таймаут")]
    Timeout,

    #[error("Randomness-сервис недоступен: {0}")]
    Unavailable(String),
}

/// Порт randomness-сервиса.
///
/// Боевая реализация – request/poll с таймаутом; для тестов и локального
/// запуска есть мгновенная синхронная `InstantRandomness`.
pub trait RandomnessProvider {
    fn request(&mut self, ctx: &SeedContext) -> Result<SeedGrant, RandomnessError>;
}

/// Мгновенный провайдер: детерминированно выводит seed из базового.
/// НЕ для продакшена.
#[derive(Clone, Debug)]
pub struct InstantRandomness {
    base: RngSeed,
}

impl InstantRandomness {
    pub fn new(base: RngSeed) -> Self {
        Self { base }
    }
}

impl RandomnessProvider for InstantRandomness {
    fn request(&mut self, ctx: &SeedContext) -> Result<SeedGrant, RandomnessError> {
        let seed = self
            .base
            .derive(ctx.match_id, ctx.round as u64, ctx.version);
        Ok(SeedGrant { seed, proof: None })
    }
}

/// Провайдер, который всегда таймаутит. Нужен тестам fallback-ветки.
#[derive(Clone, Copy, Debug, Default)]
pub struct TimingOutRandomness;

impl RandomnessProvider for TimingOutRandomness {
    fn request(&mut self, _ctx: &SeedContext) -> Result<SeedGrant, RandomnessError> {
        Err(RandomnessError::Timeout)
    }
}
