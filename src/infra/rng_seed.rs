//! RngSeed — доменно-разделённый seed для dealing.
//!
//! Умеет:
//!   - хранить базовый seed (u64 или [u8;32]);
//!   - детерминированное hash-расширение:
//!         new = H(domain || old || match_id || round || version)
//!   - локальный fallback-seed, когда randomness-сервис не ответил;
//!   - создавать DeterministicRng из seed.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::infra::rng::DeterministicRng;

/// 32-байтовый seed для RNG.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RngSeed {
    pub bytes: [u8; 32],
}

impl RngSeed {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self { bytes }
    }

    /// Seed из u64 (удобно в тестах).
    pub fn from_u64(x: u64) -> Self {
        let mut b = [0u8; 32];
        b[..8].copy_from_slice(&x.to_le_bytes());
        Self { bytes: b }
    }

    /// Доменное hash-расширение с контекстом матча.
    pub fn derive(&self, match_id: u64, round: u64, version: u64) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"WAGER_ENGINE_RNG_V1");
        hasher.update(self.bytes);
        hasher.update(match_id.to_le_bytes());
        hasher.update(round.to_le_bytes());
        hasher.update(version.to_le_bytes());

        let hash = hasher.finalize();
        let mut out = [0u8; 32];
        out.copy_from_slice(&hash[..32]);
        Self { bytes: out }
    }

    /// Локальный fallback, когда randomness-сервис не успел ответить.
    /// Матч при этом помечается как "unverified randomness".
    pub fn local_fallback(match_id: u64, version: u64, entropy_ms: u64) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"WAGER_ENGINE_FALLBACK_V1");
        hasher.update(match_id.to_le_bytes());
        hasher.update(version.to_le_bytes());
        hasher.update(entropy_ms.to_le_bytes());

        let hash = hasher.finalize();
        let mut out = [0u8; 32];
        out.copy_from_slice(&hash[..32]);
        Self { bytes: out }
    }

    pub fn to_rng(&self) -> DeterministicRng {
        DeterministicRng::from_seed(self.bytes)
    }
}
