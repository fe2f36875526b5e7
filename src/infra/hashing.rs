//! Хэширование снапшотов состояния.
//!
//! Оба tier'а для ядра непрозрачны: сравниваем только SHA-256 от payload'а.

use core::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// SHA-256 хэш payload'а снапшота.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct SnapshotHash(pub [u8; 32]);

impl fmt::Display for SnapshotHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0 {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

/// Хэш произвольного JSON-payload'а.
///
/// serde_json даёт стабильную сериализацию для одного и того же Value,
/// этого достаточно: payload – уже сериализованное tier'ом состояние.
pub fn hash_payload(payload: &serde_json::Value) -> SnapshotHash {
    let bytes = serde_json::to_vec(payload).unwrap_or_default();
    hash_bytes(&bytes)
}

pub fn hash_bytes(bytes: &[u8]) -> SnapshotHash {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let hash = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&hash[..32]);
    SnapshotHash(out)
}
