use serde::{Deserialize, Serialize};

use crate::domain::EntityId;
use crate::infra::hashing::SnapshotHash;
use crate::ports::ledger::TierSource;

/// Снапшот сущности, как его увидел один из tier'ов.
/// Payload непрозрачен – ядро хранит только hash и момент наблюдения.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct StateSnapshot {
    pub entity_id: EntityId,
    pub hash: SnapshotHash,
    pub source: TierSource,
    pub captured_at_ms: u64,
}

/// Статус сверки. Synced ⇔ оба hash'а наблюдены и равны.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum SyncStatus {
    Synced,
    Diverged,
    Syncing,
}

/// Политика разрешения конфликта при неравных hash'ах.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum ConflictPolicy {
    /// Доверяем быстрому tier'у.
    FastTierWins,
    /// Доверяем авторитетному tier'у.
    AuthoritativeWins,
    /// Доверяем более свежему captured_at; при равенстве – авторитетному.
    MostRecentWins,
}

impl ConflictPolicy {
    /// Выбрать каноничный источник из двух наблюдённых снапшотов.
    pub fn pick(&self, fast: &StateSnapshot, auth: &StateSnapshot) -> TierSource {
        match self {
            ConflictPolicy::FastTierWins => TierSource::FastTier,
            ConflictPolicy::AuthoritativeWins => TierSource::Authoritative,
            ConflictPolicy::MostRecentWins => {
                if fast.captured_at_ms > auth.captured_at_ms {
                    TierSource::FastTier
                } else {
                    TierSource::Authoritative
                }
            }
        }
    }
}

/// Итог последнего разрешения конфликта по сущности.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResolutionOutcome {
    pub winner: TierSource,
    pub policy: ConflictPolicy,
    pub resolved_at_ms: u64,
}

/// Отслеживаемая сущность: последний снапшот на источник + статус сверки.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TrackedEntity {
    pub entity_id: EntityId,
    pub fast: Option<StateSnapshot>,
    pub authoritative: Option<StateSnapshot>,
    pub status: SyncStatus,
    pub last_resolution: Option<ResolutionOutcome>,
    /// Базовый интервал опроса этой сущности.
    pub poll_interval_ms: u64,
    /// Когда сущность должна синкаться в следующий раз.
    pub next_poll_at_ms: u64,
    pub policy: ConflictPolicy,
    /// High-frequency режим: живой матч опрашивается чаще базового цикла,
    /// пока флаг не снимут (обычно – по завершению матча).
    pub high_frequency: bool,
}

impl TrackedEntity {
    pub fn new(entity_id: EntityId, poll_interval_ms: u64, policy: ConflictPolicy) -> Self {
        Self {
            entity_id,
            fast: None,
            authoritative: None,
            status: SyncStatus::Syncing,
            last_resolution: None,
            poll_interval_ms,
            next_poll_at_ms: 0,
            policy,
            high_frequency: false,
        }
    }

    pub fn snapshot_for(&self, source: TierSource) -> Option<&StateSnapshot> {
        match source {
            TierSource::FastTier => self.fast.as_ref(),
            TierSource::Authoritative => self.authoritative.as_ref(),
        }
    }
}
