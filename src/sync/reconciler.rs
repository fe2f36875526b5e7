//! StateReconciler: движок сверки пары снапшотов per сущность.

use std::collections::HashMap;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::EntityId;
use crate::ports::ledger::{LedgerClient, TierSource};
use crate::sync::snapshot::{
    ConflictPolicy, ResolutionOutcome, StateSnapshot, SyncStatus, TrackedEntity,
};

/// Источник снапшотов одного tier'а.
/// None = "ещё не наблюдали" – это валидный ответ, не ошибка.
pub trait SnapshotSource {
    fn fetch(&self, entity_id: EntityId) -> Result<Option<StateSnapshot>, SyncError>;
}

/// Адаптер LedgerClient → SnapshotSource.
pub struct LedgerSnapshotSource<C: LedgerClient> {
    client: C,
    tier: TierSource,
}

impl<C: LedgerClient> LedgerSnapshotSource<C> {
    pub fn new(client: C, tier: TierSource) -> Self {
        Self { client, tier }
    }

    pub fn client_mut(&mut self) -> &mut C {
        &mut self.client
    }
}

impl<C: LedgerClient> SnapshotSource for LedgerSnapshotSource<C> {
    fn fetch(&self, entity_id: EntityId) -> Result<Option<StateSnapshot>, SyncError> {
        let snap = self
            .client
            .get_state(entity_id)
            .map_err(|e| SyncError::SourceUnavailable {
                tier: self.tier,
                reason: e.to_string(),
            })?;
        Ok(snap.map(|s| StateSnapshot {
            entity_id,
            hash: s.hash,
            source: self.tier,
            captured_at_ms: s.captured_at_ms,
        }))
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SyncError {
    #[error("Сущность {0} не отслеживается")]
    NotTracked(EntityId),

    #[error("Источник {tier:?} недоступен: {reason}")]
    SourceUnavailable { tier: TierSource, reason: String },
}

/// Событие сверки. Reconciler их возвращает, маршрутизирует владелец матча.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum SyncEvent {
    Synced {
        entity_id: EntityId,
    },
    /// Расхождение: наблюдён один источник или hash'и не равны.
    Diverged {
        entity_id: EntityId,
        fast_seen: bool,
        authoritative_seen: bool,
    },
    /// Конфликт разрешён политикой: canonical помечен, ничего не перезаписано.
    ConflictResolved {
        entity_id: EntityId,
        winner: TierSource,
        policy: ConflictPolicy,
    },
}

/// Итог одного sync'а.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyncOutcome {
    pub status: SyncStatus,
    /// Какому снапшоту доверять downstream-потребителям.
    pub canonical: Option<TierSource>,
    pub events: Vec<SyncEvent>,
}

/// Настройки reconciler'а.
#[derive(Clone, Copy, Debug)]
pub struct ReconcilerConfig {
    /// Базовый интервал опроса (если track не задал свой).
    pub base_poll_interval_ms: u64,
    /// Повышенная частота для high-frequency сущностей.
    pub high_frequency_interval_ms: u64,
    /// Максимум сущностей в одной группе batch_sync.
    pub max_concurrent: usize,
    /// TTL снапшотов в кэше: старше – вытесняются.
    pub snapshot_ttl_ms: u64,
    /// Ёмкость журнала событий сверки.
    pub history_cap: usize,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            base_poll_interval_ms: 5_000,
            high_frequency_interval_ms: 500,
            max_concurrent: 8,
            snapshot_ttl_ms: 60_000,
            history_cap: 1_024,
        }
    }
}

/// Движок сверки. Sync по одной сущности сериализован сам с собой
/// (один вызов за раз), разные сущности независимы.
pub struct StateReconciler {
    fast: Box<dyn SnapshotSource + Send>,
    authoritative: Box<dyn SnapshotSource + Send>,
    entities: HashMap<EntityId, TrackedEntity>,
    config: ReconcilerConfig,
    /// Ограниченный журнал событий (delta history).
    history: Vec<SyncEvent>,
}

impl StateReconciler {
    pub fn new(
        fast: Box<dyn SnapshotSource + Send>,
        authoritative: Box<dyn SnapshotSource + Send>,
        config: ReconcilerConfig,
    ) -> Self {
        Self {
            fast,
            authoritative,
            entities: HashMap::new(),
            config,
            history: Vec::new(),
        }
    }

    /// Начать отслеживание сущности.
    pub fn track(
        &mut self,
        entity_id: EntityId,
        poll_interval_ms: Option<u64>,
        policy: ConflictPolicy,
    ) {
        let interval = poll_interval_ms.unwrap_or(self.config.base_poll_interval_ms);
        self.entities
            .entry(entity_id)
            .or_insert_with(|| TrackedEntity::new(entity_id, interval, policy));
        debug!("track entity {entity_id}, interval {interval}ms, policy {policy:?}");
    }

    pub fn untrack(&mut self, entity_id: EntityId) {
        self.entities.remove(&entity_id);
    }

    /// Включить/выключить high-frequency режим (живой матч).
    /// Владелец снимает флаг, когда матч дошёл до completed.
    pub fn set_high_frequency(&mut self, entity_id: EntityId, enabled: bool) {
        if let Some(e) = self.entities.get_mut(&entity_id) {
            e.high_frequency = enabled;
        }
    }

    pub fn get_sync_status(&self, entity_id: EntityId) -> Option<SyncStatus> {
        self.entities.get(&entity_id).map(|e| e.status)
    }

    pub fn tracked(&self, entity_id: EntityId) -> Option<&TrackedEntity> {
        self.entities.get(&entity_id)
    }

    /// Сверить одну сущность.
    ///
    /// `force` игнорирует расписание опроса. Ошибка fetch'а не меняет
    /// последнее известное состояние сущности.
    pub fn sync(
        &mut self,
        entity_id: EntityId,
        force: bool,
        now_ms: u64,
    ) -> Result<SyncOutcome, SyncError> {
        let entity = self
            .entities
            .get(&entity_id)
            .ok_or(SyncError::NotTracked(entity_id))?;

        if !force && now_ms < entity.next_poll_at_ms {
            return Ok(SyncOutcome {
                status: entity.status,
                canonical: entity.last_resolution.map(|r| r.winner),
                events: Vec::new(),
            });
        }

        // Помечаем syncing до обращения к источникам.
        if let Some(e) = self.entities.get_mut(&entity_id) {
            e.status = SyncStatus::Syncing;
        }

        let fast = self.fast.fetch(entity_id);
        let auth = self.authoritative.fetch(entity_id);

        let (fast, auth) = match (fast, auth) {
            (Ok(f), Ok(a)) => (f, a),
            (Err(e), _) | (_, Err(e)) => {
                warn!("sync entity {entity_id}: источник недоступен: {e}");
                // Статус возвращаем к последнему известному осмысленному.
                if let Some(ent) = self.entities.get_mut(&entity_id) {
                    ent.status = if ent.fast.is_some() || ent.authoritative.is_some() {
                        SyncStatus::Diverged
                    } else {
                        SyncStatus::Syncing
                    };
                }
                return Err(e);
            }
        };

        let mut events = Vec::new();
        let entity = self.entities.get_mut(&entity_id).expect("tracked above");

        entity.fast = fast.clone();
        entity.authoritative = auth.clone();

        let (status, canonical) = match (&fast, &auth) {
            // Оба источника ещё ничего не видели – вакуумно synced.
            (None, None) => {
                events.push(SyncEvent::Synced { entity_id });
                (SyncStatus::Synced, None)
            }

            // Виден ровно один: расхождение, фиксируем, НЕ ошибка.
            (Some(s), None) | (None, Some(s)) => {
                events.push(SyncEvent::Diverged {
                    entity_id,
                    fast_seen: fast.is_some(),
                    authoritative_seen: auth.is_some(),
                });
                (SyncStatus::Diverged, Some(s.source))
            }

            (Some(f), Some(a)) => {
                if f.hash == a.hash {
                    events.push(SyncEvent::Synced { entity_id });
                    (SyncStatus::Synced, None)
                } else {
                    let winner = entity.policy.pick(f, a);
                    events.push(SyncEvent::Diverged {
                        entity_id,
                        fast_seen: true,
                        authoritative_seen: true,
                    });
                    events.push(SyncEvent::ConflictResolved {
                        entity_id,
                        winner,
                        policy: entity.policy,
                    });
                    entity.last_resolution = Some(ResolutionOutcome {
                        winner,
                        policy: entity.policy,
                        resolved_at_ms: now_ms,
                    });
                    info!(
                        "entity {entity_id}: divergence, политика {:?} выбрала {winner:?}",
                        entity.policy
                    );
                    (SyncStatus::Diverged, Some(winner))
                }
            }
        };

        entity.status = status;
        let interval = if entity.high_frequency {
            self.config.high_frequency_interval_ms
        } else {
            entity.poll_interval_ms
        };
        entity.next_poll_at_ms = now_ms.saturating_add(interval);

        self.push_history(&events);
        Ok(SyncOutcome {
            status,
            canonical,
            events,
        })
    }

    /// Сверить пачку сущностей группами ограниченного размера.
    /// Ошибка одной сущности не прерывает пачку: на выходе карта per-id.
    pub fn batch_sync(
        &mut self,
        entity_ids: &[EntityId],
        now_ms: u64,
    ) -> HashMap<EntityId, Result<SyncOutcome, SyncError>> {
        let mut results = HashMap::with_capacity(entity_ids.len());
        for group in entity_ids.chunks(self.config.max_concurrent.max(1)) {
            for &id in group {
                let res = self.sync(id, true, now_ms);
                results.insert(id, res);
            }
        }
        results
    }

    /// Один тик фонового цикла: синкнуть всё, что по расписанию пора,
    /// и вытеснить устаревшие снапшоты.
    pub fn tick(&mut self, now_ms: u64) -> Vec<SyncEvent> {
        let due: Vec<EntityId> = self
            .entities
            .values()
            .filter(|e| now_ms >= e.next_poll_at_ms)
            .map(|e| e.entity_id)
            .collect();

        let mut events = Vec::new();
        for id in due {
            match self.sync(id, false, now_ms) {
                Ok(outcome) => events.extend(outcome.events),
                Err(e) => debug!("tick sync {id}: {e}"),
            }
        }

        self.evict_stale(now_ms);
        events
    }

    /// Журнал событий сверки (ограниченный).
    pub fn history(&self) -> &[SyncEvent] {
        &self.history
    }

    fn push_history(&mut self, events: &[SyncEvent]) {
        for ev in events {
            if self.history.len() >= self.config.history_cap {
                self.history.remove(0);
            }
            self.history.push(ev.clone());
        }
    }

    /// Вытеснение по времени: снапшоты старше TTL выбрасываем из кэша.
    /// Статус сущности при этом не трогаем.
    fn evict_stale(&mut self, now_ms: u64) {
        let ttl = self.config.snapshot_ttl_ms;
        for e in self.entities.values_mut() {
            if let Some(s) = &e.fast {
                if now_ms.saturating_sub(s.captured_at_ms) > ttl {
                    e.fast = None;
                }
            }
            if let Some(s) = &e.authoritative {
                if now_ms.saturating_sub(s.captured_at_ms) > ttl {
                    e.authoritative = None;
                }
            }
        }
    }
}
