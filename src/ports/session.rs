use std::collections::HashMap;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::domain::{MatchId, ParticipantId};
use crate::engine::actions::ActionKind;

/// Право, делегированное session-ключу.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Permission {
    JoinMatch,
    PlaceWagers,
    Fold,
    Reveal,
}

impl Permission {
    /// Какое право нужно для этого типа действия.
    pub fn required_for(kind: &ActionKind) -> Permission {
        match kind {
            ActionKind::Join { .. } => Permission::JoinMatch,
            ActionKind::Wager(_)
            | ActionKind::Raise(_)
            | ActionKind::Call
            | ActionKind::Check => Permission::PlaceWagers,
            ActionKind::Fold | ActionKind::StrategicFold => Permission::Fold,
            ActionKind::Reveal(_) => Permission::Reveal,
        }
    }
}

/// Выданный session-ключ: scoped, с ограниченным сроком жизни.
/// Позволяет агенту подавать действия от имени владельца без
/// переподтверждения каждого действия.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionHandle {
    pub id: u64,
    pub owner: ParticipantId,
}

/// Граница авторизации: каждое внешнее действие проходит verify ДО
/// валидатора. Невалидная сессия – действие молча отбрасывается,
/// до state machine оно не доходит.
pub trait SessionAuthority {
    fn issue(
        &mut self,
        owner: ParticipantId,
        permissions: Vec<Permission>,
        expires_at_ms: u64,
    ) -> SessionHandle;

    fn verify(
        &self,
        handle: &SessionHandle,
        match_id: MatchId,
        kind: &ActionKind,
        now_ms: u64,
    ) -> bool;

    fn revoke(&mut self, handle: &SessionHandle);
}

#[derive(Clone, Debug)]
struct SessionRecord {
    owner: ParticipantId,
    permissions: Vec<Permission>,
    expires_at_ms: u64,
}

/// In-memory session authority для тестов и локального запуска.
/// Scope по матчу здесь не сужается (любой матч), но контракт verify
/// его принимает – боевой адаптер сужает.
#[derive(Debug, Default)]
pub struct InMemorySessionAuthority {
    sessions: HashMap<u64, SessionRecord>,
    next_id: u64,
}

impl InMemorySessionAuthority {
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
            next_id: 1,
        }
    }
}

impl SessionAuthority for InMemorySessionAuthority {
    fn issue(
        &mut self,
        owner: ParticipantId,
        permissions: Vec<Permission>,
        expires_at_ms: u64,
    ) -> SessionHandle {
        let id = self.next_id;
        self.next_id += 1;
        self.sessions.insert(
            id,
            SessionRecord {
                owner,
                permissions,
                expires_at_ms,
            },
        );
        SessionHandle { id, owner }
    }

    fn verify(
        &self,
        handle: &SessionHandle,
        _match_id: MatchId,
        kind: &ActionKind,
        now_ms: u64,
    ) -> bool {
        let Some(rec) = self.sessions.get(&handle.id) else {
            debug!("session {}: не найдена", handle.id);
            return false;
        };
        if rec.owner != handle.owner {
            debug!("session {}: владелец не совпадает", handle.id);
            return false;
        }
        if now_ms >= rec.expires_at_ms {
            debug!("session {}: истекла", handle.id);
            return false;
        }
        let needed = Permission::required_for(kind);
        if !rec.permissions.contains(&needed) {
            debug!("session {}: нет права {:?}", handle.id, needed);
            return false;
        }
        true
    }

    fn revoke(&mut self, handle: &SessionHandle) {
        self.sessions.remove(&handle.id);
    }
}
