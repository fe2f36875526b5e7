use serde::{Deserialize, Serialize};

use crate::dispatch::SubmissionStatus;
use crate::domain::match_state::Match;
use crate::domain::{EntityId, MatchId, Nonce, ParticipantId};
use crate::sync::SyncStatus;

use super::dto::{MatchViewDto, ParticipantViewDto};

/// Запросы "только чтение" – наблюдаемая поверхность ядра.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Query {
    /// Состояние матча.
    GetMatch { match_id: MatchId },

    /// Статус сверки сущности (reconciler).
    GetSyncStatus { entity_id: EntityId },

    /// Статус отправки по nonce.
    GetSubmissionStatus { nonce: Nonce },
}

/// Результат запроса.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum QueryResponse {
    Match(Option<MatchViewDto>),
    SyncStatus(Option<SyncStatus>),
    Submission(Option<SubmissionStatus>),
}

/// Собрать DTO матча. `is_hero` решает, чьи закрытые карты показывать.
pub fn build_match_view(m: &Match, is_hero: impl Fn(ParticipantId) -> bool) -> MatchViewDto {
    let participants = m
        .participants
        .iter()
        .map(|p| ParticipantViewDto {
            participant_id: p.id,
            identity: p.identity.clone(),
            seat: p.seat,
            balance: p.balance,
            current_wager: p.current_wager,
            status: p.status,
            revealed: p.revealed,
            hole_cards: if is_hero(p.id) || p.revealed {
                Some(p.hole_cards.clone())
            } else {
                None
            },
        })
        .collect();

    MatchViewDto {
        match_id: m.id,
        phase: m.phase,
        pot: m.pot,
        wager_level: m.wager_level,
        round: m.round,
        shared_cards: m.shared_cards.clone(),
        participants,
        current_actor: m.current_actor(),
        winner: m.winner,
        version: m.version,
        unverified_randomness: m.unverified_randomness,
    }
}
