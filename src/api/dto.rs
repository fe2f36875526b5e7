use serde::{Deserialize, Serialize};

use crate::domain::card::Card;
use crate::domain::chips::Chips;
use crate::domain::match_state::Phase;
use crate::domain::participant::ParticipantStatus;
use crate::domain::{MatchId, ParticipantId, SeatIndex};

/// Участник глазами фронта. Закрытые карты отдаём только "своему"
/// участнику (hero) – чужие руки наружу не утекают.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ParticipantViewDto {
    pub participant_id: ParticipantId,
    pub identity: String,
    pub seat: SeatIndex,
    pub balance: Chips,
    pub current_wager: Chips,
    pub status: ParticipantStatus,
    pub revealed: bool,
    pub hole_cards: Option<Vec<Card>>,
}

/// Матч глазами фронта.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MatchViewDto {
    pub match_id: MatchId,
    pub phase: Phase,
    pub pot: Chips,
    pub wager_level: Chips,
    pub round: u32,
    pub shared_cards: Vec<Card>,
    pub participants: Vec<ParticipantViewDto>,
    pub current_actor: Option<ParticipantId>,
    pub winner: Option<ParticipantId>,
    pub version: u64,
    pub unverified_randomness: bool,
}
