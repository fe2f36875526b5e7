use serde::{Deserialize, Serialize};

use crate::domain::card::Card;
use crate::domain::chips::Chips;
use crate::domain::{ParticipantId, SeatIndex};

use crate::engine::actions::ActionKind;

/// Статус участника в контексте текущего матча.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum ParticipantStatus {
    /// Участник активен: может ставить, фолдить, вскрываться.
    Active,
    /// Участник сфолдил и больше не претендует на банк.
    Folded,
    /// Весь баланс уже в банке – ставить больше нечем, но на банк претендует.
    AllIn,
    /// Связь потеряна. На его ходу движок синтезирует fold.
    Disconnected,
}

/// Состояние участника внутри конкретного матча.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Participant {
    pub id: ParticipantId,
    /// Внешний identity-handle (адрес кошелька, ник – для ядра это строка).
    pub identity: String,
    /// Текущий баланс внутри матча.
    pub balance: Chips,
    /// Суммарная ставка в текущем раунде.
    pub current_wager: Chips,
    pub seat: SeatIndex,
    pub status: ParticipantStatus,
    /// Закрытые карты, розданные при dealing.
    pub hole_cards: Vec<Card>,
    /// Вскрылся ли участник в фазе reveal.
    pub revealed: bool,
    /// Последнее применённое действие (для отладки и view-слоя).
    pub last_action: Option<ActionKind>,
}

impl Participant {
    pub fn new(id: ParticipantId, identity: String, seat: SeatIndex, buy_in: Chips) -> Self {
        Self {
            id,
            identity,
            balance: buy_in,
            current_wager: Chips::ZERO,
            seat,
            status: ParticipantStatus::Active,
            hole_cards: Vec::new(),
            revealed: false,
            last_action: None,
        }
    }

    /// Участвует ли ещё в борьбе за банк. Disconnected остаётся в руке,
    /// пока его не закроет синтетический fold.
    pub fn is_in_hand(&self) -> bool {
        matches!(
            self.status,
            ParticipantStatus::Active | ParticipantStatus::AllIn | ParticipantStatus::Disconnected
        )
    }

    /// Может ли сейчас совершать действия (all-in уже не может).
    pub fn can_act(&self) -> bool {
        matches!(self.status, ParticipantStatus::Active)
    }

    /// Ожидается ли от участника ход. Disconnected остаётся в очереди:
    /// его ход закроет синтетический fold, а не пропуск очереди.
    pub fn awaits_turn(&self) -> bool {
        matches!(
            self.status,
            ParticipantStatus::Active | ParticipantStatus::Disconnected
        )
    }
}
