use serde::{Deserialize, Serialize};

use crate::domain::card::Card;
use crate::domain::chips::Chips;
use crate::domain::{ActionId, MatchId, Nonce, ParticipantId, Phase, SeatIndex};
use crate::engine::actions::ActionKind;

/// Откуда пришёл seed для колоды.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum SeedOrigin {
    /// Выдан randomness-сервисом (возможно, с proof'ом).
    Verified,
    /// Локальный fallback после таймаута сервиса. Матч помечается
    /// флагом unverified_randomness.
    LocalFallback,
}

/// Исходящее событие матча.
///
/// `apply` и `deal` возвращают список таких событий, а маршрутизацию
/// (dispatcher, подписчики, view-слой) делает вызывающий. Никаких
/// скрытых коллбеков внутри движка.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum OutboundEvent {
    /// Матч создан (первое bootstrap-действие).
    MatchCreated { match_id: MatchId },

    /// Участник вошёл в матч.
    ParticipantJoined {
        participant_id: ParticipantId,
        seat: SeatIndex,
        buy_in: Chips,
    },

    /// Матч заполнен, нужен seed: вызывающий идёт в randomness-порт
    /// и затем зовёт `deal`.
    SeedRequired { match_id: MatchId },

    /// Колода назначена и перетасована.
    DeckAssigned {
        origin: SeedOrigin,
        cards_left: usize,
    },

    /// Участнику розданы закрытые карты (сами карты в событие не кладём).
    HoleCardsDealt {
        participant_id: ParticipantId,
        count: usize,
    },

    /// Открыты общие карты.
    SharedCardsDealt { cards: Vec<Card> },

    /// Смена фазы.
    PhaseChanged { from: Phase, to: Phase },

    /// Действие участника применено.
    ActionApplied {
        participant_id: ParticipantId,
        kind: ActionKind,
        balance_after: Chips,
        pot_after: Chips,
    },

    /// Возврат половины ставки при strategic fold (для аудита).
    StrategicFoldRefunded {
        participant_id: ParticipantId,
        refund: Chips,
        pot_after: Chips,
    },

    /// Движок синтезировал fold по таймауту хода или дисконнекту.
    TimeoutFoldSynthesized { participant_id: ParticipantId },

    /// Участник потерял или восстановил связь (сигнал транспорта).
    ConnectivityChanged {
        participant_id: ParticipantId,
        connected: bool,
    },

    /// Участник вскрылся.
    RevealRecorded {
        participant_id: ParticipantId,
        cards: Vec<Card>,
    },

    /// Банк выплачен победителю.
    PotAwarded {
        participant_id: ParticipantId,
        amount: Chips,
    },

    /// Матч завершён (терминальное состояние).
    MatchCompleted {
        match_id: MatchId,
        winner: Option<ParticipantId>,
    },

    /// Повторная подача уже применённого (id, nonce): ничего не изменилось,
    /// возвращаем версию первого применения.
    DuplicateIgnored {
        action_id: ActionId,
        nonce: Nonce,
        applied_at_version: u64,
    },
}
