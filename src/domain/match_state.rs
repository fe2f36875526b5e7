use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::card::Card;
use crate::domain::chips::Chips;
use crate::domain::config::MatchConfig;
use crate::domain::deck::Deck;
use crate::domain::participant::Participant;
use crate::domain::{ActionId, MatchId, Nonce, ParticipantId};
use crate::engine::events::OutboundEvent;

/// Фаза матча. В каждый момент ровно одна.
///
/// Переходы:
///   waiting → dealing → betting → reveal → resolution → completed
/// с коротким путём betting → resolution, когда активных осталось ≤ 1.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum Phase {
    Waiting,
    Dealing,
    Betting,
    Reveal,
    Resolution,
    Completed,
}

/// Запись в журнале матча: событие + порядковый номер.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MatchEvent {
    pub index: u32,
    pub kind: OutboundEvent,
}

/// Журнал матча (аудит применённых действий). Ограничен по длине:
/// при переполнении старые записи вытесняются.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MatchHistory {
    pub events: Vec<MatchEvent>,
    next_index: u32,
    cap: usize,
}

impl MatchHistory {
    pub const DEFAULT_CAP: usize = 512;

    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            next_index: 0,
            cap: Self::DEFAULT_CAP,
        }
    }

    pub fn push(&mut self, kind: OutboundEvent) {
        if self.events.len() >= self.cap {
            self.events.remove(0);
        }
        let index = self.next_index;
        self.next_index = self.next_index.wrapping_add(1);
        self.events.push(MatchEvent { index, kind });
    }
}

impl Default for MatchHistory {
    fn default() -> Self {
        Self::new()
    }
}

/// Основное состояние матча. Владеет им исключительно state machine:
/// любые мутации – только через `apply` / `deal`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Match {
    pub id: MatchId,
    pub phase: Phase,
    pub config: MatchConfig,

    /// Участники в порядке посадки (seat = индекс в векторе).
    pub participants: Vec<Participant>,

    /// Общий банк. Инвариант: равен сумме чистых взносов и неотрицателен.
    pub pot: Chips,

    /// Текущий уровень ставки раунда (сколько должен поставить каждый активный).
    pub wager_level: Chips,

    /// Номер раунда ставок (1 после dealing).
    pub round: u32,

    /// Открытые общие карты.
    pub shared_cards: Vec<Card>,

    /// Колода, назначенная при dealing. None до неё.
    pub deck: Option<Deck>,

    /// Очередь ходов в текущем раунде: кто ещё не уравнял уровень.
    pub pending: Vec<ParticipantId>,

    /// ID последнего применённого действия.
    pub last_action: Option<ActionId>,

    /// Монотонная версия: строго растёт при каждом успешном apply.
    pub version: u64,

    pub winner: Option<ParticipantId>,

    /// Seed получен локальным fallback'ом, а не от randomness-сервиса.
    pub unverified_randomness: bool,

    /// Применённые (action id, nonce) → версия на момент применения.
    /// Повторная подача того же действия – no-op.
    pub applied: HashMap<(ActionId, Nonce), u64>,

    pub history: MatchHistory,

    pub created_at: u64,
    /// Момент перехода в Completed (для retention-окна).
    pub completed_at: Option<u64>,
}

impl Match {
    /// Пустой матч в фазе waiting. Используется только из state machine.
    pub(crate) fn new(id: MatchId, config: MatchConfig, created_at: u64) -> Self {
        Self {
            id,
            phase: Phase::Waiting,
            config,
            participants: Vec::new(),
            pot: Chips::ZERO,
            wager_level: Chips::ZERO,
            round: 0,
            shared_cards: Vec::new(),
            deck: None,
            pending: Vec::new(),
            last_action: None,
            version: 0,
            winner: None,
            unverified_randomness: false,
            applied: HashMap::new(),
            history: MatchHistory::new(),
            created_at,
            completed_at: None,
        }
    }

    pub fn participant(&self, id: ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    pub fn participant_mut(&mut self, id: ParticipantId) -> Option<&mut Participant> {
        self.participants.iter_mut().find(|p| p.id == id)
    }

    /// Сколько участников ещё борется за банк (active + all-in).
    pub fn in_hand_count(&self) -> usize {
        self.participants.iter().filter(|p| p.is_in_hand()).count()
    }

    /// Сколько участников может действовать (только active).
    pub fn active_count(&self) -> usize {
        self.participants.iter().filter(|p| p.can_act()).count()
    }

    pub fn is_full(&self) -> bool {
        self.participants.len() >= self.config.seats as usize
    }

    /// Чей сейчас ход (голова очереди pending).
    pub fn current_actor(&self) -> Option<ParticipantId> {
        self.pending.first().copied()
    }

    pub fn is_completed(&self) -> bool {
        self.phase == Phase::Completed
    }
}
