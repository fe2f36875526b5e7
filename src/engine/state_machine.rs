//! Машина состояний матча.
//!
//! Ключевое свойство: `apply` и `deal` чистые. Никакого I/O, никакого
//! чтения часов – одинаковый вход всегда даёт байт-в-байт одинаковый выход.
//! Seed для колоды добывает вызывающий (randomness-порт) и передаёт в `deal`.
//! Отклонённое действие возвращает ошибку, не трогая матч.

use log::debug;

use crate::domain::config::MatchConfig;
use crate::domain::match_state::{Match, Phase};
use crate::domain::participant::{Participant, ParticipantStatus};
use crate::domain::{Chips, Deck, MatchId, ParticipantId};
use crate::engine::actions::{Action, ActionKind};
use crate::engine::comparator::{HandComparator, HighCardComparator};
use crate::engine::errors::{ConfigError, RejectReason};
use crate::engine::events::{OutboundEvent, SeedOrigin};
use crate::engine::RandomSource;
use crate::infra::rng_seed::RngSeed;

/// Машина состояний. Держит только компаратор – всё состояние в `Match`.
pub struct GameStateMachine {
    comparator: Box<dyn HandComparator + Send + Sync>,
}

impl Default for GameStateMachine {
    fn default() -> Self {
        Self::new(Box::new(HighCardComparator))
    }
}

impl GameStateMachine {
    pub fn new(comparator: Box<dyn HandComparator + Send + Sync>) -> Self {
        Self { comparator }
    }

    /// Создать матч в фазе waiting. Конфиг валидируется здесь и только здесь.
    pub fn create_match(
        id: MatchId,
        config: MatchConfig,
        created_at_ms: u64,
    ) -> Result<(Match, Vec<OutboundEvent>), ConfigError> {
        config.validate()?;
        let m = Match::new(id, config, created_at_ms);
        let events = vec![OutboundEvent::MatchCreated { match_id: id }];
        Ok((m, events))
    }

    /// Применить одно валидированное действие.
    ///
    /// Возвращает новый матч + события для маршрутизации вызывающим.
    /// Повтор (id, nonce) – no-op с событием `DuplicateIgnored`.
    pub fn apply(
        &self,
        m: &Match,
        action: &Action,
    ) -> Result<(Match, Vec<OutboundEvent>), RejectReason> {
        // Идемпотентность прежде всего: повтор не должен даже валидироваться,
        // состояние могло уйти вперёд.
        let key = (action.id, action.nonce);
        if let Some(&version) = m.applied.get(&key) {
            debug!(
                "match {}: duplicate action id={} nonce={} (applied at v{})",
                m.id, action.id, action.nonce, version
            );
            return Ok((
                m.clone(),
                vec![OutboundEvent::DuplicateIgnored {
                    action_id: action.id,
                    nonce: action.nonce,
                    applied_at_version: version,
                }],
            ));
        }

        crate::engine::validation::validate(m, action)?;

        // Reveal сверяем с розданными картами до клонирования:
        // отклонение не должно оставлять следов.
        if let ActionKind::Reveal(cards) = &action.kind {
            let p = m
                .participant(action.participant_id)
                .ok_or(RejectReason::UnknownParticipant(action.participant_id))?;
            if *cards != p.hole_cards {
                return Err(RejectReason::RevealMismatch);
            }
        }

        let mut work = m.clone();
        let mut events = Vec::new();

        work.version += 1;
        work.last_action = Some(action.id);
        work.applied.insert(key, work.version);

        match &action.kind {
            ActionKind::Join { buy_in, identity } => {
                self.apply_join(&mut work, action, identity.clone(), *buy_in, &mut events);
            }
            ActionKind::Wager(amount) | ActionKind::Raise(amount) => {
                self.apply_wager(&mut work, action, *amount, &mut events);
            }
            ActionKind::Call => {
                self.apply_call(&mut work, action, &mut events);
            }
            ActionKind::Check => {
                self.remove_pending(&mut work, action.participant_id);
                self.push_acted(&mut work, action, &mut events);
            }
            ActionKind::Fold => {
                let p = work.participant_mut(action.participant_id).unwrap();
                p.status = ParticipantStatus::Folded;
                self.remove_pending(&mut work, action.participant_id);
                self.push_acted(&mut work, action, &mut events);
            }
            ActionKind::StrategicFold => {
                self.apply_strategic_fold(&mut work, action, &mut events);
            }
            ActionKind::Reveal(cards) => {
                let p = work.participant_mut(action.participant_id).unwrap();
                p.revealed = true;
                p.last_action = Some(action.kind.clone());
                events.push(OutboundEvent::RevealRecorded {
                    participant_id: action.participant_id,
                    cards: cards.clone(),
                });
            }
        }

        self.advance_phase(&mut work, action.timestamp_ms, &mut events);

        for ev in &events {
            work.history.push(ev.clone());
        }
        Ok((work, events))
    }

    /// Назначить колоду: построить, перетасовать seed'ом, раздать карты.
    ///
    /// Чистая функция: seed добыл вызывающий, здесь только детерминированный
    /// Fisher–Yates поверх него.
    pub fn deal(
        &self,
        m: &Match,
        seed: &RngSeed,
        origin: SeedOrigin,
    ) -> Result<(Match, Vec<OutboundEvent>), RejectReason> {
        if m.phase != Phase::Dealing {
            return Err(RejectReason::WrongPhase {
                phase: m.phase,
                action: "deal",
            });
        }

        let mut work = m.clone();
        let mut events = Vec::new();

        work.version += 1;

        let mut deck = Deck::standard_52();
        let mut rng = seed.to_rng();
        rng.shuffle(&mut deck.cards);

        for p in work.participants.iter_mut() {
            p.hole_cards = deck.draw_n(m.config.hand_size as usize);
            events.push(OutboundEvent::HoleCardsDealt {
                participant_id: p.id,
                count: p.hole_cards.len(),
            });
        }

        work.shared_cards = deck.draw_n(m.config.shared_cards as usize);
        if !work.shared_cards.is_empty() {
            events.push(OutboundEvent::SharedCardsDealt {
                cards: work.shared_cards.clone(),
            });
        }

        events.insert(
            0,
            OutboundEvent::DeckAssigned {
                origin,
                cards_left: deck.len(),
            },
        );

        if origin == SeedOrigin::LocalFallback {
            work.unverified_randomness = true;
        }

        work.deck = Some(deck);
        work.round = 1;
        work.wager_level = Chips::ZERO;
        work.pending = work
            .participants
            .iter()
            .filter(|p| p.awaits_turn())
            .map(|p| p.id)
            .collect();

        self.set_phase(&mut work, Phase::Betting, &mut events);

        for ev in &events {
            work.history.push(ev.clone());
        }
        Ok((work, events))
    }

    /// Отметить потерю или восстановление связи участника.
    ///
    /// Disconnected остаётся в руке и в очереди ходов: его ход сервис
    /// закрывает синтетическим fold'ом, как просроченный. Идемпотентно:
    /// повторная отметка того же состояния – no-op без событий.
    pub fn set_connected(
        &self,
        m: &Match,
        participant_id: ParticipantId,
        connected: bool,
    ) -> Result<(Match, Vec<OutboundEvent>), RejectReason> {
        let p = m
            .participant(participant_id)
            .ok_or(RejectReason::UnknownParticipant(participant_id))?;

        let target = if connected {
            ParticipantStatus::Active
        } else {
            ParticipantStatus::Disconnected
        };
        if p.status == target {
            return Ok((m.clone(), Vec::new()));
        }
        if !p.awaits_turn() {
            return Err(RejectReason::NotActive(participant_id));
        }

        let mut work = m.clone();
        work.version += 1;
        if let Some(p) = work.participant_mut(participant_id) {
            p.status = target;
        }
        let events = vec![OutboundEvent::ConnectivityChanged {
            participant_id,
            connected,
        }];
        for ev in &events {
            work.history.push(ev.clone());
        }
        Ok((work, events))
    }

    // ---- применение отдельных действий ----

    fn apply_join(
        &self,
        work: &mut Match,
        action: &Action,
        identity: String,
        buy_in: Chips,
        events: &mut Vec<OutboundEvent>,
    ) {
        let seat = work.participants.len() as u8;
        let mut p = Participant::new(action.participant_id, identity, seat, buy_in);
        p.last_action = Some(action.kind.clone());
        work.participants.push(p);

        events.push(OutboundEvent::ParticipantJoined {
            participant_id: action.participant_id,
            seat,
            buy_in,
        });

        if work.is_full() {
            self.set_phase(work, Phase::Dealing, events);
            events.push(OutboundEvent::SeedRequired { match_id: work.id });
        }
    }

    fn apply_wager(
        &self,
        work: &mut Match,
        action: &Action,
        amount: Chips,
        events: &mut Vec<OutboundEvent>,
    ) {
        let actor = action.participant_id;
        {
            let p = work.participant_mut(actor).unwrap();
            let needed = amount.saturating_sub(p.current_wager);
            p.balance -= needed;
            p.current_wager = amount;
            if p.balance.is_zero() {
                p.status = ParticipantStatus::AllIn;
            }
            work.pot += needed;
        }
        work.wager_level = amount;

        // Новый уровень: все остальные активные должны отреагировать.
        // Очередь – по кругу мест, начиная со следующего за raiser'ом.
        let order = seat_order_after(work, actor);
        work.pending = order;

        self.push_acted(work, action, events);
    }

    fn apply_call(&self, work: &mut Match, action: &Action, events: &mut Vec<OutboundEvent>) {
        let level = work.wager_level;
        {
            let p = work.participant_mut(action.participant_id).unwrap();
            let to_call = level.saturating_sub(p.current_wager);
            p.balance -= to_call;
            p.current_wager = level;
            if p.balance.is_zero() {
                p.status = ParticipantStatus::AllIn;
            }
            work.pot += to_call;
        }
        self.remove_pending(work, action.participant_id);
        self.push_acted(work, action, events);
    }

    /// Strategic fold: атомарно – статус, возврат в баланс, списание из банка.
    /// Либо всё, либо ничего; размер возврата фиксирован: floor(wager / 2).
    fn apply_strategic_fold(
        &self,
        work: &mut Match,
        action: &Action,
        events: &mut Vec<OutboundEvent>,
    ) {
        let refund = {
            let p = work.participant_mut(action.participant_id).unwrap();
            let refund = p.current_wager.half_down();
            p.status = ParticipantStatus::Folded;
            p.balance += refund;
            refund
        };
        work.pot -= refund;
        self.remove_pending(work, action.participant_id);
        self.push_acted(work, action, events);
        events.push(OutboundEvent::StrategicFoldRefunded {
            participant_id: action.participant_id,
            refund,
            pot_after: work.pot,
        });
    }

    // ---- фазовые переходы ----

    /// Авто-переходы после применения действия.
    fn advance_phase(&self, work: &mut Match, at_ms: u64, events: &mut Vec<OutboundEvent>) {
        match work.phase {
            Phase::Betting => {
                if work.in_hand_count() <= 1 {
                    // Короткий путь: остался один – reveal не нужен.
                    self.resolve(work, at_ms, events);
                } else if work.pending.is_empty() {
                    // Все активные уравняли уровень или сфолдили.
                    self.set_phase(work, Phase::Reveal, events);
                }
            }
            Phase::Reveal => {
                if work.in_hand_count() <= 1 {
                    // Остальные отказались вскрываться: reveal не ждём.
                    self.resolve(work, at_ms, events);
                    return;
                }
                let all_revealed = work
                    .participants
                    .iter()
                    .filter(|p| p.is_in_hand())
                    .all(|p| p.revealed);
                if all_revealed {
                    self.resolve(work, at_ms, events);
                }
            }
            _ => {}
        }
    }

    /// Resolution: выбрать победителя, выплатить банк, завершить матч.
    /// Resolution → Completed всегда, терминально.
    fn resolve(&self, work: &mut Match, at_ms: u64, events: &mut Vec<OutboundEvent>) {
        self.set_phase(work, Phase::Resolution, events);

        let contenders: Vec<&Participant> =
            work.participants.iter().filter(|p| p.is_in_hand()).collect();

        let winner = match contenders.len() {
            0 => None,
            1 => Some(contenders[0].id),
            _ => Some(self.comparator.compare(&contenders, &work.shared_cards)),
        };

        if let Some(winner_id) = winner {
            let amount = work.pot;
            if let Some(p) = work.participant_mut(winner_id) {
                p.balance += amount;
            }
            work.pot = Chips::ZERO;
            events.push(OutboundEvent::PotAwarded {
                participant_id: winner_id,
                amount,
            });
        }

        work.winner = winner;
        work.completed_at = Some(at_ms);
        work.pending.clear();
        self.set_phase(work, Phase::Completed, events);
        events.push(OutboundEvent::MatchCompleted {
            match_id: work.id,
            winner,
        });
    }

    fn set_phase(&self, work: &mut Match, to: Phase, events: &mut Vec<OutboundEvent>) {
        let from = work.phase;
        work.phase = to;
        events.push(OutboundEvent::PhaseChanged { from, to });
    }

    // ---- мелкие помощники ----

    fn remove_pending(&self, work: &mut Match, id: ParticipantId) {
        work.pending.retain(|&p| p != id);
    }

    fn push_acted(&self, work: &mut Match, action: &Action, events: &mut Vec<OutboundEvent>) {
        let p = work.participant_mut(action.participant_id).unwrap();
        p.last_action = Some(action.kind.clone());
        let balance_after = p.balance;
        events.push(OutboundEvent::ActionApplied {
            participant_id: action.participant_id,
            kind: action.kind.clone(),
            balance_after,
            pot_after: work.pot,
        });
    }
}

/// Очередь мест по кругу, начиная со следующего за `after`,
/// только активные участники.
fn seat_order_after(m: &Match, after: ParticipantId) -> Vec<ParticipantId> {
    let n = m.participants.len();
    let start = m
        .participants
        .iter()
        .position(|p| p.id == after)
        .map(|i| (i + 1) % n)
        .unwrap_or(0);

    let mut order = Vec::new();
    for i in 0..n {
        let p = &m.participants[(start + i) % n];
        if p.awaits_turn() && p.id != after {
            order.push(p.id);
        }
    }
    order
}
