//! MatchService – фасад над ядром.
//!
//! Склеивает границу авторизации, валидатор, чистую state machine,
//! репозиторий и очередь отправки. Сериализация per match обеспечивается
//! здесь: один вызов – одно применение, разные матчи независимы.

use std::collections::HashMap;

use log::{debug, warn};

use crate::dispatch::{Dispatcher, DispatcherConfig, Priority, SubmissionRequest, SubmissionStatus};
use crate::domain::config::MatchConfig;
use crate::domain::match_state::{Match, Phase};
use crate::domain::participant::ParticipantStatus;
use crate::domain::{MatchId, Nonce, ParticipantId};
use crate::engine::actions::{Action, ActionKind};
use crate::engine::errors::EngineError;
use crate::engine::events::{OutboundEvent, SeedOrigin};
use crate::engine::state_machine::GameStateMachine;
use crate::infra::ids::IdGenerator;
use crate::infra::persistence::MatchRepository;
use crate::infra::rng_seed::RngSeed;
use crate::ports::randomness::{RandomnessProvider, SeedContext};
use crate::ports::session::{SessionAuthority, SessionHandle};
use crate::ports::ledger::LedgerClient;
use crate::time_ctrl::{Clock, TurnClock};

/// Сколько держать завершённый матч до reaping'а (по умолчанию).
pub const DEFAULT_RETENTION_MS: u64 = 10 * 60 * 1_000;

pub struct MatchService<R, T, C>
where
    R: MatchRepository,
    T: LedgerClient,
    C: Clock,
{
    state_machine: GameStateMachine,
    repo: R,
    randomness: Box<dyn RandomnessProvider + Send>,
    sessions: Box<dyn SessionAuthority + Send>,
    dispatcher: Dispatcher<T>,
    clock: C,
    ids: IdGenerator,
    /// Таймер хода per match.
    turn_clocks: HashMap<MatchId, TurnClock>,
    retention_ms: u64,
}

impl<R, T, C> MatchService<R, T, C>
where
    R: MatchRepository,
    T: LedgerClient,
    C: Clock,
{
    pub fn new(
        state_machine: GameStateMachine,
        repo: R,
        randomness: Box<dyn RandomnessProvider + Send>,
        sessions: Box<dyn SessionAuthority + Send>,
        transport: T,
        clock: C,
    ) -> Self {
        Self {
            state_machine,
            repo,
            randomness,
            sessions,
            dispatcher: Dispatcher::new(transport, DispatcherConfig::default()),
            clock,
            ids: IdGenerator::new(),
            turn_clocks: HashMap::new(),
            retention_ms: DEFAULT_RETENTION_MS,
        }
    }

    pub fn with_retention_ms(mut self, retention_ms: u64) -> Self {
        self.retention_ms = retention_ms;
        self
    }

    /// Создать матч. Ошибка конфига фатальна – матч не появляется.
    pub fn create_match(
        &mut self,
        id: MatchId,
        config: MatchConfig,
    ) -> Result<Vec<OutboundEvent>, EngineError> {
        let now = self.clock.now_ms();
        let (m, events) = GameStateMachine::create_match(id, config, now)?;
        self.repo.put(m);
        Ok(events)
    }

    /// Подать внешнее действие.
    ///
    /// Граница авторизации: невалидная сессия – действие молча
    /// отбрасывается (лог debug), до валидатора и машины не доходит.
    pub fn submit_action(
        &mut self,
        handle: &SessionHandle,
        match_id: MatchId,
        action: Action,
        priority: Priority,
    ) -> Result<Vec<OutboundEvent>, EngineError> {
        let now = self.clock.now_ms();

        if handle.owner != action.participant_id
            || !self.sessions.verify(handle, match_id, &action.kind, now)
        {
            debug!(
                "match {match_id}: действие {} отброшено на границе сессий",
                action.kind.name()
            );
            return Ok(Vec::new());
        }

        let events = self.apply_and_persist(match_id, &action)?;

        // Отправка в быстрый tier – эффект ПОСЛЕ применения.
        self.enqueue_submission(match_id, &action, priority, now);
        Ok(events)
    }

    /// Один тик сервиса: просроченные ходы → синтетический fold,
    /// drain очереди отправки, reaping завершённых матчей.
    pub fn tick(&mut self) -> Vec<(MatchId, Vec<OutboundEvent>)> {
        let now = self.clock.now_ms();
        let mut all_events = Vec::new();

        // Таймауты ходов и вскрытий. Движок не блокируется на медленном
        // участнике: вместо ожидания синтезируем fold. Отключившийся
        // дедлайна не дожидается.
        let expired: Vec<(MatchId, u64)> = self
            .turn_clocks
            .iter()
            .filter_map(|(&mid, tc)| {
                let awaited = tc.current?;
                if tc.expired(now).is_some() || self.is_disconnected(mid, awaited) {
                    Some((mid, awaited))
                } else {
                    None
                }
            })
            .collect();

        for (match_id, participant_id) in expired {
            let action = Action::new(
                self.ids.next_action_id(),
                participant_id,
                ActionKind::Fold,
                now,
                self.ids.next_nonce(),
            );
            match self.apply_and_persist(match_id, &action) {
                Ok(mut events) => {
                    debug!("match {match_id}: таймаут хода, синтезирован fold для {participant_id}");
                    events.insert(0, OutboundEvent::TimeoutFoldSynthesized { participant_id });
                    // Синтетический fold тоже должен дойти до tier'а.
                    self.enqueue_submission(match_id, &action, Priority::High, now);
                    all_events.push((match_id, events));
                }
                Err(e) => warn!("match {match_id}: синтетический fold отклонён: {e}"),
            }
        }

        self.dispatcher.drain(now);
        self.reap_completed(now);
        all_events
    }

    /// Отметить потерю или восстановление связи участника.
    ///
    /// Это сигнал транспорта, а не действие участника – сессии здесь
    /// не проверяются. Ход отключившегося закроет ближайший `tick`.
    pub fn set_connected(
        &mut self,
        match_id: MatchId,
        participant_id: ParticipantId,
        connected: bool,
    ) -> Result<Vec<OutboundEvent>, EngineError> {
        let m = self
            .repo
            .get(match_id)
            .ok_or(EngineError::MatchNotFound(match_id))?;
        let (new_m, events) = self
            .state_machine
            .set_connected(&m, participant_id, connected)?;
        self.update_turn_clock(&new_m);
        self.repo.put(new_m);
        Ok(events)
    }

    /// Read-only view матча.
    pub fn get_match(&self, id: MatchId) -> Option<Match> {
        self.repo.get(id)
    }

    /// Статус отправки по nonce.
    pub fn submission_status(&self, nonce: Nonce) -> Option<SubmissionStatus> {
        self.dispatcher.status(nonce).cloned()
    }

    pub fn sessions_mut(&mut self) -> &mut (dyn SessionAuthority + Send) {
        self.sessions.as_mut()
    }

    pub fn dispatcher_mut(&mut self) -> &mut Dispatcher<T> {
        &mut self.dispatcher
    }

    // ---- внутреннее ----

    /// Применить действие, при необходимости выполнить dealing-эффект,
    /// сохранить результат и перевести таймер хода.
    fn apply_and_persist(
        &mut self,
        match_id: MatchId,
        action: &Action,
    ) -> Result<Vec<OutboundEvent>, EngineError> {
        let m = self
            .repo
            .get(match_id)
            .ok_or(EngineError::MatchNotFound(match_id))?;

        let (mut new_m, mut events) = self.state_machine.apply(&m, action)?;

        // Матч заполнился: добываем seed и раздаём. Это эффект вызывающего,
        // сама машина к randomness-порту не прикасается.
        if events
            .iter()
            .any(|e| matches!(e, OutboundEvent::SeedRequired { .. }))
        {
            let (seed, origin) = self.obtain_seed(&new_m);
            let (dealt, deal_events) = self.state_machine.deal(&new_m, &seed, origin)?;
            new_m = dealt;
            events.extend(deal_events);
        }

        self.update_turn_clock(&new_m);
        self.repo.put(new_m);
        Ok(events)
    }

    /// Seed от randomness-сервиса, при таймауте – локальный fallback
    /// с пометкой матча как "unverified randomness".
    fn obtain_seed(&mut self, m: &Match) -> (RngSeed, SeedOrigin) {
        let ctx = SeedContext {
            match_id: m.id,
            round: m.round,
            version: m.version,
        };
        match self.randomness.request(&ctx) {
            Ok(grant) => (grant.seed, SeedOrigin::Verified),
            Err(e) => {
                warn!("match {}: randomness недоступен ({e}), локальный fallback", m.id);
                let entropy = self.clock.now_ms();
                (
                    RngSeed::local_fallback(m.id, m.version, entropy),
                    SeedOrigin::LocalFallback,
                )
            }
        }
    }

    fn enqueue_submission(
        &mut self,
        match_id: MatchId,
        action: &Action,
        priority: Priority,
        now_ms: u64,
    ) {
        let request = SubmissionRequest {
            nonce: action.nonce,
            match_id,
            action: action.clone(),
            signers: vec![action.participant_id],
        };
        self.dispatcher.enqueue(request, priority, now_ms);
    }

    /// Перевести таймер на того, кого матч сейчас ждёт: текущего актора
    /// в betting или первого невскрывшегося в reveal. Без дедлайна на
    /// reveal один молчащий участник запер бы банк навсегда.
    fn update_turn_clock(&mut self, m: &Match) {
        let now = self.clock.now_ms();
        let awaited = match m.phase {
            Phase::Betting => m.current_actor(),
            Phase::Reveal => m
                .participants
                .iter()
                .find(|p| p.is_in_hand() && !p.revealed)
                .map(|p| p.id),
            _ => None,
        };
        match awaited {
            Some(actor) => {
                let tc = self.turn_clocks.entry(m.id).or_default();
                if tc.current != Some(actor) {
                    tc.start_turn(actor, now, m.config.turn_timeout_ms);
                }
            }
            None => {
                if let Some(tc) = self.turn_clocks.get_mut(&m.id) {
                    tc.clear();
                }
            }
        }
        if m.is_completed() {
            self.turn_clocks.remove(&m.id);
        }
    }

    fn is_disconnected(&self, match_id: MatchId, participant_id: ParticipantId) -> bool {
        self.repo
            .get(match_id)
            .and_then(|m| {
                m.participant(participant_id)
                    .map(|p| p.status == ParticipantStatus::Disconnected)
            })
            .unwrap_or(false)
    }

    /// Убрать завершённые матчи старше retention-окна.
    fn reap_completed(&mut self, now_ms: u64) {
        for id in self.repo.ids() {
            let Some(m) = self.repo.get(id) else { continue };
            if let Some(completed_at) = m.completed_at {
                if now_ms.saturating_sub(completed_at) >= self.retention_ms {
                    debug!("match {id}: retention истёк, удаляем");
                    self.repo.delete(id);
                    self.turn_clocks.remove(&id);
                }
            }
        }
    }
}
