//! State machine tests for wager-engine
//!
//! Сквозные свойства машины состояний:
//! - фазовые переходы waiting → dealing → betting → reveal → resolution → completed
//! - детерминизм dealing по seed'у
//! - бухгалтерия банка (pot = сумма чистых взносов)
//! - strategic fold: возврат ровно floor(50%)
//! - идемпотентность по (id, nonce)
//! - отклонение не мутирует матч, версия строго растёт

use wager_engine::domain::{Chips, MatchConfig, ParticipantStatus, Phase};
use wager_engine::engine::{
    Action, ActionKind, ConfigError, GameStateMachine, OutboundEvent, RejectReason, SeedOrigin,
};
use wager_engine::infra::RngSeed;

fn config() -> MatchConfig {
    MatchConfig::new(Chips(1_000), Chips(50_000), 30_000)
}

fn join(id: u64, participant: u64, buy_in: u64, nonce: u64) -> Action {
    Action::new(
        id,
        participant,
        ActionKind::Join {
            buy_in: Chips(buy_in),
            identity: format!("wallet-{participant}"),
        },
        1_000,
        nonce,
    )
}

fn action(id: u64, participant: u64, kind: ActionKind, nonce: u64) -> Action {
    Action::new(id, participant, kind, 1_000, nonce)
}

/// Сумма всех балансов + банк. Закрытая система: меняться не должна.
fn total_chips(m: &wager_engine::domain::Match) -> u64 {
    m.participants.iter().map(|p| p.balance.0).sum::<u64>() + m.pot.0
}

fn betting_match(sm: &GameStateMachine) -> wager_engine::domain::Match {
    let _ = env_logger::builder().is_test(true).try_init();
    let (m, _) = GameStateMachine::create_match(1, config(), 0).unwrap();
    let (m, _) = sm.apply(&m, &join(1, 1, 100_000, 1)).unwrap();
    let (m, _) = sm.apply(&m, &join(2, 2, 100_000, 2)).unwrap();
    let (m, _) = sm
        .deal(&m, &RngSeed::from_u64(7), SeedOrigin::Verified)
        .unwrap();
    m
}

//
// TEST 1 — создание матча и ошибки конфига
//
#[test]
fn create_match_starts_in_waiting() {
    let (m, events) = GameStateMachine::create_match(42, config(), 123).unwrap();
    assert_eq!(m.id, 42);
    assert_eq!(m.phase, Phase::Waiting);
    assert_eq!(m.version, 0);
    assert!(m.participants.is_empty());
    assert_eq!(events, vec![OutboundEvent::MatchCreated { match_id: 42 }]);
}

#[test]
fn invalid_config_is_fatal() {
    let mut cfg = config();
    cfg.seats = 1;
    assert_eq!(
        GameStateMachine::create_match(1, cfg, 0).unwrap_err(),
        ConfigError::NotEnoughSeats(1)
    );

    let mut cfg = config();
    cfg.min_wager = Chips::ZERO;
    assert_eq!(
        GameStateMachine::create_match(1, cfg, 0).unwrap_err(),
        ConfigError::ZeroMinWager
    );

    let cfg = MatchConfig::new(Chips(5_000), Chips(1_000), 30_000);
    assert!(matches!(
        GameStateMachine::create_match(1, cfg, 0).unwrap_err(),
        ConfigError::WagerBoundsInverted { .. }
    ));

    // 10 мест по 5 карт + 5 общих = 55 > 52.
    let mut cfg = config();
    cfg.seats = 10;
    cfg.hand_size = 5;
    cfg.shared_cards = 5;
    assert!(matches!(
        GameStateMachine::create_match(1, cfg, 0).unwrap_err(),
        ConfigError::DeckTooSmall { needed: 55 }
    ));
}

//
// TEST 2 — join до заполнения, затем dealing
//
#[test]
fn filling_the_table_requests_a_seed() {
    let sm = GameStateMachine::default();
    let (m, _) = GameStateMachine::create_match(1, config(), 0).unwrap();

    let (m, events) = sm.apply(&m, &join(1, 1, 100_000, 1)).unwrap();
    assert_eq!(m.phase, Phase::Waiting);
    assert!(!events
        .iter()
        .any(|e| matches!(e, OutboundEvent::SeedRequired { .. })));

    let (m, events) = sm.apply(&m, &join(2, 2, 100_000, 2)).unwrap();
    assert_eq!(m.phase, Phase::Dealing);
    assert!(events
        .iter()
        .any(|e| matches!(e, OutboundEvent::SeedRequired { match_id: 1 })));
    assert_eq!(m.participants.len(), 2);
    assert_eq!(m.participants[0].seat, 0);
    assert_eq!(m.participants[1].seat, 1);
}

#[test]
fn deal_hands_out_cards_and_opens_betting() {
    let sm = GameStateMachine::default();
    let m = betting_match(&sm);

    assert_eq!(m.phase, Phase::Betting);
    assert_eq!(m.round, 1);
    assert_eq!(m.shared_cards.len(), 3);
    for p in &m.participants {
        assert_eq!(p.hole_cards.len(), 2);
    }
    // 52 - 2*2 - 3 = 45 карт остаётся в колоде.
    assert_eq!(m.deck.as_ref().map(|d| d.len()), Some(45));
    // Очередь ходов: оба активных, начиная с первого места.
    assert_eq!(m.pending, vec![1, 2]);
    assert!(!m.unverified_randomness);
}

//
// TEST 3 — детерминизм dealing
//
#[test]
fn deal_is_deterministic_in_the_seed() {
    let sm = GameStateMachine::default();
    let (m, _) = GameStateMachine::create_match(1, config(), 0).unwrap();
    let (m, _) = sm.apply(&m, &join(1, 1, 100_000, 1)).unwrap();
    let (m, _) = sm.apply(&m, &join(2, 2, 100_000, 2)).unwrap();

    let seed = RngSeed::from_u64(99);
    let (a, _) = sm.deal(&m, &seed, SeedOrigin::Verified).unwrap();
    let (b, _) = sm.deal(&m, &seed, SeedOrigin::Verified).unwrap();
    assert_eq!(a, b);

    let (c, _) = sm
        .deal(&m, &RngSeed::from_u64(100), SeedOrigin::Verified)
        .unwrap();
    assert_ne!(a.participants[0].hole_cards, c.participants[0].hole_cards);
}

#[test]
fn fallback_seed_marks_the_match_unverified() {
    let sm = GameStateMachine::default();
    let (m, _) = GameStateMachine::create_match(1, config(), 0).unwrap();
    let (m, _) = sm.apply(&m, &join(1, 1, 100_000, 1)).unwrap();
    let (m, _) = sm.apply(&m, &join(2, 2, 100_000, 2)).unwrap();

    let seed = RngSeed::local_fallback(1, m.version, 777);
    let (m, events) = sm.deal(&m, &seed, SeedOrigin::LocalFallback).unwrap();
    assert!(m.unverified_randomness);
    assert!(events.iter().any(|e| matches!(
        e,
        OutboundEvent::DeckAssigned {
            origin: SeedOrigin::LocalFallback,
            ..
        }
    )));
}

//
// TEST 4 — полный heads-up сценарий: wager → call → reveal → resolution
//
#[test]
fn full_match_conserves_chips_and_pays_the_winner() {
    let sm = GameStateMachine::default();
    let m = betting_match(&sm);
    let initial_total = total_chips(&m);
    assert_eq!(initial_total, 200_000);

    let (m, _) = sm
        .apply(&m, &action(10, 1, ActionKind::Raise(Chips(5_000)), 10))
        .unwrap();
    assert_eq!(m.pot, Chips(5_000));
    assert_eq!(m.wager_level, Chips(5_000));
    assert_eq!(m.pending, vec![2]);
    assert_eq!(total_chips(&m), initial_total);

    let (m, _) = sm.apply(&m, &action(11, 2, ActionKind::Call, 11)).unwrap();
    assert_eq!(m.phase, Phase::Reveal);
    assert_eq!(m.pot, Chips(10_000));
    assert_eq!(total_chips(&m), initial_total);

    let cards1 = m.participants[0].hole_cards.clone();
    let (m, _) = sm
        .apply(&m, &action(12, 1, ActionKind::Reveal(cards1), 12))
        .unwrap();
    assert_eq!(m.phase, Phase::Reveal);

    let cards2 = m.participants[1].hole_cards.clone();
    let (m, events) = sm
        .apply(&m, &action(13, 2, ActionKind::Reveal(cards2), 13))
        .unwrap();

    assert_eq!(m.phase, Phase::Completed);
    let winner = m.winner.unwrap();
    assert!(events.iter().any(|e| matches!(
        e,
        OutboundEvent::PotAwarded { participant_id, amount }
            if *participant_id == winner && *amount == Chips(10_000)
    )));
    assert!(events
        .iter()
        .any(|e| matches!(e, OutboundEvent::MatchCompleted { .. })));

    assert_eq!(m.pot, Chips::ZERO);
    assert_eq!(total_chips(&m), initial_total);
    let winner_balance = m.participant(winner).unwrap().balance;
    assert_eq!(winner_balance, Chips(105_000));
    assert!(m.completed_at.is_some());
}

#[test]
fn reveal_must_match_the_dealt_cards() {
    let sm = GameStateMachine::default();
    let m = betting_match(&sm);
    let (m, _) = sm
        .apply(&m, &action(10, 1, ActionKind::Wager(Chips(1_000)), 10))
        .unwrap();
    let (m, _) = sm.apply(&m, &action(11, 2, ActionKind::Call, 11)).unwrap();
    assert_eq!(m.phase, Phase::Reveal);

    // Чужие карты того же размера: валидатор пропустит, машина сверит.
    let wrong = m.participants[1].hole_cards.clone();
    let err = sm
        .apply(&m, &action(12, 1, ActionKind::Reveal(wrong), 12))
        .unwrap_err();
    assert_eq!(err, RejectReason::RevealMismatch);
    assert!(!m.participants[0].revealed);
}

//
// TEST 5 — strategic fold: возврат ровно половины (floor)
//
#[test]
fn strategic_fold_refunds_exactly_half_down() {
    let sm = GameStateMachine::default();
    let m = betting_match(&sm);

    let (m, _) = sm
        .apply(&m, &action(10, 1, ActionKind::Wager(Chips(5_000)), 10))
        .unwrap();
    let before = m.participant(1).unwrap().balance;

    let (m, _) = sm
        .apply(&m, &action(11, 2, ActionKind::Raise(Chips(15_000)), 11))
        .unwrap();
    assert_eq!(m.pot, Chips(20_000));
    assert_eq!(m.pending, vec![1]);

    // Участник 1 поставил 5000, strategic fold вернёт 2500.
    let (m, events) = sm
        .apply(&m, &action(12, 1, ActionKind::StrategicFold, 12))
        .unwrap();
    assert!(events.iter().any(|e| matches!(
        e,
        OutboundEvent::StrategicFoldRefunded {
            participant_id: 1,
            refund: Chips(2_500),
            ..
        }
    )));

    let p1 = m.participant(1).unwrap();
    assert_eq!(p1.status, ParticipantStatus::Folded);
    assert_eq!(p1.balance, before + Chips(2_500));

    // Остался один: короткий путь в resolution, банк 17500 уходит второму.
    assert_eq!(m.phase, Phase::Completed);
    assert_eq!(m.winner, Some(2));
    assert_eq!(m.participant(2).unwrap().balance, Chips(102_500));
    assert_eq!(total_chips(&m), 200_000);
}

#[test]
fn strategic_fold_of_odd_wager_rounds_down() {
    let mut cfg = config();
    cfg.min_wager = Chips(1);
    cfg.seats = 3;
    let sm = GameStateMachine::default();
    let (m, _) = GameStateMachine::create_match(1, cfg, 0).unwrap();
    let (m, _) = sm.apply(&m, &join(1, 1, 100_000, 1)).unwrap();
    let (m, _) = sm.apply(&m, &join(2, 2, 100_000, 2)).unwrap();
    let (m, _) = sm.apply(&m, &join(3, 3, 100_000, 3)).unwrap();
    let (m, _) = sm
        .deal(&m, &RngSeed::from_u64(7), SeedOrigin::Verified)
        .unwrap();

    let (m, _) = sm
        .apply(&m, &action(10, 1, ActionKind::Wager(Chips(101)), 10))
        .unwrap();
    let (m, events) = sm
        .apply(&m, &action(11, 2, ActionKind::StrategicFold, 11))
        .unwrap();
    // Ставка второго равна 0: возврат 0, банк не меняется.
    assert!(events.iter().any(|e| matches!(
        e,
        OutboundEvent::StrategicFoldRefunded {
            participant_id: 2,
            refund: Chips(0),
            ..
        }
    )));

    let (m, _) = sm.apply(&m, &action(12, 3, ActionKind::Call, 12)).unwrap();
    assert_eq!(m.phase, Phase::Reveal);

    // В reveal-фазе пробуем нечётный сценарий отдельно: floor(101/2) = 50.
    assert_eq!(Chips(101).half_down(), Chips(50));
    assert_eq!(total_chips(&m), 300_000);
}

//
// TEST 6 — идемпотентность и версии
//
#[test]
fn duplicate_action_is_a_no_op() {
    let sm = GameStateMachine::default();
    let m = betting_match(&sm);

    let wager = action(10, 1, ActionKind::Wager(Chips(5_000)), 10);
    let (m1, _) = sm.apply(&m, &wager).unwrap();
    let applied_version = m1.version;

    let (m2, events) = sm.apply(&m1, &wager).unwrap();
    assert_eq!(m1, m2);
    assert_eq!(
        events,
        vec![OutboundEvent::DuplicateIgnored {
            action_id: 10,
            nonce: 10,
            applied_at_version: applied_version,
        }]
    );
    assert_eq!(m2.pot, Chips(5_000));
}

#[test]
fn version_grows_strictly_on_every_apply() {
    let sm = GameStateMachine::default();
    let (m, _) = GameStateMachine::create_match(1, config(), 0).unwrap();
    assert_eq!(m.version, 0);
    let (m, _) = sm.apply(&m, &join(1, 1, 100_000, 1)).unwrap();
    assert_eq!(m.version, 1);
    let (m, _) = sm.apply(&m, &join(2, 2, 100_000, 2)).unwrap();
    assert_eq!(m.version, 2);
    let (m, _) = sm
        .deal(&m, &RngSeed::from_u64(7), SeedOrigin::Verified)
        .unwrap();
    assert_eq!(m.version, 3);
}

//
// TEST 7 — отклонение не оставляет следов
//
#[test]
fn rejection_leaves_the_match_untouched() {
    let sm = GameStateMachine::default();
    let m = betting_match(&sm);
    let snapshot = m.clone();

    let err = sm
        .apply(&m, &action(10, 1, ActionKind::Wager(Chips(500)), 10))
        .unwrap_err();
    assert!(matches!(err, RejectReason::BelowMinWager { .. }));
    assert_eq!(m, snapshot);
}

#[test]
fn apply_is_pure() {
    let sm = GameStateMachine::default();
    let m = betting_match(&sm);
    let wager = action(10, 1, ActionKind::Wager(Chips(5_000)), 10);

    let (a, ev_a) = sm.apply(&m, &wager).unwrap();
    let (b, ev_b) = sm.apply(&m, &wager).unwrap();
    assert_eq!(a, b);
    assert_eq!(ev_a, ev_b);
}

//
// TEST 8 — 3 участника: fold'ы укорачивают очередь, последний забирает банк
//
#[test]
fn folds_down_to_one_resolve_without_reveal() {
    let mut cfg = config();
    cfg.seats = 3;
    let sm = GameStateMachine::default();
    let (m, _) = GameStateMachine::create_match(1, cfg, 0).unwrap();
    let (m, _) = sm.apply(&m, &join(1, 1, 100_000, 1)).unwrap();
    let (m, _) = sm.apply(&m, &join(2, 2, 100_000, 2)).unwrap();
    let (m, _) = sm.apply(&m, &join(3, 3, 100_000, 3)).unwrap();
    let (m, _) = sm
        .deal(&m, &RngSeed::from_u64(7), SeedOrigin::Verified)
        .unwrap();
    assert_eq!(m.pending, vec![1, 2, 3]);

    let (m, _) = sm
        .apply(&m, &action(10, 1, ActionKind::Wager(Chips(2_000)), 10))
        .unwrap();
    // Raise перезапускает очередь со следующего места.
    assert_eq!(m.pending, vec![2, 3]);

    let (m, _) = sm.apply(&m, &action(11, 2, ActionKind::Fold, 11)).unwrap();
    assert_eq!(m.phase, Phase::Betting);
    assert_eq!(m.pending, vec![3]);

    let (m, events) = sm.apply(&m, &action(12, 3, ActionKind::Fold, 12)).unwrap();
    // Остался один в руке: resolution без reveal.
    assert_eq!(m.phase, Phase::Completed);
    assert_eq!(m.winner, Some(1));
    assert!(events
        .iter()
        .any(|e| matches!(e, OutboundEvent::PotAwarded { participant_id: 1, .. })));
    // Обычный fold взнос не возвращает.
    assert_eq!(m.participant(1).unwrap().balance, Chips(100_000));
    assert_eq!(total_chips(&m), 300_000);
}

//
// TEST 9 — отказ от вскрытия: fold доступен и в reveal
//
#[test]
fn conceding_in_reveal_awards_the_pot_to_the_revealer() {
    let sm = GameStateMachine::default();
    let m = betting_match(&sm);
    let (m, _) = sm
        .apply(&m, &action(10, 1, ActionKind::Wager(Chips(5_000)), 10))
        .unwrap();
    let (m, _) = sm.apply(&m, &action(11, 2, ActionKind::Call, 11)).unwrap();
    assert_eq!(m.phase, Phase::Reveal);

    let cards1 = m.participants[0].hole_cards.clone();
    let (m, _) = sm
        .apply(&m, &action(12, 1, ActionKind::Reveal(cards1), 12))
        .unwrap();

    // Участник 2 карты не показывает и сдаётся.
    let (m, events) = sm.apply(&m, &action(13, 2, ActionKind::Fold, 13)).unwrap();
    assert_eq!(m.phase, Phase::Completed);
    assert_eq!(m.winner, Some(1));
    assert!(events.iter().any(|e| matches!(
        e,
        OutboundEvent::PotAwarded { participant_id: 1, amount: Chips(10_000) }
    )));
    assert_eq!(total_chips(&m), 200_000);
}

#[test]
fn reveal_resolves_when_only_one_stays_in_hand() {
    let sm = GameStateMachine::default();
    let m = betting_match(&sm);
    let (m, _) = sm
        .apply(&m, &action(10, 1, ActionKind::Wager(Chips(1_000)), 10))
        .unwrap();
    let (m, _) = sm.apply(&m, &action(11, 2, ActionKind::Call, 11)).unwrap();
    assert_eq!(m.phase, Phase::Reveal);

    // Никто не вскрылся; fold второго оставляет одного – reveal не ждём.
    let (m, _) = sm.apply(&m, &action(12, 2, ActionKind::Fold, 12)).unwrap();
    assert_eq!(m.phase, Phase::Completed);
    assert_eq!(m.winner, Some(1));
    assert_eq!(m.pot, Chips::ZERO);
}

//
// TEST 10 — дисконнект: участник остаётся в руке до синтетического fold'а
//
#[test]
fn disconnected_participant_stays_in_hand_but_cannot_wager() {
    let sm = GameStateMachine::default();
    let m = betting_match(&sm);

    let (m, events) = sm.set_connected(&m, 2, false).unwrap();
    assert!(events.iter().any(|e| matches!(
        e,
        OutboundEvent::ConnectivityChanged { participant_id: 2, connected: false }
    )));
    assert_eq!(m.in_hand_count(), 2);
    assert_eq!(m.pending, vec![1, 2]);

    // Ставить отключившийся не может, fold на его ходу – может.
    let (m, _) = sm
        .apply(&m, &action(10, 1, ActionKind::Wager(Chips(2_000)), 10))
        .unwrap();
    let err = sm
        .apply(&m, &action(11, 2, ActionKind::Call, 11))
        .unwrap_err();
    assert_eq!(err, RejectReason::NotActive(2));
    let (m, _) = sm.apply(&m, &action(12, 2, ActionKind::Fold, 12)).unwrap();
    assert_eq!(m.winner, Some(1));
}

#[test]
fn reconnecting_restores_the_active_status() {
    let sm = GameStateMachine::default();
    let m = betting_match(&sm);

    let (m, _) = sm.set_connected(&m, 1, false).unwrap();
    let version = m.version;
    // Повторная отметка – идемпотентный no-op.
    let (m, events) = sm.set_connected(&m, 1, false).unwrap();
    assert!(events.is_empty());
    assert_eq!(m.version, version);

    let (m, _) = sm.set_connected(&m, 1, true).unwrap();
    let (m, _) = sm
        .apply(&m, &action(10, 1, ActionKind::Wager(Chips(2_000)), 10))
        .unwrap();
    assert_eq!(m.pot, Chips(2_000));

    // Сфолдившего уже не переключить.
    let (m, _) = sm.apply(&m, &action(11, 2, ActionKind::Fold, 11)).unwrap();
    assert_eq!(
        sm.set_connected(&m, 2, false).unwrap_err(),
        RejectReason::NotActive(2)
    );
}

//
// TEST 11 — история матча пополняется событиями
//
#[test]
fn history_records_applied_events() {
    let sm = GameStateMachine::default();
    let m = betting_match(&sm);
    assert!(!m.history.events.is_empty());

    let before = m.history.events.len();
    let (m, events) = sm
        .apply(&m, &action(10, 1, ActionKind::Wager(Chips(5_000)), 10))
        .unwrap();
    assert_eq!(m.history.events.len(), before + events.len());
    // Индексы монотонны.
    let indices: Vec<u32> = m.history.events.iter().map(|e| e.index).collect();
    let mut sorted = indices.clone();
    sorted.sort_unstable();
    assert_eq!(indices, sorted);
}
