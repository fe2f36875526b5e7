//! Validator tests for wager-engine
//!
//! Проверяем per-type правила валидатора:
//! - join: фаза, capacity, повторный вход, нулевой buy-in
//! - wager/raise: уровень, min/max, баланс
//! - call/check: уравнивание уровня
//! - fold/strategic-fold: фаза и активность
//! - reveal: фаза, размер руки
//! Первое упавшее правило даёт конкретную причину.

use wager_engine::domain::{Chips, MatchConfig, Phase};
use wager_engine::engine::{
    validation::validate, Action, ActionKind, GameStateMachine, RejectReason, SeedOrigin,
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

/// Матч в фазе betting с двумя участниками по 100_000.
fn betting_match() -> wager_engine::domain::Match {
    let sm = GameStateMachine::default();
    let (m, _) = GameStateMachine::create_match(1, config(), 0).unwrap();
    let (m, _) = sm.apply(&m, &join(1, 1, 100_000, 1)).unwrap();
    let (m, _) = sm.apply(&m, &join(2, 2, 100_000, 2)).unwrap();
    let (m, _) = sm
        .deal(&m, &RngSeed::from_u64(7), SeedOrigin::Verified)
        .unwrap();
    assert_eq!(m.phase, Phase::Betting);
    m
}

//
// join
//
#[test]
fn join_allowed_in_waiting() {
    let (m, _) = GameStateMachine::create_match(1, config(), 0).unwrap();
    assert!(validate(&m, &join(1, 1, 5_000, 1)).is_ok());
}

#[test]
fn join_rejected_outside_waiting() {
    let m = betting_match();
    let err = validate(&m, &join(10, 3, 5_000, 10)).unwrap_err();
    assert!(matches!(err, RejectReason::WrongPhase { .. }));
}

#[test]
fn join_rejected_when_already_joined() {
    let sm = GameStateMachine::default();
    let mut cfg = config();
    cfg.seats = 3;
    let (m, _) = GameStateMachine::create_match(1, cfg, 0).unwrap();
    let (m, _) = sm.apply(&m, &join(1, 1, 5_000, 1)).unwrap();
    let err = validate(&m, &join(2, 1, 5_000, 2)).unwrap_err();
    assert_eq!(err, RejectReason::AlreadyJoined(1));
}

#[test]
fn join_rejected_with_zero_buy_in() {
    let (m, _) = GameStateMachine::create_match(1, config(), 0).unwrap();
    let err = validate(&m, &join(1, 1, 0, 1)).unwrap_err();
    assert_eq!(err, RejectReason::ZeroBuyIn);
}

//
// wager / raise
//
#[test]
fn wager_must_exceed_current_level() {
    let m = betting_match();
    // Уровень 0: любая ставка >= min_wager проходит.
    assert!(validate(&m, &action(10, 1, ActionKind::Wager(Chips(1_000)), 10)).is_ok());
    let err = validate(&m, &action(11, 1, ActionKind::Wager(Chips(0)), 11)).unwrap_err();
    assert!(matches!(err, RejectReason::WagerTooLow { .. }));
}

#[test]
fn wager_below_min_is_rejected() {
    let m = betting_match();
    let err = validate(&m, &action(10, 1, ActionKind::Wager(Chips(500)), 10)).unwrap_err();
    assert!(matches!(err, RejectReason::BelowMinWager { .. }));
}

#[test]
fn wager_above_max_is_rejected() {
    let m = betting_match();
    let err = validate(&m, &action(10, 1, ActionKind::Wager(Chips(60_000)), 10)).unwrap_err();
    assert!(matches!(err, RejectReason::AboveMaxWager { .. }));
}

#[test]
fn wager_over_balance_is_rejected() {
    let sm = GameStateMachine::default();
    let (m, _) = GameStateMachine::create_match(1, config(), 0).unwrap();
    let (m, _) = sm.apply(&m, &join(1, 1, 2_000, 1)).unwrap();
    let (m, _) = sm.apply(&m, &join(2, 2, 100_000, 2)).unwrap();
    let (m, _) = sm
        .deal(&m, &RngSeed::from_u64(7), SeedOrigin::Verified)
        .unwrap();
    let err = validate(&m, &action(10, 1, ActionKind::Wager(Chips(5_000)), 10)).unwrap_err();
    assert!(matches!(err, RejectReason::InsufficientBalance { .. }));
}

#[test]
fn actions_out_of_turn_are_rejected() {
    let m = betting_match();
    // Очередь начинается с участника 1.
    let err = validate(&m, &action(10, 2, ActionKind::Wager(Chips(1_000)), 10)).unwrap_err();
    assert_eq!(err, RejectReason::NotYourTurn(2));
}

//
// call / check
//
#[test]
fn call_with_nothing_to_call_is_rejected() {
    let m = betting_match();
    let err = validate(&m, &action(10, 1, ActionKind::Call, 10)).unwrap_err();
    assert_eq!(err, RejectReason::NothingToCall);
}

#[test]
fn check_requires_matched_level() {
    let sm = GameStateMachine::default();
    let m = betting_match();
    let (m, _) = sm
        .apply(&m, &action(10, 1, ActionKind::Wager(Chips(2_000)), 10))
        .unwrap();
    // Участник 2 не уравнял уровень: check недоступен, call доступен.
    let err = validate(&m, &action(11, 2, ActionKind::Check, 11)).unwrap_err();
    assert_eq!(err, RejectReason::CannotCheck);
    assert!(validate(&m, &action(12, 2, ActionKind::Call, 12)).is_ok());
}

//
// fold
//
#[test]
fn fold_rejected_outside_betting() {
    let (m, _) = GameStateMachine::create_match(1, config(), 0).unwrap();
    let err = validate(&m, &action(10, 1, ActionKind::Fold, 10)).unwrap_err();
    assert!(matches!(err, RejectReason::WrongPhase { .. }));
}

#[test]
fn folded_participant_cannot_act_again() {
    let sm = GameStateMachine::default();
    let mut cfg = config();
    cfg.seats = 3;
    let (m, _) = GameStateMachine::create_match(1, cfg, 0).unwrap();
    let (m, _) = sm.apply(&m, &join(1, 1, 100_000, 1)).unwrap();
    let (m, _) = sm.apply(&m, &join(2, 2, 100_000, 2)).unwrap();
    let (m, _) = sm.apply(&m, &join(3, 3, 100_000, 3)).unwrap();
    let (m, _) = sm
        .deal(&m, &RngSeed::from_u64(7), SeedOrigin::Verified)
        .unwrap();
    let (m, _) = sm.apply(&m, &action(10, 1, ActionKind::Fold, 10)).unwrap();
    let err = validate(&m, &action(11, 1, ActionKind::Fold, 11)).unwrap_err();
    assert!(matches!(
        err,
        RejectReason::NotActive(1) | RejectReason::NotYourTurn(1)
    ));
}

#[test]
fn fold_is_allowed_in_reveal_for_the_unrevealed() {
    let sm = GameStateMachine::default();
    let m = betting_match();
    let (m, _) = sm
        .apply(&m, &action(10, 1, ActionKind::Wager(Chips(1_000)), 10))
        .unwrap();
    let (m, _) = sm.apply(&m, &action(11, 2, ActionKind::Call, 11)).unwrap();
    assert_eq!(m.phase, Phase::Reveal);

    // Отказ от вскрытия легален, strategic fold – уже нет.
    assert!(validate(&m, &action(12, 2, ActionKind::Fold, 12)).is_ok());
    let err = validate(&m, &action(13, 2, ActionKind::StrategicFold, 13)).unwrap_err();
    assert!(matches!(err, RejectReason::WrongPhase { .. }));

    // Вскрывшийся сдаться больше не может.
    let cards = m.participants[0].hole_cards.clone();
    let (m, _) = sm
        .apply(&m, &action(14, 1, ActionKind::Reveal(cards), 14))
        .unwrap();
    let err = validate(&m, &action(15, 1, ActionKind::Fold, 15)).unwrap_err();
    assert_eq!(err, RejectReason::AlreadyRevealed(1));
}

#[test]
fn disconnected_participant_may_fold_but_not_wager() {
    let sm = GameStateMachine::default();
    let m = betting_match();
    let (m, _) = sm.set_connected(&m, 1, false).unwrap();

    let err = validate(&m, &action(10, 1, ActionKind::Wager(Chips(2_000)), 10)).unwrap_err();
    assert_eq!(err, RejectReason::NotActive(1));
    let err = validate(&m, &action(11, 1, ActionKind::Check, 11)).unwrap_err();
    assert_eq!(err, RejectReason::NotActive(1));
    // Синтетический fold на его ходу проходит валидатор.
    assert!(validate(&m, &action(12, 1, ActionKind::Fold, 12)).is_ok());
}

//
// reveal
//
#[test]
fn reveal_rejected_outside_reveal_phase() {
    let m = betting_match();
    let cards = m.participants[0].hole_cards.clone();
    let err = validate(&m, &action(10, 1, ActionKind::Reveal(cards), 10)).unwrap_err();
    assert!(matches!(err, RejectReason::WrongPhase { .. }));
}

#[test]
fn reveal_wrong_hand_size_is_rejected() {
    let sm = GameStateMachine::default();
    let m = betting_match();
    let (m, _) = sm
        .apply(&m, &action(10, 1, ActionKind::Wager(Chips(1_000)), 10))
        .unwrap();
    let (m, _) = sm.apply(&m, &action(11, 2, ActionKind::Call, 11)).unwrap();
    assert_eq!(m.phase, Phase::Reveal);

    let err = validate(&m, &action(12, 1, ActionKind::Reveal(Vec::new()), 12)).unwrap_err();
    assert!(matches!(err, RejectReason::WrongHandSize { expected: 2, got: 0 }));
}
