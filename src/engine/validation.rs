//! ActionValidator: чистый предикат "легально ли действие в этом состоянии".
//!
//! Stateless и total: на корректно типизированном входе никогда не паникует.
//! Правила проверяются по порядку, первое упавшее даёт конкретную причину.

use crate::domain::match_state::{Match, Phase};
use crate::engine::actions::{Action, ActionKind};
use crate::engine::errors::RejectReason;

/// Проверить действие против текущего состояния матча.
pub fn validate(m: &Match, action: &Action) -> Result<(), RejectReason> {
    match &action.kind {
        ActionKind::Join { buy_in, .. } => {
            if m.phase != Phase::Waiting {
                return Err(RejectReason::WrongPhase {
                    phase: m.phase,
                    action: "join",
                });
            }
            if m.is_full() {
                return Err(RejectReason::MatchFull);
            }
            if m.participant(action.participant_id).is_some() {
                return Err(RejectReason::AlreadyJoined(action.participant_id));
            }
            if buy_in.is_zero() {
                return Err(RejectReason::ZeroBuyIn);
            }
            Ok(())
        }

        ActionKind::Wager(amount) | ActionKind::Raise(amount) => {
            let p = require_active_in_betting(m, action)?;
            require_turn(m, action)?;
            if *amount <= m.wager_level {
                return Err(RejectReason::WagerTooLow {
                    amount: *amount,
                    level: m.wager_level,
                });
            }
            if *amount < m.config.min_wager {
                return Err(RejectReason::BelowMinWager {
                    amount: *amount,
                    min: m.config.min_wager,
                });
            }
            if *amount > m.config.max_wager {
                return Err(RejectReason::AboveMaxWager {
                    amount: *amount,
                    max: m.config.max_wager,
                });
            }
            // Доплатить нужно разницу до нового уровня.
            let needed = amount.saturating_sub(p.current_wager);
            if p.balance < needed {
                return Err(RejectReason::InsufficientBalance {
                    needed,
                    available: p.balance,
                });
            }
            Ok(())
        }

        ActionKind::Call => {
            let p = require_active_in_betting(m, action)?;
            require_turn(m, action)?;
            let to_call = m.wager_level.saturating_sub(p.current_wager);
            if to_call.is_zero() {
                return Err(RejectReason::NothingToCall);
            }
            if p.balance < to_call {
                return Err(RejectReason::InsufficientBalance {
                    needed: to_call,
                    available: p.balance,
                });
            }
            Ok(())
        }

        ActionKind::Check => {
            let p = require_active_in_betting(m, action)?;
            require_turn(m, action)?;
            if p.current_wager != m.wager_level {
                return Err(RejectReason::CannotCheck);
            }
            Ok(())
        }

        ActionKind::Fold => match m.phase {
            Phase::Betting => {
                require_foldable(m, action)?;
                require_turn(m, action)
            }
            // Fold в reveal – отказ от вскрытия: участник выходит из борьбы,
            // не показав карты. Так же закрывается таймаут вскрытия.
            Phase::Reveal => {
                let p = m
                    .participant(action.participant_id)
                    .ok_or(RejectReason::UnknownParticipant(action.participant_id))?;
                if !p.is_in_hand() {
                    return Err(RejectReason::NotActive(action.participant_id));
                }
                if p.revealed {
                    return Err(RejectReason::AlreadyRevealed(action.participant_id));
                }
                Ok(())
            }
            _ => Err(RejectReason::WrongPhase {
                phase: m.phase,
                action: "fold",
            }),
        },

        // Strategic fold – решение ставочного раунда, в reveal его нет.
        ActionKind::StrategicFold => {
            require_active_in_betting(m, action)?;
            require_turn(m, action)?;
            Ok(())
        }

        ActionKind::Reveal(cards) => {
            if m.phase != Phase::Reveal {
                return Err(RejectReason::WrongPhase {
                    phase: m.phase,
                    action: "reveal",
                });
            }
            let p = m
                .participant(action.participant_id)
                .ok_or(RejectReason::UnknownParticipant(action.participant_id))?;
            if !p.is_in_hand() {
                return Err(RejectReason::NotActive(action.participant_id));
            }
            if p.revealed {
                return Err(RejectReason::AlreadyRevealed(action.participant_id));
            }
            let expected = m.config.hand_size as usize;
            if cards.len() != expected {
                return Err(RejectReason::WrongHandSize {
                    expected,
                    got: cards.len(),
                });
            }
            Ok(())
        }
    }
}

/// Общая часть betting-правил: фаза, участник существует, участник активен.
fn require_active_in_betting<'m>(
    m: &'m Match,
    action: &Action,
) -> Result<&'m crate::domain::participant::Participant, RejectReason> {
    if m.phase != Phase::Betting {
        return Err(RejectReason::WrongPhase {
            phase: m.phase,
            action: action.kind.name(),
        });
    }
    let p = m
        .participant(action.participant_id)
        .ok_or(RejectReason::UnknownParticipant(action.participant_id))?;
    if !p.can_act() {
        return Err(RejectReason::NotActive(action.participant_id));
    }
    Ok(p)
}

/// Fold в betting доступен и disconnected-участнику: именно так сервис
/// закрывает его ход синтетическим fold'ом. All-in фолдить нечего.
fn require_foldable(m: &Match, action: &Action) -> Result<(), RejectReason> {
    if m.phase != Phase::Betting {
        return Err(RejectReason::WrongPhase {
            phase: m.phase,
            action: "fold",
        });
    }
    let p = m
        .participant(action.participant_id)
        .ok_or(RejectReason::UnknownParticipant(action.participant_id))?;
    if !p.awaits_turn() {
        return Err(RejectReason::NotActive(action.participant_id));
    }
    Ok(())
}

/// В betting действия идут строго по очереди pending.
fn require_turn(m: &Match, action: &Action) -> Result<(), RejectReason> {
    match m.current_actor() {
        Some(actor) if actor == action.participant_id => Ok(()),
        _ => Err(RejectReason::NotYourTurn(action.participant_id)),
    }
}
