use thiserror::Error;

use crate::domain::{Chips, MatchId, ParticipantId, Phase};

/// Ошибки конфигурации матча. Фатальны: матч с таким конфигом не создаётся.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Мест должно быть минимум 2, задано {0}")]
    NotEnoughSeats(u8),

    #[error("Минимальная ставка не может быть нулевой")]
    ZeroMinWager,

    #[error("Минимальная ставка {min:?} больше максимальной {max:?}")]
    WagerBoundsInverted { min: Chips, max: Chips },

    #[error("Таймаут хода должен быть больше нуля")]
    ZeroTurnTimeout,

    #[error("Размер руки должен быть больше нуля")]
    ZeroHandSize,

    #[error("52 карт не хватает на такой конфиг (нужно {needed})")]
    DeckTooSmall { needed: usize },
}

/// Причина отклонения действия. Восстановимая ошибка:
/// вызывающий может исправить действие и подать заново.
/// Отклонение НИКОГДА не мутирует матч.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RejectReason {
    #[error("Действие {action:?} недопустимо в фазе {phase:?}")]
    WrongPhase { phase: Phase, action: &'static str },

    #[error("Матч уже заполнен")]
    MatchFull,

    #[error("Участник {0} уже в матче")]
    AlreadyJoined(ParticipantId),

    #[error("Buy-in должен быть больше нуля")]
    ZeroBuyIn,

    #[error("Участник {0} не найден в матче")]
    UnknownParticipant(ParticipantId),

    #[error("Участник {0} не активен")]
    NotActive(ParticipantId),

    #[error("Сейчас не ход участника {0}")]
    NotYourTurn(ParticipantId),

    #[error("Ставка {amount:?} не превышает текущий уровень {level:?}")]
    WagerTooLow { amount: Chips, level: Chips },

    #[error("Ставка {amount:?} меньше минимальной {min:?}")]
    BelowMinWager { amount: Chips, min: Chips },

    #[error("Ставка {amount:?} превышает максимальную {max:?}")]
    AboveMaxWager { amount: Chips, max: Chips },

    #[error("Недостаточно баланса: нужно {needed:?}, есть {available:?}")]
    InsufficientBalance { needed: Chips, available: Chips },

    #[error("Check невозможен: уровень ставки не уравнян")]
    CannotCheck,

    #[error("Call невозможен: нечего уравнивать")]
    NothingToCall,

    #[error("Участник {0} уже вскрылся")]
    AlreadyRevealed(ParticipantId),

    #[error("Ожидалось {expected} карт, получено {got}")]
    WrongHandSize { expected: usize, got: usize },

    #[error("Вскрытые карты не совпадают с розданными")]
    RevealMismatch,
}

/// Ошибки верхнего уровня (service-фасад над движком).
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Матч {0} не найден")]
    MatchNotFound(MatchId),

    #[error("Ошибка конфигурации: {0}")]
    Config(#[from] ConfigError),

    #[error("Действие отклонено: {0}")]
    Rejected(#[from] RejectReason),
}
