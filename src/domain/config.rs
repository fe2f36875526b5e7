use serde::{Deserialize, Serialize};

use crate::domain::chips::Chips;
use crate::engine::errors::ConfigError;

/// Конфигурация матча. Валидируется один раз – при создании матча.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchConfig {
    /// Количество мест (минимум 2). Dealing стартует, когда все места заняты;
    /// для минимальной конфигурации это второй join.
    pub seats: u8,
    /// Минимальный размер ставки.
    pub min_wager: Chips,
    /// Максимальный размер ставки (уровень ставки не может его превысить).
    pub max_wager: Chips,
    /// Таймаут хода в миллисекундах. По истечении движок синтезирует fold.
    pub turn_timeout_ms: u64,
    /// Сколько закрытых карт раздаётся каждому участнику.
    pub hand_size: u8,
    /// Сколько общих карт открывается при dealing.
    pub shared_cards: u8,
}

impl MatchConfig {
    /// Разумные значения по умолчанию: heads-up, 2 закрытые + 3 общие карты.
    pub fn new(min_wager: Chips, max_wager: Chips, turn_timeout_ms: u64) -> Self {
        Self {
            seats: 2,
            min_wager,
            max_wager,
            turn_timeout_ms,
            hand_size: 2,
            shared_cards: 3,
        }
    }

    /// Проверка конфига. Ошибка здесь фатальна: матч не создаётся.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.seats < 2 {
            return Err(ConfigError::NotEnoughSeats(self.seats));
        }
        if self.min_wager.is_zero() {
            return Err(ConfigError::ZeroMinWager);
        }
        if self.max_wager < self.min_wager {
            return Err(ConfigError::WagerBoundsInverted {
                min: self.min_wager,
                max: self.max_wager,
            });
        }
        if self.turn_timeout_ms == 0 {
            return Err(ConfigError::ZeroTurnTimeout);
        }
        if self.hand_size == 0 {
            return Err(ConfigError::ZeroHandSize);
        }
        // 52 карты должно хватить на всех + общие.
        let needed = self.seats as usize * self.hand_size as usize + self.shared_cards as usize;
        if needed > 52 {
            return Err(ConfigError::DeckTooSmall { needed });
        }
        Ok(())
    }
}
