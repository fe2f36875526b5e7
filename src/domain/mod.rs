//! Доменная модель матча: фишки, карты, участники, конфиг, сам матч.

pub mod card;
pub mod chips;
pub mod config;
pub mod deck;
pub mod match_state;
pub mod participant;

// Базовые идентификаторы. Числовые alias'ы, как и везде в проекте.
pub type MatchId = u64;
pub type ParticipantId = u64;
pub type ActionId = u64;
pub type Nonce = u64;

/// Идентификатор сущности в reconciler'е. Для матчей совпадает с MatchId,
/// но reconciler про это ничего не знает.
pub type EntityId = u64;

/// Индекс места в матче (0..seats-1).
pub type SeatIndex = u8;

// Удобные реэкспорты, чтобы писать crate::domain::Chips и т.п.
pub use card::*;
pub use chips::*;
pub use config::*;
pub use deck::*;
pub use match_state::*;
pub use participant::*;
