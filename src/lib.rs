//! wager-engine: ядро коротких turn-based матчей со ставками.
//!
//! Матч оптимистично исполняется на быстром tier'е и позже сверяется
//! с авторитетным. Здесь живут две трудные части:
//!   - машина состояний матча: валидация действий, фазовые переходы,
//!     банк/ставки, strategic fold с частичным возвратом;
//!   - reconciler: сверка пары независимо наблюдаемых снапшотов
//!     одной сущности и разрешение расхождений политикой.
//!
//! Всё внешнее (клиент, транспорт rollup'а, randomness-сервис, выдача
//! сессий) – узкие порты в `ports`, подключаемые адаптерами.

pub mod api;
pub mod dispatch;
pub mod domain;
pub mod engine;
pub mod infra;
pub mod ports;
pub mod sync;
pub mod time_ctrl;
