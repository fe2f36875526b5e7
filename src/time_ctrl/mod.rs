//! Контроль времени: инжектируемые часы + таймер хода.
//!
//! Никаких wall-clock sleep'ов внутри ядра: всё тикается снаружи,
//! в тестах время двигается вручную через `ManualClock`.

pub mod clock;

pub use clock::{Clock, ManualClock, SystemClock, TurnClock};
