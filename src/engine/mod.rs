//! Движок матча: валидация действий, машина состояний, события, фасад.
//!
//! Основные операции:
//!   - `GameStateMachine::create_match` – создать матч в waiting
//!   - `GameStateMachine::apply` – применить одно действие (чистая функция)
//!   - `GameStateMachine::deal` – назначить колоду по seed'у
//!   - `MatchService::submit_action` – внешний вход: сессия → валидатор →
//!     apply → репозиторий → очередь отправки

pub mod actions;
pub mod comparator;
pub mod errors;
pub mod events;
pub mod match_service;
pub mod state_machine;
pub mod validation;

pub use actions::{Action, ActionKind};
pub use comparator::{HandComparator, HighCardComparator};
pub use errors::{ConfigError, EngineError, RejectReason};
pub use events::{OutboundEvent, SeedOrigin};
pub use match_service::MatchService;
pub use state_machine::GameStateMachine;

/// RNG-интерфейс движка. Реализации – в infra (обёртки над `rand`).
pub trait RandomSource {
    fn shuffle<T>(&mut self, slice: &mut [T]);
}
