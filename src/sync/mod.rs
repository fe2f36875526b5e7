//! Сверка состояния между быстрым и авторитетным tier'ами.
//!
//! Оба tier'а независимо наблюдают одну и ту же сущность; reconciler
//! периодически сравнивает снапшоты, фиксирует расхождения и разрешает
//! их политикой. Выигравший снапшот только ПОМЕЧАЕТСЯ каноничным –
//! проигравший источник никто молча не перезаписывает.

pub mod reconciler;
pub mod snapshot;

pub use reconciler::{
    LedgerSnapshotSource, ReconcilerConfig, SnapshotSource, StateReconciler, SyncError, SyncEvent,
    SyncOutcome,
};
pub use snapshot::{ConflictPolicy, ResolutionOutcome, StateSnapshot, SyncStatus, TrackedEntity};
