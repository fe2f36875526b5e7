//! Порты внешних коллабораторов.
//!
//! Ядро backend-агностично: randomness-сервис, оба ledger-tier'а и
//! session authority – узкие trait'ы, конкретный бэкенд подключается
//! адаптером. In-memory реализации здесь же – для тестов и локального
//! запуска (как InMemory-хранилище в infra).

pub mod ledger;
pub mod randomness;
pub mod session;

pub use ledger::{InMemoryLedger, LedgerClient, LedgerError, LedgerSnapshot, SubmitReceipt, TierSource};
pub use randomness::{
    InstantRandomness, RandomnessError, RandomnessProvider, SeedContext, SeedGrant,
    TimingOutRandomness,
};
pub use session::{InMemorySessionAuthority, Permission, SessionAuthority, SessionHandle};
