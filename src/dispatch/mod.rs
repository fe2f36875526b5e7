//! Очередь отправки state-changing запросов в быстрый tier.
//!
//! Приоритеты, ограниченный in-flight, экспоненциальный backoff и
//! идемпотентный replay по nonce. Per-match порядок сохраняется:
//! быстрый tier никогда не увидит устаревшее действие вне очереди.

pub mod dispatcher;
pub mod request;

pub use dispatcher::{Dispatcher, DispatcherConfig};
pub use request::{Priority, SubmissionRequest, SubmissionStatus};
