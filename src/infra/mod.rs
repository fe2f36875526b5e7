//! Инфраструктура: RNG, seed'ы, генерация ID, репозиторий матчей, хэширование.

pub mod hashing;
pub mod ids;
pub mod persistence;
pub mod rng;
pub mod rng_seed;

pub use hashing::hash_payload;
pub use ids::IdGenerator;
pub use persistence::{InMemoryMatchRepository, MatchRepository};
pub use rng::DeterministicRng;
pub use rng_seed::RngSeed;
