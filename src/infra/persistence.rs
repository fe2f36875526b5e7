use std::collections::HashMap;

use crate::domain::match_state::Match;
use crate::domain::MatchId;

/// Абстракция хранилища матчей.
///
/// Матч живёт в памяти за этой абстракцией; бэкенд и per-key блокировки
/// подменяются реализацией. Ядру важен только get/put/delete.
pub trait MatchRepository {
    fn get(&self, id: MatchId) -> Option<Match>;

    fn put(&mut self, m: Match);

    fn delete(&mut self, id: MatchId) -> Option<Match>;

    /// Все ID матчей (для тиков таймаутов и reaping'а).
    fn ids(&self) -> Vec<MatchId>;
}

/// Простая in-memory реализация для тестов и локального запуска.
#[derive(Debug, Default)]
pub struct InMemoryMatchRepository {
    matches: HashMap<MatchId, Match>,
}

impl InMemoryMatchRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

impl MatchRepository for InMemoryMatchRepository {
    fn get(&self, id: MatchId) -> Option<Match> {
        self.matches.get(&id).cloned()
    }

    fn put(&mut self, m: Match) {
        self.matches.insert(m.id, m);
    }

    fn delete(&mut self, id: MatchId) -> Option<Match> {
        self.matches.remove(&id)
    }

    fn ids(&self) -> Vec<MatchId> {
        self.matches.keys().copied().collect()
    }
}
