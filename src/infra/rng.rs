use crate::engine::RandomSource;

/// Детерминированный RNG для dealing, тестов и реплея.
/// Одинаковый seed → одинаковый порядок колоды, всегда.
#[derive(Clone, Debug)]
pub struct DeterministicRng {
    inner: rand::rngs::StdRng,
}

impl DeterministicRng {
    pub fn from_seed(seed: [u8; 32]) -> Self {
        use rand::SeedableRng;
        Self {
            inner: rand::rngs::StdRng::from_seed(seed),
        }
    }
}

impl RandomSource for DeterministicRng {
    /// Seeded Fisher–Yates (внутри `SliceRandom::shuffle`).
    fn shuffle<T>(&mut self, slice: &mut [T]) {
        use rand::seq::SliceRandom;
        slice.shuffle(&mut self.inner);
    }
}
