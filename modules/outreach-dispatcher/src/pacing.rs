use std::time::Duration;

use rand::Rng;

/// Delay between consecutive sends: a fixed base plus a uniform random
/// extra in `[0, range)`.
#[derive(Debug, Clone, Copy)]
pub struct Pacing {
    base: Duration,
    range: Duration,
}

impl Pacing {
    pub fn new(base: Duration, range: Duration) -> Self {
        Self { base, range }
    }

    pub fn next_delay<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let range_ms = self.range.as_millis() as u64;
        if range_ms == 0 {
            return self.base;
        }
        self.base + Duration::from_millis(rng.random_range(0..range_ms))
    }
}
