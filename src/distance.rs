/// Running distance total, used for whole-trace distance and per-window sums.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DistanceAccumulator {
    total: f64,
}

impl DistanceAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a non-negative distance delta and return the new total.
    pub fn add(&mut self, delta: f64) -> f64 {
        self.total += delta;
        self.total
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn reset(&mut self) {
        self.total = 0.0;
    }
}
