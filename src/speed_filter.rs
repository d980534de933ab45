/// Speed & acceleration acceptance filter
///
/// Decides for each chronological `(time, speed)` sample whether it is real
/// locomotion rather than GPS jitter, a stop or an implausible spike.
///
/// The reference point used for acceleration moves on every sample that is
/// neither too fast nor accelerating too hard, including samples that are
/// later rejected for being below `min_speed`. Slow stretches therefore keep
/// anchoring acceleration continuity, while spikes never corrupt it.
use serde::{Deserialize, Serialize};

/// Acceptance bounds, in the units of the samples fed to the filter.
///
/// `min_speed < speed < max_speed` and `acceleration < max_acceleration`
/// are all strict.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedLimits {
    pub min_speed: f64,
    pub max_speed: f64,
    pub max_acceleration: f64,
}

impl SpeedLimits {
    pub fn new(min_speed: f64, max_speed: f64, max_acceleration: f64) -> Self {
        SpeedLimits {
            min_speed,
            max_speed,
            max_acceleration,
        }
    }

    /// Cycling thresholds in m/s: 8 km/h, 60 km/h and 4 km/h per second.
    pub fn cycling() -> Self {
        SpeedLimits::new(8.0 / 3.6, 60.0 / 3.6, 4.0 / 3.6)
    }

    pub fn is_valid(&self) -> bool {
        self.min_speed.is_finite()
            && self.max_speed.is_finite()
            && self.max_acceleration.is_finite()
            && self.min_speed < self.max_speed
    }
}

impl Default for SpeedLimits {
    fn default() -> Self {
        SpeedLimits::cycling()
    }
}

#[derive(Debug, Clone)]
pub struct AccelerationSpeedFilter {
    limits: SpeedLimits,
    last_accepted_time: f64,
    last_accepted_speed: f64,
}

impl AccelerationSpeedFilter {
    pub fn new(limits: SpeedLimits) -> Self {
        AccelerationSpeedFilter {
            limits,
            last_accepted_time: 0.0,
            last_accepted_speed: 0.0,
        }
    }

    pub fn limits(&self) -> &SpeedLimits {
        &self.limits
    }

    /// Time of the current reference sample; `0.0` means no history yet.
    pub fn last_accepted_time(&self) -> f64 {
        self.last_accepted_time
    }

    pub fn last_accepted_speed(&self) -> f64 {
        self.last_accepted_speed
    }

    /// Acceleration of `(time, speed)` relative to the reference sample.
    ///
    /// Zero when there is no history or when `time` does not move forward.
    pub fn acceleration(&self, time: f64, speed: f64) -> f64 {
        if self.last_accepted_time == 0.0 {
            return 0.0;
        }
        let dt = time - self.last_accepted_time;
        if dt > 0.0 {
            (speed - self.last_accepted_speed) / dt
        } else {
            0.0
        }
    }

    /// Classify a sample and advance the reference point when it qualifies.
    pub fn validate(&mut self, time: f64, speed: f64) -> bool {
        let acceleration = self.acceleration(time, speed);
        let plausible = acceleration < self.limits.max_acceleration && speed < self.limits.max_speed;

        if plausible {
            self.last_accepted_time = time;
            self.last_accepted_speed = speed;
        }

        plausible && speed > self.limits.min_speed
    }
}
