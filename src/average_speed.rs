use log::debug;

use crate::speed_filter::{AccelerationSpeedFilter, SpeedLimits};
use crate::trace::Trace;

/// Totals of the samples the speed filter accepted as locomotion.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ActivitySummary {
    pub active_distance: f64,
    pub active_time: f64,
    pub accepted_samples: usize,
    pub rejected_samples: usize,
    /// Samples with a non-positive time delta; no speed can be derived for them.
    pub skipped_samples: usize,
}

impl ActivitySummary {
    /// Active distance over active time, `0.0` when nothing was accepted.
    pub fn average_speed(&self) -> f64 {
        if self.active_time > 0.0 {
            self.active_distance / self.active_time
        } else {
            0.0
        }
    }
}

/// Single filtered pass over `trace` with a filter private to this call.
pub fn summarize_activity(trace: &Trace, limits: &SpeedLimits) -> ActivitySummary {
    let mut filter = AccelerationSpeedFilter::new(*limits);
    let mut summary = ActivitySummary::default();
    let mut time = trace.start_time() as f64;

    for (_, dd, dt, _) in trace.samples() {
        if dt <= 0.0 {
            summary.skipped_samples += 1;
            continue;
        }
        time += dt;
        let speed = dd / dt;
        if filter.validate(time, speed) {
            summary.active_distance += dd;
            summary.active_time += dt;
            summary.accepted_samples += 1;
        } else {
            summary.rejected_samples += 1;
        }
    }

    debug!(
        "trace {}: {} accepted, {} rejected, {} skipped samples",
        trace.start_time(),
        summary.accepted_samples,
        summary.rejected_samples,
        summary.skipped_samples
    );

    summary
}

/// Average speed over the samples accepted as locomotion, in input units.
pub fn average_active_speed(trace: &Trace, limits: &SpeedLimits) -> f64 {
    summarize_activity(trace, limits).average_speed()
}
