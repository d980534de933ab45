/// Distance-windowed speed markers
///
/// Walks a trace once, classifying each sample with its own
/// [`AccelerationSpeedFilter`], and emits at most one representative marker
/// per window of `window_size` meters. Only windows that reach the window size
/// emit; the trailing open window is dropped.
use log::debug;
use serde::{Deserialize, Serialize};

use crate::distance::DistanceAccumulator;
use crate::speed_filter::{AccelerationSpeedFilter, SpeedLimits};
use crate::trace::{Position, Trace};

/// How the representative sample of a window is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionPolicy {
    /// The last accepted sample before the window closes.
    #[default]
    LastValid,
    /// The fastest accepted sample in the window; ties keep the earlier one.
    MaxSpeed,
}

impl SelectionPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionPolicy::LastValid => "last-valid",
            SelectionPolicy::MaxSpeed => "max-speed",
        }
    }
}

impl std::fmt::Display for SelectionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentMarker {
    pub sample_index: usize,
    /// Absolute epoch seconds of the sample.
    pub time: f64,
    pub cumulative_distance: f64,
    pub speed: f64,
    pub position: Position,
}

#[derive(Debug)]
struct Segmenter {
    window_size: f64,
    policy: SelectionPolicy,
    filter: AccelerationSpeedFilter,
    window: DistanceAccumulator,
    cumulative: DistanceAccumulator,
    cumulative_time: f64,
    candidate: Option<SegmentMarker>,
    markers: Vec<SegmentMarker>,
}

impl Segmenter {
    fn new(start_time: i64, limits: SpeedLimits, window_size: f64, policy: SelectionPolicy) -> Self {
        Segmenter {
            window_size,
            policy,
            filter: AccelerationSpeedFilter::new(limits),
            window: DistanceAccumulator::new(),
            cumulative: DistanceAccumulator::new(),
            cumulative_time: start_time as f64,
            candidate: None,
            markers: Vec::new(),
        }
    }

    fn push(&mut self, index: usize, distance_delta: f64, time_delta: f64, position: Position) {
        let window_distance = self.window.add(distance_delta);
        let cumulative_distance = self.cumulative.add(distance_delta);

        if time_delta > 0.0 {
            self.cumulative_time += time_delta;
            let speed = distance_delta / time_delta;
            if self.filter.validate(self.cumulative_time, speed) {
                self.offer(SegmentMarker {
                    sample_index: index,
                    time: self.cumulative_time,
                    cumulative_distance,
                    speed,
                    position,
                });
            }
        }

        if window_distance >= self.window_size {
            if let Some(marker) = self.candidate.take() {
                self.markers.push(marker);
            }
            self.window.reset();
        }
    }

    fn offer(&mut self, sample: SegmentMarker) {
        let replace = match (self.policy, &self.candidate) {
            (SelectionPolicy::LastValid, _) => true,
            (SelectionPolicy::MaxSpeed, None) => true,
            (SelectionPolicy::MaxSpeed, Some(best)) => sample.speed > best.speed,
        };
        if replace {
            self.candidate = Some(sample);
        }
    }
}

/// Representative speed markers, one per closed window of `window_size` meters.
///
/// `window_size` must be positive. Markers are ordered by cumulative distance.
pub fn segment_markers(
    trace: &Trace,
    limits: &SpeedLimits,
    window_size: f64,
    policy: SelectionPolicy,
) -> Vec<SegmentMarker> {
    let mut segmenter = Segmenter::new(trace.start_time(), *limits, window_size, policy);
    for (i, dd, dt, position) in trace.samples() {
        segmenter.push(i, dd, dt, position);
    }

    debug!(
        "trace {}: {} markers over {:.0} m (window {:.0} m, {})",
        trace.start_time(),
        segmenter.markers.len(),
        segmenter.cumulative.total(),
        window_size,
        policy
    );

    segmenter.markers
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trace(dd: Vec<f64>, dt: Vec<f64>) -> Trace {
        let positions: Vec<(f64, f64)> = (0..dd.len()).map(|i| (50.0 + i as f64 * 0.001, 8.0)).collect();
        Trace::from_lat_lon(1_000, dd, dt, &positions).unwrap()
    }

    fn limits() -> SpeedLimits {
        SpeedLimits::new(5.0, 20.0, 100.0)
    }

    #[test]
    fn test_constant_speed_windows() {
        let t = trace(vec![0.0, 100.0, 100.0, 100.0, 100.0], vec![0.0, 10.0, 10.0, 10.0, 10.0]);
        let markers = segment_markers(&t, &limits(), 250.0, SelectionPolicy::LastValid);
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].sample_index, 3);
        assert_eq!(markers[0].cumulative_distance, 300.0);
        assert_eq!(markers[0].speed, 10.0);
        assert_eq!(markers[0].time, 1_030.0);
    }

    #[test]
    fn test_window_size_150_closes_every_second_sample() {
        let t = trace(vec![0.0, 100.0, 100.0, 100.0, 100.0], vec![0.0, 10.0, 10.0, 10.0, 10.0]);
        let markers = segment_markers(&t, &limits(), 150.0, SelectionPolicy::LastValid);
        let indices: Vec<usize> = markers.iter().map(|m| m.sample_index).collect();
        assert_eq!(indices, vec![2, 4]);
        assert_eq!(markers[0].cumulative_distance, 200.0);
        assert_eq!(markers[0].speed, 10.0);
    }

    #[test]
    fn test_short_trace_has_no_markers() {
        let t = trace(vec![0.0, 50.0, 50.0], vec![0.0, 5.0, 5.0]);
        assert!(segment_markers(&t, &limits(), 150.0, SelectionPolicy::LastValid).is_empty());
        assert!(segment_markers(&t, &limits(), 150.0, SelectionPolicy::MaxSpeed).is_empty());
    }

    #[test]
    fn test_window_with_only_rejected_samples_emits_nothing() {
        // first window: all stationary-ish (2 m/s < 5); second window: 10 m/s
        let t = trace(
            vec![0.0, 20.0, 20.0, 20.0, 100.0, 100.0],
            vec![0.0, 10.0, 10.0, 10.0, 10.0, 10.0],
        );
        let markers = segment_markers(&t, &limits(), 60.0, SelectionPolicy::LastValid);
        let indices: Vec<usize> = markers.iter().map(|m| m.sample_index).collect();
        assert_eq!(indices, vec![4, 5]);
    }

    #[test]
    fn test_max_speed_policy_picks_fastest() {
        let t = trace(
            vec![0.0, 60.0, 150.0, 80.0, 60.0, 60.0],
            vec![0.0, 10.0, 10.0, 10.0, 10.0, 10.0],
        );
        let last = segment_markers(&t, &limits(), 280.0, SelectionPolicy::LastValid);
        let fastest = segment_markers(&t, &limits(), 280.0, SelectionPolicy::MaxSpeed);
        assert_eq!(last.len(), 1);
        assert_eq!(fastest.len(), 1);
        assert_eq!(last[0].sample_index, 3);
        assert_eq!(fastest[0].sample_index, 2);
        assert_eq!(fastest[0].speed, 15.0);
        assert_eq!(fastest[0].cumulative_distance, 210.0);
    }

    #[test]
    fn test_zero_time_delta_still_counts_distance() {
        let t = trace(vec![0.0, 100.0, 100.0, 100.0], vec![0.0, 10.0, 0.0, 10.0]);
        let markers = segment_markers(&t, &limits(), 200.0, SelectionPolicy::LastValid);
        assert_eq!(markers.len(), 1);
        // window closes at index 2 which has no speed; candidate is index 1
        assert_eq!(markers[0].sample_index, 1);
        assert_eq!(markers[0].cumulative_distance, 100.0);
    }

    #[test]
    fn test_markers_progress_along_trace() {
        let dd: Vec<f64> = (0..200).map(|i| if i == 0 { 0.0 } else { 40.0 + (i % 7) as f64 * 5.0 }).collect();
        let dt: Vec<f64> = (0..200).map(|i| if i == 0 { 0.0 } else { 5.0 }).collect();
        let t = trace(dd, dt);
        for policy in [SelectionPolicy::LastValid, SelectionPolicy::MaxSpeed] {
            let markers = segment_markers(&t, &SpeedLimits::new(5.0, 20.0, 10.0), 500.0, policy);
            assert!(!markers.is_empty());
            for pair in markers.windows(2) {
                assert!(pair[1].cumulative_distance > pair[0].cumulative_distance);
                assert!(pair[1].time > pair[0].time);
            }
        }
    }

    #[test]
    fn test_empty_trace() {
        let t = trace(vec![], vec![]);
        assert!(segment_markers(&t, &limits(), 100.0, SelectionPolicy::MaxSpeed).is_empty());
    }

    #[test]
    fn test_repeated_calls_are_independent() {
        let t = trace(vec![0.0, 100.0, 100.0, 100.0, 100.0], vec![0.0, 10.0, 10.0, 10.0, 10.0]);
        let first = segment_markers(&t, &limits(), 150.0, SelectionPolicy::LastValid);
        let second = segment_markers(&t, &limits(), 150.0, SelectionPolicy::LastValid);
        assert_eq!(first, second);
    }

    #[test]
    fn test_policy_serde_names() {
        assert_eq!(serde_json::to_string(&SelectionPolicy::MaxSpeed).unwrap(), "\"max-speed\"");
        let parsed: SelectionPolicy = serde_json::from_str("\"last-valid\"").unwrap();
        assert_eq!(parsed, SelectionPolicy::LastValid);
        assert_eq!(SelectionPolicy::MaxSpeed.to_string(), "max-speed");
    }
}
