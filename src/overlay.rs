use std::collections::HashMap;

use log::debug;

use crate::segmenter::{segment_markers, SegmentMarker, SelectionPolicy};
use crate::speed_filter::SpeedLimits;
use crate::trace::Trace;

/// Marker window for a map zoom level: `base * 2^(reference_zoom - zoom)`.
///
/// Each zoom step out doubles the window so markers keep a similar on-screen
/// spacing.
pub fn zoom_window_size(base_window_m: f64, reference_zoom: i32, zoom: i32) -> f64 {
    base_window_m * 2f64.powi(reference_zoom - zoom)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct OverlayKey {
    start_time: i64,
    window_bits: u64,
    policy: SelectionPolicy,
}

/// Caller-owned memo of marker lists keyed by trace, window size and policy.
///
/// One overlay serves a single set of speed limits; build another overlay for
/// different limits.
#[derive(Debug)]
pub struct MarkerOverlay {
    limits: SpeedLimits,
    cache: HashMap<OverlayKey, Vec<SegmentMarker>>,
}

impl MarkerOverlay {
    pub fn new(limits: SpeedLimits) -> Self {
        MarkerOverlay {
            limits,
            cache: HashMap::new(),
        }
    }

    pub fn limits(&self) -> &SpeedLimits {
        &self.limits
    }

    /// Markers for `trace`, computed on first request and reused afterwards.
    pub fn markers_for(&mut self, trace: &Trace, window_size: f64, policy: SelectionPolicy) -> &[SegmentMarker] {
        let key = OverlayKey {
            start_time: trace.start_time(),
            window_bits: window_size.to_bits(),
            policy,
        };
        let limits = self.limits;
        self.cache.entry(key).or_insert_with(|| {
            debug!(
                "Building marker layer for trace {} (window {:.0} m, {})",
                trace.start_time(),
                window_size,
                policy
            );
            segment_markers(trace, &limits, window_size, policy)
        })
    }

    pub fn contains(&self, trace: &Trace, window_size: f64, policy: SelectionPolicy) -> bool {
        self.cache.contains_key(&OverlayKey {
            start_time: trace.start_time(),
            window_bits: window_size.to_bits(),
            policy,
        })
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trace(start_time: i64) -> Trace {
        let n = 50;
        let dd: Vec<f64> = (0..n).map(|i| if i == 0 { 0.0 } else { 50.0 }).collect();
        let dt: Vec<f64> = (0..n).map(|i| if i == 0 { 0.0 } else { 5.0 }).collect();
        Trace::from_lat_lon(start_time, dd, dt, &vec![(45.0, 7.0); n]).unwrap()
    }

    #[test]
    fn test_zoom_window_size() {
        assert_eq!(zoom_window_size(250.0, 14, 14), 250.0);
        assert_eq!(zoom_window_size(250.0, 14, 13), 500.0);
        assert_eq!(zoom_window_size(250.0, 14, 16), 62.5);
    }

    #[test]
    fn test_overlay_memoizes_per_key() {
        let mut overlay = MarkerOverlay::new(SpeedLimits::cycling());
        let t = trace(100);

        let first = overlay.markers_for(&t, 500.0, SelectionPolicy::LastValid).to_vec();
        assert_eq!(overlay.len(), 1);
        let again = overlay.markers_for(&t, 500.0, SelectionPolicy::LastValid).to_vec();
        assert_eq!(overlay.len(), 1);
        assert_eq!(first, again);
        assert_eq!(first, segment_markers(&t, &SpeedLimits::cycling(), 500.0, SelectionPolicy::LastValid));

        overlay.markers_for(&t, 250.0, SelectionPolicy::LastValid);
        overlay.markers_for(&t, 250.0, SelectionPolicy::MaxSpeed);
        overlay.markers_for(&trace(200), 250.0, SelectionPolicy::MaxSpeed);
        assert_eq!(overlay.len(), 4);
        assert!(overlay.contains(&t, 250.0, SelectionPolicy::MaxSpeed));

        overlay.clear();
        assert!(overlay.is_empty());
    }
}
