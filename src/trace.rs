use geo::{point, BoundingRect, MultiPoint, Point, Rect};

use crate::distance::DistanceAccumulator;
use crate::error::TraceError;

/// A single fix position, `x` = longitude and `y` = latitude.
pub type Position = Point<f64>;

/// Recorded position trace with precomputed per-fix deltas.
///
/// Index `i` denotes the fix reached after travelling `distance_deltas[i]`
/// meters over `time_deltas[i]` seconds. The first entry carries zero deltas.
/// Time deltas may be zero or negative and are never trusted blindly.
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    start_time: i64,
    distance_deltas: Vec<f64>,
    time_deltas: Vec<f64>,
    positions: Vec<Position>,
}

impl Trace {
    /// Build a trace from parallel sequences, rejecting misaligned input.
    pub fn new(
        start_time: i64,
        distance_deltas: Vec<f64>,
        time_deltas: Vec<f64>,
        positions: Vec<Position>,
    ) -> Result<Self, TraceError> {
        if distance_deltas.len() != time_deltas.len() || distance_deltas.len() != positions.len() {
            return Err(TraceError::LengthMismatch {
                distance_deltas: distance_deltas.len(),
                time_deltas: time_deltas.len(),
                positions: positions.len(),
            });
        }

        Ok(Trace {
            start_time,
            distance_deltas,
            time_deltas,
            positions,
        })
    }

    /// Build a trace from `(latitude, longitude)` pairs.
    pub fn from_lat_lon(
        start_time: i64,
        distance_deltas: Vec<f64>,
        time_deltas: Vec<f64>,
        lat_lon: &[(f64, f64)],
    ) -> Result<Self, TraceError> {
        let positions = lat_lon
            .iter()
            .map(|&(lat, lon)| point!(x: lon, y: lat))
            .collect();
        Trace::new(start_time, distance_deltas, time_deltas, positions)
    }

    /// Epoch seconds of the first fix; identifies the trace.
    pub fn start_time(&self) -> i64 {
        self.start_time
    }

    pub fn distance_deltas(&self) -> &[f64] {
        &self.distance_deltas
    }

    pub fn time_deltas(&self) -> &[f64] {
        &self.time_deltas
    }

    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.distance_deltas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distance_deltas.is_empty()
    }

    /// Iterate fixes as `(index, distance delta, time delta, position)`.
    pub fn samples(&self) -> impl Iterator<Item = (usize, f64, f64, Position)> + '_ {
        self.distance_deltas
            .iter()
            .zip(&self.time_deltas)
            .zip(&self.positions)
            .enumerate()
            .map(|(i, ((&dd, &dt), &pos))| (i, dd, dt, pos))
    }

    /// Sum of all distance deltas in meters. No filtering is applied.
    pub fn total_distance(&self) -> f64 {
        let mut accumulator = DistanceAccumulator::new();
        for &delta in &self.distance_deltas {
            accumulator.add(delta);
        }
        accumulator.total()
    }

    /// Sum of the positive time deltas in seconds.
    pub fn elapsed_time(&self) -> f64 {
        self.time_deltas.iter().filter(|&&dt| dt > 0.0).sum()
    }

    /// Lat/lon bounding box of the fixes, `None` for an empty trace.
    pub fn bounds(&self) -> Option<Rect<f64>> {
        MultiPoint::new(self.positions.clone()).bounding_rect()
    }
}

/// Total distance of a trace in meters.
pub fn total_distance(trace: &Trace) -> f64 {
    trace.total_distance()
}
