//! # GPX Velocity
//!
//! Speed analysis for recorded ride traces whose per-fix distance and time
//! deltas have already been computed by the ingestion step.
//!
//! - total distance of a trace
//! - average *active* speed, ignoring stops, GPS jitter and spikes
//! - sparse speed markers, one per distance window, for map overlays
//!
//! ```rust
//! use gpx_velocity::{average_active_speed, segment_markers, total_distance};
//! use gpx_velocity::{SelectionPolicy, SpeedLimits, Trace};
//!
//! let trace = Trace::from_lat_lon(
//!     1_622_728_859,
//!     vec![0.0, 100.0, 100.0, 100.0],
//!     vec![0.0, 10.0, 10.0, 10.0],
//!     &[(59.90, 30.25), (59.91, 30.25), (59.92, 30.25), (59.93, 30.25)],
//! )
//! .unwrap();
//!
//! let limits = SpeedLimits::new(5.0, 20.0, 1.0);
//! assert_eq!(total_distance(&trace), 300.0);
//! assert_eq!(average_active_speed(&trace, &limits), 10.0);
//! assert_eq!(segment_markers(&trace, &limits, 150.0, SelectionPolicy::LastValid).len(), 1);
//! ```

pub mod error;
pub use error::{ConfigError, TraceError, TraceFileError};

pub mod trace;
pub use trace::{total_distance, Position, Trace};

pub mod distance;
pub use distance::DistanceAccumulator;

pub mod speed_filter;
pub use speed_filter::{AccelerationSpeedFilter, SpeedLimits};

pub mod segmenter;
pub use segmenter::{segment_markers, SegmentMarker, SelectionPolicy};

pub mod average_speed;
pub use average_speed::{average_active_speed, summarize_activity, ActivitySummary};

pub mod config;
pub use config::AnalysisConfig;

pub mod overlay;
pub use overlay::{zoom_window_size, MarkerOverlay};

pub mod trace_file;
pub use trace_file::{collect_trace_paths, discover_trace_files, read_trace_file, write_trace_file};

pub mod format;

pub mod report;
pub use report::{analyze_traces, BatchOutcome, TraceReport};
