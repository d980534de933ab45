/// Batch reports over trace files
///
/// Loads and analyses traces in parallel, prints the selector-style summary
/// and exports results to CSV.
use std::path::{Path, PathBuf};

use chrono::Local;
use csv::Writer;
use log::{info, warn};
use rayon::prelude::*;

use crate::average_speed::{summarize_activity, ActivitySummary};
use crate::config::AnalysisConfig;
use crate::error::TraceFileError;
use crate::format::{
    epoch_in, format_datetime, format_duration, marker_label, marker_title, meters_to_km, mps_to_kmh, track_caption,
};
use crate::overlay::zoom_window_size;
use crate::segmenter::{segment_markers, SegmentMarker};
use crate::trace::Trace;
use crate::trace_file::read_trace_file;

#[derive(Debug, Clone)]
pub struct TraceReport {
    pub source: PathBuf,
    pub start_time: i64,
    pub points: usize,
    pub total_distance_m: f64,
    pub elapsed_s: f64,
    pub activity: ActivitySummary,
    /// Markers at the configured default zoom.
    pub marker_count: usize,
}

impl TraceReport {
    pub fn build(source: &Path, trace: &Trace, config: &AnalysisConfig) -> Self {
        let window = zoom_window_size(config.base_window_m, config.reference_zoom, config.default_zoom);
        TraceReport {
            source: source.to_path_buf(),
            start_time: trace.start_time(),
            points: trace.len(),
            total_distance_m: trace.total_distance(),
            elapsed_s: trace.elapsed_time(),
            activity: summarize_activity(trace, &config.limits),
            marker_count: segment_markers(trace, &config.limits, window, config.policy).len(),
        }
    }

    pub fn average_speed(&self) -> f64 {
        self.activity.average_speed()
    }

    pub fn caption(&self) -> String {
        track_caption(self.start_time, self.average_speed(), self.total_distance_m, &Local)
    }
}

#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Successful reports, sorted by start time.
    pub reports: Vec<TraceReport>,
    pub failures: Vec<(PathBuf, TraceFileError)>,
}

/// Load and analyse every file on a dedicated pool of `config.worker_count()` threads.
pub fn analyze_traces(paths: &[PathBuf], config: &AnalysisConfig) -> Result<BatchOutcome, rayon::ThreadPoolBuildError> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.worker_count())
        .build()?;

    info!("Analysing {} trace files on {} threads", paths.len(), pool.current_num_threads());

    let results: Vec<(PathBuf, Result<TraceReport, TraceFileError>)> = pool.install(|| {
        paths
            .par_iter()
            .map(|path| {
                let report = read_trace_file(path).map(|trace| TraceReport::build(path, &trace, config));
                (path.clone(), report)
            })
            .collect()
    });

    let mut outcome = BatchOutcome::default();
    for (path, result) in results {
        match result {
            Ok(report) => outcome.reports.push(report),
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                outcome.failures.push((path, e));
            }
        }
    }
    outcome.reports.sort_by_key(|r| r.start_time);
    Ok(outcome)
}

pub fn print_summary(outcome: &BatchOutcome) {
    println!("\n🚴 TRACE SUMMARY");
    println!("================");

    for report in &outcome.reports {
        println!("  {}", report.caption());
    }

    let total_distance: f64 = outcome.reports.iter().map(|r| r.total_distance_m).sum();
    let active_distance: f64 = outcome.reports.iter().map(|r| r.activity.active_distance).sum();
    let active_time: f64 = outcome.reports.iter().map(|r| r.activity.active_time).sum();

    println!("\nTraces: {} loaded, {} failed", outcome.reports.len(), outcome.failures.len());
    println!("Total distance: {:.1} km", meters_to_km(total_distance));
    if active_time > 0.0 {
        println!(
            "Active: {:.1} km in {} ({:.2} km/h)",
            meters_to_km(active_distance),
            format_duration(active_time.round() as i64),
            mps_to_kmh(active_distance / active_time)
        );
    }

    for (path, e) in &outcome.failures {
        eprintln!("❌ {}: {}", path.display(), e);
    }
}

pub fn print_markers(trace: &Trace, window_size: f64, markers: &[SegmentMarker]) {
    println!(
        "\n📍 {} - window {:.0} m, {} markers",
        format_datetime(&epoch_in(trace.start_time(), &Local)),
        window_size,
        markers.len()
    );
    for marker in markers {
        let title = marker_title(marker, trace.start_time(), &Local).replace('\n', "  ");
        println!(
            "  #{:<6} {:>4} km/h  {}  ({:.6}, {:.6})",
            marker.sample_index,
            marker_label(marker),
            title,
            marker.position.y(),
            marker.position.x()
        );
    }
}

pub fn write_reports_csv(reports: &[TraceReport], csv_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let mut wtr = Writer::from_path(csv_path)?;

    wtr.write_record([
        "Source",
        "Start_Time",
        "Started",
        "Points",
        "Total_Distance_km",
        "Elapsed",
        "Active_Distance_km",
        "Active_Time",
        "Average_Speed_kmh",
        "Accepted_Samples",
        "Rejected_Samples",
        "Markers",
    ])?;

    for report in reports {
        wtr.write_record(&[
            report.source.display().to_string(),
            report.start_time.to_string(),
            format_datetime(&epoch_in(report.start_time, &Local)),
            report.points.to_string(),
            format!("{:.2}", meters_to_km(report.total_distance_m)),
            format_duration(report.elapsed_s.round() as i64),
            format!("{:.2}", meters_to_km(report.activity.active_distance)),
            format_duration(report.activity.active_time.round() as i64),
            format!("{:.2}", mps_to_kmh(report.average_speed())),
            report.activity.accepted_samples.to_string(),
            report.activity.rejected_samples.to_string(),
            report.marker_count.to_string(),
        ])?;
    }

    wtr.flush()?;
    println!("📊 Report saved to: {}", csv_path.display());
    Ok(())
}

pub fn write_markers_csv(
    trace: &Trace,
    window_size: f64,
    markers: &[SegmentMarker],
    csv_path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut wtr = Writer::from_path(csv_path)?;

    wtr.write_record([
        "Start_Time",
        "Window_m",
        "Sample_Index",
        "Time",
        "Elapsed",
        "Distance_km",
        "Speed_kmh",
        "Latitude",
        "Longitude",
    ])?;

    for marker in markers {
        wtr.write_record(&[
            trace.start_time().to_string(),
            format!("{:.1}", window_size),
            marker.sample_index.to_string(),
            format!("{:.0}", marker.time),
            format_duration((marker.time - trace.start_time() as f64).round() as i64),
            format!("{:.3}", meters_to_km(marker.cumulative_distance)),
            format!("{:.1}", mps_to_kmh(marker.speed)),
            format!("{:.6}", marker.position.y()),
            format!("{:.6}", marker.position.x()),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn ride() -> Trace {
        let n = 61;
        let dd: Vec<f64> = (0..n).map(|i| if i == 0 { 0.0 } else { 50.0 }).collect();
        let dt: Vec<f64> = (0..n).map(|i| if i == 0 { 0.0 } else { 10.0 }).collect();
        Trace::from_lat_lon(1_622_728_859, dd, dt, &vec![(59.9, 30.3); n]).unwrap()
    }

    #[test]
    fn test_build_report() {
        let report = TraceReport::build(Path::new("ride.js"), &ride(), &AnalysisConfig::default());
        assert_eq!(report.points, 61);
        assert_eq!(report.total_distance_m, 3_000.0);
        assert_eq!(report.elapsed_s, 600.0);
        assert_eq!(report.activity.accepted_samples, 60);
        assert_eq!(report.average_speed(), 5.0);
        // 250 m windows over 3 km
        assert_eq!(report.marker_count, 12);
    }

    #[test]
    fn test_markers_csv() {
        let trace = ride();
        let markers = segment_markers(&trace, &AnalysisConfig::default().limits, 1_000.0, Default::default());
        let path = std::env::temp_dir().join(format!("gpx-velocity-markers-{}.csv", std::process::id()));
        write_markers_csv(&trace, 1_000.0, &markers, &path).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        fs::remove_file(&path).ok();

        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 1 + 3);
        assert!(lines[0].starts_with("Start_Time,Window_m,Sample_Index"));
        assert!(lines[1].contains(",20,"));
        assert!(lines[1].contains("03:20"));
        assert!(lines[1].contains(",18.0,"));
    }
}
