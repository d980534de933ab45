//! Display helpers for captions and marker annotations.

use std::fmt::Display;

use chrono::{DateTime, TimeZone, Utc};

use crate::segmenter::SegmentMarker;

pub fn mps_to_kmh(speed: f64) -> f64 {
    speed * 3.6
}

pub fn meters_to_km(distance: f64) -> f64 {
    distance * 0.001
}

/// Elapsed seconds as `mm:ss`, or `hh:mm:ss` from one hour on.
pub fn format_duration(seconds: i64) -> String {
    let seconds = seconds.max(0);
    let s = seconds % 60;
    let m = (seconds / 60) % 60;
    let h = seconds / 3600;
    if h < 1 {
        format!("{:02}:{:02}", m, s)
    } else {
        format!("{:02}:{:02}:{:02}", h, m, s)
    }
}

pub fn format_date<Tz: TimeZone>(dt: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    dt.format("%Y-%m-%d").to_string()
}

pub fn format_clock<Tz: TimeZone>(dt: &DateTime<Tz>, with_seconds: bool) -> String
where
    Tz::Offset: Display,
{
    if with_seconds {
        dt.format("%H:%M:%S").to_string()
    } else {
        dt.format("%H:%M").to_string()
    }
}

pub fn format_datetime<Tz: TimeZone>(dt: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    format!("{} {}", format_date(dt), format_clock(dt, false))
}

/// Epoch seconds in `tz`; out-of-range values fall back to the epoch.
pub fn epoch_in<Tz: TimeZone>(seconds: i64, tz: &Tz) -> DateTime<Tz> {
    let utc = DateTime::<Utc>::from_timestamp(seconds, 0).unwrap_or_default();
    utc.with_timezone(tz)
}

/// Hover text for a marker: clock time, elapsed time and distance so far.
pub fn marker_title<Tz: TimeZone>(marker: &SegmentMarker, start_time: i64, tz: &Tz) -> String
where
    Tz::Offset: Display,
{
    let at = epoch_in(marker.time.floor() as i64, tz);
    let elapsed = (marker.time - start_time as f64).round() as i64;
    format!(
        "{} ({})\n{:.1} km",
        format_clock(&at, true),
        format_duration(elapsed),
        meters_to_km(marker.cumulative_distance)
    )
}

/// Marker label: speed in whole km/h.
pub fn marker_label(marker: &SegmentMarker) -> String {
    format!("{:.0}", mps_to_kmh(marker.speed))
}

/// Track selector caption: start date-time, active speed and distance.
pub fn track_caption<Tz: TimeZone>(start_time: i64, average_speed: f64, total_distance: f64, tz: &Tz) -> String
where
    Tz::Offset: Display,
{
    format!(
        "{}   {:.2} km/h   {:.1} km",
        format_datetime(&epoch_in(start_time, tz)),
        mps_to_kmh(average_speed),
        meters_to_km(total_distance)
    )
}
