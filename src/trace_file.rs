/// Trace data files
///
/// The ingestion tool writes one file per ride named `<start_time>.js`:
///
/// ```text
/// tracks['1622728859']={"ll":[[59.907581,30.256245],...],"dt":[0,1,...],"dd":[0.00,4.52,...]}
/// ```
///
/// `ll` holds `[latitude, longitude]` pairs, `dt` whole-second time deltas and
/// `dd` distance deltas in meters. A bare JSON object with the same keys (and
/// an optional `start_time`) is accepted too.
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::Deserialize;
use walkdir::WalkDir;

use crate::error::TraceFileError;
use crate::trace::Trace;

#[derive(Debug, Deserialize)]
struct RawTrace {
    #[serde(default)]
    start_time: Option<i64>,
    ll: Vec<[f64; 2]>,
    dt: Vec<f64>,
    dd: Vec<f64>,
}

/// Load one trace file from disk.
pub fn read_trace_file(path: &Path) -> Result<Trace, TraceFileError> {
    let content = fs::read_to_string(path).map_err(|source| TraceFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_trace(&content, path)
}

/// Parse trace file content; `path` is used for the file-name start time and errors.
pub fn parse_trace(content: &str, path: &Path) -> Result<Trace, TraceFileError> {
    let content = content.trim().trim_start_matches('\u{feff}');
    let (key, body) = split_assignment(content, path)?;

    let raw: RawTrace = serde_json::from_str(body).map_err(|source| TraceFileError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    let start_time = key
        .or(raw.start_time)
        .or_else(|| start_time_from_file_name(path))
        .ok_or_else(|| TraceFileError::MissingStartTime(path.to_path_buf()))?;

    let lat_lon: Vec<(f64, f64)> = raw.ll.iter().map(|&[lat, lon]| (lat, lon)).collect();
    let trace = Trace::from_lat_lon(start_time, raw.dd, raw.dt, &lat_lon).map_err(|source| {
        TraceFileError::Trace {
            path: path.to_path_buf(),
            source,
        }
    })?;

    debug!("Loaded {} ({} fixes, start {})", path.display(), trace.len(), start_time);
    Ok(trace)
}

/// Split `tracks['<key>']=<json>` into its key and JSON body.
fn split_assignment<'a>(content: &'a str, path: &Path) -> Result<(Option<i64>, &'a str), TraceFileError> {
    if content.starts_with('{') {
        return Ok((None, content));
    }

    let malformed = |reason: &str| TraceFileError::Malformed {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    };

    let rest = content
        .strip_prefix("tracks[")
        .ok_or_else(|| malformed("expected a JSON object or a tracks['<epoch>']= assignment"))?;
    let close = rest.find(']').ok_or_else(|| malformed("unterminated tracks[...] key"))?;
    let key = rest[..close].trim().trim_matches(|c| c == '\'' || c == '"');
    let key: i64 = key
        .parse()
        .map_err(|_| malformed(&format!("tracks key '{}' is not an epoch timestamp", key)))?;

    let body = rest[close + 1..]
        .trim_start()
        .strip_prefix('=')
        .ok_or_else(|| malformed("missing '=' after tracks[...]"))?;
    let body = body.trim().trim_end_matches(';').trim_end();

    Ok((Some(key), body))
}

fn start_time_from_file_name(path: &Path) -> Option<i64> {
    path.file_stem()?.to_str()?.parse().ok()
}

fn is_trace_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()).map(|e| e.to_lowercase()).as_deref(),
        Some("js") | Some("json")
    )
}

/// All `*.js` / `*.json` files below `dir`, sorted by path.
pub fn discover_trace_files(dir: &Path) -> Result<Vec<PathBuf>, TraceFileError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir) {
        let entry = entry?;
        if entry.file_type().is_file() && is_trace_file(entry.path()) {
            files.push(entry.path().to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}

/// Expand a mix of files and directories into a list of trace files.
pub fn collect_trace_paths(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, TraceFileError> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let found = discover_trace_files(input)?;
            if found.is_empty() {
                warn!("No trace files found in {}", input.display());
            }
            files.extend(found);
        } else {
            files.push(input.clone());
        }
    }
    Ok(files)
}

/// File name the viewer expects for a trace: `<start_time>.js`.
pub fn trace_file_name(trace: &Trace) -> String {
    format!("{}.js", trace.start_time())
}

/// Write `trace` in the `tracks['<start_time>']={...}` form.
pub fn write_trace<W: Write>(trace: &Trace, w: &mut W) -> std::io::Result<()> {
    write!(w, "tracks['{}']={{", trace.start_time())?;

    write!(w, "\"ll\":[")?;
    for (i, p) in trace.positions().iter().enumerate() {
        if i > 0 {
            write!(w, ",")?;
        }
        write!(w, "[{:.6},{:.6}]", p.y(), p.x())?;
    }
    write!(w, "],")?;

    write!(w, "\"dt\":[")?;
    for (i, dt) in trace.time_deltas().iter().enumerate() {
        if i > 0 {
            write!(w, ",")?;
        }
        write!(w, "{:.0}", dt)?;
    }
    write!(w, "],")?;

    write!(w, "\"dd\":[")?;
    for (i, dd) in trace.distance_deltas().iter().enumerate() {
        if i > 0 {
            write!(w, ",")?;
        }
        write!(w, "{:.2}", dd)?;
    }
    write!(w, "]}}")?;
    Ok(())
}

/// Write `trace` into `dir` as `<start_time>.js` and return the file path.
pub fn write_trace_file(trace: &Trace, dir: &Path) -> Result<PathBuf, TraceFileError> {
    let path = dir.join(trace_file_name(trace));
    let io_err = |source| TraceFileError::Io {
        path: path.clone(),
        source,
    };

    let file = File::create(&path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    write_trace(trace, &mut writer).map_err(io_err)?;
    writer.flush().map_err(io_err)?;
    Ok(path)
}
