//! gpx-velocity - speed summaries and speed markers for recorded ride traces
//!
//! Usage:
//!   gpx-velocity summary <paths>... [--csv <file>] [--jobs <n>]
//!   gpx-velocity markers <file> [--zoom <z>]... [--window <m>] [--policy max-speed]
//!   gpx-velocity convert <file> --output <dir>

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use log::info;

use gpx_velocity::report::{print_markers, print_summary, write_markers_csv, write_reports_csv};
use gpx_velocity::{
    analyze_traces, collect_trace_paths, read_trace_file, write_trace_file, zoom_window_size, AnalysisConfig,
    MarkerOverlay, SelectionPolicy,
};

#[derive(Parser)]
#[command(name = "gpx-velocity")]
#[command(about = "Active speed and distance-windowed speed markers for ride traces", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON config file (speed limits, window sizes, policy)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print one caption per trace: start time, active speed, distance
    Summary {
        /// Trace files or directories containing them
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Write the per-trace report to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Worker threads (defaults to the number of CPUs)
        #[arg(short, long)]
        jobs: Option<usize>,
    },

    /// List speed markers of one trace
    Markers {
        /// Trace file
        file: PathBuf,

        /// Map zoom levels; each one scales the base window
        #[arg(short, long)]
        zoom: Vec<i32>,

        /// Explicit window size in meters (overrides --zoom)
        #[arg(short, long)]
        window: Option<f64>,

        /// Representative sample per window
        #[arg(short, long, value_enum)]
        policy: Option<PolicyArg>,

        /// Write the markers to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Rewrite a trace into the viewer's `<start_time>.js` form
    Convert {
        /// Trace file (JSON or JS)
        file: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    LastValid,
    MaxSpeed,
}

impl From<PolicyArg> for SelectionPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::LastValid => SelectionPolicy::LastValid,
            PolicyArg::MaxSpeed => SelectionPolicy::MaxSpeed,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| writeln!(buf, "[{:5}] {}", record.level(), record.args()))
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => {
            info!("Loading config from {}", path.display());
            AnalysisConfig::load(path)?
        }
        None => AnalysisConfig::default(),
    };

    match cli.command {
        Commands::Summary { paths, csv, jobs } => {
            if jobs.is_some() {
                config.jobs = jobs;
            }
            config.validate()?;
            run_summary(&paths, csv.as_deref(), &config)?;
        }
        Commands::Markers {
            file,
            zoom,
            window,
            policy,
            csv,
        } => {
            if let Some(policy) = policy {
                config.policy = policy.into();
            }
            run_markers(&file, &zoom, window, csv.as_deref(), &config)?;
        }
        Commands::Convert { file, output } => {
            let trace = read_trace_file(&file)?;
            let written = write_trace_file(&trace, &output)?;
            println!("{} -> {}", file.display(), written.display());
        }
    }

    Ok(())
}

fn run_summary(paths: &[PathBuf], csv: Option<&Path>, config: &AnalysisConfig) -> Result<(), Box<dyn std::error::Error>> {
    let files = collect_trace_paths(paths)?;
    if files.is_empty() {
        return Err("no trace files found".into());
    }

    let outcome = analyze_traces(&files, config)?;
    print_summary(&outcome);

    if let Some(csv_path) = csv {
        write_reports_csv(&outcome.reports, csv_path)?;
    }
    Ok(())
}

fn run_markers(
    file: &Path,
    zooms: &[i32],
    window: Option<f64>,
    csv: Option<&Path>,
    config: &AnalysisConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let windows: Vec<f64> = match window {
        Some(w) if w > 0.0 && w.is_finite() => vec![w],
        Some(w) => return Err(format!("window size must be positive, got {}", w).into()),
        None if zooms.is_empty() => vec![zoom_window_size(config.base_window_m, config.reference_zoom, config.default_zoom)],
        None => zooms
            .iter()
            .map(|&z| zoom_window_size(config.base_window_m, config.reference_zoom, z))
            .collect(),
    };

    let trace = read_trace_file(file)?;
    let mut overlay = MarkerOverlay::new(config.limits);

    for (i, &window_size) in windows.iter().enumerate() {
        let markers = overlay.markers_for(&trace, window_size, config.policy);
        print_markers(&trace, window_size, markers);

        if let Some(csv_path) = csv {
            // one CSV per window when several zoom levels were requested
            let path = if windows.len() > 1 {
                csv_path.with_extension(format!("{}.csv", i))
            } else {
                csv_path.to_path_buf()
            };
            write_markers_csv(&trace, window_size, markers, &path)?;
            println!("📁 Markers saved to: {}", path.display());
        }
    }

    Ok(())
}
