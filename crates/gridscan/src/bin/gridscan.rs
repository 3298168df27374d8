use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use gridscan::scan::run_scan;
use gridscan::ScanConfig;
use log::LevelFilter;

#[cfg(feature = "tracing")]
use gridscan::core::init_tracing;
#[cfg(not(feature = "tracing"))]
use gridscan::core::init_with_level;

/// Find square tile grids in images and rectify them.
#[derive(Parser, Debug)]
#[command(name = "gridscan", version, about)]
struct Cli {
    /// Images to scan, appended to the config's inputs.
    inputs: Vec<String>,

    /// JSON scan config.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory for rendered and rectified PNGs.
    #[arg(short, long)]
    output_dir: Option<String>,

    /// Path of the JSON report.
    #[arg(short, long)]
    report: Option<String>,

    /// Treat inputs as full video frames and crop the centred grid region.
    #[arg(long)]
    video: bool,

    /// Per-frame time budget in milliseconds.
    #[arg(long)]
    budget_ms: Option<u64>,

    /// Outline tile cells on the rendered output.
    #[arg(long)]
    draw_tiles: bool,

    /// Print the effective config as JSON and exit.
    #[arg(long)]
    print_config: bool,

    #[arg(long, default_value = "info")]
    log_level: LevelFilter,

    /// Emit JSON log lines.
    #[cfg(feature = "tracing")]
    #[arg(long)]
    json_logs: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    #[cfg(not(feature = "tracing"))]
    if let Err(err) = init_with_level(cli.log_level) {
        eprintln!("failed to install logger: {err}");
    }
    #[cfg(feature = "tracing")]
    init_tracing(cli.json_logs);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg_attr(feature = "tracing", tracing::instrument(level = "info", skip(cli)))]
fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => ScanConfig::load_json(path)?,
        None => ScanConfig::default(),
    };
    config.inputs.extend(cli.inputs);
    if cli.output_dir.is_some() {
        config.output_dir = cli.output_dir;
    }
    if cli.report.is_some() {
        config.report_path = cli.report;
    }
    config.video_frames |= cli.video;
    config.params.output.draw_tiles |= cli.draw_tiles;
    if cli.budget_ms.is_some() {
        config.params.frame_budget_ms = cli.budget_ms;
    }

    if cli.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }
    if config.inputs.is_empty() {
        return Err("no input images given".into());
    }

    let report = run_scan(&config)?;
    let report_path = config.report_path();
    report.write_json(&report_path)?;

    println!(
        "{} rectified, {} bailed, {} failed",
        report.summary.rectified, report.summary.bailed, report.summary.failed
    );
    println!("wrote report JSON to {}", report_path.display());
    Ok(())
}
