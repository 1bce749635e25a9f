// facade_sim/src/main.rs

//! `facade-scan`: fly a facade scan against the simulated multirotor, or
//! summarize a recorded trajectory.
//!
//! Exit codes: 0 scan completed, 1 configuration or I/O failure before the
//! flight, 2 scan aborted.

use clap::Parser;
use log::{error, info};
use std::io::Write;
use std::process::ExitCode;

use facade_sim::cli::{Cli, Command, ScanArgs, TrajectoryArgs};
use facade_sim::prelude::*;

const EXIT_SETUP_FAILURE: u8 = 1;
const EXIT_ABORTED: u8 = 2;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {} - {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Scan(args) => scan(&args),
        Command::Trajectory(args) => trajectory(&args),
    }
}

fn scan(args: &ScanArgs) -> ExitCode {
    let config = match load_mission_config(
        args.preset.into(),
        args.config.as_deref(),
        &args.overrides(),
    ) {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            return ExitCode::from(EXIT_SETUP_FAILURE);
        }
    };

    if args.dump_config {
        return match config.to_toml() {
            Ok(text) => {
                print!("{text}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!("{e}");
                ExitCode::from(EXIT_SETUP_FAILURE)
            }
        };
    }

    let outcome = match run_mission(&config, CancellationToken::new()) {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("{e}");
            return ExitCode::from(EXIT_SETUP_FAILURE);
        }
    };

    let report = &outcome.report;
    info!(
        "{} passes, {} images, {:.1} s of flight time",
        report.passes.len(),
        report.images.len(),
        outcome.flight_time.as_secs_f64()
    );
    if let Some(path) = &outcome.trajectory_path {
        info!("Trajectory: {}", path.display());
    }

    match report.error() {
        None => ExitCode::SUCCESS,
        Some(e) => {
            error!("Scan aborted ({}): {e}", e.kind());
            ExitCode::from(EXIT_ABORTED)
        }
    }
}

fn trajectory(args: &TrajectoryArgs) -> ExitCode {
    let log = match TrajectoryLog::read_from(&args.path) {
        Ok(log) => log,
        Err(e) => {
            error!("{}: {e}", args.path.display());
            return ExitCode::from(EXIT_SETUP_FAILURE);
        }
    };

    let Some(summary) = log.summary() else {
        println!("{}: no samples", args.path.display());
        return ExitCode::SUCCESS;
    };

    println!("samples       {}", summary.samples);
    println!("lateral (Y)   {:.3} .. {:.3} m", summary.min_y, summary.max_y);
    println!(
        "altitude      {:.3} .. {:.3} m",
        summary.min_altitude, summary.max_altitude
    );
    println!("path length   {:.3} m", summary.path_length);
    println!(
        "duration      {:.3} s",
        summary.duration_ms as f64 / 1000.0
    );
    ExitCode::SUCCESS
}
