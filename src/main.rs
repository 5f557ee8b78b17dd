use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use tangentcam_lib::commands::process::{process_file, ProcessReport, ProcessRequest};
use tangentcam_lib::error::AppError;

#[derive(Parser)]
#[command(name = "tangentcam")]
#[command(about = "Expand arcs and add tangential knife headings to G-code", long_about = None)]
#[command(version)]
struct Cli {
    /// G-code program to transform
    input: PathBuf,

    /// Output path (defaults to <INPUT> with a .tan.nc extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Machine profile (TOML); the built-in profile is used when absent
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Only expand arcs, do not emit headings
    #[arg(long)]
    no_tangential: bool,

    /// Leave arc commands unexpanded
    #[arg(long)]
    no_arcs: bool,

    /// Print the report or error as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let _guard = tangentcam_lib::init_tracing();
    tracing::info!("tangentcam starting");

    let request = ProcessRequest {
        input: cli.input,
        output: cli.output,
        config: cli.config,
        no_tangential: cli.no_tangential,
        no_arcs: cli.no_arcs,
    };

    match process_file(&request) {
        Ok(report) => {
            print_report(&report, cli.json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "processing failed");
            print_error(&e, &request, cli.json);
            ExitCode::FAILURE
        }
    }
}

fn print_report(report: &ProcessReport, json: bool) {
    if json {
        match serde_json::to_string_pretty(report) {
            Ok(text) => println!("{text}"),
            Err(e) => eprintln!("error: cannot serialize report: {e}"),
        }
        return;
    }

    let stats = &report.stats;
    println!(
        "{} -> {}: {} lines in, {} out, {} arcs expanded, {} headings ({} corrected, {} filtered)",
        report.input,
        report.output,
        stats.input_lines,
        stats.output_lines,
        stats.arcs_expanded,
        stats.headings_emitted,
        stats.continuity_corrections,
        stats.moves_filtered
    );
}

fn print_error(e: &AppError, request: &ProcessRequest, json: bool) {
    if json {
        match serde_json::to_string(e) {
            Ok(text) => println!("{text}"),
            Err(ser) => eprintln!("error: {e} ({ser})"),
        }
        return;
    }

    match e {
        AppError::FileNotFound => {
            eprintln!("error: {}: file not found", request.input.display())
        }
        other => eprintln!("error: {other}"),
    }
}
