//! cascading-config
//!
//! Prints the configuration a host application would see after merging the
//! environment overlay over its defaults.

use anyhow::Result;
use cascading_config::cli::files::run_files;
use cascading_config::cli::show::{ShowArgs, run_show};
use cascading_config::cli::{Cli, Command};
use cascading_config::error::LoadError;
use cascading_config::format::OutputFormat;
use clap::Parser;
use std::fs::OpenOptions;
use std::io::Write;
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

fn init_logging(cli: &Cli) -> Result<()> {
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    match cli.log.as_str() {
        "0" | "off" => {
            // No logging
        }
        "1" | "stdout" => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(std::io::stdout)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        "2" | "stderr" => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        filename => {
            // Log to file (append mode)
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(filename)?;
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(file)
                .with_ansi(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }
    Ok(())
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    let (result, format) = match &cli.command {
        Some(Command::Show(args)) => (run_show(&cli, args, &mut out), args.format),
        Some(Command::Files(args)) => (run_files(&cli, args, &mut out), args.format),
        None => {
            let args = ShowArgs::default();
            (run_show(&cli, &args, &mut out), args.format)
        }
    };

    let Err(err) = result else {
        return Ok(ExitCode::SUCCESS);
    };

    // Machine-readable failure report when JSON output was requested
    if format == OutputFormat::Json
        && let Some(load_err) = err.downcast_ref::<LoadError>()
    {
        serde_json::to_writer_pretty(&mut out, &load_err.report())?;
        writeln!(out)?;
        return Ok(ExitCode::FAILURE);
    }

    Err(err)
}
