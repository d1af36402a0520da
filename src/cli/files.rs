//! Files subcommand for cascading-config CLI
//!
//! Lists the files each tier would merge, in merge order. Every listed file
//! is decoded, so a malformed file fails the listing the same way it would
//! fail startup.

use super::Cli;
use crate::config::ConfigTier;
use crate::format::{FileListing, OutputFormat, render_listing};
use anyhow::Result;
use clap::Args;
use std::io::Write;

/// Arguments for the files subcommand
#[derive(Args, Debug)]
pub struct FilesArgs {
    /// Output format: text (default), json, or yaml
    #[arg(short, long, default_value = "text", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Only list the environment overlay files
    #[arg(long)]
    pub no_defaults: bool,
}

pub fn run_files(cli: &Cli, args: &FilesArgs, out: &mut dyn Write) -> Result<()> {
    let settings = cli.settings();
    let loader = cli.loader(&settings);

    let mut rows = Vec::new();
    if !args.no_defaults {
        rows.extend(FileListing::from_set(
            ConfigTier::Defaults,
            &loader.default_files()?,
        ));
    }

    if let Some(environment) = cli.environment(&settings).current_environment()
        && let Some(dir) = loader.overlay_directory(&environment)?
    {
        rows.extend(FileListing::from_set(
            ConfigTier::Environment,
            &loader.load_overlay_files(&dir)?,
        ));
    }

    out.write_all(render_listing(&rows, args.format)?.as_bytes())?;
    Ok(())
}
