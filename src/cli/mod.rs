//! CLI command definitions for cascading-config
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

pub mod files;
pub mod show;

use crate::config::{
    CascadingLoader, EnvVarEnvironment, EnvironmentSource, FixedEnvironment, LoaderSettings,
    MergePolicy, SourceFormat,
};
use clap::{Parser, Subcommand};
use files::FilesArgs;
use show::ShowArgs;
use std::path::PathBuf;

/// Inspect cascading per-environment configuration
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config root directory (overrides CASCADING_CONFIG_ROOT)
    #[arg(short, long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Environment name (overrides the environment variable)
    #[arg(short, long, global = true, value_name = "NAME")]
    pub env: Option<String>,

    /// Source file format: yaml or json
    #[arg(long, global = true, value_name = "FORMAT")]
    pub format_in: Option<SourceFormat>,

    /// Merge policy: deep or replace
    #[arg(long, global = true, value_name = "POLICY")]
    pub policy: Option<MergePolicy>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the merged configuration (default if no subcommand given)
    Show(ShowArgs),

    /// List the files that would be merged, in merge order
    Files(FilesArgs),
}

impl Cli {
    /// Discovered settings with command-line overrides applied.
    pub fn settings(&self) -> LoaderSettings {
        let mut settings = LoaderSettings::discover();
        if let Some(ref root) = self.root {
            settings.config_root = root.clone();
        }
        if let Some(format) = self.format_in {
            settings.format = format;
        }
        if let Some(policy) = self.policy {
            settings.policy = policy;
        }
        settings
    }

    /// `--env` if given, otherwise the configured environment variable.
    pub fn environment(&self, settings: &LoaderSettings) -> Box<dyn EnvironmentSource> {
        match self.env {
            Some(ref name) => Box::new(FixedEnvironment::new(name.clone())),
            None => Box::new(EnvVarEnvironment::new(settings.environment_var.clone())),
        }
    }

    pub fn loader(&self, settings: &LoaderSettings) -> CascadingLoader {
        CascadingLoader::from_settings(settings)
    }
}
