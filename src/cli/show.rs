//! Show subcommand for cascading-config CLI
//!
//! Runs the full cascade into an in-memory store and prints the result.

use super::Cli;
use crate::config::{CascadingLoader, EnvironmentSource, MemoryStore};
use crate::error::LoadResult;
use crate::format::{OutputFormat, render_value};
use anyhow::{Result, bail};
use clap::Args;
use std::io::Write;
use tracing::debug;

/// Arguments for the show subcommand
#[derive(Args, Debug, Default)]
pub struct ShowArgs {
    /// Dotted key to print (e.g. `database.connections.mysql.host`); whole store if omitted
    #[arg(value_name = "KEY")]
    pub key: Option<String>,

    /// Output format: yaml (default), json, or text
    #[arg(short, long, default_value = "yaml", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Skip the defaults in the config root and show only the overlay
    #[arg(long)]
    pub no_defaults: bool,
}

/// Build the merged store the way a host application would at startup.
pub fn build_store(
    loader: &CascadingLoader,
    environment: &dyn EnvironmentSource,
    include_defaults: bool,
) -> LoadResult<MemoryStore> {
    let mut store = MemoryStore::new();
    if include_defaults {
        let report = loader.bootstrap(environment, &mut store)?;
        debug!(?report, "Bootstrap finished");
    } else {
        let outcome = loader.register(environment, &mut store)?;
        debug!(?outcome, "Overlay finished");
    }
    Ok(store)
}

pub fn run_show(cli: &Cli, args: &ShowArgs, out: &mut dyn Write) -> Result<()> {
    let settings = cli.settings();
    let loader = cli.loader(&settings);
    let environment = cli.environment(&settings);

    let store = build_store(&loader, environment.as_ref(), !args.no_defaults)?;

    let value = match args.key {
        Some(ref key) => match store.lookup(key) {
            Some(value) => value,
            None => bail!("Key not found: {}", key),
        },
        None => store.to_value(),
    };

    out.write_all(render_value(&value, args.format)?.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FixedEnvironment;
    use clap::Parser;
    use std::fs;
    use tempfile::TempDir;

    fn config_tree() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::write(root.join("app.yaml"), "name: shop\ndebug: true\n").unwrap();
        fs::create_dir_all(root.join("production")).unwrap();
        fs::write(root.join("production/app.yaml"), "debug: false\n").unwrap();
        temp
    }

    fn cli_for(root: &std::path::Path, extra: &[&str]) -> Cli {
        let mut argv = vec![
            "cascading-config".to_string(),
            "--root".to_string(),
            root.display().to_string(),
            "--env".to_string(),
            "production".to_string(),
        ];
        argv.extend(extra.iter().map(|s| s.to_string()));
        Cli::parse_from(argv)
    }

    #[test]
    fn test_build_store_with_and_without_defaults() {
        let temp = config_tree();
        let loader = CascadingLoader::new(temp.path());
        let env = FixedEnvironment::new("production");

        let full = build_store(&loader, &env, true).unwrap();
        assert_eq!(full.lookup("app.name"), Some(serde_json::json!("shop")));
        assert_eq!(full.lookup("app.debug"), Some(serde_json::json!(false)));

        let overlay_only = build_store(&loader, &env, false).unwrap();
        assert_eq!(overlay_only.lookup("app.name"), None);
        assert_eq!(overlay_only.lookup("app.debug"), Some(serde_json::json!(false)));
    }

    #[test]
    fn test_run_show_key_as_text() {
        let temp = config_tree();
        let cli = cli_for(temp.path(), &[]);
        let args = ShowArgs {
            key: Some("app.debug".into()),
            format: OutputFormat::Text,
            no_defaults: false,
        };

        let mut out = Vec::new();
        run_show(&cli, &args, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "false\n");
    }

    #[test]
    fn test_run_show_unknown_key_fails() {
        let temp = config_tree();
        let cli = cli_for(temp.path(), &[]);
        let args = ShowArgs {
            key: Some("app.missing".into()),
            ..Default::default()
        };

        let mut out = Vec::new();
        let err = run_show(&cli, &args, &mut out).unwrap_err();
        assert!(err.to_string().contains("app.missing"));
        assert!(out.is_empty());
    }
}
