//! Output formatting for merged configuration and file listings.

use crate::config::{ConfigTier, OverlaySet};
use anyhow::Result;
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;

/// Output format for rendered values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
    Text,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            "json" => Ok(OutputFormat::Json),
            "text" => Ok(OutputFormat::Text),
            _ => Err(format!(
                "Invalid format '{}'. Valid options: yaml, json, text",
                s
            )),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Yaml => write!(f, "yaml"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Text => write!(f, "text"),
        }
    }
}

/// Render a configuration value.
///
/// `Text` prints scalars bare (strings without quotes) and falls back to
/// YAML for mappings and lists.
pub fn render_value(value: &Value, format: OutputFormat) -> Result<String> {
    let rendered = match format {
        OutputFormat::Json => {
            let mut out = serde_json::to_string_pretty(value)?;
            out.push('\n');
            out
        }
        OutputFormat::Yaml => serde_yaml::to_string(value)?,
        OutputFormat::Text => match value {
            Value::String(s) => format!("{}\n", s),
            Value::Null => "null\n".to_string(),
            Value::Bool(_) | Value::Number(_) => format!("{}\n", value),
            Value::Array(_) | Value::Object(_) => serde_yaml::to_string(value)?,
        },
    };
    Ok(rendered)
}

/// One row of a file listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileListing {
    pub tier: ConfigTier,
    pub namespace: String,
    pub path: PathBuf,
}

impl FileListing {
    pub fn from_set(tier: ConfigTier, set: &OverlaySet) -> Vec<Self> {
        set.iter()
            .map(|file| FileListing {
                tier,
                namespace: file.namespace.clone(),
                path: file.path.clone(),
            })
            .collect()
    }
}

/// Render file listings as an aligned table or JSON.
pub fn render_listing(rows: &[FileListing], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            let mut out = serde_json::to_string_pretty(rows)?;
            out.push('\n');
            Ok(out)
        }
        OutputFormat::Yaml => Ok(serde_yaml::to_string(rows)?),
        OutputFormat::Text => {
            let width = rows.iter().map(|r| r.namespace.len()).max().unwrap_or(0);
            let mut out = String::new();
            for row in rows {
                out.push_str(&format!(
                    "{:<11} {:<width$}  {}\n",
                    row.tier.to_string(),
                    row.namespace,
                    row.path.display(),
                    width = width
                ));
            }
            Ok(out)
        }
    }
}
