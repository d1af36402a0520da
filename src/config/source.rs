//! Decoding configuration files into mappings.
//!
//! A [`MappingLoader`] decides which files are eligible (by exact extension)
//! and turns one file into a [`Mapping`].

use super::Mapping;
use crate::error::FileLoadCause;
use serde::Serialize;
use serde_json::Value;
use std::path::Path;

/// Pluggable file decoder.
pub trait MappingLoader {
    /// Eligible file extensions, without the leading dot. Matching is exact.
    fn extensions(&self) -> &[&'static str];

    /// Decode already-read file contents.
    fn parse(&self, content: &str) -> Result<Mapping, FileLoadCause>;

    /// Read and decode one file.
    fn load(&self, path: &Path) -> Result<Mapping, FileLoadCause> {
        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Mapping::new());
        }
        self.parse(&content)
    }

    /// Namespace key for `file_name`, or `None` if the file is not eligible.
    ///
    /// Dotfiles are never eligible.
    fn namespace_for(&self, file_name: &str) -> Option<String> {
        if file_name.starts_with('.') {
            return None;
        }
        self.extensions().iter().find_map(|ext| {
            file_name
                .strip_suffix(ext)
                .and_then(|rest| rest.strip_suffix('.'))
                .filter(|stem| !stem.is_empty())
                .map(str::to_string)
        })
    }
}

/// YAML files (`.yaml`, `.yml`).
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlLoader;

impl MappingLoader for YamlLoader {
    fn extensions(&self) -> &[&'static str] {
        &["yaml", "yml"]
    }

    fn parse(&self, content: &str) -> Result<Mapping, FileLoadCause> {
        let value: Value = serde_yaml::from_str(content)?;
        into_mapping(value)
    }
}

/// JSON files (`.json`).
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLoader;

impl MappingLoader for JsonLoader {
    fn extensions(&self) -> &[&'static str] {
        &["json"]
    }

    fn parse(&self, content: &str) -> Result<Mapping, FileLoadCause> {
        let value: Value = serde_json::from_str(content)?;
        into_mapping(value)
    }
}

/// Accept an object (or an empty document) as a mapping.
fn into_mapping(value: Value) -> Result<Mapping, FileLoadCause> {
    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Mapping::new()),
        Value::Array(_) => Err(FileLoadCause::NotAMapping { found: "a list" }),
        Value::String(_) => Err(FileLoadCause::NotAMapping { found: "a string" }),
        Value::Number(_) => Err(FileLoadCause::NotAMapping { found: "a number" }),
        Value::Bool(_) => Err(FileLoadCause::NotAMapping { found: "a boolean" }),
    }
}

/// Supported on-disk formats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFormat {
    #[default]
    Yaml,
    Json,
}

impl SourceFormat {
    pub fn loader(self) -> Box<dyn MappingLoader> {
        match self {
            SourceFormat::Yaml => Box::new(YamlLoader),
            SourceFormat::Json => Box::new(JsonLoader),
        }
    }
}

impl std::str::FromStr for SourceFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "yaml" | "yml" => Ok(SourceFormat::Yaml),
            "json" => Ok(SourceFormat::Json),
            _ => Err(format!(
                "Invalid source format '{}'. Valid options: yaml, json",
                s
            )),
        }
    }
}

impl std::fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceFormat::Yaml => write!(f, "yaml"),
            SourceFormat::Json => write!(f, "json"),
        }
    }
}
