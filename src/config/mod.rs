//! Cascading configuration.
//!
//! Configuration is read from two tiers and merged into a [`ConfigStore`]:
//! 1. **Defaults** - files directly in the config root (`config/*.yaml`)
//! 2. **Environment** - files in `config/<environment>/`
//!
//! Each file becomes one namespace, named by its file stem. When a namespace
//! is already stored, the new mapping is merged over it recursively: nested
//! mappings merge key by key, every other value (lists included) replaces
//! the stored one.

mod environment;
mod loader;
mod merge;
mod settings;
mod source;
mod store;

pub use environment::{
    DEFAULT_ENVIRONMENT_VAR, EnvVarEnvironment, EnvironmentSource, FixedEnvironment,
    validate_environment,
};
pub use loader::{
    BootstrapReport, CascadingLoader, ConfigTier, LoadOutcome, MergeAction, MergeEntry,
    MergeReport, OverlayFile, OverlaySet, load_overlay_files, merge_into_store,
    resolve_overlay_directory,
};
pub use merge::{MergePolicy, deep_merge, merge_mappings};
pub use settings::LoaderSettings;
pub use source::{JsonLoader, MappingLoader, SourceFormat, YamlLoader};
pub use store::{ConfigStore, MemoryStore};

/// One configuration namespace: string keys to arbitrary values.
pub type Mapping = serde_json::Map<String, serde_json::Value>;
