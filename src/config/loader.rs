//! Cascading configuration loader.
//!
//! Loads the default files in the config root, then the files in
//! `<config_root>/<environment>/`, merging each file into the store under the
//! namespace named by its file stem. Every file of a tier is loaded before the
//! first write, so a malformed file leaves that tier's namespaces untouched.

use super::Mapping;
use super::environment::{EnvironmentSource, validate_environment};
use super::merge::MergePolicy;
use super::settings::LoaderSettings;
use super::source::{MappingLoader, YamlLoader};
use super::store::ConfigStore;
use crate::error::{LoadError, LoadResult};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Configuration tier priority (lowest to highest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigTier {
    /// Files directly in the config root
    Defaults = 0,
    /// Files in the environment subdirectory
    Environment = 1,
}

impl std::fmt::Display for ConfigTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigTier::Defaults => write!(f, "defaults"),
            ConfigTier::Environment => write!(f, "environment"),
        }
    }
}

/// One eligible file and the mapping it decoded to.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayFile {
    pub namespace: String,
    pub path: PathBuf,
    pub mapping: Mapping,
}

/// The eligible files of one directory, unique by namespace.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlaySet {
    files: Vec<OverlayFile>,
}

impl OverlaySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file. A file with the same namespace is replaced and returned.
    pub fn insert(&mut self, file: OverlayFile) -> Option<OverlayFile> {
        match self.files.iter_mut().find(|f| f.namespace == file.namespace) {
            Some(existing) => Some(std::mem::replace(existing, file)),
            None => {
                self.files.push(file);
                None
            }
        }
    }

    pub fn get(&self, namespace: &str) -> Option<&OverlayFile> {
        self.files.iter().find(|f| f.namespace == namespace)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, OverlayFile> {
        self.files.iter()
    }

    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(|f| f.namespace.as_str())
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl<'a> IntoIterator for &'a OverlaySet {
    type Item = &'a OverlayFile;
    type IntoIter = std::slice::Iter<'a, OverlayFile>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// What happened to a namespace during a merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeAction {
    /// Nothing was stored; the file became the namespace value.
    Created,
    /// The file was merged over the stored value.
    Merged,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeEntry {
    pub namespace: String,
    pub source: PathBuf,
    pub action: MergeAction,
}

/// Per-namespace record of one merge pass, in merge order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    pub entries: Vec<MergeEntry>,
}

impl MergeReport {
    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.namespace.as_str())
    }

    pub fn count(&self, action: MergeAction) -> usize {
        self.entries.iter().filter(|e| e.action == action).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Result of loading one tier. Only `Applied` touched the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// No environment was selected.
    NoEnvironment,
    /// The tier's directory does not exist.
    NoOverlay { directory: PathBuf },
    Applied {
        tier: ConfigTier,
        directory: PathBuf,
        report: MergeReport,
    },
}

impl LoadOutcome {
    pub fn report(&self) -> Option<&MergeReport> {
        match self {
            LoadOutcome::Applied { report, .. } => Some(report),
            _ => None,
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, LoadOutcome::Applied { .. })
    }
}

/// Outcome of both tiers of a [`CascadingLoader::bootstrap`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapReport {
    pub defaults: LoadOutcome,
    pub overlay: LoadOutcome,
}

/// `config_root/environment` if it is an existing directory.
///
/// `Ok(None)` is the ordinary "this environment has no overlay" case. Only a
/// name that would leave the config root is an error.
pub fn resolve_overlay_directory(
    config_root: &Path,
    environment: &str,
) -> LoadResult<Option<PathBuf>> {
    if environment.is_empty() {
        return Ok(None);
    }
    validate_environment(environment)?;
    let dir = config_root.join(environment);
    if dir.is_dir() {
        Ok(Some(dir))
    } else {
        Ok(None)
    }
}

/// Load every eligible file of `dir`, in ascending file-name order.
///
/// When two files map to the same namespace the later one wins. Any file
/// that cannot be decoded aborts the whole load.
pub fn load_overlay_files(dir: &Path, source: &dyn MappingLoader) -> LoadResult<OverlaySet> {
    let mut set = OverlaySet::new();

    for (file_name, path) in sorted_entries(dir)? {
        let Some(namespace) = source.namespace_for(&file_name) else {
            debug!(file = %file_name, "Skipping ineligible entry");
            continue;
        };
        if !path.is_file() {
            debug!(file = %file_name, "Skipping non-file entry");
            continue;
        }

        let mapping = source
            .load(&path)
            .map_err(|cause| LoadError::file_load(&path, cause))?;
        debug!(namespace = %namespace, path = %path.display(), "Loaded config file");

        if let Some(displaced) = set.insert(OverlayFile {
            namespace,
            path,
            mapping,
        }) {
            debug!(
                namespace = %displaced.namespace,
                replaced = %displaced.path.display(),
                "Later file takes over namespace"
            );
        }
    }

    Ok(set)
}

/// Merge every file of `set` into `store`, in set order.
pub fn merge_into_store(
    set: &OverlaySet,
    store: &mut dyn ConfigStore,
    policy: MergePolicy,
) -> LoadResult<MergeReport> {
    let mut report = MergeReport::default();

    for file in set {
        let (value, action) = match store.get(&file.namespace) {
            Some(original) => (policy.apply(original, file.mapping.clone()), MergeAction::Merged),
            None => (file.mapping.clone(), MergeAction::Created),
        };

        store
            .set(&file.namespace, value)
            .map_err(|source| LoadError::StoreWrite {
                namespace: file.namespace.clone(),
                source,
            })?;

        report.entries.push(MergeEntry {
            namespace: file.namespace.clone(),
            source: file.path.clone(),
            action,
        });
    }

    Ok(report)
}

/// Directory entries sorted by file name. Non-UTF-8 names are skipped.
fn sorted_entries(dir: &Path) -> LoadResult<Vec<(String, PathBuf)>> {
    let read_error = |source: std::io::Error| LoadError::ReadDirectory {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(read_error)? {
        let entry = entry.map_err(read_error)?;
        match entry.file_name().into_string() {
            Ok(name) => entries.push((name, entry.path())),
            Err(name) => debug!(file = ?name, "Skipping entry with non-UTF-8 name"),
        }
    }
    entries.sort_by(|a, b| a.0.cmp(&b.0));

    Ok(entries)
}

/// Loader bound to one config root, file format and merge policy.
pub struct CascadingLoader {
    config_root: PathBuf,
    source: Box<dyn MappingLoader>,
    policy: MergePolicy,
}

impl std::fmt::Debug for CascadingLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CascadingLoader")
            .field("config_root", &self.config_root)
            .field("extensions", &self.source.extensions())
            .field("policy", &self.policy)
            .finish()
    }
}

impl CascadingLoader {
    /// YAML files, deep merge.
    pub fn new(config_root: impl Into<PathBuf>) -> Self {
        Self {
            config_root: config_root.into(),
            source: Box::new(YamlLoader),
            policy: MergePolicy::default(),
        }
    }

    pub fn from_settings(settings: &LoaderSettings) -> Self {
        Self {
            config_root: settings.config_root.clone(),
            source: settings.format.loader(),
            policy: settings.policy,
        }
    }

    pub fn with_source(mut self, source: impl MappingLoader + 'static) -> Self {
        self.source = Box::new(source);
        self
    }

    pub fn with_policy(mut self, policy: MergePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn config_root(&self) -> &Path {
        &self.config_root
    }

    pub fn policy(&self) -> MergePolicy {
        self.policy
    }

    pub fn source(&self) -> &dyn MappingLoader {
        self.source.as_ref()
    }

    pub fn overlay_directory(&self, environment: &str) -> LoadResult<Option<PathBuf>> {
        resolve_overlay_directory(&self.config_root, environment)
    }

    pub fn load_overlay_files(&self, dir: &Path) -> LoadResult<OverlaySet> {
        load_overlay_files(dir, self.source.as_ref())
    }

    pub fn merge_into_store(
        &self,
        set: &OverlaySet,
        store: &mut dyn ConfigStore,
    ) -> LoadResult<MergeReport> {
        merge_into_store(set, store, self.policy)
    }

    /// The files [`load_defaults`](Self::load_defaults) would apply.
    pub fn default_files(&self) -> LoadResult<OverlaySet> {
        if self.config_root.is_dir() {
            self.load_overlay_files(&self.config_root)
        } else {
            Ok(OverlaySet::new())
        }
    }

    /// Apply the overlay of a named environment.
    pub fn apply_environment(
        &self,
        environment: &str,
        store: &mut dyn ConfigStore,
    ) -> LoadResult<LoadOutcome> {
        let Some(dir) = self.overlay_directory(environment)? else {
            debug!(
                environment = %environment,
                root = %self.config_root.display(),
                "No overlay directory for environment"
            );
            return Ok(LoadOutcome::NoOverlay {
                directory: self.config_root.join(environment),
            });
        };

        let set = self.load_overlay_files(&dir)?;
        let report = self.merge_into_store(&set, store)?;
        info!(
            environment = %environment,
            directory = %dir.display(),
            created = report.count(MergeAction::Created),
            merged = report.count(MergeAction::Merged),
            "Applied environment overlay"
        );

        Ok(LoadOutcome::Applied {
            tier: ConfigTier::Environment,
            directory: dir,
            report,
        })
    }

    /// Resolve the environment and apply its overlay.
    pub fn register(
        &self,
        environment: &dyn EnvironmentSource,
        store: &mut dyn ConfigStore,
    ) -> LoadResult<LoadOutcome> {
        match environment.current_environment() {
            Some(name) => self.apply_environment(&name, store),
            None => {
                debug!("No environment selected, skipping overlay");
                Ok(LoadOutcome::NoEnvironment)
            }
        }
    }

    /// Merge the files directly in the config root into the store.
    pub fn load_defaults(&self, store: &mut dyn ConfigStore) -> LoadResult<LoadOutcome> {
        if !self.config_root.is_dir() {
            debug!(root = %self.config_root.display(), "Config root does not exist");
            return Ok(LoadOutcome::NoOverlay {
                directory: self.config_root.clone(),
            });
        }

        let set = self.load_overlay_files(&self.config_root)?;
        let report = self.merge_into_store(&set, store)?;
        info!(
            root = %self.config_root.display(),
            namespaces = report.len(),
            "Loaded default configuration"
        );

        Ok(LoadOutcome::Applied {
            tier: ConfigTier::Defaults,
            directory: self.config_root.clone(),
            report,
        })
    }

    /// Defaults first, then the environment overlay.
    pub fn bootstrap(
        &self,
        environment: &dyn EnvironmentSource,
        store: &mut dyn ConfigStore,
    ) -> LoadResult<BootstrapReport> {
        let defaults = self.load_defaults(store)?;
        let overlay = self.register(environment, store)?;
        Ok(BootstrapReport { defaults, overlay })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::store::MemoryStore;
    use crate::config::{FixedEnvironment, JsonLoader};
    use crate::error::StoreError;
    use serde_json::{Value, json};
    use std::fs;
    use tempfile::TempDir;

    fn mapping(value: Value) -> Mapping {
        value.as_object().cloned().unwrap()
    }

    fn write(dir: &Path, name: &str, content: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join(name), content).unwrap();
    }

    /// Store that rejects every write.
    struct ReadOnlyStore;

    impl ConfigStore for ReadOnlyStore {
        fn get(&self, _namespace: &str) -> Option<Mapping> {
            None
        }

        fn set(&mut self, _namespace: &str, _value: Mapping) -> Result<(), StoreError> {
            Err(StoreError::new("store is read-only"))
        }
    }

    #[test]
    fn test_resolve_overlay_directory() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("production")).unwrap();
        fs::write(temp.path().join("staging"), "not a directory").unwrap();

        assert_eq!(
            resolve_overlay_directory(temp.path(), "production").unwrap(),
            Some(temp.path().join("production"))
        );
        assert_eq!(resolve_overlay_directory(temp.path(), "local").unwrap(), None);
        assert_eq!(resolve_overlay_directory(temp.path(), "staging").unwrap(), None);
        assert_eq!(resolve_overlay_directory(temp.path(), "").unwrap(), None);
        assert_eq!(resolve_overlay_directory(temp.path(), "eu/prod").unwrap(), None);
        assert!(resolve_overlay_directory(temp.path(), "..").is_err());
    }

    #[test]
    fn test_load_overlay_files_filters_and_orders() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path();
        write(dir, "database.yaml", "default: pgsql\n");
        write(dir, "cache.yml", "driver: redis\n");
        write(dir, "notes.txt", "ignored");
        write(dir, ".secret.yaml", "token: abc\n");
        fs::create_dir_all(dir.join("nested.yaml")).unwrap();

        let set = load_overlay_files(dir, &YamlLoader).unwrap();
        let namespaces: Vec<&str> = set.namespaces().collect();
        assert_eq!(namespaces, vec!["cache", "database"]);
        assert_eq!(
            set.get("database").unwrap().mapping,
            mapping(json!({"default": "pgsql"}))
        );
    }

    #[test]
    fn test_later_file_wins_namespace_collision() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "db.yaml", "host: from-yaml\n");
        write(temp.path(), "db.yml", "host: from-yml\n");

        let set = load_overlay_files(temp.path(), &YamlLoader).unwrap();
        assert_eq!(set.len(), 1);
        let file = set.get("db").unwrap();
        assert_eq!(file.mapping, mapping(json!({"host": "from-yml"})));
        assert_eq!(file.path, temp.path().join("db.yml"));
    }

    #[test]
    fn test_malformed_file_aborts_load() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "a.yaml", "ok: true\n");
        write(temp.path(), "b.yaml", "- not\n- a mapping\n");

        let err = load_overlay_files(temp.path(), &YamlLoader).unwrap_err();
        assert!(matches!(err, LoadError::FileLoad { .. }));
        assert_eq!(err.path(), Some(temp.path().join("b.yaml").as_path()));
    }

    #[test]
    fn test_missing_directory_is_read_error() {
        let temp = TempDir::new().unwrap();
        let err = load_overlay_files(&temp.path().join("absent"), &YamlLoader).unwrap_err();
        assert!(matches!(err, LoadError::ReadDirectory { .. }));
    }

    #[test]
    fn test_merge_into_store_creates_and_merges() {
        let mut store = MemoryStore::from_mappings([(
            "database",
            mapping(json!({"a": 1, "b": {"c": 2, "d": 3}})),
        )]);

        let mut set = OverlaySet::new();
        set.insert(OverlayFile {
            namespace: "database".into(),
            path: PathBuf::from("production/database.yaml"),
            mapping: mapping(json!({"b": {"c": 99}})),
        });
        set.insert(OverlayFile {
            namespace: "queue".into(),
            path: PathBuf::from("production/queue.yaml"),
            mapping: mapping(json!({"driver": "sqs"})),
        });

        let report = merge_into_store(&set, &mut store, MergePolicy::Deep).unwrap();
        assert_eq!(report.count(MergeAction::Merged), 1);
        assert_eq!(report.count(MergeAction::Created), 1);
        assert_eq!(
            store.get("database"),
            Some(mapping(json!({"a": 1, "b": {"c": 99, "d": 3}})))
        );
        assert_eq!(store.get("queue"), Some(mapping(json!({"driver": "sqs"}))));
    }

    #[test]
    fn test_store_rejection_propagates() {
        let mut set = OverlaySet::new();
        set.insert(OverlayFile {
            namespace: "cache".into(),
            path: PathBuf::from("cache.yaml"),
            mapping: Mapping::new(),
        });

        let err = merge_into_store(&set, &mut ReadOnlyStore, MergePolicy::Deep).unwrap_err();
        match err {
            LoadError::StoreWrite { namespace, source } => {
                assert_eq!(namespace, "cache");
                assert_eq!(source.message(), "store is read-only");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_register_without_environment_is_noop() {
        let temp = TempDir::new().unwrap();
        write(&temp.path().join("production"), "app.yaml", "debug: false\n");

        let loader = CascadingLoader::new(temp.path());
        let mut store = MemoryStore::new();
        let outcome = loader
            .register(&FixedEnvironment::new(""), &mut store)
            .unwrap();
        assert_eq!(outcome, LoadOutcome::NoEnvironment);
        assert!(store.is_empty());
    }

    #[test]
    fn test_bootstrap_applies_defaults_then_overlay() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "app.yaml", "name: shop\ndebug: true\n");
        write(&root.join("production"), "app.yaml", "debug: false\n");

        let loader = CascadingLoader::new(root);
        let mut store = MemoryStore::new();
        let report = loader
            .bootstrap(&FixedEnvironment::new("production"), &mut store)
            .unwrap();

        assert!(report.defaults.is_applied());
        assert_eq!(
            report.overlay.report().unwrap().entries[0].action,
            MergeAction::Merged
        );
        assert_eq!(
            store.get("app"),
            Some(mapping(json!({"name": "shop", "debug": false})))
        );
    }

    #[test]
    fn test_json_source() {
        let temp = TempDir::new().unwrap();
        write(&temp.path().join("local"), "mail.json", r#"{"port": 1025}"#);
        write(&temp.path().join("local"), "ignored.yaml", "port: 25\n");

        let loader = CascadingLoader::new(temp.path()).with_source(JsonLoader);
        let mut store = MemoryStore::new();
        loader.apply_environment("local", &mut store).unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("mail"), Some(mapping(json!({"port": 1025}))));
    }

    #[test]
    fn test_tier_ordering() {
        assert!(ConfigTier::Defaults < ConfigTier::Environment);
        assert_eq!(ConfigTier::Environment.to_string(), "environment");
    }
}
