//! Recursive override of configuration mappings.
//!
//! Mappings are merged key by key; every other value in the overlay (scalars,
//! lists, null) replaces the base value outright. Lists are never concatenated.

use super::Mapping;
use serde::Serialize;
use serde_json::Value;

/// Deep merge two values, with `overlay` taking precedence over `base`.
///
/// - Objects are merged recursively: keys in overlay override keys in base,
///   keys only present in base are kept
/// - Arrays, strings, numbers, booleans and nulls replace the base entirely
///
/// # Example
/// ```
/// use serde_json::json;
/// use cascading_config::config::deep_merge;
///
/// let base = json!({"a": 1, "b": {"c": 2, "d": 3}});
/// let overlay = json!({"b": {"c": 99}});
/// assert_eq!(deep_merge(base, overlay), json!({"a": 1, "b": {"c": 99, "d": 3}}));
/// ```
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            Value::Object(merge_mappings(base_map, overlay_map))
        }
        (_, overlay) => overlay,
    }
}

/// Merge two mappings key by key. See [`deep_merge`].
pub fn merge_mappings(mut base: Mapping, overlay: Mapping) -> Mapping {
    for (key, overlay_value) in overlay {
        let merged_value = match base.remove(&key) {
            Some(base_value) => deep_merge(base_value, overlay_value),
            None => overlay_value,
        };
        base.insert(key, merged_value);
    }
    base
}

/// How an overlay namespace is combined with the value already stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// Recursive override; untouched keys survive.
    #[default]
    Deep,
    /// The overlay mapping replaces the whole namespace.
    Replace,
}

impl MergePolicy {
    pub fn apply(self, base: Mapping, overlay: Mapping) -> Mapping {
        match self {
            MergePolicy::Deep => merge_mappings(base, overlay),
            MergePolicy::Replace => overlay,
        }
    }
}

impl std::str::FromStr for MergePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "deep" => Ok(MergePolicy::Deep),
            "replace" => Ok(MergePolicy::Replace),
            _ => Err(format!(
                "Invalid merge policy '{}'. Valid options: deep, replace",
                s
            )),
        }
    }
}

impl std::fmt::Display for MergePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MergePolicy::Deep => write!(f, "deep"),
            MergePolicy::Replace => write!(f, "replace"),
        }
    }
}
