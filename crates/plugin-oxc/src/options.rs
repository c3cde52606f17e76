//! Plugin options and the layered compile-option merge.

use plugin_oxc_tsconfig::TsconfigSelector;
use regex::Regex;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::error::{PluginError, Result};
use crate::minify::MinifyLevel;

/// Modules the plugin compiles unless `include` says otherwise
pub const DEFAULT_INCLUDE: &str = r"\.[cm]?[jt]sx?$";
/// Modules the plugin skips unless `exclude` says otherwise
pub const DEFAULT_EXCLUDE: &str = "node_modules";
/// Extensions probed during resolution, in order
pub const DEFAULT_EXTENSIONS: [&str; 6] = [".ts", ".tsx", ".mjs", ".js", ".cjs", ".jsx"];

/// User-facing plugin configuration.
///
/// Deserializes from the same camelCase JSON shape a bundler config file
/// would use; every field is optional.
///
/// ```
/// use plugin_oxc::{MinifyLevel, PluginOptions};
///
/// let options: PluginOptions = serde_json::from_value(serde_json::json!({
///     "tsconfig": false,
///     "minify": true,
///     "compile": { "jsx": { "pragma": "h" } }
/// }))
/// .unwrap();
/// assert_eq!(options.minify, MinifyLevel::Identifiers);
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PluginOptions {
    /// Regex patterns a module id must match (any) to be compiled.
    #[serde(deserialize_with = "one_or_many")]
    pub include: Vec<String>,
    /// Regex patterns that exclude a module id (any).
    #[serde(deserialize_with = "one_or_many")]
    pub exclude: Vec<String>,
    pub extensions: Vec<String>,
    pub tsconfig: TsconfigSelector,
    /// Applied to whole chunks in `render_chunk`, never per module.
    pub minify: MinifyLevel,
    pub sourcemap: bool,
    /// Per-call compiler overrides, merged over the tsconfig-derived layer.
    pub compile: Map<String, Value>,
}

impl Default for PluginOptions {
    fn default() -> Self {
        Self {
            include: vec![DEFAULT_INCLUDE.to_string()],
            exclude: vec![DEFAULT_EXCLUDE.to_string()],
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            tsconfig: TsconfigSelector::Discover,
            minify: MinifyLevel::None,
            sourcemap: true,
            compile: Map::new(),
        }
    }
}

impl PluginOptions {
    pub fn from_json(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| PluginError::invalid(e.to_string()))
    }
}

fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(pattern) => vec![pattern],
        OneOrMany::Many(patterns) => patterns,
    })
}

/// Compiled include/exclude patterns.
#[derive(Debug, Clone)]
pub struct Filter {
    include: Vec<Regex>,
    exclude: Vec<Regex>,
}

impl Filter {
    pub fn new(include: &[String], exclude: &[String]) -> Result<Self> {
        let compile = |patterns: &[String]| {
            patterns
                .iter()
                .map(|p| {
                    Regex::new(p).map_err(|e| PluginError::invalid(format!("pattern `{}`: {}", p, e)))
                })
                .collect::<Result<Vec<_>>>()
        };
        Ok(Self {
            include: compile(include)?,
            exclude: compile(exclude)?,
        })
    }

    /// Whether a module id should be compiled. Virtual ids never are.
    pub fn matches(&self, id: &str) -> bool {
        if id.contains('\0') || self.exclude.iter().any(|re| re.is_match(id)) {
            return false;
        }
        self.include.is_empty() || self.include.iter().any(|re| re.is_match(id))
    }
}

/// Merge JSON layers, lowest precedence first.
///
/// Objects merge key by key; arrays and scalars from a later layer replace
/// what came before, and `null` removes the key.
pub fn merge_layers<I>(layers: I) -> Value
where
    I: IntoIterator<Item = Value>,
{
    let mut merged = Value::Object(Map::new());
    for layer in layers {
        merge_value(&mut merged, layer);
    }
    merged
}

fn merge_value(target: &mut Value, update: Value) {
    match (target, update) {
        (Value::Object(target), Value::Object(update)) => {
            for (key, value) in update {
                if value.is_null() {
                    target.remove(&key);
                } else {
                    merge_value(target.entry(key).or_insert(Value::Null), value);
                }
            }
        }
        (slot, update) => *slot = update,
    }
}
