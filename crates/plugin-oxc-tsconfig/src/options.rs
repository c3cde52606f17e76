//! The normalized subset of `compilerOptions` the transform step cares about.

use indexmap::IndexMap;
use path_clean::PathClean;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Alias pattern → ordered substitution patterns, in declaration order.
pub type PathAliases = IndexMap<String, Vec<String>>;

/// Value of `compilerOptions.jsx`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsxMode {
    Preserve,
    React,
    ReactJsx,
    ReactJsxDev,
    ReactNative,
}

impl JsxMode {
    /// Whether the mode selects the automatic (React 17+) runtime
    pub fn is_automatic(self) -> bool {
        matches!(self, Self::ReactJsx | Self::ReactJsxDev)
    }
}

impl FromStr for JsxMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "preserve" => Ok(Self::Preserve),
            "react" => Ok(Self::React),
            "react-jsx" => Ok(Self::ReactJsx),
            "react-jsxdev" => Ok(Self::ReactJsxDev),
            "react-native" => Ok(Self::ReactNative),
            other => Err(format!("unknown jsx mode: {}", other)),
        }
    }
}

impl std::fmt::Display for JsxMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Preserve => "preserve",
            Self::React => "react",
            Self::ReactJsx => "react-jsx",
            Self::ReactJsxDev => "react-jsxdev",
            Self::ReactNative => "react-native",
        };
        f.write_str(s)
    }
}

/// Compiler options discovered for one directory.
///
/// Immutable once built; the resolver hands out shared references to it.
/// `base_url` is always absolute when present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompilerOptionsView {
    pub import_helpers: Option<bool>,
    pub es_module_interop: Option<bool>,
    pub experimental_decorators: Option<bool>,
    pub emit_decorator_metadata: Option<bool>,
    pub jsx_factory: Option<String>,
    pub jsx_fragment_factory: Option<String>,
    pub jsx_import_source: Option<String>,
    pub jsx: Option<JsxMode>,
    pub target: Option<String>,
    pub base_url: Option<PathBuf>,
    pub paths: Option<PathAliases>,
}

impl CompilerOptionsView {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Extract the known fields from a merged `compilerOptions` object.
    ///
    /// `base_url_origin` and `paths_origin` are the directories of the files
    /// that contributed the effective `baseUrl` and `paths` values. Values of
    /// the wrong JSON type are dropped rather than rejected.
    pub(crate) fn from_compiler_options(
        options: &Map<String, Value>,
        base_url_origin: Option<&Path>,
        paths_origin: Option<&Path>,
    ) -> Self {
        let flag = |key: &str| options.get(key).and_then(Value::as_bool);
        let string = |key: &str| options.get(key).and_then(Value::as_str).map(str::to_string);

        let paths = options.get("paths").and_then(Value::as_object).map(|map| {
            map.iter()
                .map(|(pattern, targets)| {
                    let targets = targets
                        .as_array()
                        .map(|list| {
                            list.iter()
                                .filter_map(Value::as_str)
                                .map(str::to_string)
                                .collect()
                        })
                        .unwrap_or_default();
                    (pattern.clone(), targets)
                })
                .collect::<PathAliases>()
        });

        let base_url = match (options.get("baseUrl").and_then(Value::as_str), base_url_origin) {
            (Some(declared), Some(origin)) => Some(origin.join(declared).clean()),
            // `paths` without `baseUrl` resolves against the file declaring `paths`
            _ if paths.is_some() => paths_origin.map(Path::to_path_buf),
            _ => None,
        };

        Self {
            import_helpers: flag("importHelpers"),
            es_module_interop: flag("esModuleInterop"),
            experimental_decorators: flag("experimentalDecorators"),
            emit_decorator_metadata: flag("emitDecoratorMetadata"),
            jsx_factory: string("jsxFactory"),
            jsx_fragment_factory: string("jsxFragmentFactory"),
            jsx_import_source: string("jsxImportSource"),
            jsx: options
                .get("jsx")
                .and_then(Value::as_str)
                .and_then(|s| s.parse().ok()),
            target: string("target"),
            base_url,
            paths,
        }
    }

    /// Candidate files for a bare specifier according to `paths`.
    ///
    /// An exact pattern wins over wildcard patterns; among wildcard patterns
    /// the one with the longest prefix wins. Candidates keep the order of the
    /// substitution list and are resolved against `base_url`.
    pub fn alias_candidates(&self, specifier: &str) -> Vec<PathBuf> {
        let (Some(paths), Some(base_url)) = (&self.paths, &self.base_url) else {
            return Vec::new();
        };

        if let Some(targets) = paths.get(specifier).filter(|_| !specifier.contains('*')) {
            return targets.iter().map(|t| base_url.join(t).clean()).collect();
        }

        let mut best: Option<(usize, &str, &Vec<String>)> = None;
        for (pattern, targets) in paths {
            let Some((prefix, suffix)) = pattern.split_once('*') else {
                continue;
            };
            if specifier.len() < prefix.len() + suffix.len()
                || !specifier.starts_with(prefix)
                || !specifier.ends_with(suffix)
            {
                continue;
            }
            if best.is_some_and(|(longest, _, _)| longest >= prefix.len()) {
                continue;
            }
            let captured = &specifier[prefix.len()..specifier.len() - suffix.len()];
            best = Some((prefix.len(), captured, targets));
        }

        best.map(|(_, captured, targets)| {
            targets
                .iter()
                .map(|t| base_url.join(t.replacen('*', captured, 1)).clean())
                .collect()
        })
        .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn options(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn extracts_known_fields_only() {
        let view = CompilerOptionsView::from_compiler_options(
            &options(json!({
                "importHelpers": true,
                "esModuleInterop": false,
                "experimentalDecorators": true,
                "emitDecoratorMetadata": true,
                "jsxFactory": "h",
                "jsxFragmentFactory": "Fragment",
                "jsxImportSource": "preact",
                "jsx": "react-jsx",
                "target": "ES2020",
                "strict": true,
                "outDir": "dist"
            })),
            None,
            None,
        );

        assert_eq!(view.import_helpers, Some(true));
        assert_eq!(view.es_module_interop, Some(false));
        assert_eq!(view.experimental_decorators, Some(true));
        assert_eq!(view.emit_decorator_metadata, Some(true));
        assert_eq!(view.jsx_factory.as_deref(), Some("h"));
        assert_eq!(view.jsx_fragment_factory.as_deref(), Some("Fragment"));
        assert_eq!(view.jsx_import_source.as_deref(), Some("preact"));
        assert_eq!(view.jsx, Some(JsxMode::ReactJsx));
        assert_eq!(view.target.as_deref(), Some("ES2020"));
        assert!(view.base_url.is_none());
        assert!(view.paths.is_none());
    }

    #[test]
    fn wrong_types_are_dropped() {
        let view = CompilerOptionsView::from_compiler_options(
            &options(json!({ "importHelpers": "yes", "jsxFactory": 3, "jsx": "bogus" })),
            None,
            None,
        );
        assert!(view.is_empty());
    }

    #[test]
    fn base_url_resolves_against_its_origin() {
        let view = CompilerOptionsView::from_compiler_options(
            &options(json!({ "baseUrl": "./src" })),
            Some(Path::new("/project/config")),
            None,
        );
        assert_eq!(view.base_url, Some(PathBuf::from("/project/config/src")));
    }

    #[test]
    fn paths_without_base_url_use_paths_origin() {
        let view = CompilerOptionsView::from_compiler_options(
            &options(json!({ "paths": { "@/*": ["./src/*"] } })),
            None,
            Some(Path::new("/project")),
        );
        assert_eq!(view.base_url, Some(PathBuf::from("/project")));
        assert_eq!(view.paths.unwrap()["@/*"], vec!["./src/*".to_string()]);
    }

    #[test]
    fn jsx_mode_round_trips() {
        for mode in ["preserve", "react", "react-jsx", "react-jsxdev", "react-native"] {
            assert_eq!(mode.parse::<JsxMode>().unwrap().to_string(), mode);
        }
        assert!("React-JSX".parse::<JsxMode>().unwrap().is_automatic());
        assert!(!JsxMode::React.is_automatic());
    }

    fn aliased(paths: Value) -> CompilerOptionsView {
        CompilerOptionsView::from_compiler_options(
            &options(json!({ "baseUrl": ".", "paths": paths })),
            Some(Path::new("/project")),
            Some(Path::new("/project")),
        )
    }

    #[test]
    fn wildcard_alias_substitutes_capture() {
        let view = aliased(json!({ "@/*": ["./src/*", "./generated/*"] }));
        assert_eq!(
            view.alias_candidates("@/components/a"),
            vec![
                PathBuf::from("/project/src/components/a"),
                PathBuf::from("/project/generated/components/a"),
            ]
        );
        assert!(view.alias_candidates("lodash").is_empty());
    }

    #[test]
    fn exact_alias_beats_wildcard() {
        let view = aliased(json!({ "*": ["./vendor/*"], "config": ["./src/config.ts"] }));
        assert_eq!(
            view.alias_candidates("config"),
            vec![PathBuf::from("/project/src/config.ts")]
        );
        assert_eq!(
            view.alias_candidates("lodash"),
            vec![PathBuf::from("/project/vendor/lodash")]
        );
    }

    #[test]
    fn longest_prefix_wins() {
        let view = aliased(json!({ "@/*": ["./src/*"], "@/lib/*": ["./lib/*"] }));
        assert_eq!(
            view.alias_candidates("@/lib/b"),
            vec![PathBuf::from("/project/lib/b")]
        );
    }

    #[test]
    fn no_candidates_without_paths() {
        assert!(CompilerOptionsView::default().alias_candidates("@/a").is_empty());
    }
}
