//! Per-directory configuration discovery with a process-lifetime cache.

use dashmap::DashMap;
use plugin_oxc_runtime::Runtime;
use serde::{Deserialize, Deserializer};
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::diagnostics::{codes, ConfigWarning, DiagnosticSink};
use crate::loader::ConfigLoader;
use crate::options::CompilerOptionsView;

/// Primary configuration file name
pub const TSCONFIG_JSON: &str = "tsconfig.json";
/// Fallback for plain JavaScript projects, only tried when no file was named
pub const JSCONFIG_JSON: &str = "jsconfig.json";

/// Which configuration file a lookup should use.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum TsconfigSelector {
    /// Search upward for `tsconfig.json`, then `jsconfig.json`
    #[default]
    Discover,
    /// Do not read any configuration
    Disabled,
    /// An absolute path is loaded as-is; a relative one is searched upward
    /// by that name
    Path(PathBuf),
}

impl TsconfigSelector {
    fn cache_key(&self) -> Cow<'_, str> {
        match self {
            Self::Discover => Cow::Borrowed("undefined"),
            Self::Disabled => Cow::Borrowed("false"),
            Self::Path(path) => path.to_string_lossy(),
        }
    }
}

impl From<&str> for TsconfigSelector {
    fn from(path: &str) -> Self {
        Self::Path(PathBuf::from(path))
    }
}

impl From<PathBuf> for TsconfigSelector {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

/// Accepts `false`, `true`, or a path string.
impl<'de> Deserialize<'de> for TsconfigSelector {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Flag(bool),
            Path(PathBuf),
        }

        Ok(match Option::<Raw>::deserialize(deserializer)? {
            None | Some(Raw::Flag(true)) => Self::Discover,
            Some(Raw::Flag(false)) => Self::Disabled,
            Some(Raw::Path(path)) => Self::Path(path),
        })
    }
}

/// Discovers, merges and caches compiler configuration.
///
/// One instance belongs to one plugin instance (one build). Entries are
/// computed on the first lookup of a `(directory, selector)` pair and handed
/// out as shared references afterwards; nothing is ever invalidated.
#[derive(Debug)]
pub struct ConfigResolver {
    runtime: Arc<dyn Runtime>,
    cache: DashMap<String, Arc<CompilerOptionsView>>,
    empty: Arc<CompilerOptionsView>,
}

impl ConfigResolver {
    pub fn new(runtime: Arc<dyn Runtime>) -> Self {
        Self {
            runtime,
            cache: DashMap::new(),
            empty: Arc::new(CompilerOptionsView::default()),
        }
    }

    /// Number of cached `(directory, selector)` entries
    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }

    /// Resolve the options that apply to sources in `directory`.
    ///
    /// Never fails: missing or malformed configuration degrades to an empty
    /// view and a warning on `sink`.
    pub async fn resolve(
        &self,
        directory: &Path,
        selector: &TsconfigSelector,
        sink: &dyn DiagnosticSink,
    ) -> Arc<CompilerOptionsView> {
        if *selector == TsconfigSelector::Disabled {
            return Arc::clone(&self.empty);
        }

        let key = format!("{}:{}", directory.display(), selector.cache_key());
        if let Some(hit) = self.cache.get(&key) {
            return Arc::clone(hit.value());
        }

        debug!("[tsconfig] cache miss for {}", key);
        let view = Arc::new(self.load(directory, selector, sink).await);

        // Two lookups racing on the same key both load; the first insert wins
        // and both callers get that entry.
        let entry = self.cache.entry(key).or_insert(view);
        Arc::clone(entry.value())
    }

    async fn load(
        &self,
        directory: &Path,
        selector: &TsconfigSelector,
        sink: &dyn DiagnosticSink,
    ) -> CompilerOptionsView {
        let loader = ConfigLoader::new(self.runtime.as_ref(), sink);

        match selector {
            TsconfigSelector::Path(path) if path.is_absolute() => {
                match loader.load(path).await {
                    Ok(loaded) => loaded.into_view(),
                    Err(e) => {
                        warn!("[tsconfig] {}", e);
                        sink.warn(ConfigWarning::new(codes::TSCONFIG_INVALID, e.to_string()));
                        CompilerOptionsView::default()
                    }
                }
            }
            TsconfigSelector::Path(name) => {
                self.search(&loader, directory, &[name.as_path()], sink).await
            }
            TsconfigSelector::Discover => {
                let names = [Path::new(TSCONFIG_JSON), Path::new(JSCONFIG_JSON)];
                self.search(&loader, directory, &names, sink).await
            }
            TsconfigSelector::Disabled => CompilerOptionsView::default(),
        }
    }

    /// Walk from `directory` to the filesystem root, trying each name in
    /// every directory. Unreadable or malformed files count as absent.
    async fn search(
        &self,
        loader: &ConfigLoader<'_>,
        directory: &Path,
        names: &[&Path],
        sink: &dyn DiagnosticSink,
    ) -> CompilerOptionsView {
        for dir in directory.ancestors() {
            for name in names {
                let candidate = dir.join(name);
                if !self.runtime.is_file(&candidate).await {
                    continue;
                }
                match loader.load(&candidate).await {
                    Ok(loaded) => {
                        debug!(
                            "[tsconfig] using {} for {}",
                            loaded.file.display(),
                            directory.display()
                        );
                        return loaded.into_view();
                    }
                    Err(e) => warn!("[tsconfig] skipping {}: {}", candidate.display(), e),
                }
            }
        }

        let searched = names
            .iter()
            .map(|name| name.display().to_string())
            .collect::<Vec<_>>()
            .join(" or ");
        sink.warn(ConfigWarning::new(
            codes::TSCONFIG_NOT_FOUND,
            format!(
                "Could not find {} from {}, using default compiler options",
                searched,
                directory.display()
            ),
        ));
        CompilerOptionsView::default()
    }
}
