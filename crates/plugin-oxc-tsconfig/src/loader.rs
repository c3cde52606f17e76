//! Loading a single configuration file together with its `extends` chain.

use path_clean::PathClean;
use plugin_oxc_runtime::Runtime;
use serde_json::{Map, Value};
use std::ffi::OsString;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use tracing::debug;

use crate::diagnostics::{codes, ConfigWarning, DiagnosticSink};
use crate::error::{Result, TsconfigError};
use crate::jsonc;
use crate::options::CompilerOptionsView;

type LoadFuture<'a> = Pin<Box<dyn Future<Output = Result<LoadedConfig>> + Send + 'a>>;

/// `compilerOptions` flattened across an extends chain.
#[derive(Debug, Clone)]
pub(crate) struct LoadedConfig {
    pub file: PathBuf,
    compiler_options: Map<String, Value>,
    base_url_origin: Option<PathBuf>,
    paths_origin: Option<PathBuf>,
}

impl LoadedConfig {
    fn new(file: PathBuf) -> Self {
        Self {
            file,
            compiler_options: Map::new(),
            base_url_origin: None,
            paths_origin: None,
        }
    }

    /// Layer a parent underneath what has been collected so far. Parents are
    /// absorbed in `extends` order, so later parents override earlier ones.
    fn absorb(&mut self, parent: LoadedConfig) {
        self.compiler_options.extend(parent.compiler_options);
        if parent.base_url_origin.is_some() {
            self.base_url_origin = parent.base_url_origin;
        }
        if parent.paths_origin.is_some() {
            self.paths_origin = parent.paths_origin;
        }
    }

    /// Apply the file's own `compilerOptions`; its keys win over every parent.
    fn overlay(&mut self, own: &Map<String, Value>, dir: &Path) {
        for (key, value) in own {
            match key.as_str() {
                "baseUrl" => self.base_url_origin = Some(dir.to_path_buf()),
                "paths" => self.paths_origin = Some(dir.to_path_buf()),
                _ => {}
            }
            self.compiler_options.insert(key.clone(), value.clone());
        }
    }

    pub fn into_view(self) -> CompilerOptionsView {
        CompilerOptionsView::from_compiler_options(
            &self.compiler_options,
            self.base_url_origin.as_deref(),
            self.paths_origin.as_deref(),
        )
    }
}

pub(crate) struct ConfigLoader<'a> {
    runtime: &'a dyn Runtime,
    sink: &'a dyn DiagnosticSink,
}

impl<'a> ConfigLoader<'a> {
    pub fn new(runtime: &'a dyn Runtime, sink: &'a dyn DiagnosticSink) -> Self {
        Self { runtime, sink }
    }

    pub async fn load(&self, file: &Path) -> Result<LoadedConfig> {
        let mut stack = Vec::new();
        self.load_chain(file.to_path_buf(), &mut stack).await
    }

    fn load_chain<'b>(&'b self, file: PathBuf, stack: &'b mut Vec<PathBuf>) -> LoadFuture<'b> {
        Box::pin(async move {
            if stack.contains(&file) {
                return Err(TsconfigError::ExtendsCycle(file));
            }

            let text = self
                .runtime
                .read_to_string(&file)
                .await
                .map_err(|source| TsconfigError::Read {
                    path: file.clone(),
                    source,
                })?;
            let root = match jsonc::parse(&text) {
                Ok(Value::Object(root)) => root,
                Ok(_) => {
                    return Err(TsconfigError::Parse {
                        path: file,
                        message: "expected a JSON object at the top level".to_string(),
                    })
                }
                Err(e) => {
                    return Err(TsconfigError::Parse {
                        path: file,
                        message: e.to_string(),
                    })
                }
            };

            debug!("[tsconfig] loaded {}", file.display());

            let dir = file.parent().map(Path::to_path_buf).unwrap_or_default();
            let mut loaded = LoadedConfig::new(file.clone());

            stack.push(file.clone());
            for specifier in extends_specifiers(root.get("extends")) {
                match self.resolve_extends(&dir, &specifier).await {
                    Some(parent_file) => {
                        let parent = self.load_chain(parent_file, stack).await?;
                        loaded.absorb(parent);
                    }
                    None => {
                        let error = TsconfigError::ExtendsNotFound {
                            specifier,
                            from: file.clone(),
                        };
                        self.sink.warn(ConfigWarning::new(
                            codes::TSCONFIG_EXTENDS_NOT_FOUND,
                            error.to_string(),
                        ));
                    }
                }
            }
            stack.pop();

            if let Some(own) = root.get("compilerOptions").and_then(Value::as_object) {
                loaded.overlay(own, &dir);
            }

            Ok(loaded)
        })
    }

    /// Locate the file an `extends` entry points at.
    ///
    /// Relative and absolute specifiers resolve against the extending file's
    /// directory; anything else is looked up in `node_modules` walking up.
    async fn resolve_extends(&self, dir: &Path, specifier: &str) -> Option<PathBuf> {
        let candidates: Vec<PathBuf> =
            if specifier.starts_with('.') || Path::new(specifier).is_absolute() {
                json_variants(dir.join(specifier).clean())
            } else {
                dir.ancestors()
                    .flat_map(|ancestor| {
                        let base = ancestor.join("node_modules").join(specifier);
                        let mut candidates = json_variants(base.clone());
                        candidates.push(base.join("tsconfig.json"));
                        candidates
                    })
                    .collect()
            };

        for candidate in candidates {
            if self.runtime.is_file(&candidate).await {
                return Some(candidate);
            }
        }
        None
    }
}

fn extends_specifiers(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::String(s)) => vec![s.clone()],
        Some(Value::Array(list)) => list
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn json_variants(base: PathBuf) -> Vec<PathBuf> {
    if base.extension().is_some_and(|ext| ext == "json") {
        return vec![base];
    }
    let mut with_ext = OsString::from(base.as_os_str());
    with_ext.push(".json");
    vec![base, PathBuf::from(with_ext)]
}
