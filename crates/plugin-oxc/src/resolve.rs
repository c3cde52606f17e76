//! Resolution of extensionless, directory and aliased imports.

use path_clean::PathClean;
use plugin_oxc_runtime::Runtime;
use plugin_oxc_tsconfig::CompilerOptionsView;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Probes the filesystem for the file an import refers to.
///
/// Extensions are tried one at a time in configured order so the first
/// match is always the preferred one.
#[derive(Debug)]
pub(crate) struct ModuleResolver {
    runtime: Arc<dyn Runtime>,
    extensions: Vec<String>,
}

impl ModuleResolver {
    pub fn new(runtime: Arc<dyn Runtime>, extensions: Vec<String>) -> Self {
        Self {
            runtime,
            extensions,
        }
    }

    /// Resolve `./x` or `../x` against the importing module's directory.
    pub async fn resolve_relative(&self, specifier: &str, importer: &str) -> Option<PathBuf> {
        let base = Path::new(importer).parent()?;
        self.probe(&base.join(specifier).clean()).await
    }

    /// Resolve a bare specifier through `paths`, trying each substitution in
    /// declaration order.
    pub async fn resolve_alias(
        &self,
        specifier: &str,
        view: &CompilerOptionsView,
    ) -> Option<PathBuf> {
        for candidate in view.alias_candidates(specifier) {
            if let Some(file) = self.probe(&candidate).await {
                debug!("[resolve] {} -> {} via paths", specifier, file.display());
                return Some(file);
            }
            // Aliases may point straight at non-script files
            if self.runtime.is_file(&candidate).await {
                return Some(candidate);
            }
        }
        None
    }

    async fn probe(&self, path: &Path) -> Option<PathBuf> {
        let stem = strip_script_extension(path);
        if let Some(file) = self.first_existing(|ext| append(&stem, ext)).await {
            return Some(file);
        }
        if self.runtime.is_dir(path).await {
            return self
                .first_existing(|ext| path.join(format!("index{}", ext)))
                .await;
        }
        None
    }

    async fn first_existing<F>(&self, candidate: F) -> Option<PathBuf>
    where
        F: Fn(&str) -> PathBuf,
    {
        for ext in &self.extensions {
            let file = candidate(ext);
            if self.runtime.is_file(&file).await {
                return Some(file);
            }
        }
        None
    }
}

/// Drop a `.js`-family or `.ts`-family extension so `./a.js` can resolve
/// to `./a.ts`.
fn strip_script_extension(path: &Path) -> PathBuf {
    let is_script = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            let ext = ext.strip_prefix(['c', 'm']).unwrap_or(ext);
            matches!(ext, "js" | "jsx" | "ts" | "tsx")
        });
    if is_script {
        path.with_extension("")
    } else {
        path.to_path_buf()
    }
}

fn append(path: &Path, ext: &str) -> PathBuf {
    let mut raw = path.as_os_str().to_owned();
    raw.push(ext);
    PathBuf::from(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::DEFAULT_EXTENSIONS;
    use plugin_oxc_runtime::MemoryRuntime;
    use plugin_oxc_tsconfig::PathAliases;

    fn resolver(files: &[&str]) -> ModuleResolver {
        let runtime = MemoryRuntime::new("/project");
        for file in files {
            runtime.add_file(*file, "");
        }
        ModuleResolver::new(
            Arc::new(runtime),
            DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        )
    }

    #[test]
    fn strips_only_script_extensions() {
        assert_eq!(strip_script_extension(Path::new("/a/b.mts")), PathBuf::from("/a/b"));
        assert_eq!(strip_script_extension(Path::new("/a/b.jsx")), PathBuf::from("/a/b"));
        assert_eq!(strip_script_extension(Path::new("/a/b.css")), PathBuf::from("/a/b.css"));
        assert_eq!(strip_script_extension(Path::new("/a/b.d")), PathBuf::from("/a/b.d"));
    }

    #[tokio::test]
    async fn extension_order_decides() {
        let resolver = resolver(&["/project/src/a.js", "/project/src/a.ts"]);
        assert_eq!(
            resolver.resolve_relative("./a", "/project/src/index.ts").await,
            Some(PathBuf::from("/project/src/a.ts"))
        );
    }

    #[tokio::test]
    async fn js_specifier_finds_ts_source() {
        let resolver = resolver(&["/project/src/util.ts"]);
        assert_eq!(
            resolver.resolve_relative("../src/util.js", "/project/src/index.ts").await,
            Some(PathBuf::from("/project/src/util.ts"))
        );
    }

    #[tokio::test]
    async fn directory_index() {
        let resolver = resolver(&["/project/src/components/index.tsx"]);
        assert_eq!(
            resolver.resolve_relative("./components", "/project/src/index.ts").await,
            Some(PathBuf::from("/project/src/components/index.tsx"))
        );
    }

    #[tokio::test]
    async fn unresolvable_is_none() {
        let resolver = resolver(&["/project/src/a.css"]);
        assert_eq!(resolver.resolve_relative("./a", "/project/src/index.ts").await, None);
        assert_eq!(resolver.resolve_relative("./missing", "/project/src/index.ts").await, None);
    }

    #[tokio::test]
    async fn aliases_try_each_target() {
        let resolver = resolver(&["/project/generated/api.ts", "/project/assets/logo.svg"]);
        let mut paths = PathAliases::new();
        paths.insert("@/*".into(), vec!["./src/*".into(), "./generated/*".into()]);
        paths.insert("logo".into(), vec!["./assets/logo.svg".into()]);
        let view = CompilerOptionsView {
            base_url: Some(PathBuf::from("/project")),
            paths: Some(paths),
            ..CompilerOptionsView::default()
        };

        assert_eq!(
            resolver.resolve_alias("@/api", &view).await,
            Some(PathBuf::from("/project/generated/api.ts"))
        );
        assert_eq!(
            resolver.resolve_alias("logo", &view).await,
            Some(PathBuf::from("/project/assets/logo.svg"))
        );
        assert_eq!(resolver.resolve_alias("react", &view).await, None);
    }
}
