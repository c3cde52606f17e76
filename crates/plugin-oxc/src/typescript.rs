//! Detects the installed TypeScript compiler.

use plugin_oxc_runtime::Runtime;
use serde_json::Value;
use tracing::debug;

/// Major version of the `typescript` package visible from the working
/// directory, if any.
pub(crate) async fn installed_major(runtime: &dyn Runtime) -> Option<u32> {
    let cwd = runtime.get_cwd().ok()?;
    for dir in cwd.ancestors() {
        let manifest = dir.join("node_modules/typescript/package.json");
        let Ok(text) = runtime.read_to_string(&manifest).await else {
            continue;
        };
        let major = parse_major(&text);
        debug!("[typescript] found {} (major {:?})", manifest.display(), major);
        return major;
    }
    None
}

fn parse_major(package_json: &str) -> Option<u32> {
    let manifest: Value = serde_json::from_str(package_json).ok()?;
    manifest
        .get("version")?
        .as_str()?
        .split('.')
        .next()?
        .parse()
        .ok()
}
