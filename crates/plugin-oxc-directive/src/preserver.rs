//! Per-build directive registry.

use dashmap::DashMap;
use indexmap::IndexSet;
use oxc_sourcemap::{SourceMap, SourceMapBuilder};
use tracing::debug;

use crate::scan;

/// A chunk with its directive block prepended.
#[derive(Debug, Clone)]
pub struct RenderedChunk {
    pub code: String,
    /// Line-offset map from the rendered chunk back to the chunk as it was
    /// handed in. Only produced when requested.
    pub map: Option<SourceMap>,
}

/// Records leading directives per module and re-emits them per chunk.
///
/// One instance belongs to one build. Modules are extracted while the host
/// transforms them; chunks are rendered after every module transform has
/// completed. Re-extracting a module replaces its entry.
#[derive(Debug, Default)]
pub struct DirectivePreserver {
    modules: DashMap<String, IndexSet<String>>,
}

impl DirectivePreserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Strip the directive prologue from a module and record it.
    ///
    /// Returns the stripped text, or `None` when the module has no directives
    /// and should be passed on unchanged.
    pub fn extract(&self, module_id: &str, code: &str) -> Option<String> {
        let Some(extraction) = scan::extract(code) else {
            self.modules.remove(module_id);
            return None;
        };

        debug!(
            "[directive] {} -> {}",
            module_id,
            extraction.directives.join(" ")
        );
        self.modules.insert(
            module_id.to_string(),
            extraction.directives.into_iter().collect(),
        );
        Some(extraction.code)
    }

    /// Directives recorded for one module, in first-seen order.
    pub fn directives(&self, module_id: &str) -> Vec<String> {
        self.modules
            .get(module_id)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of modules with at least one recorded directive.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Prepend the union of the chunk's module directives to `code`.
    ///
    /// Modules without an entry are skipped. Returns `None` when no module in
    /// the chunk carries a directive, meaning the chunk is left untouched.
    pub fn render<I, S>(&self, code: &str, module_ids: I, sourcemap: bool) -> Option<RenderedChunk>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut union = IndexSet::new();
        for id in module_ids {
            if let Some(set) = self.modules.get(id.as_ref()) {
                union.extend(set.iter().cloned());
            }
        }
        if union.is_empty() {
            return None;
        }

        let banner = union.into_iter().collect::<Vec<_>>().join("\n");
        let map = if sourcemap {
            line_offset_map(code, lines_count(&banner) + 1)
        } else {
            None
        };

        Some(RenderedChunk {
            code: format!("{}\n{}", banner, code),
            map,
        })
    }
}

fn lines_count(s: &str) -> u32 {
    u32::try_from(memchr::memchr_iter(b'\n', s.as_bytes()).count()).unwrap_or(u32::MAX)
}

/// Map every line of `code` to itself shifted down by `offset` lines.
fn line_offset_map(code: &str, offset: u32) -> Option<SourceMap> {
    let lines = lines_count(code)
        .checked_add(1)
        .filter(|lines| lines.checked_add(offset).is_some())?;

    let mut builder = SourceMapBuilder::default();
    let source = builder.add_source_and_content("", code);
    for line in 0..lines {
        builder.add_token(line + offset, 0, line, 0, Some(source), None);
    }
    Some(builder.into_sourcemap())
}
