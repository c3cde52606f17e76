use oxc_sourcemap::{SourceMap, SourceMapBuilder};

/// Copy `map` with every generated line moved down by `offset`.
///
/// Used when a directive block is prepended to already-minified output.
pub(crate) fn shift_lines(map: &SourceMap, offset: u32) -> SourceMap {
    let mut builder = SourceMapBuilder::default();

    let sources: Vec<u32> = map
        .get_sources()
        .enumerate()
        .map(|(index, source)| {
            let content = u32::try_from(index)
                .ok()
                .and_then(|id| map.get_source_content(id))
                .map_or("", |content| content.as_ref());
            builder.add_source_and_content(source, content)
        })
        .collect();
    let names: Vec<u32> = map.get_names().map(|name| builder.add_name(name)).collect();

    for token in map.get_tokens() {
        builder.add_token(
            token.get_dst_line().saturating_add(offset),
            token.get_dst_col(),
            token.get_src_line(),
            token.get_src_col(),
            token
                .get_source_id()
                .and_then(|id| sources.get(id as usize).copied()),
            token.get_name_id().and_then(|id| names.get(id as usize).copied()),
        );
    }

    builder.into_sourcemap()
}

pub(crate) fn lines_count(s: &str) -> u32 {
    u32::try_from(s.bytes().filter(|b| *b == b'\n').count()).unwrap_or(u32::MAX)
}
