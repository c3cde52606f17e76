//! Lenient JSON reader for tsconfig files.
//!
//! TypeScript accepts comments and trailing commas in its configuration
//! files, so they are read with `jsonc-parser` rather than `serde_json`.

use jsonc_parser::ParseOptions;
use jsonc_parser::errors::ParseError;
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum JsoncError {
    #[error("{0}")]
    Syntax(ParseError),

    #[error("file contains no JSON value")]
    Empty,
}

/// Parse JSON-with-comments text into a `serde_json::Value`.
pub fn parse(source: &str) -> Result<Value, JsoncError> {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);
    jsonc_parser::parse_to_serde_value(source, &ParseOptions::default())
        .map_err(JsoncError::Syntax)?
        .ok_or(JsoncError::Empty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plain_json_passes_through() {
        let value = parse(r#"{"compilerOptions": {"target": "ES2020"}}"#).unwrap();
        assert_eq!(value, json!({"compilerOptions": {"target": "ES2020"}}));
    }

    #[test]
    fn strips_line_and_block_comments() {
        let value = parse(
            r#"{
                // leading comment
                "compilerOptions": {
                    /* block
                       comment */
                    "jsxFactory": "h" // trailing
                }
            }"#,
        )
        .unwrap();
        assert_eq!(value, json!({"compilerOptions": {"jsxFactory": "h"}}));
    }

    #[test]
    fn strips_trailing_commas() {
        let value = parse(
            r#"{
                "compilerOptions": {
                    "paths": { "@/*": ["./src/*",], },
                },
            }"#,
        )
        .unwrap();
        assert_eq!(value, json!({"compilerOptions": {"paths": {"@/*": ["./src/*"]}}}));
    }

    #[test]
    fn comment_markers_inside_strings_are_kept() {
        let value = parse(r#"{"a": "http://x/*y*/", "b": "c,]"}"#).unwrap();
        assert_eq!(value, json!({"a": "http://x/*y*/", "b": "c,]"}));
    }

    #[test]
    fn escaped_quotes_do_not_end_strings() {
        let value = parse(r#"{"a": "say \"hi\" // not a comment"}"#).unwrap();
        assert_eq!(value, json!({"a": "say \"hi\" // not a comment"}));
    }

    #[test]
    fn byte_order_mark_is_ignored() {
        let value = parse("\u{feff}{\"a\": 1}").unwrap();
        assert_eq!(value, json!({"a": 1}));
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert!(matches!(
            parse(r#"{"compilerOptions": "#),
            Err(JsoncError::Syntax(_))
        ));
        assert!(parse("not json").is_err());
    }

    #[test]
    fn empty_file_is_an_error() {
        assert!(matches!(parse("  // nothing here\n"), Err(JsoncError::Empty)));
    }
}
