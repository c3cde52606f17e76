//! Lexical scan for the directive prologue.
//!
//! Runs on raw module text before any parser sees it. A directive line is a
//! line whose first non-blank token is either a quoted string literal
//! (trailing content on the same line is allowed and discarded) or a `#!`
//! shebang. Blank lines between directives are skipped; the scan stops at the
//! first line that is neither.

/// Directives removed from a module and the text left behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// Module text with each directive line blanked. Line terminators are
    /// kept so every remaining token stays on its original line.
    pub code: String,
    /// Directives in source order, in statement form (`'use client';`) or
    /// as the verbatim shebang line.
    pub directives: Vec<String>,
}

/// Pull the leading directives out of `code`.
///
/// Returns `None` when the module has no directive prologue. A leading
/// byte order mark is dropped from the returned code.
pub fn extract(code: &str) -> Option<Extraction> {
    let code = code.strip_prefix('\u{feff}').unwrap_or(code);
    let mut directives = Vec::new();
    let mut stripped = String::with_capacity(code.len());
    let mut consumed = 0;

    for line in code.split_inclusive('\n') {
        let content = line.trim_end_matches(['\n', '\r']);
        let terminator = &line[content.len()..];
        let token = content.trim_start();

        if token.is_empty() {
            stripped.push_str(line);
        } else if let Some(directive) = parse_directive(token) {
            directives.push(directive);
            stripped.push_str(terminator);
        } else {
            break;
        }
        consumed += line.len();
    }

    if directives.is_empty() {
        return None;
    }

    stripped.push_str(&code[consumed..]);
    Some(Extraction {
        code: stripped,
        directives,
    })
}

fn parse_directive(token: &str) -> Option<String> {
    if token.starts_with("#!") {
        return Some(token.trim_end().to_string());
    }

    let quote = token.chars().next().filter(|c| matches!(c, '\'' | '"'))?;
    let rest = &token[1..];
    let body = &rest[..rest.find(quote)?];
    if body.is_empty() || body.ends_with('\\') {
        return None;
    }
    Some(statement(body))
}

/// Re-quote a directive body with single quotes and terminate it.
///
/// Bodies that themselves contain a single quote keep double quotes.
fn statement(body: &str) -> String {
    if body.contains('\'') {
        format!("\"{}\";", body)
    } else {
        format!("'{}';", body)
    }
}
