//! Chunk-level minification.

use oxc_allocator::Allocator;
use oxc_codegen::{Codegen, CodegenOptions};
use oxc_minifier::{CompressOptions, MangleOptions, Minifier, MinifierOptions};
use oxc_parser::Parser;
use oxc_span::SourceType;
use serde::{Deserialize, Deserializer};
use std::path::PathBuf;

use crate::compile::CompileOutput;
use crate::error::{PluginError, Result};

/// How aggressively chunks are minified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MinifyLevel {
    /// Leave output readable.
    #[default]
    None,
    /// Remove whitespace and comments only.
    Whitespace,
    /// Syntax-level compression, names preserved.
    Syntax,
    /// Compression plus identifier mangling.
    Identifiers,
}

impl MinifyLevel {
    /// Parse a level name, case-insensitively.
    ///
    /// `"true"` and `"false"` are accepted as aliases for `identifiers` and
    /// `none`.
    ///
    /// ```
    /// use plugin_oxc::MinifyLevel;
    ///
    /// assert_eq!(MinifyLevel::parse("SYNTAX").unwrap(), MinifyLevel::Syntax);
    /// assert_eq!(MinifyLevel::parse("true").unwrap(), MinifyLevel::Identifiers);
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "none" | "false" => Ok(Self::None),
            "whitespace" => Ok(Self::Whitespace),
            "syntax" => Ok(Self::Syntax),
            "identifiers" | "true" => Ok(Self::Identifiers),
            _ => Err(PluginError::invalid(format!(
                "invalid minify level '{}', expected: none, whitespace, syntax, identifiers",
                s
            ))),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self, Self::None)
    }

    fn minifier_options(self) -> MinifierOptions {
        let compress = matches!(self, Self::Syntax | Self::Identifiers);
        MinifierOptions {
            mangle: matches!(self, Self::Identifiers).then(MangleOptions::default),
            compress: compress.then(CompressOptions::default),
        }
    }
}

impl From<bool> for MinifyLevel {
    fn from(enabled: bool) -> Self {
        if enabled { Self::Identifiers } else { Self::None }
    }
}

impl std::fmt::Display for MinifyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Whitespace => write!(f, "whitespace"),
            Self::Syntax => write!(f, "syntax"),
            Self::Identifiers => write!(f, "identifiers"),
        }
    }
}

impl<'de> Deserialize<'de> for MinifyLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Flag(bool),
            Level(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Flag(enabled) => Ok(enabled.into()),
            Raw::Level(level) => Self::parse(&level).map_err(serde::de::Error::custom),
        }
    }
}

/// Minify a rendered chunk as an ES module.
///
/// `file_name` names the chunk in the returned source map, which is only
/// produced when `sourcemap` is set.
pub fn minify(
    code: &str,
    level: MinifyLevel,
    file_name: &str,
    sourcemap: bool,
) -> Result<CompileOutput> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, code, SourceType::mjs()).parse();
    if ret.panicked || !ret.errors.is_empty() {
        let message = ret
            .errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("\n");
        return Err(PluginError::Minify(format!("{}: {}", file_name, message)));
    }
    let mut program = ret.program;

    let minified = Minifier::new(level.minifier_options()).minify(&allocator, &mut program);

    let ret = Codegen::new()
        .with_options(CodegenOptions {
            minify: true,
            source_map_path: sourcemap.then(|| PathBuf::from(file_name)),
            ..CodegenOptions::default()
        })
        .with_scoping(minified.scoping)
        .build(&program);

    Ok(CompileOutput {
        code: ret.code,
        map: ret.map,
    })
}
