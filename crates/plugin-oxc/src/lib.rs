//! # plugin-oxc
//!
//! A Rolldown plugin that compiles TypeScript and JSX with
//! [oxc](https://oxc.rs), configured by the project's own `tsconfig.json`.
//!
//! ## Pipeline
//!
//! ```text
//! resolve_id   ./foo, ./dir, @/alias ──► probe extensions, index files, tsconfig paths
//!
//! transform    module.tsx
//!                │  nearest tsconfig/jsconfig (cached per directory)
//!                │  fallbacks < tsconfig layer < `compile` overrides
//!                │  strip "use client" & co. (when preserving directives)
//!                ▼
//!              oxc parse ─► transform ─► codegen (+ source map)
//!
//! render_chunk minify (optional) ─► prepend the chunk's directives
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use plugin_oxc::{DirectivePreserver, OxcPlugin, PluginOptions};
//! use std::sync::Arc;
//!
//! # fn main() -> plugin_oxc::Result<()> {
//! let options = PluginOptions::from_json(serde_json::json!({
//!     "tsconfig": "tsconfig.build.json",
//!     "minify": "syntax"
//! }))?;
//! let plugin = OxcPlugin::builder(options)
//!     .preserve_directives(Arc::new(DirectivePreserver::new()))
//!     .build()?;
//! # let _ = plugin;
//! # Ok(())
//! # }
//! ```
//!
//! Configuration discovery never fails a build: a missing or malformed
//! tsconfig produces a warning and the module is compiled with defaults.
//! Parse and transform errors are fatal for the module.

mod compile;
mod error;
mod minify;
mod options;
mod plugin;
mod resolve;
mod sourcemap;
mod typescript;

#[cfg(feature = "logging")]
pub mod logging;

pub use compile::{
    compile, CompileOptions, CompileOutput, DecoratorConfig, JsxConfig, JsxRuntimeKind,
    SourceLang,
};
pub use error::{PluginError, Result};
pub use minify::{minify, MinifyLevel};
pub use options::{
    merge_layers, Filter, PluginOptions, DEFAULT_EXCLUDE, DEFAULT_EXTENSIONS, DEFAULT_INCLUDE,
};
pub use plugin::{MinifyPlugin, OxcPlugin, OxcPluginBuilder, TransformedModule};

pub use plugin_oxc_directive::{DirectivePreserver, PreserveDirectivesPlugin};
pub use plugin_oxc_runtime::{NativeRuntime, Runtime};
pub use plugin_oxc_tsconfig::{
    CompilerOptionsView, ConfigResolver, ConfigWarning, DiagnosticSink, TsconfigSelector,
    WarningCollector,
};

/// Warning codes reported through the bundler's diagnostic channel
pub mod codes {
    pub use plugin_oxc_tsconfig::codes::*;

    pub const TYPESCRIPT_NOT_FOUND: &str = "TYPESCRIPT_NOT_FOUND";
}
