//! Compiler configuration discovery for plugin-oxc
//!
//! Locates the `tsconfig.json` (or `jsconfig.json`) that governs a source
//! directory, follows its `extends` chain, normalizes `baseUrl`/`paths`, and
//! keeps the result for the rest of the build.
//!
//! ```text
//! directory ──► cache? ──hit──► Arc<CompilerOptionsView>
//!                  │
//!                 miss
//!                  ▼
//!     search upward ─► load file ─► follow extends ─► merge (child wins)
//!                  ▼
//!     extract known fields, absolutize baseUrl ─► cache ─► return
//! ```
//!
//! Discovery never fails the build. A missing file produces a
//! `TSCONFIG_NOT_FOUND` warning and an empty view; a malformed file is
//! skipped as if it did not exist.
//!
//! ## Example
//!
//! ```rust,no_run
//! use plugin_oxc_runtime::NativeRuntime;
//! use plugin_oxc_tsconfig::{ConfigResolver, TsconfigSelector, WarningCollector};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let resolver = ConfigResolver::new(Arc::new(NativeRuntime::new()));
//! let warnings = WarningCollector::new();
//! let options = resolver
//!     .resolve(Path::new("/project/src"), &TsconfigSelector::Discover, &warnings)
//!     .await;
//! println!("jsxFactory = {:?}", options.jsx_factory);
//! # }
//! ```

mod diagnostics;
mod error;
pub mod jsonc;
mod loader;
mod options;
mod resolver;

pub use diagnostics::{codes, ConfigWarning, DiagnosticSink, WarningCollector};
pub use error::{Result, TsconfigError};
pub use options::{CompilerOptionsView, JsxMode, PathAliases};
pub use resolver::{ConfigResolver, TsconfigSelector, JSCONFIG_JSON, TSCONFIG_JSON};
