//! Directive preservation for bundled output
//!
//! Leading directives such as `"use client"` or a `#!/usr/bin/env node`
//! shebang only mean something at the top of a file. Compilers and
//! bundlers tend to drop or bury them, so this crate lifts them out of each
//! module before compilation and puts the relevant ones back at the top of
//! each finished chunk.
//!
//! ```text
//! transform(foo.ts)  "use client"; "use sukka"; ...  ─┐
//! transform(bar.ts)  "use client"; ...               ─┤  DirectivePreserver
//!                                                      │
//! render_chunk([foo.ts, bar.ts])  ◄────────────────────┘
//!   'use client';
//!   'use sukka';
//!   <chunk body>
//! ```
//!
//! [`DirectivePreserver`] holds the registry and does the work;
//! [`PreserveDirectivesPlugin`] wires it into Rolldown's `transform` and
//! `render_chunk` hooks.

mod plugin;
mod preserver;
pub mod scan;

pub use plugin::PreserveDirectivesPlugin;
pub use preserver::{DirectivePreserver, RenderedChunk};
pub use scan::Extraction;
