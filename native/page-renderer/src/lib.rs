//! # Page Renderer Native
//!
//! Renders untrusted, AI-generated TSX page sources into preview markup.
//!
//! ## Pipeline
//!
//! 1. **Format**: pretty-print the source. Soft stage: on failure the original
//!    text is kept and a warning travels with the state.
//! 2. **Sanitize**: drop the `'use client'` directive, rewrite scoped style
//!    islands, remove every `import` and bind a stand-in for each imported
//!    symbol, then locate the single entry unit and strip export syntax.
//! 3. **Lower**: wrap the sanitized text in a function body that receives the
//!    runtime handle, lower JSX to `React.createElement` and erase TypeScript.
//! 4. **Execute**: evaluate the unit in a fresh JavaScript context, check it
//!    returned something callable and render it to markup.
//!
//! Stages 2-4 are hard: any failure moves the surface to `Error` with the
//! failure message. Every input ends in `Ready` or `Error`.
//!
//! ## Isolation
//!
//! Each run gets its own engine context on its own worker thread. The unit
//! sees nothing but the runtime handle passed as its only parameter and a
//! silent `console`; there is no DOM, network or filesystem inside.

mod bridge;
mod cache;
mod config;
mod content;
mod entry;
mod error;
mod format;
mod harness;
mod icons;
mod jsx_lowerer;
mod markup;
mod pipeline;
mod references;
mod sandbox;
mod sanitize;
mod stubs;
mod styles;
mod surface;

#[cfg(test)]
mod scenario_tests;

pub use bridge::{render_output, render_page_source_json, sanitize_page_source_json, RenderOutput};
pub use cache::SanitizeCache;
pub use config::{RendererConfig, DEFAULT_ENTRY_NAME, DEFAULT_IMAGE_PLACEHOLDER, ICON_MODULES};
pub use content::is_likely_page_source;
pub use entry::{extract_entry, strip_client_directive, strip_module_exports, EntryForm, EntryOutcome};
pub use error::{FailureStage, RenderError};
pub use format::{format_source, FormatOutcome, FORMAT_WARNING};
pub use harness::{assemble_executable, lower_executable};
pub use icons::{icon_path, is_icon_module, DEFAULT_ICON_PATH};
pub use markup::{inspect_markup, MarkupSummary};
pub use pipeline::Pipeline;
pub use references::{
    classify_symbol, collect_runtime_bindings, parse_reference_declaration, scan_references,
    ClassificationSet, ClassifiedSymbol, NamedSymbol, ReferenceDeclaration, RuntimeBinding,
    ScanOutcome, SymbolKind,
};
pub use sandbox::Sandbox;
pub use sanitize::{sanitize_source, SanitizedSource};
pub use stubs::{build_fallback_prelude, build_runtime_bindings};
pub use styles::normalize_style_blocks;
pub use surface::{PipelineState, PipelineStatus, RenderSurface, RenderedUnit, SurfaceView};

#[cfg(feature = "napi")]
pub use bridge::{
    is_likely_page_source_native, render_page_source_native, render_page_sources_native,
    sanitize_page_source_native,
};
