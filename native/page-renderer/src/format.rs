//! Cosmetic pretty-printing of generated sources.
//!
//! Formatting is never a correctness gate: any failure hands back the original
//! text together with a warning and the pipeline carries on.

use oxc_allocator::Allocator;
use oxc_codegen::{Codegen, CodegenOptions};
use oxc_parser::Parser;
use oxc_span::SourceType;
use serde::Serialize;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, warn};

pub const FORMAT_WARNING: &str =
    "The generated code could not be formatted. The original version is shown instead.";

/// Result of [`format_source`]. The text is oxc codegen output: single quotes
/// and semicolons, but no trailing commas, so it is close to Prettier style
/// without being byte-identical to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatOutcome {
    pub text: String,
    pub warning: Option<String>,
}

impl FormatOutcome {
    fn unchanged(source: &str, warning: Option<String>) -> Self {
        Self {
            text: source.to_string(),
            warning,
        }
    }
}

pub fn format_source(source: &str) -> FormatOutcome {
    if source.trim().is_empty() {
        return FormatOutcome::unchanged(source, None);
    }

    match panic::catch_unwind(AssertUnwindSafe(|| reprint(source))) {
        Ok(Ok(text)) => FormatOutcome {
            text,
            warning: None,
        },
        Ok(Err(reason)) => {
            warn!(%reason, "could not format generated TSX");
            FormatOutcome::unchanged(source, Some(FORMAT_WARNING.to_string()))
        }
        Err(_) => {
            warn!("formatter panicked on generated TSX");
            FormatOutcome::unchanged(source, Some(FORMAT_WARNING.to_string()))
        }
    }
}

fn reprint(source: &str) -> Result<String, String> {
    let allocator = Allocator::default();
    let source_type = SourceType::tsx();
    let ret = Parser::new(&allocator, source, source_type).parse();

    if ret.panicked || !ret.errors.is_empty() {
        let reason = ret
            .errors
            .first()
            .map(|e| e.to_string())
            .unwrap_or_else(|| "parser aborted".to_string());
        return Err(reason);
    }

    let options = CodegenOptions {
        single_quote: true,
        ..CodegenOptions::default()
    };
    let code = Codegen::new().with_options(options).build(&ret.program).code;
    debug!(bytes = code.len(), "formatted generated source");
    Ok(code)
}
