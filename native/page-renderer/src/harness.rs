//! Execution harness: wraps a sanitized source into a function body that
//! receives the runtime handle, then lowers it to plain JavaScript.
//!
//! The body is parsed as a TSX script with `return` allowed at the top level,
//! JSX is lowered to `React.createElement` calls, TypeScript syntax is erased
//! and the result is printed back out. Nothing from disk (no tsconfig, no
//! babel config) takes part.

use oxc_allocator::Allocator;
use oxc_ast_visit::VisitMut;
use oxc_codegen::Codegen;
use oxc_parser::{ParseOptions, Parser};
use oxc_semantic::SemanticBuilder;
use oxc_span::SourceType;
use oxc_transformer::{TransformOptions, Transformer};
use std::path::Path;
use tracing::debug;

use crate::error::RenderError;
use crate::jsx_lowerer::JsxLowerer;
use crate::sanitize::SanitizedSource;

/// Name of the single parameter through which the runtime reaches the unit.
pub const RUNTIME_PARAM: &str = "__ReactRuntime";

/// Prefix of the error thrown when the entry binding does not exist at all.
pub const MISSING_ENTRY_MARKER: &str = "__missing_entry__:";

const RUNTIME_BINDINGS: &str = "const { Fragment, useState, useEffect, useLayoutEffect, useMemo, useCallback, useRef, useReducer, useId, useContext } = React;";

/// Lays the unit out as a strict function body. The runtime handle and the
/// common hook names are bound in the outer scope; prelude and body sit in an
/// inner block so anything the unit declares shadows them instead of
/// colliding.
pub fn assemble_executable(sanitized: &SanitizedSource) -> String {
    let entry = &sanitized.entry_name;
    let mut out = String::with_capacity(sanitized.prelude.len() + sanitized.body.len() + 512);
    out.push_str("'use strict';\n");
    out.push_str(&format!("const React = {};\n", RUNTIME_PARAM));
    out.push_str(RUNTIME_BINDINGS);
    out.push_str("\n{\n");
    out.push_str(&sanitized.prelude);
    if !sanitized.prelude.is_empty() && !sanitized.prelude.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(&sanitized.body);
    if !sanitized.body.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(&format!(
        "if (typeof {entry} === 'undefined') {{ throw new Error('{marker}{entry}'); }}\nreturn {entry};\n}}\n",
        entry = entry,
        marker = MISSING_ENTRY_MARKER,
    ));
    out
}

pub fn lower_executable(text: &str) -> Result<String, RenderError> {
    let allocator = Allocator::default();
    let source_type = SourceType::tsx().with_module(false).with_script(true);
    let options = ParseOptions {
        allow_return_outside_function: true,
        ..ParseOptions::default()
    };

    let ret = Parser::new(&allocator, text, source_type)
        .with_options(options)
        .parse();
    if ret.panicked || !ret.errors.is_empty() {
        let message = ret
            .errors
            .first()
            .map(|e| e.to_string())
            .unwrap_or_else(|| "the generated code could not be parsed".to_string());
        return Err(RenderError::lowering(message));
    }
    let mut program = ret.program;

    let mut lowerer = JsxLowerer::new(&allocator);
    lowerer.visit_program(&mut program);

    let semantic = SemanticBuilder::new()
        .with_check_syntax_error(true)
        .build(&program);
    if let Some(err) = semantic.errors.first() {
        return Err(RenderError::lowering(err.to_string()));
    }
    let scoping = semantic.semantic.into_scoping();

    let transformed = Transformer::new(&allocator, Path::new("page.tsx"), &TransformOptions::default())
        .build_with_scoping(scoping, &mut program);
    if let Some(err) = transformed.errors.first() {
        return Err(RenderError::lowering(err.to_string()));
    }

    let code = Codegen::new().build(&program).code;
    debug!(
        elements = lowerer.lowered,
        bytes = code.len(),
        "lowered executable unit"
    );
    Ok(code)
}
