//! Sanitization: the text-level half of the pipeline.
//!
//! Directive removal, style normalization, reference scanning, prelude
//! synthesis and entry extraction, in that order. The result carries no
//! import declarations and no export syntax.

use serde::Serialize;
use tracing::debug;

use crate::config::RendererConfig;
use crate::entry::{extract_entry, strip_client_directive, EntryForm};
use crate::error::RenderError;
use crate::references::{scan_references, ReferenceDeclaration};
use crate::stubs::{build_fallback_prelude, build_runtime_bindings};
use crate::styles::normalize_style_blocks;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SanitizedSource {
    pub prelude: String,
    pub body: String,
    pub entry_name: String,
    pub entry_form: EntryForm,
    pub declarations: Vec<ReferenceDeclaration>,
}

impl SanitizedSource {
    pub fn text(&self) -> String {
        format!("{}{}", self.prelude, self.body)
    }

    /// The sanitized text re-exported as a module, suitable for feeding back
    /// through [`sanitize_source`].
    pub fn as_module_source(&self) -> String {
        let mut text = self.text();
        if !text.ends_with('\n') {
            text.push('\n');
        }
        text.push_str(&format!("export default {};\n", self.entry_name));
        text
    }
}

pub fn sanitize_source(code: &str, config: &RendererConfig) -> Result<SanitizedSource, RenderError> {
    let without_directive = strip_client_directive(code);
    let styled = normalize_style_blocks(&without_directive);
    let scan = scan_references(&styled, config)?;
    let mut prelude = build_runtime_bindings(&scan.runtime_bindings);
    prelude.push_str(&build_fallback_prelude(&scan.symbols, config));
    let entry = extract_entry(&scan.body, &config.fallback_entry_name);

    debug!(
        entry = %entry.entry_name,
        stubs = scan.symbols.len(),
        prelude_bytes = prelude.len(),
        "sanitized generated source"
    );

    Ok(SanitizedSource {
        prelude,
        body: entry.body,
        entry_name: entry.entry_name,
        entry_form: entry.form,
        declarations: scan.declarations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitized_text_has_no_module_syntax() {
        let code = "'use client';\nimport { Button } from '@/components/ui/button';\nimport { Star } from 'lucide-react';\n\nexport default function Page() {\n  return <Button><Star /></Button>;\n}\n";
        let out = sanitize_source(code, &RendererConfig::default()).unwrap();
        let text = out.text();
        assert_eq!(out.entry_name, "Page");
        assert!(!text.contains("import "));
        assert!(!text.contains("export "));
        assert!(!text.contains("use client"));
        assert!(out.prelude.contains("const Button = __createStubComponent(\"Button\");"));
        assert!(out.prelude.contains("const Star = __createIconStub("));
        assert_eq!(out.declarations.len(), 2);
    }

    #[test]
    fn test_module_source_round_trips_with_empty_prelude() {
        let code = "import Hero from './Hero';\nexport default function Page() { return <Hero />; }";
        let config = RendererConfig::default();
        let first = sanitize_source(code, &config).unwrap();
        let second = sanitize_source(&first.as_module_source(), &config).unwrap();
        assert_eq!(second.prelude, "");
        assert_eq!(second.entry_name, first.entry_name);
        assert_eq!(second.entry_form, EntryForm::DefaultIdentifier);
        assert!(second.declarations.is_empty());
    }

    #[test]
    fn test_runtime_imports_bound_ahead_of_stubs() {
        let code = "import { createContext, memo as pure } from 'react';\nimport { Hero } from '@/ui';\nexport default function Page() { return <Hero />; }";
        let out = sanitize_source(code, &RendererConfig::default()).unwrap();
        assert!(out.prelude.starts_with("const { createContext, memo: pure } = React;\n"), "got: {}", out.prelude);
        assert!(out.prelude.contains("const Hero = __createStubComponent(\"Hero\");"));
        assert_eq!(out.entry_name, "Page");
    }

    #[test]
    fn test_malformed_reference_fails() {
        let err = sanitize_source("import { A as } from './a';\n", &RendererConfig::default())
            .unwrap_err();
        assert!(matches!(err, RenderError::MalformedReference { .. }));
    }
}
