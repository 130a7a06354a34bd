//! Reference scanning: finds every `import` declaration in a generated
//! source, removes it, and classifies each bound local symbol so the stub
//! synthesizer knows what kind of stand-in it needs.
//!
//! ## Classification order
//!
//! 1. `Image` → media stand-in
//! 2. `Link` → navigation stand-in
//! 3. `use` + capitalised suffix → stateful capability (hook)
//! 4. capitalised, imported from an icon library → icon
//! 5. capitalised → component
//! 6. `cn` → class-name utility
//! 7. anything else → plain value
//!
//! `* as X` always yields a namespace proxy. The first classification of a
//! local name wins. This is a naming-convention heuristic; no type
//! information is available for generated code.

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

use crate::config::RendererConfig;
use crate::error::RenderError;
use crate::icons::is_icon_module;

pub const MEDIA_SYMBOL: &str = "Image";
pub const NAVIGATION_SYMBOL: &str = "Link";
pub const UTILITY_SYMBOL: &str = "cn";
/// Name the injected runtime handle is bound to inside a unit.
pub const RUNTIME_HANDLE: &str = "React";

lazy_static! {
    static ref IMPORT_FROM: Regex = Regex::new(
        r#"(?m)^[ \t]*import\s+([^;'"]+?)\s+from\s*["']([^"']+)["'][ \t]*;?[ \t]*$"#
    )
    .unwrap();
    static ref IMPORT_SIDE_EFFECT: Regex =
        Regex::new(r#"(?m)^[ \t]*import\s*["']([^"']+)["'][ \t]*;?[ \t]*$"#).unwrap();
    static ref SINGLE_FROM: Regex =
        Regex::new(r#"^\s*import\s+([^;'"]+?)\s+from\s*["']([^"']+)["']\s*;?\s*$"#).unwrap();
    static ref SINGLE_SIDE_EFFECT: Regex =
        Regex::new(r#"^\s*import\s*["']([^"']+)["']\s*;?\s*$"#).unwrap();
    static ref IDENTIFIER: Regex = Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").unwrap();
}

// ═══════════════════════════════════════════════════════════════════════════════
// DECLARATIONS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedSymbol {
    pub imported: String,
    pub local: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceDeclaration {
    pub module_name: String,
    pub default_symbol: Option<String>,
    pub named_symbols: Vec<NamedSymbol>,
    pub namespace_symbol: Option<String>,
    /// `import type …`: erased at compile time, binds nothing.
    pub type_only: bool,
}

impl ReferenceDeclaration {
    pub fn is_side_effect_only(&self) -> bool {
        self.default_symbol.is_none()
            && self.named_symbols.is_empty()
            && self.namespace_symbol.is_none()
    }
}

/// Parses a single reference declaration statement.
pub fn parse_reference_declaration(statement: &str) -> Result<ReferenceDeclaration, RenderError> {
    if let Some(caps) = SINGLE_SIDE_EFFECT.captures(statement) {
        return Ok(ReferenceDeclaration {
            module_name: caps[1].trim().to_string(),
            ..ReferenceDeclaration::default()
        });
    }

    let caps = SINGLE_FROM
        .captures(statement)
        .ok_or_else(|| malformed(statement, "not an import declaration"))?;

    let mut decl = ReferenceDeclaration {
        module_name: caps[2].trim().to_string(),
        ..ReferenceDeclaration::default()
    };

    let mut clause = caps[1].trim();
    if let Some(rest) = clause.strip_prefix("type") {
        if rest.starts_with(char::is_whitespace) || rest.starts_with('{') {
            decl.type_only = true;
            clause = rest.trim_start();
        }
    }

    parse_clause(clause, &mut decl).map_err(|reason| malformed(statement, &reason))?;
    Ok(decl)
}

fn parse_clause(clause: &str, decl: &mut ReferenceDeclaration) -> Result<(), String> {
    let mut rest = clause.trim();

    if !rest.starts_with('{') && !rest.starts_with('*') {
        let (default, tail) = match rest.find(',') {
            Some(i) => (rest[..i].trim(), Some(rest[i + 1..].trim())),
            None => (rest, None),
        };
        expect_identifier(default)?;
        decl.default_symbol = Some(default.to_string());
        match tail {
            None => return Ok(()),
            Some("") => return Err("dangling `,` after default binding".to_string()),
            Some(t) => rest = t,
        }
    }

    if let Some(ns) = rest.strip_prefix('*') {
        let ns = ns
            .trim_start()
            .strip_prefix("as")
            .filter(|r| r.starts_with(char::is_whitespace))
            .ok_or_else(|| "expected `as` after `*`".to_string())?
            .trim();
        expect_identifier(ns)?;
        decl.namespace_symbol = Some(ns.to_string());
        return Ok(());
    }

    if let Some(open) = rest.strip_prefix('{') {
        let inner = open
            .strip_suffix('}')
            .ok_or_else(|| "unbalanced braces in named bindings".to_string())?;
        if inner.contains('{') || inner.contains('}') {
            return Err("unbalanced braces in named bindings".to_string());
        }
        for chunk in inner.split(',') {
            let chunk = chunk.trim();
            if chunk.is_empty() {
                continue;
            }
            let (is_type, binding) = match chunk.strip_prefix("type") {
                Some(r) if r.starts_with(char::is_whitespace) => (true, r.trim()),
                _ => (false, chunk),
            };
            let parts: Vec<&str> = binding.split_whitespace().collect();
            let (imported, local) = match parts.as_slice() {
                [name] => (*name, *name),
                [imported, "as", local] => (*imported, *local),
                _ => return Err(format!("cannot read binding `{}`", chunk)),
            };
            expect_identifier(imported)?;
            expect_identifier(local)?;
            if is_type {
                continue;
            }
            decl.named_symbols.push(NamedSymbol {
                imported: imported.to_string(),
                local: local.to_string(),
            });
        }
        return Ok(());
    }

    Err(format!("unexpected `{}`", rest))
}

fn expect_identifier(name: &str) -> Result<(), String> {
    if IDENTIFIER.is_match(name) {
        Ok(())
    } else {
        Err(format!("`{}` is not a valid binding name", name))
    }
}

fn malformed(statement: &str, reason: &str) -> RenderError {
    RenderError::MalformedReference {
        statement: statement.trim().to_string(),
        reason: reason.to_string(),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CLASSIFICATION
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SymbolKind {
    Component,
    StatefulCapability,
    Icon,
    MediaStandIn,
    NavigationStandIn,
    NamespaceProxy,
    Utility,
    PlainValue,
}

pub fn classify_symbol(local: &str, module_name: &str, config: &RendererConfig) -> SymbolKind {
    if local == MEDIA_SYMBOL {
        return SymbolKind::MediaStandIn;
    }
    if local == NAVIGATION_SYMBOL {
        return SymbolKind::NavigationStandIn;
    }
    if is_hook_name(local) {
        return SymbolKind::StatefulCapability;
    }
    if starts_uppercase(local) {
        if is_icon_module(module_name, config) {
            return SymbolKind::Icon;
        }
        return SymbolKind::Component;
    }
    if local == UTILITY_SYMBOL {
        return SymbolKind::Utility;
    }
    SymbolKind::PlainValue
}

fn is_hook_name(name: &str) -> bool {
    name.strip_prefix("use").map_or(false, starts_uppercase)
}

fn starts_uppercase(name: &str) -> bool {
    name.chars().next().map_or(false, |c| c.is_ascii_uppercase())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedSymbol {
    pub name: String,
    /// Name the symbol has in its module; differs from `name` when aliased.
    pub imported: String,
    pub kind: SymbolKind,
    pub module_name: String,
}

/// Classified symbols in first-seen order, one entry per local name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassificationSet {
    entries: Vec<ClassifiedSymbol>,
    seen: HashSet<String>,
}

impl ClassificationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when the name was already classified.
    pub fn insert(&mut self, name: &str, kind: SymbolKind, module_name: &str) -> bool {
        self.insert_aliased(name, name, kind, module_name)
    }

    /// Like [`ClassificationSet::insert`] for a symbol bound under a local
    /// alias (`import { Star as Rating }`).
    pub fn insert_aliased(
        &mut self,
        name: &str,
        imported: &str,
        kind: SymbolKind,
        module_name: &str,
    ) -> bool {
        if !self.seen.insert(name.to_string()) {
            return false;
        }
        self.entries.push(ClassifiedSymbol {
            name: name.to_string(),
            imported: imported.to_string(),
            kind,
            module_name: module_name.to_string(),
        });
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.seen.contains(name)
    }

    pub fn get(&self, name: &str) -> Option<SymbolKind> {
        self.entries.iter().find(|s| s.name == name).map(|s| s.kind)
    }

    pub fn contains_kind(&self, kind: SymbolKind) -> bool {
        self.entries.iter().any(|s| s.kind == kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClassifiedSymbol> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registers every runtime binding of `decl`. Declarations from the host
    /// runtime's own modules resolve through the injected handle and are skipped.
    pub fn register(&mut self, decl: &ReferenceDeclaration, config: &RendererConfig) {
        if decl.type_only || config.is_runtime_module(&decl.module_name) {
            return;
        }
        let locals = decl
            .default_symbol
            .iter()
            .map(|d| (d, d))
            .chain(decl.named_symbols.iter().map(|s| (&s.local, &s.imported)));
        for (local, imported) in locals {
            let kind = classify_symbol(local, &decl.module_name, config);
            if self.insert_aliased(local, imported, kind, &decl.module_name) {
                debug!(symbol = %local, module = %decl.module_name, ?kind, "classified import");
            }
        }
        if let Some(ns) = &decl.namespace_symbol {
            self.insert(ns, SymbolKind::NamespaceProxy, &decl.module_name);
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SCANNING
// ═══════════════════════════════════════════════════════════════════════════════

/// A binding imported from one of the host runtime's own modules. These are
/// bound from the injected handle instead of being stubbed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum RuntimeBinding {
    /// `import { memo }` or `import { useState as useS }`.
    Member { imported: String, local: String },
    /// `import R from 'react'` or `import * as R from 'react'`.
    Handle { local: String },
}

impl RuntimeBinding {
    pub fn local(&self) -> &str {
        match self {
            RuntimeBinding::Member { local, .. } | RuntimeBinding::Handle { local } => local,
        }
    }
}

/// Collects the runtime bindings of `declarations`, one per local name.
/// Names already classified for stubbing and the handle's own name `React`
/// are left out.
pub fn collect_runtime_bindings(
    declarations: &[ReferenceDeclaration],
    symbols: &ClassificationSet,
    config: &RendererConfig,
) -> Vec<RuntimeBinding> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut bindings = Vec::new();

    for decl in declarations {
        if decl.type_only || !config.is_runtime_module(&decl.module_name) {
            continue;
        }
        let handles = decl
            .default_symbol
            .iter()
            .chain(decl.namespace_symbol.iter())
            .map(|local| RuntimeBinding::Handle {
                local: local.clone(),
            });
        let members = decl.named_symbols.iter().map(|named| {
            if named.imported == "default" {
                RuntimeBinding::Handle {
                    local: named.local.clone(),
                }
            } else {
                RuntimeBinding::Member {
                    imported: named.imported.clone(),
                    local: named.local.clone(),
                }
            }
        });

        for binding in handles.chain(members) {
            let local = binding.local();
            if local == RUNTIME_HANDLE || symbols.contains(local) || !seen.insert(local.to_string()) {
                continue;
            }
            bindings.push(binding);
        }
    }
    bindings
}

#[derive(Debug, Clone)]
pub struct ScanOutcome {
    /// Input text with every reference declaration removed.
    pub body: String,
    pub declarations: Vec<ReferenceDeclaration>,
    pub symbols: ClassificationSet,
    pub runtime_bindings: Vec<RuntimeBinding>,
}

pub fn scan_references(source: &str, config: &RendererConfig) -> Result<ScanOutcome, RenderError> {
    let mut declarations = Vec::new();
    let mut failure: Option<RenderError> = None;

    let without_bound = IMPORT_FROM.replace_all(source, |caps: &Captures| {
        match parse_reference_declaration(&caps[0]) {
            Ok(decl) => declarations.push(decl),
            Err(err) => {
                failure.get_or_insert(err);
            }
        }
        String::new()
    });
    if let Some(err) = failure {
        return Err(err);
    }

    let body = IMPORT_SIDE_EFFECT
        .replace_all(&without_bound, |caps: &Captures| {
            declarations.push(ReferenceDeclaration {
                module_name: caps[1].to_string(),
                ..ReferenceDeclaration::default()
            });
            String::new()
        })
        .into_owned();

    let mut symbols = ClassificationSet::new();
    for decl in &declarations {
        symbols.register(decl, config);
    }
    let runtime_bindings = collect_runtime_bindings(&declarations, &symbols, config);

    debug!(
        declarations = declarations.len(),
        symbols = symbols.len(),
        runtime_bindings = runtime_bindings.len(),
        "scanned reference declarations"
    );

    Ok(ScanOutcome {
        body,
        declarations,
        symbols,
        runtime_bindings,
    })
}
