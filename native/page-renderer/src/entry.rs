//! Entry unit extraction.
//!
//! Finds the one symbol the generated page exposes, binds it to a plain
//! script-level name and removes every module-export form, since the unit is
//! executed as a function body rather than as a module.

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde::Serialize;
use tracing::debug;

lazy_static! {
    static ref CLIENT_DIRECTIVE: Regex =
        Regex::new(r#"^\s*(?:'use client'|"use client")[ \t]*;?[ \t]*\r?\n?"#).unwrap();

    static ref DEFAULT_FUNCTION: Regex = Regex::new(
        r"(?m)^[ \t]*export\s+default\s+((?:async\s+)?function\s*\*?\s*([A-Za-z_$][\w$]*)\s*[(<])"
    )
    .unwrap();
    static ref DEFAULT_IDENTIFIER: Regex =
        Regex::new(r"(?m)^[ \t]*export\s+default\s+([A-Za-z_$][\w$]*)[ \t]*;?[ \t]*$").unwrap();
    static ref DEFAULT_CLASS: Regex =
        Regex::new(r"(?m)^[ \t]*export\s+default\s+(class\s+([A-Za-z_$][\w$]*))").unwrap();
    static ref DEFAULT_ANONYMOUS: Regex = Regex::new(r"(?m)^[ \t]*export\s+default\s+").unwrap();
    /// Any `export default` still present once the entry has been taken.
    static ref DEFAULT_LEFTOVER: Regex = Regex::new(
        r"(?m)^([ \t]*)export\s+default\s+((?:async\s+)?function\b|class\b)?"
    )
    .unwrap();

    static ref CONST_DECLARATION: Regex =
        Regex::new(r"\bconst\s+([A-Za-z_$][\w$]*)\s*(?::[^=\n]+)?=\s*\(").unwrap();
    static ref FUNCTION_DECLARATION: Regex =
        Regex::new(r"\bfunction\s+([A-Za-z_$][\w$]*)\s*\(").unwrap();

    static ref EXPORT_DECLARATION: Regex = Regex::new(
        r"(?m)^([ \t]*)export\s+((?:const|let|var|function|async|class|interface|type|enum|abstract|declare)\b)"
    )
    .unwrap();
    static ref EXPORT_LIST: Regex = Regex::new(
        r#"(?m)^[ \t]*export\s+(?:type\s+)?\{[^}]*\}\s*(?:from\s*["'][^"']*["'])?[ \t]*;?[ \t]*$"#
    )
    .unwrap();
    static ref EXPORT_STAR: Regex = Regex::new(
        r#"(?m)^[ \t]*export\s*\*\s*(?:as\s+[A-Za-z_$][\w$]*\s+)?from\s*["'][^"']*["'][ \t]*;?[ \t]*$"#
    )
    .unwrap();
}

/// Words that can follow `export default` without naming a binding.
const NON_BINDING_WORDS: &[&str] = &[
    "function", "class", "async", "new", "null", "undefined", "true", "false", "this",
    "typeof", "void", "await", "yield",
];

/// Which form the entry was recognised from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EntryForm {
    DefaultFunction,
    DefaultIdentifier,
    DefaultClass,
    AnonymousDefault,
    ConstDeclaration,
    FunctionDeclaration,
    Fabricated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryOutcome {
    pub body: String,
    pub entry_name: String,
    pub form: EntryForm,
}

pub fn strip_client_directive(source: &str) -> String {
    CLIENT_DIRECTIVE.replace(source, "").into_owned()
}

pub fn extract_entry(body: &str, fallback_name: &str) -> EntryOutcome {
    let (body, entry_name, form) = locate_entry(body, fallback_name);
    let body = strip_module_exports(&body);
    debug!(entry = %entry_name, ?form, "extracted entry unit");
    EntryOutcome {
        body,
        entry_name,
        form,
    }
}

fn locate_entry(body: &str, fallback_name: &str) -> (String, String, EntryForm) {
    if let Some((rewritten, name)) = drop_export_prefix(&DEFAULT_FUNCTION, body) {
        return (rewritten, name, EntryForm::DefaultFunction);
    }

    let named_default = DEFAULT_IDENTIFIER
        .captures_iter(body)
        .find(|caps| !NON_BINDING_WORDS.contains(&&caps[1]));
    if let Some((whole, name)) = named_default.and_then(|caps| Some((caps.get(0)?, caps[1].to_string()))) {
        let rewritten = format!("{}{}", &body[..whole.start()], &body[whole.end()..]);
        return (rewritten, name, EntryForm::DefaultIdentifier);
    }

    if let Some((rewritten, name)) = drop_export_prefix(&DEFAULT_CLASS, body) {
        return (rewritten, name, EntryForm::DefaultClass);
    }

    if let Some(m) = DEFAULT_ANONYMOUS.find(body) {
        let rewritten = format!(
            "{}const {} = {}",
            &body[..m.start()],
            fallback_name,
            &body[m.end()..]
        );
        return (rewritten, fallback_name.to_string(), EntryForm::AnonymousDefault);
    }

    if let Some(caps) = CONST_DECLARATION.captures(body) {
        return (body.to_string(), caps[1].to_string(), EntryForm::ConstDeclaration);
    }

    if let Some(caps) = FUNCTION_DECLARATION.captures(body) {
        return (body.to_string(), caps[1].to_string(), EntryForm::FunctionDeclaration);
    }

    let mut fabricated = body.trim_end().to_string();
    if !fabricated.is_empty() {
        fabricated.push('\n');
    }
    fabricated.push_str(&format!("const {} = () => null;\n", fallback_name));
    (fabricated, fallback_name.to_string(), EntryForm::Fabricated)
}

/// Cuts `export default ` in front of the declaration captured by group 1,
/// returning the rewritten text and the name captured by group 2.
fn drop_export_prefix(pattern: &Regex, body: &str) -> Option<(String, String)> {
    let caps = pattern.captures(body)?;
    let whole = caps.get(0)?;
    let decl = caps.get(1)?;
    let name = caps.get(2)?.as_str().to_string();
    Some((
        format!("{}{}", &body[..whole.start()], &body[decl.start()..]),
        name,
    ))
}

/// Removes module-export syntax the script form cannot carry. A leftover
/// default export keeps its declaration; a leftover default expression is
/// evaluated and discarded.
pub fn strip_module_exports(body: &str) -> String {
    let body = EXPORT_LIST.replace_all(body, "");
    let body = EXPORT_STAR.replace_all(&body, "");
    let body = EXPORT_DECLARATION.replace_all(&body, "$1$2");
    DEFAULT_LEFTOVER
        .replace_all(&body, |caps: &Captures| match caps.get(2) {
            Some(decl) => format!("{}{}", &caps[1], decl.as_str()),
            None => format!("{}void ", &caps[1]),
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FALLBACK: &str = "WebsitePage";

    #[test]
    fn test_client_directive_removed() {
        assert_eq!(strip_client_directive("'use client';\nconst a = 1;"), "const a = 1;");
        assert_eq!(strip_client_directive("  \"use client\"\nconst a = 1;"), "const a = 1;");
        assert_eq!(strip_client_directive("const a = 'use client';"), "const a = 'use client';");
    }

    #[test]
    fn test_default_function() {
        let out = extract_entry("export default function Page() { return null; }", FALLBACK);
        assert_eq!(out.entry_name, "Page");
        assert_eq!(out.form, EntryForm::DefaultFunction);
        assert_eq!(out.body, "function Page() { return null; }");

        let out = extract_entry("export default async function Landing() {}", FALLBACK);
        assert_eq!(out.entry_name, "Landing");
        assert_eq!(out.body, "async function Landing() {}");
    }

    #[test]
    fn test_default_identifier_statement_deleted() {
        let out = extract_entry("const Home = () => null;\nexport default Home;\n", FALLBACK);
        assert_eq!(out.entry_name, "Home");
        assert_eq!(out.form, EntryForm::DefaultIdentifier);
        assert!(!out.body.contains("export"));
        assert!(out.body.contains("const Home = () => null;"));
    }

    #[test]
    fn test_anonymous_default_bound_to_fallback() {
        let out = extract_entry("export default function () { return null; }", FALLBACK);
        assert_eq!(out.entry_name, FALLBACK);
        assert_eq!(out.form, EntryForm::AnonymousDefault);
        assert_eq!(out.body, "const WebsitePage = function () { return null; }");

        let out = extract_entry("const Inner = () => null;\nexport default memo(Inner);", FALLBACK);
        assert_eq!(out.entry_name, FALLBACK);
        assert!(out.body.contains("const WebsitePage = memo(Inner);"));
    }

    #[test]
    fn test_default_class() {
        let out = extract_entry("export default class Shop extends React.Component {}", FALLBACK);
        assert_eq!(out.entry_name, "Shop");
        assert_eq!(out.body, "class Shop extends React.Component {}");
    }

    #[test]
    fn test_const_and_function_heuristics() {
        let out = extract_entry("const Landing: React.FC = () => null;", FALLBACK);
        assert_eq!(out.entry_name, "Landing");
        assert_eq!(out.form, EntryForm::ConstDeclaration);

        let out = extract_entry("function Gallery() { return null; }", FALLBACK);
        assert_eq!(out.entry_name, "Gallery");
        assert_eq!(out.form, EntryForm::FunctionDeclaration);
    }

    #[test]
    fn test_fabricated_entry_when_nothing_matches() {
        let out = extract_entry("let x = 1;", FALLBACK);
        assert_eq!(out.entry_name, FALLBACK);
        assert_eq!(out.form, EntryForm::Fabricated);
        assert!(out.body.ends_with("const WebsitePage = () => null;\n"));

        let out = extract_entry("", FALLBACK);
        assert_eq!(out.body, "const WebsitePage = () => null;\n");
    }

    #[test]
    fn test_remaining_exports_stripped() {
        let src = "export const Hero = () => null;\nexport interface Props { a: string }\nexport { Hero as Banner };\nexport * from './other';\nexport default function Page() { return null; }\n";
        let out = extract_entry(src, FALLBACK);
        assert_eq!(out.entry_name, "Page");
        assert!(!out.body.contains("export"), "got: {}", out.body);
        assert!(out.body.contains("const Hero = () => null;"));
        assert!(out.body.contains("interface Props"));
    }

    #[test]
    fn test_export_text_inside_strings_is_not_the_entry() {
        let src = "const s = 'export default function Fake(';\nexport default function Real() { return null; }\n";
        let out = extract_entry(src, FALLBACK);
        assert_eq!(out.entry_name, "Real");
        assert_eq!(out.form, EntryForm::DefaultFunction);
        assert!(out.body.contains("const s = 'export default function Fake(';"));
        assert!(out.body.contains("\nfunction Real()"), "got: {}", out.body);
    }

    #[test]
    fn test_second_default_export_is_neutralised() {
        let src = "export default function Page() { return null; }\nexport default function Other() { return null; }\nexport default 42;\n";
        let out = extract_entry(src, FALLBACK);
        assert_eq!(out.entry_name, "Page");
        assert!(!out.body.lines().any(|l| l.trim_start().starts_with("export")), "got: {}", out.body);
        assert!(out.body.contains("function Other()"));
        assert!(out.body.contains("void 42;"));
    }
}
