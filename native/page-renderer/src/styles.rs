//! Scoped style islands (`<style jsx>{`...`}</style>`) rewritten into plain
//! style elements whose CSS is injected as raw HTML content. String payloads
//! (`{"..."}` or `{'...'}`) are accepted as well.

use lazy_static::lazy_static;
use regex::{Captures, Regex};

lazy_static! {
    /// `<style jsx>{`...`}</style>` and `<style jsx global>{`...`}</style>`.
    /// The payload group honours escape sequences so an escaped backtick does
    /// not end the template early.
    static ref SCOPED_STYLE: Regex = Regex::new(
        r"<style\s+jsx(?:=\{true\})?(?:\s+global(?:=\{true\})?)?\s*>\s*\{\s*`((?:\\[\s\S]|[^`\\])*)`\s*\}\s*</style\s*>"
    )
    .unwrap();
    static ref SCOPED_STYLE_STRING: Regex = Regex::new(
        r#"<style\s+jsx(?:=\{true\})?(?:\s+global(?:=\{true\})?)?\s*>\s*\{\s*(?:"((?:\\[\s\S]|[^"\\])*)"|'((?:\\[\s\S]|[^'\\])*)')\s*\}\s*</style\s*>"#
    )
    .unwrap();
    static ref STYLE_OPEN_TAG: Regex = Regex::new(r"<style\b([^>]*)>").unwrap();
    static ref STYLE_FLAG: Regex =
        Regex::new(r"\s+(?:jsx|global)(?:=\{true\})?(\s|/|$)").unwrap();
}

pub fn normalize_style_blocks(source: &str) -> String {
    let rewritten = SCOPED_STYLE.replace_all(source, |caps: &Captures| raw_style_element(&caps[1]));
    let rewritten = SCOPED_STYLE_STRING.replace_all(&rewritten, |caps: &Captures| {
        let payload = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
        raw_style_element(payload)
    });

    STYLE_OPEN_TAG
        .replace_all(&rewritten, |caps: &Captures| {
            // Already rewritten above; the CSS may contain `>` so leave it whole.
            if caps[1].contains("dangerouslySetInnerHTML") {
                return caps[0].to_string();
            }
            let mut attrs = caps[1].to_string();
            loop {
                let next = STYLE_FLAG.replace_all(&attrs, "$1").into_owned();
                if next == attrs {
                    break;
                }
                attrs = next;
            }
            format!("<style{}>", attrs)
        })
        .into_owned()
}

fn raw_style_element(payload: &str) -> String {
    let css = cook_payload(payload);
    format!(
        "<style dangerouslySetInnerHTML={{{{ __html: `{}` }}}} />",
        escape_template_payload(&css)
    )
}

/// Resolves the escapes a string or template literal would apply, so the
/// payload is the CSS text the author meant.
fn cook_payload(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('`') => out.push('`'),
            Some('\'') => out.push('\''),
            Some('"') => out.push('"'),
            Some('$') => out.push('$'),
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

fn escape_template_payload(css: &str) -> String {
    css.replace('\\', "\\\\")
        .replace('`', "\\`")
        .replace("${", "\\${")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scoped_block_becomes_raw_html_style() {
        let src = "<div><style jsx>{`\n.hero { color: red; }\n`}</style></div>";
        let out = normalize_style_blocks(src);
        assert_eq!(
            out,
            "<div><style dangerouslySetInnerHTML={{ __html: `\n.hero { color: red; }\n` }} /></div>"
        );
    }

    #[test]
    fn test_global_flag_is_dropped() {
        let out = normalize_style_blocks("<style jsx global>{`body { margin: 0 }`}</style>");
        assert!(!out.contains("global"));
        assert!(!out.contains(" jsx"));
        assert!(out.contains("__html: `body { margin: 0 }`"));
    }

    #[test]
    fn test_escaped_backtick_survives_round_trip() {
        let src = r#"<style jsx>{`.q::before { content: "\`"; }`}</style>"#;
        let out = normalize_style_blocks(src);
        assert!(out.contains(r#"content: "\`";"#), "got: {}", out);
        assert!(!out.contains("jsx"));
    }

    #[test]
    fn test_interpolation_marker_is_escaped() {
        let out = normalize_style_blocks("<style jsx>{`.a { width: ${w}px }`}</style>");
        assert!(out.contains(r"\${w}px"), "got: {}", out);
    }

    #[test]
    fn test_string_payloads_are_rewritten() {
        let out = normalize_style_blocks(r#"<style jsx>{'.a::after { content: \'x\' }'}</style>"#);
        assert_eq!(
            out,
            "<style dangerouslySetInnerHTML={{ __html: `.a::after { content: 'x' }` }} />"
        );
        let out = normalize_style_blocks(r#"<style jsx global>{"body { color: red }"}</style>"#);
        assert!(out.contains("__html: `body { color: red }`"), "got: {}", out);
    }

    #[test]
    fn test_leftover_flags_removed_from_other_style_tags() {
        let out = normalize_style_blocks("<style jsx global>{css}</style>");
        assert_eq!(out, "<style>{css}</style>");
    }

    #[test]
    fn test_plain_markup_untouched() {
        let src = "<section className='jsx'><style>{'a{}'}</style></section>";
        assert_eq!(normalize_style_blocks(src), src);
    }
}
