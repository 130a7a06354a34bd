//! Tells page sources apart from structured (JSON) page content.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref DEFAULT_EXPORT: Regex = Regex::new(r"export\s+default").unwrap();
    static ref IMPORT_FROM: Regex = Regex::new(r#"import\s+.+from\s+['"][^'"]+['"]"#).unwrap();
}

pub fn is_likely_page_source(value: Option<&str>) -> bool {
    let Some(value) = value else {
        return false;
    };
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.starts_with('{') || trimmed.starts_with('[') {
        return false;
    }
    DEFAULT_EXPORT.is_match(trimmed) || IMPORT_FROM.is_match(trimmed)
}
