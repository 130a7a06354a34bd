//! Structural summary of rendered markup.
//!
//! The rendered unit is parsed back with html5ever so callers (and the logs)
//! can see what actually came out: its visible text, how many elements it
//! produced and which stand-ins ended up on screen.

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use serde::Serialize;
use tracing::warn;

pub const STUB_MARKER_ATTR: &str = "data-ai-stub";
pub const ICON_MARKER_ATTR: &str = "data-ai-icon";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkupSummary {
    /// Visible text with whitespace runs collapsed to single spaces.
    pub text: String,
    pub element_count: usize,
    /// `data-ai-stub` values in document order.
    pub stub_markers: Vec<String>,
    /// `data-ai-icon` values in document order.
    pub icon_markers: Vec<String>,
}

impl MarkupSummary {
    pub fn is_empty(&self) -> bool {
        self.element_count == 0 && self.text.is_empty()
    }
}

pub fn inspect_markup(html: &str) -> MarkupSummary {
    if html.trim().is_empty() {
        return MarkupSummary::default();
    }

    let dom = match parse_document(RcDom::default(), Default::default())
        .from_utf8()
        .read_from(&mut html.as_bytes())
    {
        Ok(dom) => dom,
        Err(e) => {
            warn!(error = %e, "rendered markup could not be parsed");
            return MarkupSummary::default();
        }
    };

    let mut summary = MarkupSummary::default();
    let mut text = String::new();
    collect(&dom.document, &mut summary, &mut text);
    summary.text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    summary
}

fn collect(node: &Handle, summary: &mut MarkupSummary, text: &mut String) {
    match &node.data {
        NodeData::Text { contents } => {
            text.push_str(&contents.borrow());
            text.push(' ');
        }
        NodeData::Element { name, attrs, .. } => {
            let tag = name.local.to_string();
            // html, head and body are supplied by the document parser
            if !matches!(tag.as_str(), "html" | "head" | "body") {
                summary.element_count += 1;
            }
            for attr in attrs.borrow().iter() {
                let attr_name = attr.name.local.to_string();
                if attr_name == STUB_MARKER_ATTR {
                    summary.stub_markers.push(attr.value.to_string());
                } else if attr_name == ICON_MARKER_ATTR {
                    summary.icon_markers.push(attr.value.to_string());
                }
            }
            if matches!(tag.as_str(), "style" | "script") {
                return;
            }
            for child in node.children.borrow().iter() {
                collect(child, summary, text);
            }
        }
        NodeData::Document => {
            for child in node.children.borrow().iter() {
                collect(child, summary, text);
            }
        }
        _ => {}
    }
}
