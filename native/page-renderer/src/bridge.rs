//! JSON bridge for the Node host.
//!
//! The plain functions here build the JSON payloads; the `#[napi]` wrappers
//! only exist with the `napi` feature.

use lazy_static::lazy_static;
use serde::Serialize;
use serde_json::Value;

use crate::config::RendererConfig;
use crate::error::RenderError;
use crate::pipeline::Pipeline;
use crate::sanitize::sanitize_source;
use crate::surface::{PipelineState, SurfaceView};

#[cfg(feature = "napi")]
use crate::content::is_likely_page_source;
#[cfg(feature = "napi")]
use napi_derive::napi;

lazy_static! {
    static ref SHARED_PIPELINE: Pipeline = Pipeline::new(RendererConfig::default());
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderOutput {
    pub state: PipelineState,
    pub view: SurfaceView,
}

pub fn render_output(pipeline: &Pipeline, code: &str, show_code_panel: bool) -> RenderOutput {
    let state = pipeline.run(code);
    let view = SurfaceView::render(&state, show_code_panel);
    RenderOutput { state, view }
}

pub fn render_page_source_json(code: &str, show_code_panel: bool) -> Result<Value, serde_json::Error> {
    serde_json::to_value(render_output(&SHARED_PIPELINE, code, show_code_panel))
}

pub fn sanitize_page_source_json(code: &str) -> Result<Value, RenderError> {
    let sanitized = sanitize_source(code, SHARED_PIPELINE.config())?;
    serde_json::to_value(&sanitized).map_err(|e| RenderError::runtime(e.to_string()))
}

#[cfg(feature = "napi")]
#[napi]
pub fn render_page_source_native(code: String, show_code_panel: Option<bool>) -> napi::Result<Value> {
    render_page_source_json(&code, show_code_panel.unwrap_or(false))
        .map_err(|e| napi::Error::from_reason(e.to_string()))
}

#[cfg(feature = "napi")]
#[napi]
pub fn render_page_sources_native(codes: Vec<String>) -> napi::Result<Value> {
    let refs: Vec<&str> = codes.iter().map(String::as_str).collect();
    serde_json::to_value(SHARED_PIPELINE.run_many(&refs))
        .map_err(|e| napi::Error::from_reason(e.to_string()))
}

#[cfg(feature = "napi")]
#[napi]
pub fn sanitize_page_source_native(code: String) -> napi::Result<Value> {
    sanitize_page_source_json(&code).map_err(|e| napi::Error::from_reason(e.to_string()))
}

#[cfg(feature = "napi")]
#[napi]
pub fn is_likely_page_source_native(value: Option<String>) -> bool {
    is_likely_page_source(value.as_deref())
}
