//! Synchronous driver for the full format → sanitize → lower → execute chain.
//!
//! [`Pipeline::compile`] is the half shared with the render surface's worker
//! threads; [`Pipeline::run`] drives both halves on the calling thread and
//! always hands back a terminal state.

use rayon::prelude::*;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;
use tracing::{error, info, instrument};

use crate::cache::SanitizeCache;
use crate::config::RendererConfig;
use crate::error::RenderError;
use crate::format::format_source;
use crate::harness::{assemble_executable, lower_executable};
use crate::markup::inspect_markup;
use crate::sanitize::sanitize_source;
use crate::sandbox::Sandbox;
use crate::surface::{PipelineState, RenderedUnit};

pub struct Pipeline {
    config: RendererConfig,
    cache: SanitizeCache,
}

impl Pipeline {
    pub fn new(config: RendererConfig) -> Self {
        let cache = SanitizeCache::new(config.cache_capacity);
        Self { config, cache }
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn cache(&self) -> &SanitizeCache {
        &self.cache
    }

    #[instrument(skip_all, fields(bytes = code.len()))]
    pub fn run(&self, code: &str) -> PipelineState {
        let mut state = PipelineState::formatting();
        state.apply_formatted(format_source(code));
        let formatted = state.formatted_text.clone();
        state.apply_compiled(self.compile_guarded(&formatted));
        state
    }

    /// Renders independent sources in parallel, one sandbox per source.
    pub fn run_many(&self, codes: &[&str]) -> Vec<PipelineState> {
        codes.par_iter().map(|code| self.run(code)).collect()
    }

    /// Same as [`Pipeline::compile`], with a panic inside the engines turned
    /// into an execution failure.
    pub fn compile_guarded(&self, formatted: &str) -> Result<RenderedUnit, RenderError> {
        match panic::catch_unwind(AssertUnwindSafe(|| self.compile(formatted))) {
            Ok(result) => result,
            Err(_) => {
                error!("render engine panicked");
                Err(RenderError::runtime(""))
            }
        }
    }

    pub fn compile(&self, formatted: &str) -> Result<RenderedUnit, RenderError> {
        let started = Instant::now();

        let sanitized = self
            .cache
            .get_or_insert_with(formatted, || sanitize_source(formatted, &self.config))?;
        let executable = assemble_executable(&sanitized);
        let lowered = lower_executable(&executable)?;

        let mut sandbox = Sandbox::new(&self.config)?;
        let entry = sandbox.instantiate(&lowered)?;
        let markup = sandbox.render(&entry)?;
        let summary = inspect_markup(&markup);

        info!(
            entry = %sanitized.entry_name,
            elements = summary.element_count,
            stubs = summary.stub_markers.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "rendered generated page"
        );

        Ok(RenderedUnit {
            entry_name: sanitized.entry_name,
            markup,
            summary,
        })
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(RendererConfig::default())
    }
}
