//! Failure model for the page-source pipeline.
//!
//! Formatting problems are soft and never surface here; they travel as a
//! warning string on the pipeline state. Everything in [`RenderError`] is a
//! hard failure that moves the render surface into its error state.

use serde::Serialize;
use thiserror::Error;

/// The pipeline stage a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureStage {
    Format,
    Compile,
    Execution,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// A statement matched the reference-declaration shape but its binding
    /// clause could not be read.
    #[error("malformed import declaration `{statement}`: {reason}")]
    MalformedReference { statement: String, reason: String },

    /// The assembled unit could not be parsed, type-stripped or lowered.
    #[error("{message}")]
    Lowering { message: String },

    #[error("no default component was found to render (expected `{entry}`)")]
    MissingEntry { entry: String },

    #[error("output is not a valid renderable unit")]
    NotRenderable,

    /// An exception thrown while evaluating or rendering the unit.
    #[error("{message}")]
    Runtime { message: String },

    /// The worker owning the run stopped without reporting a result.
    #[error("render worker terminated before reporting a result")]
    WorkerLost,
}

impl RenderError {
    pub fn stage(&self) -> FailureStage {
        match self {
            RenderError::MalformedReference { .. } | RenderError::Lowering { .. } => {
                FailureStage::Compile
            }
            RenderError::MissingEntry { .. }
            | RenderError::NotRenderable
            | RenderError::Runtime { .. }
            | RenderError::WorkerLost => FailureStage::Execution,
        }
    }

    pub(crate) fn lowering(message: impl Into<String>) -> Self {
        RenderError::Lowering {
            message: message.into(),
        }
    }

    pub(crate) fn runtime(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.trim().is_empty() {
            RenderError::Runtime {
                message: "the generated site could not be rendered".to_string(),
            }
        } else {
            RenderError::Runtime { message }
        }
    }
}
