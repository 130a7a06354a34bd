//! Render surface: the state machine that owns pipeline runs and turns their
//! state into the preview shell.
//!
//! Every source change starts a fresh run on its own worker thread. The
//! worker reports back over a channel; only the owner of the surface writes
//! its state, inside [`RenderSurface::poll`] or [`RenderSurface::wait`].
//! Superseded runs are cancelled through their flag and their events are
//! never applied.

use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use crate::error::{FailureStage, RenderError};
use crate::format::{format_source, FormatOutcome};
use crate::markup::MarkupSummary;
use crate::pipeline::Pipeline;

// ═══════════════════════════════════════════════════════════════════════════════
// STATE
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStatus {
    Formatting,
    Compiling,
    Ready,
    Error,
}

impl PipelineStatus {
    pub fn label(self) -> &'static str {
        match self {
            PipelineStatus::Formatting => "Formatting generated code...",
            PipelineStatus::Compiling => "Compiling components...",
            PipelineStatus::Ready => "Render ready",
            PipelineStatus::Error => "The site could not be rendered.",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, PipelineStatus::Ready | PipelineStatus::Error)
    }
}

/// What a successful run resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedUnit {
    pub entry_name: String,
    pub markup: String,
    pub summary: MarkupSummary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineState {
    pub status: PipelineStatus,
    pub formatted_text: String,
    pub format_warning: Option<String>,
    pub runtime_error: Option<String>,
    pub failure_stage: Option<FailureStage>,
    pub resolved_unit: Option<RenderedUnit>,
}

impl PipelineState {
    pub fn formatting() -> Self {
        Self {
            status: PipelineStatus::Formatting,
            formatted_text: String::new(),
            format_warning: None,
            runtime_error: None,
            failure_stage: None,
            resolved_unit: None,
        }
    }

    pub fn apply_formatted(&mut self, outcome: FormatOutcome) {
        if self.status != PipelineStatus::Formatting {
            return;
        }
        self.formatted_text = outcome.text;
        if outcome.warning.is_some() {
            self.failure_stage = Some(FailureStage::Format);
        }
        self.format_warning = outcome.warning;
        self.status = PipelineStatus::Compiling;
    }

    pub fn apply_compiled(&mut self, result: Result<RenderedUnit, RenderError>) {
        if self.status != PipelineStatus::Compiling {
            return;
        }
        match result {
            Ok(unit) => {
                self.resolved_unit = Some(unit);
                self.status = PipelineStatus::Ready;
            }
            Err(err) => self.fail(err),
        }
    }

    pub(crate) fn fail(&mut self, err: RenderError) {
        error!(stage = ?err.stage(), error = %err, "render run failed");
        self.failure_stage = Some(err.stage());
        self.runtime_error = Some(err.to_string());
        self.resolved_unit = None;
        self.status = PipelineStatus::Error;
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SURFACE
// ═══════════════════════════════════════════════════════════════════════════════

enum WorkerEvent {
    Formatted(FormatOutcome),
    Compiled(Result<RenderedUnit, RenderError>),
}

struct RunHandle {
    id: u64,
    cancel: Arc<AtomicBool>,
    events: Receiver<(u64, WorkerEvent)>,
}

pub struct RenderSurface {
    pipeline: Arc<Pipeline>,
    show_code_panel: bool,
    source: Option<String>,
    state: PipelineState,
    run: Option<RunHandle>,
    next_run_id: u64,
}

impl RenderSurface {
    pub fn new(pipeline: Arc<Pipeline>, show_code_panel: bool) -> Self {
        Self {
            pipeline,
            show_code_panel,
            source: None,
            state: PipelineState::formatting(),
            run: None,
            next_run_id: 1,
        }
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn show_code_panel(&self) -> bool {
        self.show_code_panel
    }

    pub fn set_show_code_panel(&mut self, show: bool) {
        self.show_code_panel = show;
    }

    /// Id of the run currently owning the state, if any run was started.
    pub fn current_run(&self) -> Option<u64> {
        self.run.as_ref().map(|r| r.id)
    }

    /// Starts a new run for `code` unless it equals the current source.
    /// Returns whether a run was started.
    pub fn set_source(&mut self, code: &str) -> bool {
        if self.source.as_deref() == Some(code) {
            return false;
        }
        self.cancel_current();

        let id = self.next_run_id;
        self.next_run_id += 1;
        self.source = Some(code.to_string());
        self.state = PipelineState::formatting();

        let cancel = Arc::new(AtomicBool::new(false));
        let (tx, rx) = mpsc::channel();
        let pipeline = Arc::clone(&self.pipeline);
        let worker_cancel = Arc::clone(&cancel);
        let worker_code = code.to_string();

        let spawned = thread::Builder::new()
            .name(format!("page-render-{}", id))
            .stack_size(self.pipeline.config().worker_stack_size)
            .spawn(move || run_worker(id, pipeline, worker_code, worker_cancel, tx));

        match spawned {
            Ok(_) => {
                info!(run = id, bytes = code.len(), "started render run");
                self.run = Some(RunHandle {
                    id,
                    cancel,
                    events: rx,
                });
            }
            Err(e) => {
                warn!(run = id, error = %e, "could not spawn render worker");
                self.run = None;
                self.state.fail(RenderError::WorkerLost);
            }
        }
        true
    }

    /// Applies every event already reported by the current run without
    /// blocking. Returns `true` if the state changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        loop {
            let next = match &self.run {
                Some(run) => run.events.try_recv(),
                None => return changed,
            };
            match next {
                Ok((id, event)) => changed |= self.apply(id, event),
                Err(TryRecvError::Empty) => return changed,
                Err(TryRecvError::Disconnected) => {
                    changed |= self.worker_gone();
                    return changed;
                }
            }
        }
    }

    /// Blocks until the current run reaches `Ready` or `Error`.
    pub fn wait(&mut self) -> &PipelineState {
        while !self.state.is_terminal() {
            let next = match &self.run {
                Some(run) => run.events.recv(),
                None => break,
            };
            match next {
                Ok((id, event)) => {
                    self.apply(id, event);
                }
                Err(_) => {
                    self.worker_gone();
                }
            }
        }
        &self.state
    }

    /// Like [`RenderSurface::wait`] but gives up after `timeout`.
    /// Returns whether the run reached a terminal state.
    pub fn wait_timeout(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while !self.state.is_terminal() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let next = match &self.run {
                Some(run) => run.events.recv_timeout(remaining),
                None => break,
            };
            match next {
                Ok((id, event)) => {
                    self.apply(id, event);
                }
                Err(RecvTimeoutError::Timeout) => return false,
                Err(RecvTimeoutError::Disconnected) => {
                    self.worker_gone();
                }
            }
        }
        self.state.is_terminal()
    }

    fn apply(&mut self, id: u64, event: WorkerEvent) -> bool {
        let current = match &self.run {
            Some(run) if run.id == id && !run.cancel.load(Ordering::SeqCst) => run.id,
            _ => {
                debug!(run = id, "discarding event from superseded run");
                return false;
            }
        };
        let before = self.state.status;
        match event {
            WorkerEvent::Formatted(outcome) => self.state.apply_formatted(outcome),
            WorkerEvent::Compiled(result) => self.state.apply_compiled(result),
        }
        if self.state.is_terminal() {
            info!(run = current, status = ?self.state.status, "render run settled");
        }
        before != self.state.status
    }

    fn worker_gone(&mut self) -> bool {
        self.run = None;
        if self.state.is_terminal() {
            return false;
        }
        self.state.fail(RenderError::WorkerLost);
        true
    }

    fn cancel_current(&mut self) {
        if let Some(run) = self.run.take() {
            run.cancel.store(true, Ordering::SeqCst);
            debug!(run = run.id, "cancelled render run");
        }
    }

    pub fn view(&self) -> SurfaceView {
        SurfaceView::render(&self.state, self.show_code_panel)
    }
}

impl Drop for RenderSurface {
    fn drop(&mut self) {
        self.cancel_current();
    }
}

fn run_worker(
    id: u64,
    pipeline: Arc<Pipeline>,
    code: String,
    cancel: Arc<AtomicBool>,
    events: Sender<(u64, WorkerEvent)>,
) {
    let cancelled = || cancel.load(Ordering::SeqCst);
    if cancelled() {
        return;
    }

    let formatted = format_source(&code);
    let text = formatted.text.clone();
    if cancelled() || events.send((id, WorkerEvent::Formatted(formatted))).is_err() {
        return;
    }

    if cancelled() {
        return;
    }
    let result = pipeline.compile_guarded(&text);
    if cancelled() {
        debug!(run = id, "render run finished after cancellation");
        return;
    }
    let _ = events.send((id, WorkerEvent::Compiled(result)));
}

// ═══════════════════════════════════════════════════════════════════════════════
// VIEW
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SurfaceView {
    pub status: PipelineStatus,
    pub label: &'static str,
    pub html: String,
}

impl SurfaceView {
    pub fn render(state: &PipelineState, show_code_panel: bool) -> Self {
        let mut html = String::from("<div class=\"relative min-h-screen bg-black text-white\">");

        if state.status != PipelineStatus::Ready {
            html.push_str("<div class=\"flex min-h-screen flex-col items-center justify-center gap-3 px-6 text-center text-sm text-slate-300\">");
            html.push_str(&format!(
                "<div class=\"animate-pulse text-base font-medium text-white\">{}</div>",
                state.status.label()
            ));
            if let Some(err) = &state.runtime_error {
                html.push_str(&format!(
                    "<p class=\"max-w-lg text-xs text-rose-300\">{}</p>",
                    escape_html(err)
                ));
            }
            if let Some(warning) = &state.format_warning {
                html.push_str(&format!(
                    "<p class=\"max-w-lg text-xs text-amber-300\">{}</p>",
                    escape_html(warning)
                ));
            }
            html.push_str("</div>");
        }

        match (&state.status, &state.resolved_unit) {
            (PipelineStatus::Ready, Some(unit)) => {
                html.push_str("<div class=\"bg-white text-slate-900\">");
                html.push_str(&unit.markup);
                html.push_str("</div>");
            }
            (PipelineStatus::Error, None) => {
                html.push_str("<div class=\"flex min-h-screen flex-col items-center justify-center px-6 text-center text-sm text-slate-300\">");
                html.push_str("<p class=\"text-base font-semibold text-rose-200\">We could not render the generated content.</p>");
                if let Some(err) = &state.runtime_error {
                    html.push_str(&format!(
                        "<p class=\"mt-2 max-w-xl text-xs text-slate-400\">{}</p>",
                        escape_html(err)
                    ));
                }
                html.push_str("</div>");
            }
            _ => {}
        }

        if show_code_panel && !state.formatted_text.is_empty() {
            html.push_str("<details class=\"fixed bottom-6 right-6 w-[min(90vw,32rem)] overflow-hidden rounded-2xl border border-white/20 bg-slate-900/80 backdrop-blur\">");
            html.push_str("<summary class=\"cursor-pointer px-4 py-3 text-sm font-medium text-white\">View formatted code</summary>");
            html.push_str(&format!(
                "<pre class=\"max-h-[60vh] overflow-auto bg-slate-950 p-4 text-[11px] leading-relaxed text-emerald-200\">{}</pre>",
                escape_html(&state.formatted_text)
            ));
            html.push_str("</details>");
        }

        html.push_str("</div>");

        Self {
            status: state.status,
            label: state.status.label(),
            html,
        }
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(markup: &str) -> RenderedUnit {
        RenderedUnit {
            entry_name: "Page".into(),
            markup: markup.into(),
            summary: MarkupSummary::default(),
        }
    }

    #[test]
    fn test_state_transitions_in_order() {
        let mut state = PipelineState::formatting();
        state.apply_compiled(Ok(unit("<p/>")));
        assert_eq!(state.status, PipelineStatus::Formatting, "compile before format is ignored");

        state.apply_formatted(FormatOutcome { text: "x".into(), warning: None });
        assert_eq!(state.status, PipelineStatus::Compiling);
        state.apply_compiled(Ok(unit("<p>Hi</p>")));
        assert_eq!(state.status, PipelineStatus::Ready);
        assert!(state.failure_stage.is_none());
    }

    #[test]
    fn test_failure_records_stage_and_message() {
        let mut state = PipelineState::formatting();
        state.apply_formatted(FormatOutcome { text: "x".into(), warning: None });
        state.apply_compiled(Err(RenderError::NotRenderable));
        assert_eq!(state.status, PipelineStatus::Error);
        assert_eq!(state.failure_stage, Some(FailureStage::Execution));
        assert_eq!(state.runtime_error.as_deref(), Some("output is not a valid renderable unit"));
    }

    #[test]
    fn test_view_wraps_ready_unit_in_isolated_container() {
        let mut state = PipelineState::formatting();
        state.apply_formatted(FormatOutcome { text: "<b>".into(), warning: None });
        state.apply_compiled(Ok(unit("<p>Hi</p>")));
        let view = SurfaceView::render(&state, true);
        assert_eq!(view.label, "Render ready");
        assert!(view.html.contains("<div class=\"bg-white text-slate-900\"><p>Hi</p></div>"));
        assert!(view.html.contains("&lt;b&gt;"));
        assert!(!view.html.contains("animate-pulse"));
    }

    #[test]
    fn test_view_shows_error_and_warning_without_code_panel() {
        let mut state = PipelineState::formatting();
        state.apply_formatted(FormatOutcome {
            text: "src".into(),
            warning: Some("could not format".into()),
        });
        state.apply_compiled(Err(RenderError::runtime("x < y")));
        let view = SurfaceView::render(&state, false);
        assert_eq!(view.label, "The site could not be rendered.");
        assert!(view.html.contains("x &lt; y"));
        assert!(view.html.contains("could not format"));
        assert!(!view.html.contains("<details"));
    }
}
