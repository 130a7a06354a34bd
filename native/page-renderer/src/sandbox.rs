//! Execution of lowered units inside an embedded JavaScript engine.
//!
//! Each [`Sandbox`] owns its own `boa_engine` context, so units never share
//! globals with each other or with the host. The runtime handle is evaluated
//! into a value that is passed to the unit as its only parameter; it is never
//! installed on the global object. A context is not `Send`, so a sandbox lives
//! and dies on the thread that created it.

use boa_engine::{js_string, Context, JsError, JsObject, JsValue, Source};
use tracing::{debug, error};

use crate::config::RendererConfig;
use crate::error::RenderError;
use crate::harness::{MISSING_ENTRY_MARKER, RUNTIME_PARAM};

/// Minimal React-compatible runtime: element factory, hooks for a single
/// render pass, context, and `renderToString`.
pub const RUNTIME_SOURCE: &str = include_str!("runtime.js");

/// Globals every generated unit may touch without reaching the host.
const SANDBOX_GLOBALS: &str = r#"var console = (function () {
  var noop = function () {};
  return { log: noop, info: noop, warn: noop, error: noop, debug: noop, trace: noop };
})();"#;

pub struct Sandbox {
    context: Context,
    runtime: JsObject,
}

impl Sandbox {
    pub fn new(config: &RendererConfig) -> Result<Self, RenderError> {
        let mut context = Context::default();
        context
            .runtime_limits_mut()
            .set_loop_iteration_limit(config.loop_iteration_limit);
        context
            .runtime_limits_mut()
            .set_recursion_limit(config.recursion_limit);

        if let Err(err) = context.eval(Source::from_bytes(SANDBOX_GLOBALS)) {
            return Err(RenderError::runtime(describe(err, &mut context)));
        }

        let runtime = match context.eval(Source::from_bytes(RUNTIME_SOURCE)) {
            Ok(value) => value,
            Err(err) => return Err(RenderError::runtime(describe(err, &mut context))),
        };
        let runtime = runtime
            .as_object()
            .cloned()
            .ok_or_else(|| RenderError::runtime("the component runtime failed to initialise"))?;

        Ok(Self { context, runtime })
    }

    /// Evaluates a lowered unit and returns its entry, which must be callable.
    pub fn instantiate(&mut self, lowered: &str) -> Result<JsObject, RenderError> {
        let factory_source = format!("(function ({}) {{\n{}\n}})", RUNTIME_PARAM, lowered);
        let factory = self.eval(&factory_source)?;
        let factory = factory
            .as_callable()
            .cloned()
            .ok_or_else(|| RenderError::lowering("the assembled unit is not a function"))?;

        let runtime = JsValue::from(self.runtime.clone());
        let result = match factory.call(&JsValue::undefined(), &[runtime], &mut self.context) {
            Ok(value) => value,
            Err(err) => return Err(self.convert(err)),
        };

        match result.as_callable() {
            Some(entry) => {
                debug!("instantiated renderable unit");
                Ok(entry.clone())
            }
            None => Err(RenderError::NotRenderable),
        }
    }

    /// Renders `createElement(entry, null)` to markup.
    pub fn render(&mut self, entry: &JsObject) -> Result<String, RenderError> {
        let create_element = self.runtime_function("createElement")?;
        let render_to_string = self.runtime_function("renderToString")?;

        let element = match create_element.call(
            &JsValue::undefined(),
            &[JsValue::from(entry.clone()), JsValue::null()],
            &mut self.context,
        ) {
            Ok(value) => value,
            Err(err) => return Err(self.convert(err)),
        };

        let markup = match render_to_string.call(&JsValue::undefined(), &[element], &mut self.context) {
            Ok(value) => value,
            Err(err) => return Err(self.convert(err)),
        };

        match markup.as_string() {
            Some(s) => Ok(s.to_std_string_escaped()),
            None => Err(RenderError::NotRenderable),
        }
    }

    fn runtime_function(&mut self, name: &str) -> Result<JsObject, RenderError> {
        let value = match self.runtime.get(js_string!(name), &mut self.context) {
            Ok(value) => value,
            Err(err) => return Err(self.convert(err)),
        };
        value
            .as_callable()
            .cloned()
            .ok_or_else(|| RenderError::runtime(format!("runtime is missing `{}`", name)))
    }

    fn eval(&mut self, source: &str) -> Result<JsValue, RenderError> {
        match self.context.eval(Source::from_bytes(source)) {
            Ok(value) => Ok(value),
            Err(err) => {
                let message = describe(err, &mut self.context);
                error!(%message, "assembled unit failed to evaluate");
                Err(RenderError::lowering(message))
            }
        }
    }

    fn convert(&mut self, err: JsError) -> RenderError {
        let message = describe(err, &mut self.context);
        if let Some(entry) = message.strip_prefix(MISSING_ENTRY_MARKER) {
            return RenderError::MissingEntry {
                entry: entry.to_string(),
            };
        }
        RenderError::runtime(message)
    }
}

/// Human-readable text of a thrown value: the message of an `Error` object,
/// the display form of anything else.
fn describe(err: JsError, context: &mut Context) -> String {
    match err.try_native(context) {
        Ok(native) if !native.message().is_empty() => native.message().to_string(),
        Ok(native) => native.to_string(),
        Err(_) => err.to_string(),
    }
}
