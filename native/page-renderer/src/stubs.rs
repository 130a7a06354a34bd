//! Fallback prelude synthesis.
//!
//! Every classified symbol gets a declaration that binds a safe stand-in, and
//! the shared helper factories those declarations call are emitted once each,
//! only when some symbol needs them. Everything is written as
//! `const NAME = function (...)` so the entry extractor's declaration
//! heuristics never mistake a helper for the page.

use tracing::debug;

use crate::config::RendererConfig;
use crate::icons::{icon_path, DEFAULT_ICON_PATH};
use crate::references::{ClassificationSet, RuntimeBinding, SymbolKind, RUNTIME_HANDLE};

const STUB_COMPONENT_FACTORY: &str = r#"const __createStubComponent = function (displayName) {
  const Stub = function (props) {
    const rest = Object.assign({}, props);
    const children = rest.children;
    delete rest.children;
    rest['data-ai-stub'] = displayName;
    return React.createElement('div', rest, children);
  };
  Stub.displayName = displayName;
  return Stub;
};"#;

const STUB_HOOK_FACTORY: &str = r#"const __noop = function () {};
const __createStubHook = function (displayName) {
  return function () {
    return { push: __noop, replace: __noop, back: __noop, prefetch: __noop, refresh: __noop, forward: __noop };
  };
};"#;

const NAMESPACE_FACTORY: &str = r#"const __createNamespaceStub = function (namespaceLabel) {
  const members = {};
  return new Proxy({}, {
    get: function (target, key) {
      if (typeof key === 'symbol') {
        return undefined;
      }
      if (key === '__esModule') {
        return true;
      }
      if (!Object.prototype.hasOwnProperty.call(members, key)) {
        members[key] = __createStubComponent(namespaceLabel + '.' + key);
      }
      return members[key];
    }
  });
};"#;

const ICON_FACTORY: &str = r#"const __createIconStub = function (name, path) {
  const Icon = function (props) {
    const p = props || {};
    let size = 24;
    if (typeof p.size === 'number' && isFinite(p.size)) {
      size = p.size;
    } else if (typeof p.size === 'string' && !isNaN(parseFloat(p.size))) {
      size = parseFloat(p.size);
    }
    const rest = Object.assign({}, p);
    delete rest.size;
    delete rest.color;
    delete rest.strokeWidth;
    delete rest.absoluteStrokeWidth;
    delete rest.children;
    const attrs = Object.assign({
      xmlns: 'http://www.w3.org/2000/svg',
      width: size,
      height: size,
      viewBox: '0 0 24 24',
      fill: 'none',
      stroke: p.color || 'currentColor',
      strokeWidth: p.strokeWidth != null ? p.strokeWidth : 2,
      strokeLinecap: 'round',
      strokeLinejoin: 'round'
    }, rest, { 'data-ai-icon': name });
    return React.createElement('svg', attrs, React.createElement('path', { d: path || __DEFAULT_ICON_PATH }));
  };
  Icon.displayName = name;
  return Icon;
};"#;

const IMAGE_STUB: &str = r#"const __IMAGE_ONLY_PROPS = ['priority', 'placeholder', 'blurDataURL', 'loader', 'quality', 'sizes', 'unoptimized', 'layout', 'objectFit', 'objectPosition', 'onLoadingComplete', 'lazyBoundary', 'lazyRoot', 'fill', 'loading', 'children'];
const __ImageStub = function (props) {
  const p = props || {};
  const rest = {};
  Object.keys(p).forEach(function (key) {
    if (__IMAGE_ONLY_PROPS.indexOf(key) === -1) {
      rest[key] = p[key];
    }
  });
  rest.alt = p.alt || '';
  rest.src = typeof p.src === 'string' && p.src.trim().length > 0 ? p.src : __IMAGE_FALLBACK;
  if (p.fill) {
    const style = p.style || {};
    rest.style = Object.assign({
      position: 'absolute',
      inset: 0,
      width: '100%',
      height: '100%',
      objectFit: style.objectFit || p.objectFit || 'cover'
    }, style);
  }
  rest.loading = p.loading === 'eager' ? 'eager' : 'lazy';
  return React.createElement('img', rest);
};"#;

const LINK_STUB: &str = r#"const __LINK_ONLY_PROPS = ['prefetch', 'replace', 'scroll', 'shallow', 'passHref', 'legacyBehavior', 'locale', 'children'];
const __LinkStub = function (props) {
  const p = props || {};
  const rest = {};
  Object.keys(p).forEach(function (key) {
    if (__LINK_ONLY_PROPS.indexOf(key) === -1) {
      rest[key] = p[key];
    }
  });
  let href = p.href;
  if (href && typeof href === 'object') {
    href = href.pathname || __LINK_FALLBACK;
  }
  rest.href = href == null ? __LINK_FALLBACK : href;
  return React.createElement('a', rest, p.children);
};"#;

/// Quotes `value` as a JavaScript string literal.
fn js_string(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "''".to_string())
}

#[derive(Default)]
struct Needs {
    component: bool,
    hook: bool,
    namespace: bool,
    icon: bool,
    image: bool,
    link: bool,
}

pub fn build_fallback_prelude(symbols: &ClassificationSet, config: &RendererConfig) -> String {
    if symbols.is_empty() {
        return String::new();
    }

    let mut needs = Needs::default();
    let mut declarations = Vec::with_capacity(symbols.len());

    for symbol in symbols.iter() {
        let name = &symbol.name;
        let line = match symbol.kind {
            SymbolKind::Component => {
                needs.component = true;
                format!("const {} = __createStubComponent({});", name, js_string(name))
            }
            SymbolKind::StatefulCapability => {
                needs.hook = true;
                format!("const {} = __createStubHook({});", name, js_string(name))
            }
            SymbolKind::Icon => {
                needs.icon = true;
                let path = icon_path(&symbol.imported)
                    .or_else(|| icon_path(name))
                    .map_or_else(|| "null".to_string(), js_string);
                format!("const {} = __createIconStub({}, {});", name, js_string(name), path)
            }
            SymbolKind::NamespaceProxy => {
                needs.namespace = true;
                needs.component = true;
                format!("const {} = __createNamespaceStub({});", name, js_string(name))
            }
            SymbolKind::MediaStandIn => {
                needs.image = true;
                format!("const {} = __ImageStub;", name)
            }
            SymbolKind::NavigationStandIn => {
                needs.link = true;
                format!("const {} = __LinkStub;", name)
            }
            SymbolKind::Utility => format!(
                "const {} = function () {{ return Array.prototype.slice.call(arguments).filter(Boolean).join(' '); }};",
                name
            ),
            SymbolKind::PlainValue => format!("const {} = function () {{ return null; }};", name),
        };
        declarations.push(line);
    }

    let mut helpers: Vec<String> = Vec::new();
    if needs.component {
        helpers.push(STUB_COMPONENT_FACTORY.to_string());
    }
    if needs.hook {
        helpers.push(STUB_HOOK_FACTORY.to_string());
    }
    if needs.namespace {
        helpers.push(NAMESPACE_FACTORY.to_string());
    }
    if needs.icon {
        helpers.push(format!("const __DEFAULT_ICON_PATH = {};", js_string(DEFAULT_ICON_PATH)));
        helpers.push(ICON_FACTORY.to_string());
    }
    if needs.image {
        helpers.push(format!(
            "const __IMAGE_FALLBACK = {};",
            js_string(&config.image_placeholder_url)
        ));
        helpers.push(IMAGE_STUB.to_string());
    }
    if needs.link {
        helpers.push(format!(
            "const __LINK_FALLBACK = {};",
            js_string(&config.link_placeholder_href)
        ));
        helpers.push(LINK_STUB.to_string());
    }

    debug!(
        helpers = helpers.len(),
        declarations = declarations.len(),
        "built fallback prelude"
    );

    let mut prelude = helpers.join("\n");
    prelude.push('\n');
    prelude.push_str(&declarations.join("\n"));
    prelude.push('\n');
    prelude
}

/// Binds names imported from the runtime's own modules to the injected
/// handle: one destructuring line for members, one line per handle alias.
pub fn build_runtime_bindings(bindings: &[RuntimeBinding]) -> String {
    let mut members = Vec::new();
    let mut out = String::new();
    for binding in bindings {
        match binding {
            RuntimeBinding::Member { imported, local } if imported == local => {
                members.push(local.clone());
            }
            RuntimeBinding::Member { imported, local } => {
                members.push(format!("{}: {}", imported, local));
            }
            RuntimeBinding::Handle { local } => {
                out.push_str(&format!("const {} = {};\n", local, RUNTIME_HANDLE));
            }
        }
    }
    if !members.is_empty() {
        out.insert_str(
            0,
            &format!("const {{ {} }} = {};\n", members.join(", "), RUNTIME_HANDLE),
        );
    }
    out
}
