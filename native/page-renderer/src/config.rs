//! Renderer configuration.

use serde::{Deserialize, Serialize};

pub const DEFAULT_ENTRY_NAME: &str = "WebsitePage";
pub const DEFAULT_IMAGE_PLACEHOLDER: &str =
    "https://cdn.aipagebuilder.local/placeholder-image.jpg";

/// Module identifiers that ship icon-shaped components. Matched exactly or as
/// a `/`-separated prefix (`react-icons/fa` matches `react-icons`).
pub const ICON_MODULES: &[&str] = &[
    "lucide-react",
    "react-icons",
    "@heroicons/react",
    "@radix-ui/react-icons",
    "@tabler/icons-react",
    "react-feather",
    "phosphor-react",
    "@phosphor-icons/react",
    "react-bootstrap-icons",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct RendererConfig {
    /// Name bound to a fabricated or anonymous entry unit.
    pub fallback_entry_name: String,
    /// Substituted by the image stand-in when `src` is missing or blank.
    pub image_placeholder_url: String,
    /// Substituted by the link stand-in when `href` is absent.
    pub link_placeholder_href: String,
    /// Modules resolved by the injected runtime handle; imports from these are
    /// removed without a stub.
    pub runtime_modules: Vec<String>,
    /// Appended to [`ICON_MODULES`].
    pub extra_icon_modules: Vec<String>,
    pub loop_iteration_limit: u64,
    pub recursion_limit: usize,
    /// Maximum number of sanitized sources kept by the pipeline cache.
    pub cache_capacity: usize,
    /// Stack size of render worker threads, in bytes.
    pub worker_stack_size: usize,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            fallback_entry_name: DEFAULT_ENTRY_NAME.to_string(),
            image_placeholder_url: DEFAULT_IMAGE_PLACEHOLDER.to_string(),
            link_placeholder_href: "#".to_string(),
            runtime_modules: vec!["react".to_string()],
            extra_icon_modules: Vec::new(),
            loop_iteration_limit: 1_000_000,
            recursion_limit: 512,
            cache_capacity: 64,
            worker_stack_size: 16 * 1024 * 1024,
        }
    }
}

impl RendererConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn is_runtime_module(&self, module_name: &str) -> bool {
        self.runtime_modules.iter().any(|m| m == module_name)
    }

    pub fn icon_modules(&self) -> impl Iterator<Item = &str> {
        ICON_MODULES
            .iter()
            .copied()
            .chain(self.extra_icon_modules.iter().map(String::as_str))
    }
}
