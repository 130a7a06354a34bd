//! End-to-end scenarios for the synchronous pipeline.
//!
//! Each test feeds a generated page source through `Pipeline::run` and checks
//! the terminal state, the rendered markup and the stand-ins that ended up in
//! it.

#[cfg(test)]
mod tests {
    use crate::config::RendererConfig;
    use crate::error::FailureStage;
    use crate::format::FORMAT_WARNING;
    use crate::icons::{icon_path, DEFAULT_ICON_PATH};
    use crate::pipeline::Pipeline;
    use crate::references::{classify_symbol, scan_references, SymbolKind};
    use crate::sanitize::sanitize_source;
    use crate::surface::{PipelineState, PipelineStatus, SurfaceView};
    use proptest::prelude::*;

    fn run(code: &str) -> PipelineState {
        Pipeline::new(RendererConfig::default()).run(code)
    }

    fn ready_markup(code: &str) -> String {
        let state = run(code);
        assert_eq!(
            state.status,
            PipelineStatus::Ready,
            "expected Ready, got error: {:?}",
            state.runtime_error
        );
        state.resolved_unit.map(|u| u.markup).unwrap_or_default()
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // SCENARIOS
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_plain_page_renders_text() {
        let code = "export default function Page(){ return <div>Hi</div>; }";
        let scan = scan_references(code, &RendererConfig::default()).unwrap();
        assert!(scan.declarations.is_empty());

        let state = run(code);
        assert_eq!(state.status, PipelineStatus::Ready);
        assert!(state.format_warning.is_none());
        let unit = state.resolved_unit.unwrap();
        assert_eq!(unit.entry_name, "Page");
        assert!(unit.markup.contains("<div>Hi</div>"), "got: {}", unit.markup);
        assert_eq!(unit.summary.text, "Hi");
    }

    #[test]
    fn test_known_icon_renders_mapped_path() {
        let code = "import { Star } from 'lucide-react';\nexport default function Page(){ return <Star size=\"32\" />; }";
        let scan = scan_references(code, &RendererConfig::default()).unwrap();
        assert_eq!(scan.symbols.get("Star"), Some(SymbolKind::Icon));

        let state = run(code);
        assert_eq!(state.status, PipelineStatus::Ready, "{:?}", state.runtime_error);
        let unit = state.resolved_unit.unwrap();
        assert!(unit.markup.contains(icon_path("Star").unwrap()), "got: {}", unit.markup);
        assert!(unit.markup.contains("width=\"32\""), "got: {}", unit.markup);
        assert!(unit.markup.contains("stroke=\"currentColor\""));
        assert_eq!(unit.summary.icon_markers, vec!["Star"]);
    }

    #[test]
    fn test_unknown_icon_falls_back_to_circle() {
        let markup = ready_markup(
            "import { Wombat } from 'lucide-react';\nexport default function Page(){ return <Wombat size=\"huge\" />; }",
        );
        assert!(markup.contains(DEFAULT_ICON_PATH), "got: {}", markup);
        assert!(markup.contains("width=\"24\""), "got: {}", markup);
    }

    #[test]
    fn test_unterminated_string_fails_with_code_still_viewable() {
        let code = "const broken = 'unterminated;\nexport default function Page(){ return <div>Hi</div>; }";
        let state = run(code);
        assert_eq!(state.format_warning.as_deref(), Some(FORMAT_WARNING));
        assert_eq!(state.status, PipelineStatus::Error);
        assert_eq!(state.failure_stage, Some(FailureStage::Compile));
        assert!(state.runtime_error.is_some());
        assert_eq!(state.formatted_text, code);

        let view = SurfaceView::render(&state, true);
        assert!(view.html.contains("<details"));
        assert!(view.html.contains("const broken = &#x27;unterminated;"));
    }

    #[test]
    fn test_scoped_style_with_backtick_payload() {
        let code = "export default function Page(){ return <div><style jsx>{`.q::before { content: \"\\`\"; }`}</style><p>Styled</p></div>; }";
        let state = run(code);
        assert_eq!(state.status, PipelineStatus::Ready, "{:?}", state.runtime_error);

        let sanitized = sanitize_source(&state.formatted_text, &RendererConfig::default()).unwrap();
        assert!(!sanitized.body.contains("jsx>"), "got: {}", sanitized.body);
        assert!(sanitized.body.contains("dangerouslySetInnerHTML"));

        let markup = state.resolved_unit.unwrap().markup;
        assert!(markup.contains("<style>.q::before { content: \"`\"; }</style>"), "got: {}", markup);
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // STAND-INS
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_component_stub_forwards_children() {
        let markup = ready_markup(
            "import { Button } from '@/components/ui/button';\nexport default function Page(){ return <Button className=\"cta\">Buy</Button>; }",
        );
        assert_eq!(markup, "<div class=\"cta\" data-ai-stub=\"Button\">Buy</div>");
    }

    #[test]
    fn test_namespace_members_become_named_stubs() {
        let state = run(
            "import * as Motion from 'framer-motion';\nexport default function Page(){ return <Motion.section>Hi</Motion.section>; }",
        );
        assert_eq!(state.status, PipelineStatus::Ready, "{:?}", state.runtime_error);
        let summary = state.resolved_unit.unwrap().summary;
        assert_eq!(summary.stub_markers, vec!["Motion.section"]);
        assert_eq!(summary.text, "Hi");
    }

    #[test]
    fn test_image_and_link_stand_ins() {
        let markup = ready_markup(
            "import Image from 'next/image';\nimport Link from 'next/link';\nexport default function Page(){ return <Link href={{ pathname: '/about' }} prefetch={false}><Image src=\"\" alt=\"Logo\" fill priority /></Link>; }",
        );
        assert!(markup.contains("<a href=\"/about\">"), "got: {}", markup);
        assert!(markup.contains(crate::config::DEFAULT_IMAGE_PLACEHOLDER));
        assert!(markup.contains("loading=\"lazy\""));
        assert!(markup.contains("position:absolute"));
        assert!(markup.contains("object-fit:cover"));
        assert!(!markup.contains("priority"));
        assert!(!markup.contains("prefetch"));
    }

    #[test]
    fn test_link_without_href_uses_placeholder() {
        let markup = ready_markup(
            "import Link from 'next/link';\nexport default function Page(){ return <Link>Home</Link>; }",
        );
        assert_eq!(markup, "<a href=\"#\">Home</a>");
    }

    #[test]
    fn test_hooks_utilities_and_values_resolve() {
        let markup = ready_markup(
            "'use client';\nimport { useState } from 'react';\nimport { useRouter } from 'next/navigation';\nimport { cn } from '@/lib/utils';\nimport { siteConfig } from '@/config/site';\n\nexport default function Page() {\n  const router = useRouter();\n  const [count] = useState(3);\n  const hidden = false;\n  return <button className={cn('btn', hidden && 'hidden', 'primary')} onClick={() => router.push('/')}>{count} items {siteConfig()}</button>;\n}\n",
        );
        assert_eq!(markup, "<button class=\"btn primary\">3 items </button>");
    }

    #[test]
    fn test_context_and_memo_render() {
        let markup = ready_markup(
            "import React, { createContext, useContext, memo } from 'react';\nconst Theme = createContext('light');\nconst Label = memo(function Label() { const theme = useContext(Theme); return <span>{theme}</span>; });\nexport default function Page() { return <Theme.Provider value=\"dark\"><Label /></Theme.Provider>; }",
        );
        assert_eq!(markup, "<span>dark</span>");
    }

    #[test]
    fn test_aliased_and_namespace_runtime_imports_resolve() {
        let markup = ready_markup(
            "import * as R from 'react';\nimport { useState as useS, forwardRef } from 'react';\nconst Field = forwardRef(function Field(props, ref) { return <input {...props} />; });\nexport default function Page() { const [label] = useS('Email'); return <R.Fragment><Field name={label} /></R.Fragment>; }",
        );
        assert_eq!(markup, "<input name=\"Email\"/>");
    }

    #[test]
    fn test_hook_from_foreign_module_shadows_runtime_hook() {
        let markup = ready_markup(
            "import { useState } from 'preact/hooks';\nexport default function Page() { const store = useState(0); return <p>{typeof store.push}</p>; }",
        );
        assert_eq!(markup, "<p>function</p>");
    }

    #[test]
    fn test_aliased_icon_renders_imported_glyph() {
        let state = run(
            "import { Star as Rating } from 'lucide-react';\nexport default function Page() { return <Rating />; }",
        );
        assert_eq!(state.status, PipelineStatus::Ready, "{:?}", state.runtime_error);
        let unit = state.resolved_unit.unwrap();
        assert!(unit.markup.contains(icon_path("Star").unwrap()), "got: {}", unit.markup);
        assert!(!unit.markup.contains(DEFAULT_ICON_PATH));
        assert_eq!(unit.summary.icon_markers, vec!["Rating"]);
    }

    #[test]
    fn test_export_text_in_string_does_not_hide_entry() {
        let code = "const note = 'export default function Fake(';\nexport default function Real() { return <p>{note.length}</p>; }";
        let sanitized = sanitize_source(code, &RendererConfig::default()).unwrap();
        assert_eq!(sanitized.entry_name, "Real");
        assert!(
            !sanitized.body.lines().any(|l| l.trim_start().starts_with("export")),
            "got: {}",
            sanitized.body
        );
        assert_eq!(ready_markup(code), "<p>29</p>");
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // FAILURES
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_missing_entry_binding() {
        let state = run("const Other = () => null;\nexport default Home;");
        assert_eq!(state.status, PipelineStatus::Error);
        assert_eq!(state.failure_stage, Some(FailureStage::Execution));
        assert!(state.runtime_error.unwrap().contains("Home"));
    }

    #[test]
    fn test_non_callable_entry_is_not_renderable() {
        let state = run("export default 42;");
        assert_eq!(state.status, PipelineStatus::Error);
        assert_eq!(state.runtime_error.as_deref(), Some("output is not a valid renderable unit"));
    }

    #[test]
    fn test_render_exception_message_surfaces() {
        let state = run("export default function Page() { throw new Error('menu data missing'); }");
        assert_eq!(state.status, PipelineStatus::Error);
        assert_eq!(state.runtime_error.as_deref(), Some("menu data missing"));
    }

    #[test]
    fn test_malformed_import_is_compile_failure() {
        let state = run("import { Hero, from '@/ui';\nexport default function Page() { return null; }");
        assert_eq!(state.status, PipelineStatus::Error);
        assert_eq!(state.failure_stage, Some(FailureStage::Compile));
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // PROPERTIES
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_no_entry_form_renders_nothing() {
        let state = run("let greeting = 'hello';");
        assert_eq!(state.status, PipelineStatus::Ready, "{:?}", state.runtime_error);
        let unit = state.resolved_unit.unwrap();
        assert_eq!(unit.entry_name, "WebsitePage");
        assert_eq!(unit.markup, "");
        assert!(unit.summary.is_empty());
    }

    #[test]
    fn test_rerun_on_sanitized_output_is_idempotent() {
        let code = "import { Hero } from '@/components/hero';\nimport { Star } from 'lucide-react';\nexport default function Page() { return <main><Hero title=\"Bakery\" /><Star /></main>; }";
        let config = RendererConfig::default();
        let pipeline = Pipeline::new(config.clone());

        let first = pipeline.run(code);
        assert_eq!(first.status, PipelineStatus::Ready, "{:?}", first.runtime_error);
        let sanitized = sanitize_source(&first.formatted_text, &config).unwrap();

        let second = pipeline.run(&sanitized.as_module_source());
        assert_eq!(second.status, PipelineStatus::Ready, "{:?}", second.runtime_error);
        let resanitized = sanitize_source(&second.formatted_text, &config).unwrap();
        assert_eq!(resanitized.prelude, "");
        assert_eq!(resanitized.entry_name, sanitized.entry_name);
        assert_eq!(
            first.resolved_unit.unwrap().markup,
            second.resolved_unit.unwrap().markup
        );
    }

    #[test]
    fn test_batch_rendering_keeps_order() {
        let pipeline = Pipeline::default();
        let states = pipeline.run_many(&[
            "export default function A() { return <p>a</p>; }",
            "export default Missing;",
            "export default function C() { return <p>c</p>; }",
        ]);
        let statuses: Vec<PipelineStatus> = states.iter().map(|s| s.status).collect();
        assert_eq!(
            statuses,
            vec![PipelineStatus::Ready, PipelineStatus::Error, PipelineStatus::Ready]
        );
    }

    fn fragment() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("import { Star } from 'lucide-react';\n".to_string()),
            Just("import * as UI from '@/ui';\n".to_string()),
            Just("import './globals.css';\n".to_string()),
            Just("export default function Page() { return <div>ok</div>; }\n".to_string()),
            Just("export default Page;\n".to_string()),
            Just("const Page = () => <Star />;\n".to_string()),
            Just("<style jsx>{`a{}`}</style>".to_string()),
            Just("while (true) {}\n".to_string()),
            Just("{ ( [ `".to_string()),
            "[ -~\n]{0,40}",
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn every_input_reaches_a_terminal_state(parts in prop::collection::vec(fragment(), 0..5)) {
            let code = parts.concat();
            let config = RendererConfig {
                loop_iteration_limit: 50_000,
                ..RendererConfig::default()
            };
            let state = Pipeline::new(config).run(&code);
            prop_assert!(state.is_terminal());
            prop_assert_eq!(state.resolved_unit.is_some(), state.status == PipelineStatus::Ready);
            prop_assert_eq!(state.runtime_error.is_some(), state.status == PipelineStatus::Error);
        }

        #[test]
        fn hook_names_are_stateful_anywhere(suffix in "[A-Z][a-zA-Z]{0,10}", module in "[a-z@/.-]{1,20}") {
            let name = format!("use{}", suffix);
            prop_assert_eq!(
                classify_symbol(&name, &module, &RendererConfig::default()),
                SymbolKind::StatefulCapability
            );
        }

        #[test]
        fn capitalized_names_from_other_modules_are_components(
            name in "[A-Z][a-zA-Z]{0,10}",
            module in "[a-z]{2,10}(/[a-z]{2,8})?",
        ) {
            prop_assume!(name != "Image" && name != "Link");
            prop_assert_eq!(
                classify_symbol(&name, &module, &RendererConfig::default()),
                SymbolKind::Component
            );
        }

        #[test]
        fn sentinel_aliases_always_win(imported in "[A-Za-z]{1,10}", module in "[a-z@/-]{1,20}") {
            let code = format!(
                "import {{ {} as Image }} from '{}';\nimport {{ {} as Link }} from '{}';\n",
                imported, module, imported, module
            );
            let config = RendererConfig::default();
            prop_assume!(imported != "type");
            prop_assume!(!config.is_runtime_module(&module));
            let scan = scan_references(&code, &config).unwrap();
            prop_assert_eq!(scan.symbols.get("Image"), Some(SymbolKind::MediaStandIn));
            prop_assert_eq!(scan.symbols.get("Link"), Some(SymbolKind::NavigationStandIn));
        }
    }
}
