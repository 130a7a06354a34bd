//! Renders a page source file and prints the surface payload as JSON.
//!
//! ```text
//! RUST_LOG=page_renderer_native=debug cargo run --example preview -- page.tsx
//! ```
//!
//! Reads stdin when no path is given.

use std::io::Read;
use std::sync::Arc;
use std::{env, fs, io, process};

use page_renderer_native::{Pipeline, RenderOutput, RenderSurface, RendererConfig};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let source = match env::args().nth(1) {
        Some(path) => fs::read_to_string(&path).unwrap_or_else(|e| {
            eprintln!("cannot read {}: {}", path, e);
            process::exit(2);
        }),
        None => {
            let mut buf = String::new();
            if let Err(e) = io::stdin().read_to_string(&mut buf) {
                eprintln!("cannot read stdin: {}", e);
                process::exit(2);
            }
            buf
        }
    };

    let config = match env::var("PAGE_RENDERER_CONFIG") {
        Ok(json) => RendererConfig::from_json(&json).unwrap_or_else(|e| {
            eprintln!("invalid PAGE_RENDERER_CONFIG: {}", e);
            process::exit(2);
        }),
        Err(_) => RendererConfig::default(),
    };

    let mut surface = RenderSurface::new(Arc::new(Pipeline::new(config)), true);
    surface.set_source(&source);
    let state = surface.wait().clone();
    let output = RenderOutput {
        view: surface.view(),
        state,
    };

    match serde_json::to_string_pretty(&output) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("cannot serialize output: {}", e);
            process::exit(1);
        }
    }
}
