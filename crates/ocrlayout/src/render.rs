use std::path::{Path, PathBuf};

use colored::Colorize;
use ocrlayout_core::{Document, LayoutEngine};
use serde::Serialize;

use crate::config::{build_engine, LayoutArgs};
use crate::diagnostics::LogSink;
use crate::prelude::{eprintln, println, *};

#[derive(Debug, clap::Args)]
pub struct RenderOptions {
    /// Path to the OCR JSON document
    pub path: PathBuf,

    /// Write the result to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    #[clap(flatten)]
    pub layout: LayoutArgs,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderOutput {
    pub source: String,
    pub pages: Vec<String>,
    pub text: String,
}

pub async fn run(options: RenderOptions, global: crate::Global) -> Result<()> {
    let engine = build_engine(&global, &options.layout)?;

    let output = tokio::task::spawn_blocking({
        let path = options.path.clone();
        move || render_file_data(&engine, &path)
    })
    .await??;

    let rendered = if options.json {
        serde_json::to_string_pretty(&output)
            .map_err(|e| eyre!("JSON serialization failed: {}", e))?
    } else {
        output.text
    };

    match options.output {
        Some(path) => {
            std::fs::write(&path, f!("{rendered}\n"))
                .wrap_err_with(|| f!("Failed to write {}", path.display()))?;
            if global.verbose {
                eprintln!(
                    "{} {} pages to {}",
                    "Wrote".green().bold(),
                    output.pages.len(),
                    path.display().to_string().cyan()
                );
            }
        }
        None => println!("{rendered}"),
    }

    Ok(())
}

/// Read and render one document.
pub fn render_file_data(engine: &LayoutEngine, path: &Path) -> Result<RenderOutput> {
    let bytes =
        std::fs::read(path).wrap_err_with(|| f!("Failed to read {}", path.display()))?;
    let document = Document::from_slice(&bytes)
        .wrap_err_with(|| f!("Failed to parse {}", path.display()))?;

    let source = path.display().to_string();
    Ok(render_document_data(engine, &document, source))
}

/// Render a parsed document, keeping the per-page text alongside the joined
/// result.
pub fn render_document_data(
    engine: &LayoutEngine,
    document: &Document,
    source: String,
) -> RenderOutput {
    let sink = LogSink::new(source.clone());
    let rendered = engine.render_document_parts(document, &sink);

    RenderOutput {
        source,
        pages: rendered.pages,
        text: rendered.text,
    }
}
