use std::path::{Path, PathBuf};

use colored::Colorize;
use ocrlayout_core::{Document, LayoutConfig, LayoutEngine, PageAnalysis};
use serde::Serialize;

use crate::config::{build_engine, LayoutArgs};
use crate::diagnostics::LogSink;
use crate::prelude::{println, *};

#[derive(Debug, clap::Args)]
pub struct InspectOptions {
    /// Path to the OCR JSON document
    pub path: PathBuf,

    /// Also print the word-width statistics of every line
    #[arg(long)]
    pub lines: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    #[clap(flatten)]
    pub layout: LayoutArgs,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InspectOutput {
    pub source: String,
    pub config: LayoutConfig,
    pub pages: Vec<PageAnalysis>,
}

pub async fn run(options: InspectOptions, global: crate::Global) -> Result<()> {
    let engine = build_engine(&global, &options.layout)?;

    let output = tokio::task::spawn_blocking({
        let path = options.path.clone();
        move || inspect_file_data(&engine, &path)
    })
    .await??;

    if options.json {
        let json = serde_json::to_string_pretty(&output)
            .map_err(|e| eyre!("Failed to serialize output: {}", e))?;
        println!("{json}");
        return Ok(());
    }

    println!(
        "\n{} {} ({} pages)\n",
        "Document".bold(),
        output.source.cyan(),
        output.pages.len()
    );

    if output.pages.is_empty() {
        println!("No pages found.");
        return Ok(());
    }

    pages_table(&output.pages).printstd();

    if options.lines {
        for page in &output.pages {
            println!("\n{} {}", "Page".bold().cyan(), page.page);
            line_stats_table(page).printstd();
        }
    }

    Ok(())
}

/// Read a document and analyze every page.
pub fn inspect_file_data(engine: &LayoutEngine, path: &Path) -> Result<InspectOutput> {
    let bytes =
        std::fs::read(path).wrap_err_with(|| f!("Failed to read {}", path.display()))?;
    let document = Document::from_slice(&bytes)
        .wrap_err_with(|| f!("Failed to parse {}", path.display()))?;

    let source = path.display().to_string();
    let sink = LogSink::new(source.clone());
    Ok(InspectOutput {
        pages: engine.analyze_document(&document, &sink),
        config: engine.config().clone(),
        source,
    })
}

fn format_size(width: Option<f32>, height: Option<f32>) -> String {
    match (width, height) {
        (Some(w), Some(h)) => f!("{w:.0}x{h:.0}"),
        _ => "-".to_string(),
    }
}

/// One row per page.
pub fn pages_table(pages: &[PageAnalysis]) -> prettytable::Table {
    let mut table = new_table();
    table.add_row(prettytable::row![
        "Page".bold().cyan(),
        "Size".bold().cyan(),
        "Words".bold().cyan(),
        "Skipped".bold().cyan(),
        "Flat".bold().cyan(),
        "Lines".bold().cyan(),
        "Left".bold().cyan(),
        "Right".bold().cyan(),
        "Row height".bold().cyan(),
        "Slot".bold().cyan(),
        "Significant".bold().cyan(),
        "Gaps".bold().cyan()
    ]);

    for page in pages {
        table.add_row(prettytable::row![
            page.page,
            format_size(page.width, page.height),
            page.words,
            page.skipped.len(),
            page.degenerate_words,
            page.lines,
            f!("{:.1}", page.left),
            f!("{:.1}", page.right),
            f!("{:.1}", page.row_height),
            f!("{:.2}", page.global_slot),
            page.significant_lines,
            page.gap_markers
        ]);
    }

    table
}

/// `[min, median, max]` word widths per line of one page.
pub fn line_stats_table(page: &PageAnalysis) -> prettytable::Table {
    let mut table = new_table();
    table.add_row(prettytable::row![
        "Line".bold().cyan(),
        "Min".bold().cyan(),
        "Median".bold().cyan(),
        "Max".bold().cyan()
    ]);

    for (index, stats) in page.line_stats.iter().enumerate() {
        table.add_row(prettytable::row![
            index + 1,
            f!("{:.1}", stats.min),
            f!("{:.1}", stats.median),
            f!("{:.1}", stats.max)
        ]);
    }

    table
}
