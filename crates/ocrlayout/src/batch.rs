use std::path::{Path, PathBuf};
use std::sync::Arc;

use colored::Colorize;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use ocrlayout_core::{Document, LayoutEngine};
use serde::Serialize;

use crate::config::{build_engine, LayoutArgs};
use crate::diagnostics::LogSink;
use crate::prelude::{eprintln, println, *};

#[derive(Debug, clap::Args)]
pub struct BatchOptions {
    /// Directory holding the OCR JSON documents
    pub input_dir: PathBuf,

    /// Directory the rendered text files are written to
    pub output_dir: PathBuf,

    /// Documents rendered concurrently (defaults to the available parallelism)
    #[arg(short, long, env = "OCRLAYOUT_JOBS")]
    pub jobs: Option<usize>,

    /// Extension of the output files
    #[arg(long, default_value = "txt")]
    pub extension: String,

    #[clap(flatten)]
    pub layout: LayoutArgs,
}

/// Result of rendering one input file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileOutcome {
    pub input: PathBuf,
    pub output: PathBuf,
    pub pages: usize,
    pub error: Option<String>,
}

impl FileOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

pub async fn run(options: BatchOptions, global: crate::Global) -> Result<()> {
    let engine = Arc::new(build_engine(&global, &options.layout)?);

    let inputs = collect_inputs(&options.input_dir)?;
    if inputs.is_empty() {
        return Err(Error::NoDocuments(options.input_dir.display().to_string()).into());
    }

    std::fs::create_dir_all(&options.output_dir)
        .wrap_err_with(|| f!("Failed to create {}", options.output_dir.display()))?;

    let jobs = options.jobs.unwrap_or_else(default_jobs).max(1);
    log::debug!("rendering {} documents with {jobs} jobs", inputs.len());

    let progress = ProgressBar::new(inputs.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("=> "),
    );

    let outcomes = process_all(
        engine,
        inputs,
        &options.output_dir,
        &options.extension,
        jobs,
        Some(&progress),
    )
    .await;

    progress.finish_and_clear();

    let total = outcomes.len();
    let failed: Vec<&FileOutcome> = outcomes.iter().filter(|o| !o.is_ok()).collect();

    for outcome in &failed {
        eprintln!(
            "{} {}: {}",
            "Failed".red().bold(),
            outcome.input.display(),
            outcome.error.as_deref().unwrap_or_default()
        );
    }

    if global.verbose {
        for outcome in outcomes.iter().filter(|o| o.is_ok()) {
            println!(
                "{} {} ({} pages)",
                "Rendered".green(),
                outcome.output.display(),
                outcome.pages
            );
        }
    }

    println!(
        "{} {} of {} documents into {}",
        "Rendered".green().bold(),
        (total - failed.len()).to_string().bold(),
        total,
        options.output_dir.display().to_string().cyan()
    );

    if failed.is_empty() {
        Ok(())
    } else {
        Err(Error::BatchFailed {
            failed: failed.len(),
            total,
        }
        .into())
    }
}

fn default_jobs() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// `*.json` files directly inside `dir`, sorted by name.
pub fn collect_inputs(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries =
        std::fs::read_dir(dir).wrap_err_with(|| f!("Failed to read directory {}", dir.display()))?;

    let mut inputs = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json && path.is_file() {
            inputs.push(path);
        }
    }

    inputs.sort();
    Ok(inputs)
}

/// Output file for `input`: same stem, new extension, inside `output_dir`.
pub fn output_path(output_dir: &Path, input: &Path, extension: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    let extension = extension.trim_start_matches('.');
    if extension.is_empty() {
        output_dir.join(stem)
    } else {
        output_dir.join(f!("{stem}.{extension}"))
    }
}

/// Render every input on the blocking pool, at most `jobs` at a time.
///
/// A failing file never stops the batch; outcomes come back sorted by input.
pub async fn process_all(
    engine: Arc<LayoutEngine>,
    inputs: Vec<PathBuf>,
    output_dir: &Path,
    extension: &str,
    jobs: usize,
    progress: Option<&ProgressBar>,
) -> Vec<FileOutcome> {
    let mut outcomes: Vec<FileOutcome> = stream::iter(inputs)
        .map(|input| {
            let engine = Arc::clone(&engine);
            let output = output_path(output_dir, &input, extension);
            async move {
                let result = tokio::task::spawn_blocking({
                    let input = input.clone();
                    let output = output.clone();
                    move || process_file(&engine, &input, &output)
                })
                .await
                .map_err(|e| eyre!(Error::Generic(f!("worker failed: {e}"))))
                .and_then(|r| r);

                match result {
                    Ok(pages) => FileOutcome {
                        input,
                        output,
                        pages,
                        error: None,
                    },
                    Err(err) => FileOutcome {
                        input,
                        output,
                        pages: 0,
                        error: Some(f!("{err:#}")),
                    },
                }
            }
        })
        .buffer_unordered(jobs.max(1))
        .inspect(|outcome| {
            if let Some(progress) = progress {
                progress.set_message(
                    outcome
                        .input
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default(),
                );
                progress.inc(1);
            }
        })
        .collect()
        .await;

    outcomes.sort_by(|a, b| a.input.cmp(&b.input));
    outcomes
}

/// Render `input` into `output`; returns the number of pages.
pub fn process_file(engine: &LayoutEngine, input: &Path, output: &Path) -> Result<usize> {
    let bytes =
        std::fs::read(input).wrap_err_with(|| f!("Failed to read {}", input.display()))?;
    let document = Document::from_slice(&bytes)
        .wrap_err_with(|| f!("Failed to parse {}", input.display()))?;

    let sink = LogSink::new(input.display().to_string());
    let text = engine.render_document(&document, &sink);
    std::fs::write(output, f!("{text}\n"))
        .wrap_err_with(|| f!("Failed to write {}", output.display()))?;

    Ok(document.pages.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn write_document(dir: &Path, name: &str, word: &str) -> PathBuf {
        let value = json!({
            "text": word,
            "pages": [{
                "dimension": { "width": 200.0, "height": 100.0 },
                "tokens": [{
                    "layout": {
                        "textAnchor": { "textSegments": [{ "startIndex": 0, "endIndex": word.len() }] },
                        "boundingPoly": { "normalizedVertices": [
                            { "x": 0.0, "y": 0.0 }, { "x": 0.25, "y": 0.0 },
                            { "x": 0.25, "y": 0.5 }, { "x": 0.0, "y": 0.5 }
                        ] }
                    }
                }]
            }]
        });
        let path = dir.join(name);
        std::fs::write(&path, value.to_string()).unwrap();
        path
    }

    // =====================================================================
    // File naming and discovery
    // =====================================================================

    #[test]
    fn test_output_path_replaces_extension() {
        let out = Path::new("/out");
        assert_eq!(
            output_path(out, Path::new("/in/scan-001.json"), "txt"),
            PathBuf::from("/out/scan-001.txt")
        );
        assert_eq!(
            output_path(out, Path::new("/in/scan.v2.json"), ".md"),
            PathBuf::from("/out/scan.v2.md")
        );
        assert_eq!(
            output_path(out, Path::new("/in/scan.json"), ""),
            PathBuf::from("/out/scan")
        );
    }

    #[test]
    fn test_collect_inputs_sorted_json_only() {
        let dir = tempfile::tempdir().unwrap();
        write_document(dir.path(), "b.json", "b");
        write_document(dir.path(), "a.JSON", "a");
        std::fs::write(dir.path().join("notes.txt"), "ignore me").unwrap();
        std::fs::create_dir(dir.path().join("nested.json")).unwrap();

        let inputs = collect_inputs(dir.path()).unwrap();
        let names: Vec<_> = inputs
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.JSON", "b.json"]);
    }

    #[test]
    fn test_collect_inputs_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(collect_inputs(&dir.path().join("absent")).is_err());
    }

    // =====================================================================
    // Processing
    // =====================================================================

    #[test]
    fn test_process_file_writes_text() {
        let input_dir = tempfile::tempdir().unwrap();
        let output_dir = tempfile::tempdir().unwrap();
        let input = write_document(input_dir.path(), "memo.json", "Memo");
        let output = output_path(output_dir.path(), &input, "txt");

        let pages = process_file(&LayoutEngine::default(), &input, &output).unwrap();
        assert_eq!(pages, 1);
        assert_eq!(std::fs::read_to_string(output).unwrap(), " Memo\n");
    }

    #[tokio::test]
    async fn test_process_all_continues_after_failure() {
        let input_dir = tempfile::tempdir().unwrap();
        let output_dir = tempfile::tempdir().unwrap();
        write_document(input_dir.path(), "one.json", "One");
        std::fs::write(input_dir.path().join("two.json"), "not json").unwrap();
        write_document(input_dir.path(), "three.json", "Three");

        let inputs = collect_inputs(input_dir.path()).unwrap();
        let outcomes = process_all(
            Arc::new(LayoutEngine::default()),
            inputs,
            output_dir.path(),
            "txt",
            2,
            None,
        )
        .await;

        assert_eq!(outcomes.len(), 3);
        let ok: Vec<_> = outcomes.iter().filter(|o| o.is_ok()).collect();
        assert_eq!(ok.len(), 2);

        let failed = outcomes.iter().find(|o| !o.is_ok()).unwrap();
        assert!(failed.input.ends_with("two.json"));
        assert!(failed.error.as_deref().unwrap().contains("Failed to parse"));

        assert_eq!(
            std::fs::read_to_string(output_dir.path().join("three.txt")).unwrap(),
            " Three\n"
        );
        assert!(!output_dir.path().join("two.txt").exists());
    }
}
