use crate::prelude::*;
use clap::Parser;

mod batch;
mod config;
mod diagnostics;
mod error;
mod inspect;
mod prelude;
mod render;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Rebuild the visual layout of OCR-scanned pages as monospaced plain text"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Whether to display additional information.
    #[clap(long, env = "OCRLAYOUT_VERBOSE", global = true, default_value = "false")]
    verbose: bool,

    /// TOML file with layout parameters
    #[clap(long, env = "OCRLAYOUT_CONFIG", global = true)]
    config: Option<std::path::PathBuf>,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Render one OCR JSON document as text
    Render(crate::render::RenderOptions),

    /// Render every OCR JSON document in a directory
    Batch(crate::batch::BatchOptions),

    /// Print per-page layout statistics
    Inspect(crate::inspect::InspectOptions),
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let app = App::parse();
    init_logger(app.global.verbose);

    match app.command {
        SubCommands::Render(options) => crate::render::run(options, app.global).await,
        SubCommands::Batch(options) => crate::batch::run(options, app.global).await,
        SubCommands::Inspect(options) => crate::inspect::run(options, app.global).await,
    }
    .map_err(|err: color_eyre::eyre::Report| eyre!(err))
}

/// `RUST_LOG` drives the filter; `--verbose` forces debug output.
fn init_logger(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        App::command().debug_assert();
    }

    #[test]
    fn test_parse_render_with_layout_flags() {
        let app = App::try_parse_from([
            "ocrlayout",
            "--verbose",
            "render",
            "scan.json",
            "--spacing",
            "word-gap",
            "--min-overlap",
            "50",
        ])
        .unwrap();

        assert!(app.global.verbose);
        match app.command {
            SubCommands::Render(options) => {
                assert_eq!(options.path, std::path::PathBuf::from("scan.json"));
                assert_eq!(options.layout.min_overlap, Some(50.0));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_batch_defaults() {
        let app = App::try_parse_from(["ocrlayout", "batch", "in", "out"]).unwrap();
        match app.command {
            SubCommands::Batch(options) => {
                assert_eq!(options.extension, "txt");
                assert_eq!(options.jobs, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
