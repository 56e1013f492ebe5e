//! Core library for ocrlayout
//!
//! This crate implements the **Functional Core** of the ocrlayout application:
//! reconstructing the visual layout of an OCR-scanned page as monospaced
//! plain text. It never touches the file system or prints; the `ocrlayout`
//! binary does all I/O around it.
//!
//! # Pipeline
//!
//! Every page goes through the same four steps:
//!
//! - [`extract`]: token records (text anchors + normalized polygons) become
//!   positioned [`Word`]s in page pixels, with the page's left/right text
//!   edges and row height.
//! - [`cluster`]: words are grouped into visual [`Line`]s despite vertical
//!   jitter between boxes on the same baseline.
//! - [`slot`]: a single horizontal unit (the slot) is derived from the word
//!   widths of significant lines.
//! - [`render`]: lines become text, horizontal gaps quantized into space
//!   runs and large vertical gaps marked with a blank line.
//!
//! [`LayoutEngine`] wires the steps together according to a [`LayoutConfig`]
//! and joins pages with [`PAGE_SEPARATOR`].
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use ocrlayout_core::{LayoutConfig, LayoutEngine, NullSink};
//!
//! let engine = LayoutEngine::new(LayoutConfig::default())?;
//! let text = engine.render_json(&std::fs::read_to_string("scan.json")?, &NullSink)?;
//! println!("{text}");
//! ```

pub mod cluster;
pub mod config;
pub mod diagnostics;
pub mod document;
pub mod engine;
pub mod error;
pub mod extract;
pub mod render;
pub mod slot;
pub mod types;

pub use cluster::{LineGrouping, OverlapClustering, RowBandClustering};
pub use config::{
    ClusteringStrategy, GapStrategy, LayoutConfig, SlotScope, SpacingStrategy, TokenSource,
};
pub use diagnostics::{Diagnostic, DiagnosticSink, NullSink, RecordingSink, SkipReason};
pub use document::Document;
pub use engine::{
    LayoutEngine, PageAnalysis, RenderedDocument, EMPTY_PAGE_PLACEHOLDER, NO_PAGES_FOUND,
    PAGE_SEPARATOR,
};
pub use error::LayoutError;
pub use render::{GapPolicy, LineRenderer, SpacingPolicy};
pub use slot::SlotModel;
pub use types::{Line, PageGeometry, Word};

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_engine_can_be_shared_across_threads() {
        assert_send_sync::<LayoutEngine>();
    }
}
