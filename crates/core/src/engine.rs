//! Page and document assembly.
//!
//! [`LayoutEngine`] runs the per-page pipeline (extract, cluster, slot,
//! render) and joins the results. Nothing here fails: malformed tokens are
//! skipped, empty pages get a placeholder, and an empty document renders as
//! a fixed message.

use serde::Serialize;

use crate::cluster::{grouping_for, LineGrouping};
use crate::config::LayoutConfig;
use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::document::{Document, Page};
use crate::error::LayoutError;
use crate::extract::{extract_words, ExtractedPage, SkippedToken};
use crate::render::{LineRenderer, RenderContext, RenderedPage};
use crate::slot::{SlotModel, WidthStats};
use crate::types::Line;

/// Joins rendered pages.
pub const PAGE_SEPARATOR: &str = "\n---\n";

/// Rendered in place of a page that yields no words.
pub const EMPTY_PAGE_PLACEHOLDER: &str = "[empty page]";

/// Rendered in place of a document without pages.
pub const NO_PAGES_FOUND: &str = "no pages found";

/// Rendered pages together with their joined text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedDocument {
    pub pages: Vec<String>,
    pub text: String,
}

impl RenderedDocument {
    fn from_pages(pages: Vec<String>) -> Self {
        let text = if pages.is_empty() {
            NO_PAGES_FOUND.to_string()
        } else {
            pages.join(PAGE_SEPARATOR)
        };
        Self { pages, text }
    }
}

/// Per-page statistics, as reported by `inspect`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageAnalysis {
    pub page: usize,
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub words: usize,
    pub degenerate_words: usize,
    pub lines: usize,
    pub skipped: Vec<SkippedToken>,
    pub left: f32,
    pub right: f32,
    pub row_height: f32,
    pub global_slot: f32,
    pub significant_lines: usize,
    pub line_stats: Vec<WidthStats>,
    pub gap_markers: usize,
}

/// Intermediate results of one pass over a page.
struct PageLayout {
    extracted: ExtractedPage,
    degenerate_words: usize,
    lines: Vec<Line>,
    slots: SlotModel,
    rendered: RenderedPage,
}

pub struct LayoutEngine {
    config: LayoutConfig,
    grouping: Box<dyn LineGrouping>,
    renderer: LineRenderer,
}

impl LayoutEngine {
    /// Build an engine for a validated `config`.
    pub fn new(config: LayoutConfig) -> Result<Self, LayoutError> {
        config.validate()?;
        Ok(Self {
            grouping: grouping_for(&config),
            renderer: LineRenderer::from_config(&config),
            config,
        })
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Render one page into text lines.
    pub fn render_page(&self, page: &Page, text: &str, sink: &dyn DiagnosticSink) -> Vec<String> {
        self.render_numbered(page_number(page, 0), page, text, sink)
    }

    /// Render every page and join them with [`PAGE_SEPARATOR`].
    pub fn render_document(&self, document: &Document, sink: &dyn DiagnosticSink) -> String {
        self.render_document_parts(document, sink).text
    }

    /// Render every page, keeping the per-page text next to the joined
    /// result.
    pub fn render_document_parts(
        &self,
        document: &Document,
        sink: &dyn DiagnosticSink,
    ) -> RenderedDocument {
        RenderedDocument::from_pages(self.render_pages(document, sink))
    }

    /// Rendered text of each page, in document order.
    pub fn render_pages(&self, document: &Document, sink: &dyn DiagnosticSink) -> Vec<String> {
        document
            .pages
            .iter()
            .enumerate()
            .map(|(index, page)| {
                self.render_numbered(page_number(page, index), page, &document.text, sink)
                    .join("\n")
            })
            .collect()
    }

    /// Parse a JSON document and render it.
    pub fn render_json(&self, json: &str, sink: &dyn DiagnosticSink) -> Result<String, LayoutError> {
        let document = Document::from_json(json)?;
        Ok(self.render_document(&document, sink))
    }

    /// Run the pipeline on one page and report its statistics.
    pub fn analyze_page(&self, page: &Page, text: &str, sink: &dyn DiagnosticSink) -> PageAnalysis {
        self.analyze_numbered(page_number(page, 0), page, text, sink)
    }

    /// Analyze every page of `document`.
    pub fn analyze_document(
        &self,
        document: &Document,
        sink: &dyn DiagnosticSink,
    ) -> Vec<PageAnalysis> {
        document
            .pages
            .iter()
            .enumerate()
            .map(|(index, page)| {
                self.analyze_numbered(page_number(page, index), page, &document.text, sink)
            })
            .collect()
    }

    fn analyze_numbered(
        &self,
        number: usize,
        page: &Page,
        text: &str,
        sink: &dyn DiagnosticSink,
    ) -> PageAnalysis {
        let layout = self.layout_page(number, page, text, sink);
        let geometry = layout.extracted.geometry;
        let size = page.pixel_size();

        PageAnalysis {
            page: number,
            width: size.map(|(w, _)| w),
            height: size.map(|(_, h)| h),
            words: layout.extracted.words.len(),
            degenerate_words: layout.degenerate_words,
            lines: layout.lines.len(),
            skipped: layout.extracted.skipped,
            left: geometry.left,
            right: geometry.right,
            row_height: geometry.row_height,
            global_slot: layout.slots.global_slot,
            significant_lines: layout.slots.significant_lines,
            line_stats: layout.slots.line_stats,
            gap_markers: layout.rendered.gap_markers,
        }
    }

    fn render_numbered(
        &self,
        number: usize,
        page: &Page,
        text: &str,
        sink: &dyn DiagnosticSink,
    ) -> Vec<String> {
        let layout = self.layout_page(number, page, text, sink);
        if layout.lines.is_empty() {
            return vec![EMPTY_PAGE_PLACEHOLDER.to_string()];
        }
        layout.rendered.lines
    }

    fn layout_page(
        &self,
        number: usize,
        page: &Page,
        text: &str,
        sink: &dyn DiagnosticSink,
    ) -> PageLayout {
        let size = page.pixel_size();
        sink.emit(&Diagnostic::PageStarted {
            page: number,
            width: size.map(|(w, _)| w),
            height: size.map(|(_, h)| h),
        });

        let extracted = extract_words(page, text, self.config.token_source);
        for skipped in &extracted.skipped {
            sink.emit(&Diagnostic::TokenSkipped {
                page: number,
                token: skipped.index,
                reason: skipped.reason,
            });
        }
        sink.emit(&Diagnostic::WordsExtracted {
            page: number,
            count: extracted.words.len(),
            left: extracted.geometry.left,
            right: extracted.geometry.right,
            row_height: extracted.geometry.row_height,
        });

        let mut degenerate_words = 0;
        for word in extracted.words.iter().filter(|w| w.is_degenerate()) {
            degenerate_words += 1;
            sink.emit(&Diagnostic::DegenerateWord {
                page: number,
                text: word.text.clone(),
            });
        }

        let lines = self.grouping.group_into_lines(extracted.words.clone());
        sink.emit(&Diagnostic::LinesClustered {
            page: number,
            count: lines.len(),
        });

        let slots = SlotModel::compute(&lines, &extracted.geometry, self.config.significant_ratio);
        sink.emit(&Diagnostic::SlotComputed {
            page: number,
            global_slot: slots.global_slot,
            significant_lines: slots.significant_lines,
        });

        let rendered = self.renderer.render(
            &lines,
            &RenderContext {
                geometry: &extracted.geometry,
                slots: &slots,
            },
        );
        if rendered.gap_markers > 0 {
            sink.emit(&Diagnostic::GapsInserted {
                page: number,
                count: rendered.gap_markers,
            });
        }

        PageLayout {
            extracted,
            degenerate_words,
            lines,
            slots,
            rendered,
        }
    }
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self {
            grouping: grouping_for(&LayoutConfig::default()),
            renderer: LineRenderer::default(),
            config: LayoutConfig::default(),
        }
    }
}

/// 1-based page number: the record's own number, else its position.
fn page_number(page: &Page, index: usize) -> usize {
    page.page_number
        .map(|n| n as usize)
        .unwrap_or(index + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ClusteringStrategy, GapStrategy};
    use crate::diagnostics::{NullSink, RecordingSink, SkipReason};
    use serde_json::{json, Value};

    // -- Fixture builders -------------------------------------------------

    /// A token covering `text[start..end]` with a pixel box on a 1000x1000
    /// page.
    fn token(start: usize, end: usize, x0: f32, y0: f32, x1: f32, y1: f32) -> Value {
        let s = 1000.0;
        json!({
            "layout": {
                "textAnchor": {
                    "textSegments": [{ "startIndex": start.to_string(), "endIndex": end.to_string() }]
                },
                "boundingPoly": {
                    "normalizedVertices": [
                        { "x": x0 / s, "y": y0 / s },
                        { "x": x1 / s, "y": y0 / s },
                        { "x": x1 / s, "y": y1 / s },
                        { "x": x0 / s, "y": y1 / s }
                    ]
                }
            }
        })
    }

    fn page(number: u32, tokens: Vec<Value>) -> Value {
        json!({
            "pageNumber": number,
            "dimension": { "width": 1000.0, "height": 1000.0, "unit": "pixels" },
            "tokens": tokens
        })
    }

    fn document(text: &str, pages: Vec<Value>) -> Document {
        serde_json::from_value(json!({ "text": text, "pages": pages })).unwrap()
    }

    fn invoice() -> Document {
        // "Invoice" / "Total 42" with a paragraph gap in between.
        document(
            "Invoice\nTotal 42",
            vec![page(
                1,
                vec![
                    token(0, 7, 0.0, 0.0, 70.0, 20.0),
                    token(8, 13, 0.0, 100.0, 50.0, 120.0),
                    token(14, 16, 150.0, 101.0, 170.0, 121.0),
                ],
            )],
        )
    }

    // =====================================================================
    // render_document
    // =====================================================================

    #[test]
    fn test_render_single_page() {
        let engine = LayoutEngine::default();
        let out = engine.render_document(&invoice(), &NullSink);
        assert_eq!(out, " Invoice\n\n Total  42");
    }

    #[test]
    fn test_empty_page_placeholder_joins_with_separator() {
        let doc = document(
            "one two",
            vec![
                page(1, vec![token(0, 3, 0.0, 0.0, 30.0, 10.0)]),
                page(2, vec![]),
                page(3, vec![token(4, 7, 0.0, 0.0, 30.0, 10.0)]),
            ],
        );
        let out = LayoutEngine::default().render_document(&doc, &NullSink);
        assert_eq!(out, " one\n---\n[empty page]\n---\n two");
    }

    #[test]
    fn test_render_page_lines() {
        let doc = invoice();
        let lines = LayoutEngine::default().render_page(&doc.pages[0], &doc.text, &NullSink);
        assert_eq!(lines, vec![" Invoice", "", " Total  42"]);

        let empty = Page::default();
        assert_eq!(
            LayoutEngine::default().render_page(&empty, "", &NullSink),
            vec![EMPTY_PAGE_PLACEHOLDER]
        );
    }

    #[test]
    fn test_render_pages_keeps_pages_apart() {
        let doc = document(
            "one two",
            vec![
                page(1, vec![token(0, 3, 0.0, 0.0, 30.0, 10.0)]),
                page(2, vec![token(4, 7, 0.0, 0.0, 30.0, 10.0)]),
            ],
        );
        let pages = LayoutEngine::default().render_pages(&doc, &NullSink);
        assert_eq!(pages, vec![" one", " two"]);
        assert!(LayoutEngine::default()
            .render_pages(&document("", vec![]), &NullSink)
            .is_empty());
    }

    #[test]
    fn test_document_without_pages() {
        let doc = document("", vec![]);
        assert_eq!(
            LayoutEngine::default().render_document(&doc, &NullSink),
            NO_PAGES_FOUND
        );
    }

    #[test]
    fn test_zero_height_word_excluded() {
        let doc = document(
            "flat word",
            vec![page(
                1,
                vec![
                    token(0, 4, 0.0, 50.0, 40.0, 50.0),
                    token(5, 9, 0.0, 0.0, 40.0, 20.0),
                ],
            )],
        );
        let engine = LayoutEngine::default();
        let out = engine.render_document(&doc, &NullSink);
        assert_eq!(out, " word");
        assert_eq!(out.matches("word").count(), 1);

        let analysis = engine.analyze_page(&doc.pages[0], &doc.text, &NullSink);
        assert_eq!(analysis.words, 2);
        assert_eq!(analysis.degenerate_words, 1);
        assert_eq!(analysis.lines, 1);
        assert_eq!(analysis.row_height, 20.0);
    }

    #[test]
    fn test_all_degenerate_page() {
        let doc = document(
            "flat",
            vec![page(1, vec![token(0, 4, 0.0, 50.0, 40.0, 50.0)])],
        );
        let engine = LayoutEngine::default();
        assert_eq!(engine.render_document(&doc, &NullSink), EMPTY_PAGE_PLACEHOLDER);

        let analysis = engine.analyze_page(&doc.pages[0], &doc.text, &NullSink);
        assert_eq!(analysis.row_height, 1000.0);
    }

    #[test]
    fn test_render_is_deterministic() {
        let engine = LayoutEngine::default();
        let doc = invoice();
        assert_eq!(
            engine.render_document(&doc, &NullSink),
            engine.render_document(&doc, &NullSink)
        );
    }

    #[test]
    fn test_render_json_reports_parse_errors() {
        let engine = LayoutEngine::default();
        assert!(matches!(
            engine.render_json("{not json", &NullSink),
            Err(LayoutError::Json(_))
        ));
        assert_eq!(
            engine.render_json(r#"{"pages": []}"#, &NullSink).unwrap(),
            NO_PAGES_FOUND
        );
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = LayoutConfig {
            min_overlap_pct: 150.0,
            ..Default::default()
        };
        assert!(LayoutEngine::new(config).is_err());
    }

    #[test]
    fn test_config_selects_strategies() {
        // Second token sits 8px lower: row-band joins it, overlap does not.
        let doc = document(
            "a b",
            vec![page(
                1,
                vec![
                    token(0, 1, 0.0, 0.0, 10.0, 10.0),
                    token(2, 3, 20.0, 4.0, 30.0, 14.0),
                ],
            )],
        );
        let overlap = LayoutEngine::default();
        assert_eq!(overlap.render_document(&doc, &NullSink), " a\n  b");

        let band = LayoutEngine::new(LayoutConfig {
            clustering: ClusteringStrategy::RowBand,
            gap_policy: GapStrategy::Statistical,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(band.render_document(&doc, &NullSink), " a b");
    }

    // =====================================================================
    // Diagnostics and analysis
    // =====================================================================

    #[test]
    fn test_diagnostics_emitted_in_pipeline_order() {
        let mut doc = invoice();
        doc.pages[0].tokens.push(Default::default());

        let sink = RecordingSink::new();
        LayoutEngine::default().render_document(&doc, &sink);
        let events = sink.events();

        assert!(matches!(events[0], Diagnostic::PageStarted { page: 1, .. }));
        assert_eq!(
            events[1],
            Diagnostic::TokenSkipped {
                page: 1,
                token: 3,
                reason: SkipReason::MissingAnchor
            }
        );
        assert!(matches!(events[2], Diagnostic::WordsExtracted { count: 3, .. }));
        assert!(matches!(events[3], Diagnostic::LinesClustered { count: 2, .. }));
        assert!(matches!(events[4], Diagnostic::SlotComputed { .. }));
        assert_eq!(events[5], Diagnostic::GapsInserted { page: 1, count: 1 });
    }

    #[test]
    fn test_analyze_document() {
        let doc = invoice();
        let analyses = LayoutEngine::default().analyze_document(&doc, &NullSink);
        assert_eq!(analyses.len(), 1);

        let a = &analyses[0];
        assert_eq!(a.page, 1);
        assert_eq!(a.width, Some(1000.0));
        assert_eq!(a.words, 3);
        assert_eq!(a.lines, 2);
        assert_eq!(a.left, 0.0);
        assert_eq!(a.right, 170.0);
        assert_eq!(a.row_height, 20.0);
        assert_eq!(a.global_slot, 35.0);
        assert_eq!(a.line_stats.len(), 2);
        assert_eq!(a.gap_markers, 1);

        let value = serde_json::to_value(a).unwrap();
        assert_eq!(value["global_slot"], 35.0);
    }

    #[test]
    fn test_analyze_document_numbers_unnumbered_pages_by_position() {
        let value = json!({ "text": "a b", "pages": [
            { "dimension": { "width": 1000.0, "height": 1000.0 },
              "tokens": [token(0, 1, 0.0, 0.0, 10.0, 20.0)] },
            { "dimension": { "width": 1000.0, "height": 1000.0 },
              "tokens": [token(2, 3, 0.0, 0.0, 10.0, 20.0)] }
        ] });
        let doc: Document = serde_json::from_value(value).unwrap();

        let sink = RecordingSink::default();
        let analyses = LayoutEngine::default().analyze_document(&doc, &sink);
        let analyzed: Vec<usize> = analyses.iter().map(|a| a.page).collect();
        assert_eq!(analyzed, vec![1, 2]);

        let started: Vec<usize> = sink
            .events()
            .iter()
            .filter_map(|e| match e {
                Diagnostic::PageStarted { page, .. } => Some(*page),
                _ => None,
            })
            .collect();
        assert_eq!(started, vec![1, 2]);
    }

    #[test]
    fn test_render_document_parts() {
        let parts = LayoutEngine::default().render_document_parts(&invoice(), &NullSink);
        assert_eq!(parts.pages.len(), 1);
        assert_eq!(parts.text, parts.pages[0]);

        let empty = LayoutEngine::default().render_document_parts(&Document::default(), &NullSink);
        assert!(empty.pages.is_empty());
        assert_eq!(empty.text, NO_PAGES_FOUND);
    }
}
