//! Token extraction: OCR records to positioned words.
//!
//! Best-effort by contract. A token that cannot be placed is skipped and
//! reported in [`ExtractedPage::skipped`]; extraction itself never fails.

use serde::Serialize;

use crate::config::TokenSource;
use crate::diagnostics::SkipReason;
use crate::document::{Page, TextSegment, TokenRecord};
use crate::types::{PageGeometry, Word};

/// Bounding polygons need the top-left (0) and bottom-right (2) corners.
const MIN_POLYGON_VERTICES: usize = 3;

/// A token that did not become a word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SkippedToken {
    pub index: usize,
    pub reason: SkipReason,
}

/// Words of one page plus the page-level extrema.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedPage {
    pub words: Vec<Word>,
    pub geometry: PageGeometry,
    pub skipped: Vec<SkippedToken>,
}

impl ExtractedPage {
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Resolve every token of `page` against the document `text` buffer.
pub fn extract_words(page: &Page, text: &str, source: TokenSource) -> ExtractedPage {
    let records = match source {
        TokenSource::Tokens => &page.tokens,
        TokenSource::Lines => &page.lines,
    };

    let size = page.pixel_size();
    let page_height = size.map(|(_, h)| h).unwrap_or(0.0);

    let mut words: Vec<Word> = Vec::with_capacity(records.len());
    let mut skipped: Vec<SkippedToken> = Vec::new();
    let mut left = f32::INFINITY;
    let mut right = f32::NEG_INFINITY;
    let mut row_height = page_height;

    for (index, record) in records.iter().enumerate() {
        match place_token(record, text, size) {
            Ok(word) => {
                left = left.min(word.x0);
                right = right.max(word.x1());
                let height = word.height();
                if height > 0.0 && height < row_height {
                    row_height = height;
                }
                words.push(word);
            }
            Err(reason) => skipped.push(SkippedToken { index, reason }),
        }
    }

    if words.is_empty() {
        left = 0.0;
        right = 0.0;
    }

    ExtractedPage {
        words,
        geometry: PageGeometry {
            left,
            right,
            row_height,
        },
        skipped,
    }
}

/// Turn one record into a word, or say why it cannot be placed.
fn place_token(
    record: &TokenRecord,
    text: &str,
    size: Option<(f32, f32)>,
) -> Result<Word, SkipReason> {
    let layout = record.layout.as_ref().ok_or(SkipReason::MissingAnchor)?;
    let anchor = layout
        .text_anchor
        .as_ref()
        .ok_or(SkipReason::MissingAnchor)?;

    let resolved = resolve_text(&anchor.text_segments, text);
    if resolved.is_empty() {
        return Err(SkipReason::EmptyText);
    }

    let vertices = layout
        .bounding_poly
        .as_ref()
        .map(|poly| poly.normalized_vertices.as_slice())
        .filter(|v| v.len() >= MIN_POLYGON_VERTICES)
        .ok_or(SkipReason::MissingPolygon)?;

    let (width, height) = size.ok_or(SkipReason::MissingDimensions)?;

    let top_left = vertices[0];
    let bottom_right = vertices[2];
    Ok(Word::new(
        resolved,
        top_left.x * width,
        top_left.y * height,
        bottom_right.x * width,
        bottom_right.y * height,
    ))
}

/// Concatenate the byte ranges addressed by `segments`.
///
/// Ends past the buffer are clamped; a cut through a multi-byte character is
/// replaced lossily rather than dropped.
pub fn resolve_text(segments: &[TextSegment], text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = String::new();
    for seg in segments {
        let end = seg.end_index.min(bytes.len());
        if seg.start_index >= end {
            continue;
        }
        out.push_str(&String::from_utf8_lossy(&bytes[seg.start_index..end]));
    }
    out
}
