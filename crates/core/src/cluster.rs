//! Word-to-line clustering.
//!
//! OCR boxes for words on the same baseline rarely share identical top and
//! bottom edges, so lines are formed by tolerance tests rather than exact
//! y-equality. Two strategies are available behind [`LineGrouping`]:
//!
//! - [`OverlapClustering`]: a word joins the first line whose vertical band
//!   covers enough of the word's height.
//! - [`RowBandClustering`]: a word joins the current row when its top edge is
//!   within a fixed pixel distance of the row's first word.
//!
//! Both finish with the same post-pass: lines ordered top-to-bottom, words
//! within a line left-to-right. Degenerate (zero-height) words are dropped.

use crate::config::{ClusteringStrategy, LayoutConfig};
use crate::types::{Line, Word};

/// Groups positioned words into ordered visual lines.
pub trait LineGrouping: Send + Sync {
    fn group_into_lines(&self, words: Vec<Word>) -> Vec<Line>;
}

/// Build the grouping strategy selected by `config`.
pub fn grouping_for(config: &LayoutConfig) -> Box<dyn LineGrouping> {
    match config.clustering {
        ClusteringStrategy::Overlap => Box::new(OverlapClustering {
            min_overlap_pct: config.min_overlap_pct,
        }),
        ClusteringStrategy::RowBand => Box::new(RowBandClustering {
            tolerance: config.row_tolerance,
        }),
    }
}

// ---------------------------------------------------------------------------
// Overlap clustering
// ---------------------------------------------------------------------------

/// Vertical-overlap clustering.
///
/// Words are visited by ascending top edge. The overlap between a word and a
/// line band is normalized by the word's own height; the first line (in
/// creation order) reaching `min_overlap_pct` wins, with no best-fit search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlapClustering {
    pub min_overlap_pct: f32,
}

impl Default for OverlapClustering {
    fn default() -> Self {
        Self {
            min_overlap_pct: crate::config::DEFAULT_MIN_OVERLAP_PCT,
        }
    }
}

impl OverlapClustering {
    /// Overlap of `word` with `line` as a percentage of the word height.
    fn overlap_pct(line: &Line, word: &Word) -> f32 {
        let ratio = line.overlap_with(word) / word.height();
        ratio.clamp(0.0, 1.0) * 100.0
    }
}

impl LineGrouping for OverlapClustering {
    fn group_into_lines(&self, mut words: Vec<Word>) -> Vec<Line> {
        words.sort_by(|a, b| a.y_top.total_cmp(&b.y_top));

        let mut lines: Vec<Line> = Vec::new();
        for word in words {
            if word.is_degenerate() {
                continue;
            }

            let target = lines
                .iter()
                .position(|line| Self::overlap_pct(line, &word) >= self.min_overlap_pct);

            match target {
                Some(idx) => lines[idx].push(word),
                None => lines.push(Line::new(word)),
            }
        }

        finalize_lines(lines)
    }
}

// ---------------------------------------------------------------------------
// Row-band clustering
// ---------------------------------------------------------------------------

/// Fixed-threshold row grouping.
///
/// Words sorted by `(y_top, x0)`; a word stays on the current row while its
/// top edge is within `tolerance` pixels of the row's first word.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowBandClustering {
    pub tolerance: f32,
}

impl LineGrouping for RowBandClustering {
    fn group_into_lines(&self, mut words: Vec<Word>) -> Vec<Line> {
        words.sort_by(|a, b| a.y_top.total_cmp(&b.y_top).then(a.x0.total_cmp(&b.x0)));

        let mut lines: Vec<Line> = Vec::new();
        let mut anchor_top = 0.0_f32;

        for word in words {
            if word.is_degenerate() {
                continue;
            }

            match lines.last_mut() {
                Some(line) if (word.y_top - anchor_top).abs() <= self.tolerance => {
                    line.push(word);
                }
                _ => {
                    anchor_top = word.y_top;
                    lines.push(Line::new(word));
                }
            }
        }

        finalize_lines(lines)
    }
}

// ---------------------------------------------------------------------------
// Post-pass
// ---------------------------------------------------------------------------

/// Order lines by top edge and words by left edge.
///
/// Widening can leave an early line with a lower top than a later one, so
/// the line order is re-established here.
fn finalize_lines(mut lines: Vec<Line>) -> Vec<Line> {
    lines.sort_by(|a, b| a.top.total_cmp(&b.top));
    for line in &mut lines {
        line.sort_words();
    }
    lines
}
