//! The slot model: how many pixels one rendered space stands for.
//!
//! Proportional OCR boxes cannot be mapped 1:1 to monospaced characters, so
//! a single horizontal unit is derived from the word-width distribution. The
//! slot starts at the page's used width and shrinks to the narrowest median
//! word width among *significant* lines, i.e. lines whose words cover a
//! substantial share of that width. Titles and isolated words therefore
//! cannot set an oversized slot.

use serde::Serialize;

use crate::config::SlotScope;
use crate::types::{Line, PageGeometry};

/// Used when no positive slot can be derived.
pub const FALLBACK_SLOT: f32 = 1.0;

/// `[min, median, max]` word widths of one line.
///
/// Only positive widths count; a line without any is all zeros.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct WidthStats {
    pub min: f32,
    pub median: f32,
    pub max: f32,
}

impl WidthStats {
    /// Width statistics of `line`, or `None` when no word has a positive
    /// width.
    pub fn of_line(line: &Line) -> Option<Self> {
        let mut widths: Vec<f32> = line
            .words
            .iter()
            .map(|w| w.width)
            .filter(|w| *w > 0.0)
            .collect();
        if widths.is_empty() {
            return None;
        }
        widths.sort_by(|a, b| a.total_cmp(b));

        Some(Self {
            min: widths[0],
            median: median_of_sorted(&widths),
            max: widths[widths.len() - 1],
        })
    }
}

/// Standard median of an ascending, non-empty slice.
fn median_of_sorted(sorted: &[f32]) -> f32 {
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Page-wide slot plus the per-line statistics it was derived from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotModel {
    pub global_slot: f32,
    pub line_stats: Vec<WidthStats>,
    pub significant_lines: usize,
}

impl SlotModel {
    /// Derive the slot for one page.
    ///
    /// `significant_ratio` is the fraction of the used width a line's word
    /// widths must cover before its median may set the slot.
    pub fn compute(lines: &[Line], geometry: &PageGeometry, significant_ratio: f32) -> Self {
        let used_width = geometry.used_width();
        let mut global_slot = used_width;
        let mut significant_lines = 0;
        let mut line_stats = Vec::with_capacity(lines.len());

        for line in lines {
            let stats = WidthStats::of_line(line).unwrap_or_default();
            line_stats.push(stats);

            if line.width_sum() >= used_width * significant_ratio {
                significant_lines += 1;
                if stats.median > 0.0 && stats.median < global_slot {
                    global_slot = stats.median;
                }
            }
        }

        if global_slot.is_nan() || global_slot <= 0.0 {
            global_slot = FALLBACK_SLOT;
        }

        Self {
            global_slot,
            line_stats,
            significant_lines,
        }
    }

    /// Slot to quantize line `index` with.
    ///
    /// Per-line scope uses the line's own median width, falling back to the
    /// global slot when that median is not positive.
    pub fn slot_for_line(&self, index: usize, scope: SlotScope) -> f32 {
        match scope {
            SlotScope::Global => self.global_slot,
            SlotScope::PerLine => self
                .line_stats
                .get(index)
                .map(|s| s.median)
                .filter(|m| *m > 0.0)
                .unwrap_or(self.global_slot),
        }
    }
}
