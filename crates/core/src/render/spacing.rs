//! Horizontal spacing policies: how many spaces precede each word.
//!
//! Every policy guarantees at least one space before every word, so the
//! rendered horizontal position only ever moves right.

use crate::config::{LayoutConfig, SpacingStrategy};
use crate::types::Word;

pub trait SpacingPolicy: Send + Sync {
    /// Space-run length before each of `words` (ordered left-to-right).
    ///
    /// `left` is the page's leftmost text edge and `slot` the pixel width of
    /// one rendered space; `slot` is always positive.
    fn space_runs(&self, words: &[Word], left: f32, slot: f32) -> Vec<usize>;
}

/// Build the spacing policy selected by `config`.
pub fn spacing_for(config: &LayoutConfig) -> Box<dyn SpacingPolicy> {
    match config.spacing {
        SpacingStrategy::Grid => Box::new(GridSpacing),
        SpacingStrategy::WordGap => Box::new(WordGapSpacing {
            max_spaces: config.max_gap_spaces,
        }),
    }
}

// ---------------------------------------------------------------------------
// Grid spacing
// ---------------------------------------------------------------------------

/// Absolute slot grid anchored at the page's left text edge.
///
/// Words starting at similar pixel offsets land on the same slot index on
/// every line, which keeps table columns aligned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GridSpacing;

impl SpacingPolicy for GridSpacing {
    fn space_runs(&self, words: &[Word], left: f32, slot: f32) -> Vec<usize> {
        let mut last_slot: i64 = 0;
        words
            .iter()
            .map(|word| {
                let slot_index = ((word.x0 - left) / slot).floor() as i64;
                let spaces = (slot_index - last_slot).max(1);
                last_slot = slot_index + (word.width / slot).ceil() as i64;
                spaces as usize
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Word-gap spacing
// ---------------------------------------------------------------------------

/// Spacing relative to the previous word's right edge.
///
/// Degrades more gracefully on skewed scans but does not align columns
/// across lines. The first word is measured from the page's left edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordGapSpacing {
    pub max_spaces: usize,
}

impl Default for WordGapSpacing {
    fn default() -> Self {
        Self {
            max_spaces: crate::config::DEFAULT_MAX_GAP_SPACES,
        }
    }
}

impl SpacingPolicy for WordGapSpacing {
    fn space_runs(&self, words: &[Word], left: f32, slot: f32) -> Vec<usize> {
        let max = self.max_spaces.max(1) as i64;
        let mut last_right = left;
        words
            .iter()
            .map(|word| {
                let gap = word.x0 - last_right;
                last_right = word.x1();
                ((gap / slot).round() as i64).clamp(1, max) as usize
            })
            .collect()
    }
}
