//! Paragraph-gap thresholds.
//!
//! A blank line is emitted before a line whose top edge sits more than the
//! threshold below the previous line's bottom edge.

use crate::config::{GapStrategy, LayoutConfig};
use crate::types::{Line, PageGeometry};

pub trait GapPolicy: Send + Sync {
    /// Vertical distance (pixels) above which a gap marker is inserted.
    fn threshold(&self, lines: &[Line], geometry: &PageGeometry) -> f32;
}

pub fn gap_policy_for(config: &LayoutConfig) -> Box<dyn GapPolicy> {
    match config.gap_policy {
        GapStrategy::Fixed => Box::new(FixedMultiple {
            multiplier: config.gap_multiplier,
        }),
        GapStrategy::Statistical => Box::new(Statistical {
            k: config.gap_stddev,
            fallback_multiplier: config.gap_multiplier,
        }),
    }
}

/// Distances between consecutive lines, `line[i].top - line[i-1].bottom`.
pub fn line_distances(lines: &[Line]) -> Vec<f32> {
    lines
        .windows(2)
        .map(|pair| pair[1].top - pair[0].bottom)
        .collect()
}

// ---------------------------------------------------------------------------
// Fixed multiple of the row height
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedMultiple {
    pub multiplier: f32,
}

impl Default for FixedMultiple {
    fn default() -> Self {
        Self {
            multiplier: crate::config::DEFAULT_GAP_MULTIPLIER,
        }
    }
}

impl GapPolicy for FixedMultiple {
    fn threshold(&self, _lines: &[Line], geometry: &PageGeometry) -> f32 {
        self.multiplier * geometry.row_height
    }
}

// ---------------------------------------------------------------------------
// Mean + k standard deviations
// ---------------------------------------------------------------------------

/// Threshold derived from the page's own line spacing.
///
/// Pages with fewer than two line distances have no meaningful deviation and
/// use `fallback_multiplier × row_height` instead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Statistical {
    pub k: f32,
    pub fallback_multiplier: f32,
}

impl Default for Statistical {
    fn default() -> Self {
        Self {
            k: crate::config::DEFAULT_GAP_STDDEV,
            fallback_multiplier: crate::config::DEFAULT_GAP_MULTIPLIER,
        }
    }
}

impl GapPolicy for Statistical {
    fn threshold(&self, lines: &[Line], geometry: &PageGeometry) -> f32 {
        let distances = line_distances(lines);
        if distances.len() < 2 {
            return self.fallback_multiplier * geometry.row_height;
        }

        let n = distances.len() as f32;
        let mean = distances.iter().sum::<f32>() / n;
        let variance = distances.iter().map(|d| (d - mean).powi(2)).sum::<f32>() / n;
        mean + self.k * variance.sqrt()
    }
}
