//! Tunable parameters of the layout engine.
//!
//! All heuristics thresholds are empirical; they are kept here as named
//! values so they can be adjusted per corpus from a TOML file or the CLI.

use serde::{Deserialize, Serialize};

use crate::error::LayoutError;

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

/// Minimum vertical overlap (percent of the word height) to join a line.
pub const DEFAULT_MIN_OVERLAP_PCT: f32 = 65.0;

/// Row-band clustering tolerance in pixels.
pub const DEFAULT_ROW_TOLERANCE: f32 = 5.0;

/// A line whose word widths sum to at least this fraction of the used page
/// width may set the slot.
pub const DEFAULT_SIGNIFICANT_RATIO: f32 = 0.30;

/// Vertical gap, in row heights, that marks a paragraph break.
pub const DEFAULT_GAP_MULTIPLIER: f32 = 1.5;

/// Standard deviations above the mean line distance for the statistical gap
/// policy.
pub const DEFAULT_GAP_STDDEV: f32 = 1.0;

/// Upper bound on the spaces emitted between two words in word-gap mode.
pub const DEFAULT_MAX_GAP_SPACES: usize = 25;

// ---------------------------------------------------------------------------
// Strategy selectors
// ---------------------------------------------------------------------------

/// Which record list of a page feeds the extractor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TokenSource {
    #[default]
    Tokens,
    Lines,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClusteringStrategy {
    /// Vertical-overlap clustering.
    #[default]
    Overlap,
    /// Fixed pixel band around the first word of each row.
    RowBand,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpacingStrategy {
    /// Absolute slot grid anchored at the page's left text edge.
    #[default]
    Grid,
    /// Spacing relative to the previous word's right edge.
    WordGap,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SlotScope {
    #[default]
    Global,
    PerLine,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GapStrategy {
    /// Fixed multiple of the page row height.
    #[default]
    Fixed,
    /// Mean plus k standard deviations of successive line distances.
    Statistical,
}

// ---------------------------------------------------------------------------
// LayoutConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub token_source: TokenSource,
    pub clustering: ClusteringStrategy,
    pub min_overlap_pct: f32,
    pub row_tolerance: f32,
    pub spacing: SpacingStrategy,
    pub max_gap_spaces: usize,
    pub slot_scope: SlotScope,
    pub significant_ratio: f32,
    pub gap_policy: GapStrategy,
    pub gap_multiplier: f32,
    pub gap_stddev: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            token_source: TokenSource::default(),
            clustering: ClusteringStrategy::default(),
            min_overlap_pct: DEFAULT_MIN_OVERLAP_PCT,
            row_tolerance: DEFAULT_ROW_TOLERANCE,
            spacing: SpacingStrategy::default(),
            max_gap_spaces: DEFAULT_MAX_GAP_SPACES,
            slot_scope: SlotScope::default(),
            significant_ratio: DEFAULT_SIGNIFICANT_RATIO,
            gap_policy: GapStrategy::default(),
            gap_multiplier: DEFAULT_GAP_MULTIPLIER,
            gap_stddev: DEFAULT_GAP_STDDEV,
        }
    }
}

impl LayoutConfig {
    /// Parse a TOML document; keys that are absent keep their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, LayoutError> {
        let config: LayoutConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make the heuristics meaningless.
    pub fn validate(&self) -> Result<(), LayoutError> {
        if self.min_overlap_pct.is_nan()
            || self.min_overlap_pct <= 0.0
            || self.min_overlap_pct > 100.0
        {
            return Err(LayoutError::InvalidConfig(format!(
                "min_overlap_pct must be in (0, 100], got {}",
                self.min_overlap_pct
            )));
        }
        if self.row_tolerance.is_nan() || self.row_tolerance <= 0.0 {
            return Err(LayoutError::InvalidConfig(format!(
                "row_tolerance must be positive, got {}",
                self.row_tolerance
            )));
        }
        if !(0.0..=1.0).contains(&self.significant_ratio) {
            return Err(LayoutError::InvalidConfig(format!(
                "significant_ratio must be in [0, 1], got {}",
                self.significant_ratio
            )));
        }
        if self.gap_multiplier.is_nan() || self.gap_multiplier <= 0.0 {
            return Err(LayoutError::InvalidConfig(format!(
                "gap_multiplier must be positive, got {}",
                self.gap_multiplier
            )));
        }
        if self.gap_stddev.is_nan() || self.gap_stddev < 0.0 {
            return Err(LayoutError::InvalidConfig(format!(
                "gap_stddev must not be negative, got {}",
                self.gap_stddev
            )));
        }
        if self.max_gap_spaces == 0 {
            return Err(LayoutError::InvalidConfig(
                "max_gap_spaces must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
