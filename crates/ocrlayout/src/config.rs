use std::path::Path;

use ocrlayout_core::{
    ClusteringStrategy, GapStrategy, LayoutConfig, LayoutEngine, SlotScope, SpacingStrategy,
    TokenSource,
};

use crate::prelude::*;

// ---------------------------------------------------------------------------
// Command-line mirrors of the core strategy selectors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ClusteringArg {
    Overlap,
    RowBand,
}

impl From<ClusteringArg> for ClusteringStrategy {
    fn from(value: ClusteringArg) -> Self {
        match value {
            ClusteringArg::Overlap => ClusteringStrategy::Overlap,
            ClusteringArg::RowBand => ClusteringStrategy::RowBand,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SpacingArg {
    Grid,
    WordGap,
}

impl From<SpacingArg> for SpacingStrategy {
    fn from(value: SpacingArg) -> Self {
        match value {
            SpacingArg::Grid => SpacingStrategy::Grid,
            SpacingArg::WordGap => SpacingStrategy::WordGap,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SlotScopeArg {
    Global,
    PerLine,
}

impl From<SlotScopeArg> for SlotScope {
    fn from(value: SlotScopeArg) -> Self {
        match value {
            SlotScopeArg::Global => SlotScope::Global,
            SlotScopeArg::PerLine => SlotScope::PerLine,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum GapPolicyArg {
    Fixed,
    Statistical,
}

impl From<GapPolicyArg> for GapStrategy {
    fn from(value: GapPolicyArg) -> Self {
        match value {
            GapPolicyArg::Fixed => GapStrategy::Fixed,
            GapPolicyArg::Statistical => GapStrategy::Statistical,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum TokenSourceArg {
    Tokens,
    Lines,
}

impl From<TokenSourceArg> for TokenSource {
    fn from(value: TokenSourceArg) -> Self {
        match value {
            TokenSourceArg::Tokens => TokenSource::Tokens,
            TokenSourceArg::Lines => TokenSource::Lines,
        }
    }
}

// ---------------------------------------------------------------------------
// Layout flags shared by every subcommand
// ---------------------------------------------------------------------------

/// Overrides for the layout parameters. Unset flags keep the value from the
/// config file, or the built-in default.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct LayoutArgs {
    /// Line clustering strategy
    #[arg(long, value_enum, env = "OCRLAYOUT_CLUSTERING")]
    pub clustering: Option<ClusteringArg>,

    /// Minimum vertical overlap (percent of word height) to join a line
    #[arg(long, value_name = "PCT")]
    pub min_overlap: Option<f32>,

    /// Row-band clustering tolerance in pixels
    #[arg(long, value_name = "PX")]
    pub row_tolerance: Option<f32>,

    /// Horizontal spacing strategy
    #[arg(long, value_enum, env = "OCRLAYOUT_SPACING")]
    pub spacing: Option<SpacingArg>,

    /// Maximum spaces between two words in word-gap mode
    #[arg(long, value_name = "N")]
    pub max_gap_spaces: Option<usize>,

    /// Use one slot for the page or each line's own median width
    #[arg(long, value_enum)]
    pub slot_scope: Option<SlotScopeArg>,

    /// Share of the used page width a line must cover to set the slot
    #[arg(long, value_name = "RATIO")]
    pub significant_ratio: Option<f32>,

    /// Paragraph gap detection policy
    #[arg(long, value_enum, env = "OCRLAYOUT_GAP_POLICY")]
    pub gap_policy: Option<GapPolicyArg>,

    /// Gap threshold in row heights (fixed policy)
    #[arg(long, value_name = "M")]
    pub gap_multiplier: Option<f32>,

    /// Standard deviations above the mean line distance (statistical policy)
    #[arg(long, value_name = "K")]
    pub gap_stddev: Option<f32>,

    /// Which record list of each page to read
    #[arg(long, value_enum)]
    pub token_source: Option<TokenSourceArg>,
}

impl LayoutArgs {
    /// Write every flag that was given over `config`.
    pub fn apply(&self, config: &mut LayoutConfig) {
        if let Some(v) = self.clustering {
            config.clustering = v.into();
        }
        if let Some(v) = self.min_overlap {
            config.min_overlap_pct = v;
        }
        if let Some(v) = self.row_tolerance {
            config.row_tolerance = v;
        }
        if let Some(v) = self.spacing {
            config.spacing = v.into();
        }
        if let Some(v) = self.max_gap_spaces {
            config.max_gap_spaces = v;
        }
        if let Some(v) = self.slot_scope {
            config.slot_scope = v.into();
        }
        if let Some(v) = self.significant_ratio {
            config.significant_ratio = v;
        }
        if let Some(v) = self.gap_policy {
            config.gap_policy = v.into();
        }
        if let Some(v) = self.gap_multiplier {
            config.gap_multiplier = v;
        }
        if let Some(v) = self.gap_stddev {
            config.gap_stddev = v;
        }
        if let Some(v) = self.token_source {
            config.token_source = v.into();
        }
    }
}

/// Defaults, then the TOML file (if any), then the command-line flags.
pub fn resolve_config(path: Option<&Path>, args: &LayoutArgs) -> Result<LayoutConfig> {
    let mut config = match path {
        Some(path) => {
            let source = std::fs::read_to_string(path)
                .wrap_err_with(|| f!("Failed to read config file {}", path.display()))?;
            LayoutConfig::from_toml_str(&source)
                .wrap_err_with(|| f!("Failed to load config file {}", path.display()))?
        }
        None => LayoutConfig::default(),
    };

    args.apply(&mut config);
    config.validate().wrap_err("Invalid layout parameters")?;

    log::debug!("layout config: {config:?}");
    Ok(config)
}

/// Build the engine for one invocation.
pub fn build_engine(global: &crate::Global, args: &LayoutArgs) -> Result<LayoutEngine> {
    let config = resolve_config(global.config.as_deref(), args)?;
    Ok(LayoutEngine::new(config)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_without_file_or_flags() {
        let config = resolve_config(None, &LayoutArgs::default()).unwrap();
        assert_eq!(config, LayoutConfig::default());
    }

    #[test]
    fn test_flags_override_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "spacing = \"word-gap\"\nmin_overlap_pct = 55.0").unwrap();

        let args = LayoutArgs {
            min_overlap: Some(80.0),
            gap_policy: Some(GapPolicyArg::Statistical),
            ..Default::default()
        };
        let config = resolve_config(Some(file.path()), &args).unwrap();

        assert_eq!(config.spacing, SpacingStrategy::WordGap);
        assert_eq!(config.min_overlap_pct, 80.0);
        assert_eq!(config.gap_policy, GapStrategy::Statistical);
        assert_eq!(config.max_gap_spaces, 25);
    }

    #[test]
    fn test_invalid_flag_value_rejected() {
        let args = LayoutArgs {
            significant_ratio: Some(2.0),
            ..Default::default()
        };
        assert!(resolve_config(None, &args).is_err());
    }

    #[test]
    fn test_missing_config_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_config(Some(&dir.path().join("absent.toml")), &LayoutArgs::default())
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_value_enum_conversions() {
        assert_eq!(
            ClusteringStrategy::from(ClusteringArg::RowBand),
            ClusteringStrategy::RowBand
        );
        assert_eq!(SlotScope::from(SlotScopeArg::PerLine), SlotScope::PerLine);
        assert_eq!(TokenSource::from(TokenSourceArg::Lines), TokenSource::Lines);
    }
}
