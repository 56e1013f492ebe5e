//! Line rendering: clustered lines to monospaced text.
//!
//! Horizontal gaps are quantized into space runs by a [`SpacingPolicy`];
//! vertical breaks larger than the [`GapPolicy`] threshold become one blank
//! line (a gap marker).

pub mod gap;
pub mod spacing;

pub use gap::{gap_policy_for, FixedMultiple, GapPolicy, Statistical};
pub use spacing::{spacing_for, GridSpacing, SpacingPolicy, WordGapSpacing};

use crate::config::{LayoutConfig, SlotScope};
use crate::slot::SlotModel;
use crate::types::{Line, PageGeometry};

/// Page-level inputs shared by every line of a page.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub geometry: &'a PageGeometry,
    pub slots: &'a SlotModel,
}

/// Rendered text lines of one page, gap markers included.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedPage {
    pub lines: Vec<String>,
    pub gap_markers: usize,
}

pub struct LineRenderer {
    spacing: Box<dyn SpacingPolicy>,
    gaps: Box<dyn GapPolicy>,
    slot_scope: SlotScope,
}

impl LineRenderer {
    pub fn new(
        spacing: Box<dyn SpacingPolicy>,
        gaps: Box<dyn GapPolicy>,
        slot_scope: SlotScope,
    ) -> Self {
        Self {
            spacing,
            gaps,
            slot_scope,
        }
    }

    pub fn from_config(config: &LayoutConfig) -> Self {
        Self::new(
            spacing_for(config),
            gap_policy_for(config),
            config.slot_scope,
        )
    }

    /// Render `lines` (ordered top-to-bottom) into text.
    pub fn render(&self, lines: &[Line], ctx: &RenderContext<'_>) -> RenderedPage {
        let threshold = self.gaps.threshold(lines, ctx.geometry);
        let mut page = RenderedPage::default();
        let mut last_bottom: Option<f32> = None;

        for (index, line) in lines.iter().enumerate() {
            if let Some(bottom) = last_bottom {
                if line.top - bottom > threshold {
                    page.lines.push(String::new());
                    page.gap_markers += 1;
                }
            }

            let slot = ctx.slots.slot_for_line(index, self.slot_scope);
            page.lines.push(self.render_line(line, ctx.geometry.left, slot));
            last_bottom = Some(line.bottom);
        }

        page
    }

    fn render_line(&self, line: &Line, left: f32, slot: f32) -> String {
        let runs = self.spacing.space_runs(&line.words, left, slot);
        let mut out = String::new();
        for (word, spaces) in line.words.iter().zip(runs) {
            out.extend(std::iter::repeat(' ').take(spaces));
            out.push_str(&word.text.replace('\n', " "));
        }
        out.truncate(out.trim_end().len());
        out
    }
}

impl Default for LineRenderer {
    fn default() -> Self {
        Self::from_config(&LayoutConfig::default())
    }
}
