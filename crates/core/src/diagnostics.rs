//! Side-channel observability for the layout engine.
//!
//! The engine never prints. Callers that want to see what happened on a
//! page pass a [`DiagnosticSink`]; the CLI forwards events to `log`, tests
//! collect them with [`RecordingSink`].

use std::fmt;
use std::sync::Mutex;

use serde::Serialize;

/// Why a token record could not become a word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    MissingAnchor,
    EmptyText,
    MissingPolygon,
    MissingDimensions,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingAnchor => write!(f, "missing text anchor"),
            SkipReason::EmptyText => write!(f, "empty text"),
            SkipReason::MissingPolygon => write!(f, "missing bounding polygon"),
            SkipReason::MissingDimensions => write!(f, "missing page dimensions"),
        }
    }
}

/// One observable step of the per-page pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Diagnostic {
    PageStarted {
        page: usize,
        width: Option<f32>,
        height: Option<f32>,
    },
    TokenSkipped {
        page: usize,
        token: usize,
        reason: SkipReason,
    },
    WordsExtracted {
        page: usize,
        count: usize,
        left: f32,
        right: f32,
        row_height: f32,
    },
    DegenerateWord {
        page: usize,
        text: String,
    },
    LinesClustered {
        page: usize,
        count: usize,
    },
    SlotComputed {
        page: usize,
        global_slot: f32,
        significant_lines: usize,
    },
    GapsInserted {
        page: usize,
        count: usize,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::PageStarted {
                page,
                width,
                height,
            } => match (width, height) {
                (Some(w), Some(h)) => write!(f, "page {page}: {w}x{h}"),
                _ => write!(f, "page {page}: no dimensions"),
            },
            Diagnostic::TokenSkipped {
                page,
                token,
                reason,
            } => write!(f, "page {page}: skipped token {token} ({reason})"),
            Diagnostic::WordsExtracted {
                page,
                count,
                left,
                right,
                row_height,
            } => write!(
                f,
                "page {page}: {count} words, left={left:.2} right={right:.2} row_height={row_height:.2}"
            ),
            Diagnostic::DegenerateWord { page, text } => {
                write!(f, "page {page}: excluded zero-height word {text:?}")
            }
            Diagnostic::LinesClustered { page, count } => {
                write!(f, "page {page}: {count} lines")
            }
            Diagnostic::SlotComputed {
                page,
                global_slot,
                significant_lines,
            } => write!(
                f,
                "page {page}: slot={global_slot:.2} from {significant_lines} significant lines"
            ),
            Diagnostic::GapsInserted { page, count } => {
                write!(f, "page {page}: {count} paragraph gaps")
            }
        }
    }
}

/// Receiver for pipeline diagnostics.
pub trait DiagnosticSink: Send + Sync {
    fn emit(&self, event: &Diagnostic);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn emit(&self, _event: &Diagnostic) {}
}

/// Keeps every event in memory, in emission order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<Diagnostic>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events recorded so far.
    pub fn events(&self) -> Vec<Diagnostic> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl DiagnosticSink for RecordingSink {
    fn emit(&self, event: &Diagnostic) {
        match self.events.lock() {
            Ok(mut events) => events.push(event.clone()),
            Err(poisoned) => poisoned.into_inner().push(event.clone()),
        }
    }
}
