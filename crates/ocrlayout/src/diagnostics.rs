use ocrlayout_core::{Diagnostic, DiagnosticSink};

/// Forwards layout diagnostics to the `log` facade, tagged with the source
/// document.
#[derive(Debug, Clone)]
pub struct LogSink {
    source: String,
}

impl LogSink {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// Per-token events are noisy; everything else is page-level.
    fn level(event: &Diagnostic) -> log::Level {
        match event {
            Diagnostic::TokenSkipped { .. } | Diagnostic::DegenerateWord { .. } => {
                log::Level::Trace
            }
            _ => log::Level::Debug,
        }
    }
}

impl DiagnosticSink for LogSink {
    fn emit(&self, event: &Diagnostic) {
        log::log!(Self::level(event), "{}: {event}", self.source);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ocrlayout_core::SkipReason;

    #[test]
    fn test_token_events_log_at_trace() {
        let skipped = Diagnostic::TokenSkipped {
            page: 1,
            token: 0,
            reason: SkipReason::EmptyText,
        };
        assert_eq!(LogSink::level(&skipped), log::Level::Trace);

        let lines = Diagnostic::LinesClustered { page: 1, count: 3 };
        assert_eq!(LogSink::level(&lines), log::Level::Debug);
    }
}
