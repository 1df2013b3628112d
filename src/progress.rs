//! Progress bar driven by session events.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use repofetch_core::session::{SessionEvent, SessionState};

/// Renders scan and download progress on stderr.
///
/// Disabled reporters ignore every event, leaving output to the log lines.
pub(crate) struct ProgressReporter {
    bar: Option<ProgressBar>,
}

impl ProgressReporter {
    pub(crate) fn new(enabled: bool) -> Self {
        Self {
            bar: enabled.then(ProgressBar::hidden),
        }
    }

    pub(crate) fn handle(&mut self, event: &SessionEvent) {
        let Some(bar) = self.bar.as_ref() else {
            return;
        };
        match event {
            SessionEvent::State(SessionState::Scanning) => {
                bar.set_draw_target(indicatif::ProgressDrawTarget::stderr());
                bar.set_style(
                    ProgressStyle::with_template("{spinner} {msg}")
                        .unwrap_or_else(|_| ProgressStyle::default_spinner()),
                );
                bar.set_message("Scanning repository pages...");
                bar.enable_steady_tick(Duration::from_millis(100));
            }
            SessionEvent::Progress { downloaded, total } => {
                if bar.length() != Some(*total as u64) {
                    bar.disable_steady_tick();
                    bar.set_style(
                        ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}")
                            .unwrap_or_else(|_| ProgressStyle::default_bar()),
                    );
                    bar.set_length(*total as u64);
                    bar.set_message("downloaded");
                }
                bar.set_position(*downloaded as u64);
            }
            SessionEvent::Finished(_) => bar.finish_and_clear(),
            _ => {}
        }
    }
}
