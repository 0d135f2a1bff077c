use indicatif::{HumanDuration, ProgressBar};
use std::time::{Duration, Instant};

/// Spinner shown while a long step runs; hidden when stdout is not a terminal.
pub struct Spinner {
    pb: ProgressBar,
    started: Instant,
}

impl Spinner {
    pub fn new(message: &str) -> Self {
        let pb = if console::Term::stdout().is_term() {
            let pb = ProgressBar::new_spinner();
            pb.enable_steady_tick(Duration::from_millis(100));
            pb
        } else {
            ProgressBar::hidden()
        };
        pb.set_message(message.to_string());
        Self {
            pb,
            started: Instant::now(),
        }
    }

    pub fn set_message(&self, msg: &str) {
        self.pb.set_message(msg.to_string());
    }

    /// Stop the spinner; returns the elapsed time in human form
    pub fn finish(&self) -> String {
        self.pb.finish_and_clear();
        HumanDuration(self.started.elapsed()).to_string()
    }
}
