use indicatif::{ProgressBar, ProgressStyle};
use isomol::engine::progress::{Progress, ProgressCallback};
use std::sync::{Arc, Mutex};
use tracing::warn;

/// Bridges the engine's progress events onto a single indicatif bar drawn
/// to stderr.
#[derive(Clone)]
pub struct CliProgressHandler {
    bar: Arc<Mutex<ProgressBar>>,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        let bar = ProgressBar::new(100).with_style(Self::bar_style());
        bar.set_draw_target(indicatif::ProgressDrawTarget::stderr());
        bar.finish_and_clear();

        Self {
            bar: Arc::new(Mutex::new(bar)),
        }
    }

    pub fn callback(&self) -> ProgressCallback<'static> {
        let bar = self.bar.clone();

        Box::new(move |progress: Progress| {
            let Ok(bar) = bar.lock() else {
                warn!("Progress bar mutex was poisoned; dropping progress update.");
                return;
            };

            match progress {
                Progress::StageStart { name } => {
                    bar.reset();
                    bar.set_length(100);
                    bar.set_style(Self::bar_style());
                    bar.set_message(name);
                }
                Progress::Percent(value) => {
                    bar.set_position(u64::from(value.min(100)));
                }
                Progress::StageFinish => {
                    bar.finish_and_clear();
                }
                Progress::Message(text) => {
                    if bar.is_finished() {
                        eprintln!("  {text}");
                    } else {
                        bar.println(format!("  {text}"));
                    }
                }
            }
        })
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template("{msg:<24} [{bar:40.cyan/blue}] {pos:>3}%")
            .expect("Failed to create progress bar style template")
            .progress_chars("##-")
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handler_initializes_finished() {
        let handler = CliProgressHandler::new();
        let bar = handler.bar.lock().unwrap();
        assert!(bar.is_finished());
    }

    #[test]
    fn callback_tracks_stage_and_percent() {
        let handler = CliProgressHandler::new();
        let callback = handler.callback();

        callback(Progress::StageStart { name: "Loading" });
        {
            let bar = handler.bar.lock().unwrap();
            assert!(!bar.is_finished());
            assert_eq!(bar.length(), Some(100));
        }

        callback(Progress::Percent(42));
        {
            let bar = handler.bar.lock().unwrap();
            assert_eq!(bar.position(), 42);
        }

        callback(Progress::StageFinish);
        {
            let bar = handler.bar.lock().unwrap();
            assert!(bar.is_finished());
        }
    }
}
