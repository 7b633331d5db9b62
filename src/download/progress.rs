// In-flight download tracking and the console spinners

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Spinner glyphs; the trailing empty string is shown once a bar finishes
pub const SPINNER: [&str; 5] = ["|", "/", "—", "\\", ""];

// ============================================================================
// Progress Tracker
// ============================================================================

/// Shared list of labels for tracks that have started downloading
///
/// Track tasks append from their own tasks while the reporter snapshots on
/// its own schedule; every access goes through the mutex.
#[derive(Debug, Clone, Default)]
pub struct ProgressTracker {
    labels: Arc<Mutex<Vec<String>>>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, label: impl Into<String>) {
        lock(&self.labels).push(label.into());
    }

    /// Copy of the current labels, in insertion order
    pub fn snapshot(&self) -> Vec<String> {
        lock(&self.labels).clone()
    }

    pub fn len(&self) -> usize {
        lock(&self.labels).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// A panicking track task must not take the spinners down with it
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ============================================================================
// Progress Reporter
// ============================================================================

/// Background task that gives every started track its own spinner line
///
/// On each tick new labels from the tracker get a spinner under a shared
/// `MultiProgress`. With `render == false` the bars draw to a hidden target.
pub struct ProgressReporter {
    bars: Arc<Mutex<Vec<ProgressBar>>>,
    handle: Option<JoinHandle<()>>,
}

impl ProgressReporter {
    pub fn start(tracker: ProgressTracker, interval: Duration, render: bool) -> Self {
        let target = if render {
            ProgressDrawTarget::stdout()
        } else {
            ProgressDrawTarget::hidden()
        };
        let multi = MultiProgress::with_draw_target(target);
        let bars = Arc::new(Mutex::new(Vec::new()));

        let handle = {
            let bars = Arc::clone(&bars);
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(interval);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

                loop {
                    ticker.tick().await;
                    add_new_bars(&multi, &bars, &tracker.snapshot(), interval, render);
                }
            })
        };

        Self {
            bars,
            handle: Some(handle),
        }
    }

    /// Stop refreshing and clear every spinner
    pub async fn stop(mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            let _ = handle.await;
        }
        self.clear_bars();
    }

    fn clear_bars(&self) {
        for bar in lock(&self.bars).drain(..) {
            bar.finish_and_clear();
        }
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        self.clear_bars();
    }
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner().tick_strings(&SPINNER)
}

fn add_new_bars(
    multi: &MultiProgress,
    bars: &Mutex<Vec<ProgressBar>>,
    labels: &[String],
    interval: Duration,
    render: bool,
) {
    let mut bars = lock(bars);
    let known = bars.len();
    for label in labels.iter().skip(known) {
        let bar = multi.add(ProgressBar::new_spinner());
        bar.set_style(spinner_style());
        bar.set_message(label.clone());
        if render {
            bar.enable_steady_tick(interval);
        }
        bars.push(bar);
    }
}
