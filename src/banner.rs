//! Transient success banner with auto-dismiss.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;

/// How long a message stays up before it clears itself.
pub const DISMISS_AFTER: Duration = Duration::from_secs(3);

#[derive(Default)]
struct BannerState {
    message: Option<String>,
    epoch: u64,
    timer: Option<JoinHandle<()>>,
}

/// A single-message banner. Setting a new message while one is showing
/// replaces it and restarts the dismiss window; windows never stack.
#[derive(Clone, Default)]
pub struct StatusBanner {
    state: Arc<Mutex<BannerState>>,
}

impl StatusBanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, message: impl Into<String>) {
        let mut state = self.state.lock().expect("banner lock");
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }
        state.epoch += 1;
        state.message = Some(message.into());

        let epoch = state.epoch;
        let shared = Arc::clone(&self.state);
        state.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(DISMISS_AFTER).await;
            let mut state = shared.lock().expect("banner lock");
            // A newer message owns the banner now; leave it alone.
            if state.epoch == epoch {
                state.message = None;
                state.timer = None;
            }
        }));
    }

    /// User-initiated dismissal.
    pub fn dismiss(&self) {
        let mut state = self.state.lock().expect("banner lock");
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }
        state.message = None;
    }

    pub fn message(&self) -> Option<String> {
        self.state.lock().expect("banner lock").message.clone()
    }
}
