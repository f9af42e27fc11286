use crate::error::{TomeError, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared stop flag read by every parser loop iteration.
///
/// Clones share the same flag, so a clone can be moved into a signal handler
/// or a progress callback and still stop the run that owns the original.
#[derive(Debug, Clone, Default)]
pub struct CancellationSignal {
    stop_requested: Arc<AtomicBool>,
}

impl CancellationSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::SeqCst);
    }

    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.stop_requested.store(false, Ordering::SeqCst);
    }
}

/// Routes Ctrl+C to a [`CancellationSignal`].
///
/// The first interrupt asks the current parser to stop at its next record;
/// a second one exits the process.
pub struct InterruptHandler {
    signal: CancellationSignal,
    interrupted: Arc<AtomicBool>,
}

impl InterruptHandler {
    pub fn install(signal: CancellationSignal) -> Result<Self> {
        let interrupted = Arc::new(AtomicBool::new(false));

        let signal_clone = signal.clone();
        let interrupted_clone = interrupted.clone();

        ctrlc::set_handler(move || {
            signal_clone.request_stop();

            if !interrupted_clone.swap(true, Ordering::SeqCst) {
                eprintln!("\n🛑 Stopping after the current record... (press Ctrl+C again to force exit)");
            } else {
                eprintln!("\n💀 Force stopping...");
                std::process::exit(130);
            }
        })
        .map_err(|e| TomeError::Config {
            message: format!("Failed to set signal handler: {}", e),
        })?;

        Ok(Self {
            signal,
            interrupted,
        })
    }

    /// Handler without OS registration, for tests.
    pub fn detached(signal: CancellationSignal) -> Self {
        Self {
            signal,
            interrupted: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn was_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }

    pub fn signal(&self) -> &CancellationSignal {
        &self.signal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_state_management() {
        let signal = CancellationSignal::new();
        assert!(!signal.is_stop_requested());

        signal.request_stop();
        assert!(signal.is_stop_requested());

        signal.reset();
        assert!(!signal.is_stop_requested());
    }

    #[test]
    fn test_clones_share_flag() {
        let signal = CancellationSignal::new();
        let remote = signal.clone();

        remote.request_stop();
        assert!(signal.is_stop_requested());

        signal.reset();
        assert!(!remote.is_stop_requested());
    }

    #[test]
    fn test_detached_handler() {
        let signal = CancellationSignal::new();
        let handler = InterruptHandler::detached(signal.clone());

        assert!(!handler.was_interrupted());
        handler.signal().request_stop();
        assert!(signal.is_stop_requested());
    }
}
