//! Cooperative shutdown flag.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A cloneable handle to the world's quit flag.
///
/// The flag is polled between steps, so a request made from a signal
/// handler thread lets the current step finish its drains first.
#[derive(Debug, Clone, Default)]
pub struct QuitHandle(Arc<AtomicBool>);

impl QuitHandle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_the_flag() {
        let handle = QuitHandle::new();
        let remote = handle.clone();
        assert!(!handle.is_requested());
        std::thread::spawn(move || remote.request()).join().unwrap();
        assert!(handle.is_requested());
    }
}
