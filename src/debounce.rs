//! Single-slot debounce
//!
//! Coalesces rapid repeated requests into one effective action: arming the
//! slot cancels-and-replaces whatever was pending, and only the most recent
//! token survives the quiet period. No timer handles; a generation counter
//! decides which request is still live.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// A "latest pending request" slot.
#[derive(Debug, Default)]
pub struct DebounceSlot {
    generation: AtomicU64,
}

impl DebounceSlot {
    /// Create an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new request, superseding any pending one.
    ///
    /// Returns the token identifying this request.
    pub fn arm(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Wait out the quiet period for a token.
    ///
    /// Returns `true` when the token is still the latest request after the
    /// delay, `false` when it was superseded (or cancelled) in the meantime.
    pub async fn expire(&self, token: u64, delay: Duration) -> bool {
        tokio::time::sleep(delay).await;
        self.is_current(token)
    }

    /// Whether a token is still the latest request.
    pub fn is_current(&self, token: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == token
    }

    /// Invalidate every pending token. Used at teardown so a superseded
    /// request never fires after the owner is gone.
    pub fn cancel_all(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lone_request_survives() {
        let slot = DebounceSlot::new();

        let token = slot.arm();
        assert!(slot.expire(token, Duration::ZERO).await);
    }

    #[tokio::test]
    async fn test_newer_request_supersedes_older() {
        let slot = DebounceSlot::new();

        let first = slot.arm();
        let second = slot.arm();

        assert!(!slot.expire(first, Duration::ZERO).await);
        assert!(slot.expire(second, Duration::ZERO).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_last_of_burst_fires() {
        let slot = DebounceSlot::new();
        let delay = Duration::from_millis(300);

        let (a, b, c) = (slot.arm(), slot.arm(), slot.arm());
        let (ra, rb, rc) = tokio::join!(
            slot.expire(a, delay),
            slot.expire(b, delay),
            slot.expire(c, delay)
        );

        assert!(!ra);
        assert!(!rb);
        assert!(rc);
    }

    #[tokio::test]
    async fn test_cancel_all_invalidates_pending() {
        let slot = DebounceSlot::new();

        let token = slot.arm();
        slot.cancel_all();
        assert!(!slot.expire(token, Duration::ZERO).await);
    }
}
