//! Last-resort render containment
//!
//! A supervisor wall around i18n-consuming render code: a panic inside the
//! guarded closure is caught and logged, and a minimal bilingual recovery
//! message is rendered in its place. Purely containment; recoverable load
//! errors are the provider's job, not this module's.

use std::panic::{self, AssertUnwindSafe};

/// Bilingual recovery message shown when guarded rendering panics.
pub const RECOVERY_MESSAGE: &str =
    "多语言系统错误，请重试。 / The language system encountered an error. Please retry.";

/// Catches panics from a render closure and substitutes a fallback.
pub struct RenderGuard {
    fallback: String,
    on_recover: Option<Box<dyn Fn() + Send + Sync>>,
}

impl Default for RenderGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderGuard {
    /// Create a guard with the default bilingual fallback message.
    pub fn new() -> Self {
        Self {
            fallback: RECOVERY_MESSAGE.to_string(),
            on_recover: None,
        }
    }

    /// Use a custom fallback rendering.
    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = fallback.into();
        self
    }

    /// Register the recovery action offered to the user (the "reload"
    /// equivalent). Invoked by [`recover`](Self::recover), never
    /// automatically.
    pub fn with_recovery(mut self, action: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_recover = Some(Box::new(action));
        self
    }

    /// Run a render closure, substituting the fallback if it panics.
    pub fn render<F>(&self, render: F) -> String
    where
        F: FnOnce() -> String,
    {
        match panic::catch_unwind(AssertUnwindSafe(render)) {
            Ok(output) => output,
            Err(cause) => {
                let detail = cause
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| cause.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                tracing::error!(detail, "render panicked inside i18n boundary");
                self.fallback.clone()
            }
        }
    }

    /// Trigger the registered recovery action, if any.
    pub fn recover(&self) {
        if let Some(action) = &self.on_recover {
            action();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_healthy_render_passes_through() {
        let guard = RenderGuard::new();

        assert_eq!(guard.render(|| "rendered".to_string()), "rendered");
    }

    #[test]
    fn test_panicking_render_yields_fallback() {
        let guard = RenderGuard::new();

        let output = guard.render(|| panic!("boom"));
        assert_eq!(output, RECOVERY_MESSAGE);
    }

    #[test]
    fn test_custom_fallback() {
        let guard = RenderGuard::new().with_fallback("sorry");

        assert_eq!(guard.render(|| panic!("boom")), "sorry");
    }

    #[test]
    fn test_recovery_action_runs_only_on_demand() {
        let fired = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&fired);
        let guard = RenderGuard::new().with_recovery(move || flag.store(true, Ordering::SeqCst));

        let _ = guard.render(|| panic!("boom"));
        assert!(!fired.load(Ordering::SeqCst));

        guard.recover();
        assert!(fired.load(Ordering::SeqCst));
    }
}
