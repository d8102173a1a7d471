//! User-facing notifications ("toasts").
//!
//! The request executor only sees the [`Notifier`] trait. The terminal UI
//! plugs in a [`ToastCenter`], which turns each call into a store action.

mod center;

pub use center::ToastCenter;

use std::time::{Duration, Instant};

/// Opaque handle to an open toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ToastHandle(pub u64);

/// Toast severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    /// Persistent until converted or dismissed.
    Loading,
    Info,
    Success,
    Error,
}

impl ToastLevel {
    /// How long a toast of this level stays up. `None` means until dismissed.
    pub fn ttl(&self) -> Option<Duration> {
        match self {
            Self::Loading => None,
            Self::Info | Self::Success => Some(Duration::from_secs(3)),
            Self::Error => Some(Duration::from_secs(10)),
        }
    }
}

/// A toast as held by the store.
#[derive(Debug, Clone)]
pub struct Toast {
    pub handle: ToastHandle,
    pub level: ToastLevel,
    pub message: String,
    /// When the toast was shown or last changed level.
    pub since: Instant,
}

impl Toast {
    pub fn new(handle: ToastHandle, level: ToastLevel, message: impl Into<String>) -> Self {
        Self {
            handle,
            level,
            message: message.into(),
            since: Instant::now(),
        }
    }

    /// Whether the toast should be removed at `now`.
    pub fn is_expired(&self, now: Instant) -> bool {
        self.level
            .ttl()
            .is_some_and(|ttl| now.saturating_duration_since(self.since) >= ttl)
    }
}

/// Notification surface used by the request executor.
#[cfg_attr(test, mockall::automock)]
pub trait Notifier: Send + Sync {
    /// Open a persistent loading toast.
    fn show_loading(&self, message: &str) -> ToastHandle;

    /// Turn an open toast into an error toast.
    fn update_to_error(&self, handle: ToastHandle, message: &str);

    /// Show a fresh error toast.
    fn show_error(&self, message: &str);

    /// Show a short-lived success toast.
    fn show_success(&self, message: &str);

    /// Remove a toast.
    fn dismiss(&self, handle: ToastHandle);
}

/// Notifier that only logs. Used before the terminal UI is up.
#[derive(Debug, Default)]
pub struct SilentNotifier {
    next_id: std::sync::atomic::AtomicU64,
}

impl Notifier for SilentNotifier {
    fn show_loading(&self, message: &str) -> ToastHandle {
        let id = self
            .next_id
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        tracing::debug!(toast = id, text = message, "Loading toast");
        ToastHandle(id)
    }

    fn update_to_error(&self, handle: ToastHandle, message: &str) {
        tracing::warn!(toast = handle.0, text = message, "Request failed");
    }

    fn show_error(&self, message: &str) {
        tracing::warn!(text = message, "Request failed");
    }

    fn show_success(&self, message: &str) {
        tracing::info!(text = message, "Success");
    }

    fn dismiss(&self, handle: ToastHandle) {
        tracing::debug!(toast = handle.0, "Toast dismissed");
    }
}
