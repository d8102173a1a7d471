//! Toast center feeding the store.

use super::{Notifier, Toast, ToastHandle, ToastLevel};
use crate::state::Action;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;

/// [`Notifier`] that dispatches toast actions to the store.
#[derive(Debug)]
pub struct ToastCenter {
    next_id: AtomicU64,
    action_tx: mpsc::UnboundedSender<Action>,
}

impl ToastCenter {
    /// Create a toast center dispatching on `action_tx`.
    pub fn new(action_tx: mpsc::UnboundedSender<Action>) -> Self {
        Self {
            next_id: AtomicU64::new(1),
            action_tx,
        }
    }

    fn dispatch(&self, action: Action) {
        if self.action_tx.send(action).is_err() {
            tracing::debug!("Store is gone, dropping toast action");
        }
    }

    fn open(&self, level: ToastLevel, message: &str) -> ToastHandle {
        let handle = ToastHandle(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.dispatch(Action::ShowToast(Toast::new(handle, level, message)));
        handle
    }
}

impl Notifier for ToastCenter {
    fn show_loading(&self, message: &str) -> ToastHandle {
        self.open(ToastLevel::Loading, message)
    }

    fn update_to_error(&self, handle: ToastHandle, message: &str) {
        self.dispatch(Action::UpdateToast {
            handle,
            level: ToastLevel::Error,
            message: message.to_string(),
        });
    }

    fn show_error(&self, message: &str) {
        self.open(ToastLevel::Error, message);
    }

    fn show_success(&self, message: &str) {
        self.open(ToastLevel::Success, message);
    }

    fn dismiss(&self, handle: ToastHandle) {
        self.dispatch(Action::DismissToast(handle));
    }
}
