//! Application-level state.

use crate::api::ExecutionState;
use crate::notify::Toast;
use std::collections::HashMap;
use std::time::Instant;

/// The current view/screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Account,
    Positions,
    Orders,
    Trades,
    Algorithms,
}

impl View {
    pub const ALL: [View; 5] = [
        View::Account,
        View::Positions,
        View::Orders,
        View::Trades,
        View::Algorithms,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Self::Account => "Account",
            Self::Positions => "Positions",
            Self::Orders => "Orders",
            Self::Trades => "Trades",
            Self::Algorithms => "Algorithms",
        }
    }

    /// Resource whose requests feed this view.
    pub fn resource(&self) -> Resource {
        match self {
            Self::Account => Resource::Account,
            Self::Positions => Resource::Positions,
            Self::Orders | Self::Trades => Resource::Orders,
            Self::Algorithms => Resource::Algorithms,
        }
    }

    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|v| v == self).unwrap_or(0)
    }

    pub fn next(&self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(&self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// A backend resource with its own request executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Account,
    Positions,
    Orders,
    Algorithms,
    /// One-off commands (cancel, toggle, run).
    Commands,
}

impl Resource {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Account => "account",
            Self::Positions => "positions",
            Self::Orders => "orders",
            Self::Algorithms => "algorithms",
            Self::Commands => "commands",
        }
    }
}

/// Global application state.
#[derive(Debug, Default)]
pub struct AppState {
    /// Current view.
    pub current_view: View,
    /// Whether to show help overlay.
    pub show_help: bool,
    /// Visible toasts, oldest first.
    pub toasts: Vec<Toast>,
    /// Last error that was not tied to a request.
    pub error: Option<String>,
    /// Email of the signed-in user.
    pub user: Option<String>,
    /// Latest executor state per resource.
    pub requests: HashMap<Resource, ExecutionState>,
    /// Whether the app should quit.
    pub should_quit: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any resource has a call chain running.
    pub fn is_loading(&self) -> bool {
        self.requests.values().any(|s| s.loading)
    }

    /// Whether `resource` has a call chain running.
    pub fn is_loading_resource(&self, resource: Resource) -> bool {
        self.requests.get(&resource).is_some_and(|s| s.loading)
    }

    /// Highest retry count among running chains.
    pub fn retrying(&self) -> Option<(Resource, u32)> {
        self.requests
            .iter()
            .filter(|(_, s)| s.loading && s.retry_count > 0)
            .map(|(r, s)| (*r, s.retry_count))
            .max_by_key(|(_, count)| *count)
    }

    /// Drop toasts whose lifetime has passed.
    pub fn expire_toasts(&mut self, now: Instant) {
        self.toasts.retain(|t| !t.is_expired(now));
    }
}
