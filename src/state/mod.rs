//! State management for algodesk.
//!
//! This module provides centralized state management with a unidirectional
//! data flow pattern inspired by Redux/Elm architecture. Request tasks and
//! the toast center report back by dispatching [`Action`]s.

mod algorithm_state;
mod app_state;
mod order_state;
mod portfolio_state;

pub use algorithm_state::AlgorithmState;
pub use app_state::{AppState, Resource, View};
pub use order_state::OrderState;
pub use portfolio_state::{AccountSnapshot, AccountState, PositionState};

use crate::api::ExecutionState;
use crate::api::types::{
    AlgoRunResult, AlgorithmRecord, OpenOrder, PositionRecord, TradeRecord, TradingStatus,
};
use crate::notify::{Toast, ToastHandle, ToastLevel};
use order_state::clamp_selection;
use std::time::Instant;
use tokio::sync::mpsc;

/// Actions that can be dispatched to modify state.
#[derive(Debug, Clone)]
pub enum Action {
    // Navigation
    SetView(View),
    NextView,
    PrevView,

    // UI actions
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    GoToTop,
    GoToBottom,
    ToggleHelp,
    Tick,

    // Commands, performed by the app
    RefreshAll,
    CancelSelectedOrder,
    ToggleSelectedAlgorithm,
    RunSelectedAlgorithm,
    ToggleAutomation,

    // Results
    SessionChanged(Option<String>),
    RequestStateChanged(Resource, ExecutionState),
    AccountLoaded(Box<AccountSnapshot>),
    PositionsLoaded(Vec<PositionRecord>),
    OrdersLoaded {
        orders: Vec<OpenOrder>,
        trades: Vec<TradeRecord>,
    },
    OrderCancelled(String),
    AlgorithmsLoaded(Vec<AlgorithmRecord>),
    AlgorithmUpdated(AlgorithmRecord),
    AlgorithmRan(AlgoRunResult),
    AutomationUpdated(TradingStatus),

    // Toasts
    ShowToast(Toast),
    UpdateToast {
        handle: ToastHandle,
        level: ToastLevel,
        message: String,
    },
    DismissToast(ToastHandle),

    // Error handling
    SetError(String),
    ClearError,

    Quit,
}

/// The global state store.
#[derive(Debug)]
pub struct Store {
    /// Application state.
    pub app: AppState,
    pub account: AccountState,
    pub positions: PositionState,
    pub orders: OrderState,
    pub algorithms: AlgorithmState,
    /// Action sender for dispatching actions.
    action_tx: mpsc::UnboundedSender<Action>,
}

impl Store {
    /// Create a new store with the given action sender.
    pub fn new(action_tx: mpsc::UnboundedSender<Action>) -> Self {
        Self {
            app: AppState::new(),
            account: AccountState::default(),
            positions: PositionState::default(),
            orders: OrderState::default(),
            algorithms: AlgorithmState::default(),
            action_tx,
        }
    }

    /// Sender for tasks that report back to the store.
    pub fn sender(&self) -> mpsc::UnboundedSender<Action> {
        self.action_tx.clone()
    }

    /// Apply an action to update state.
    pub fn reduce(&mut self, action: Action) {
        match action {
            // Navigation
            Action::SetView(view) => self.app.current_view = view,
            Action::NextView => self.app.current_view = self.app.current_view.next(),
            Action::PrevView => self.app.current_view = self.app.current_view.prev(),

            // UI actions
            Action::ScrollUp => self.scroll(-1),
            Action::ScrollDown => self.scroll(1),
            Action::PageUp => self.scroll(-10),
            Action::PageDown => self.scroll(10),
            Action::GoToTop => self.select_at(|_| 0),
            Action::GoToBottom => self.select_at(|len| len.saturating_sub(1)),
            Action::ToggleHelp => self.app.show_help = !self.app.show_help,
            Action::Tick => self.app.expire_toasts(Instant::now()),

            Action::RefreshAll
            | Action::CancelSelectedOrder
            | Action::ToggleSelectedAlgorithm
            | Action::RunSelectedAlgorithm
            | Action::ToggleAutomation => {}

            // Results
            Action::SessionChanged(user) => self.app.user = user,
            Action::RequestStateChanged(resource, state) => {
                self.app.requests.insert(resource, state);
            }
            Action::AccountLoaded(snapshot) => {
                self.account.snapshot = *snapshot;
                self.account.last_updated = Some(chrono::Utc::now());
            }
            Action::PositionsLoaded(positions) => {
                self.positions.positions = positions;
                self.positions.selected =
                    clamp_selection(self.positions.selected, self.positions.positions.len());
                self.positions.last_updated = Some(chrono::Utc::now());
            }
            Action::OrdersLoaded { orders, trades } => {
                self.orders.orders = orders;
                self.orders.trades = trades;
                self.orders.selected_order =
                    clamp_selection(self.orders.selected_order, self.orders.orders.len());
                self.orders.selected_trade =
                    clamp_selection(self.orders.selected_trade, self.orders.trades.len());
                self.orders.last_updated = Some(chrono::Utc::now());
            }
            Action::OrderCancelled(order_id) => self.orders.remove_order(&order_id),
            Action::AlgorithmsLoaded(algorithms) => {
                self.algorithms.algorithms = algorithms;
                self.algorithms.selected =
                    clamp_selection(self.algorithms.selected, self.algorithms.algorithms.len());
                self.algorithms.last_updated = Some(chrono::Utc::now());
            }
            Action::AlgorithmUpdated(algorithm) => self.algorithms.upsert(algorithm),
            Action::AlgorithmRan(result) => self.algorithms.last_run = Some(result),
            Action::AutomationUpdated(status) => {
                self.account.snapshot.automation = Some(status);
            }

            // Toasts
            Action::ShowToast(toast) => self.app.toasts.push(toast),
            Action::UpdateToast {
                handle,
                level,
                message,
            } => {
                if let Some(toast) = self.app.toasts.iter_mut().find(|t| t.handle == handle) {
                    toast.level = level;
                    toast.message = message;
                    toast.since = Instant::now();
                } else {
                    self.app.toasts.push(Toast::new(handle, level, message));
                }
            }
            Action::DismissToast(handle) => self.app.toasts.retain(|t| t.handle != handle),

            // Error handling
            Action::SetError(error) => self.app.error = Some(error),
            Action::ClearError => self.app.error = None,

            Action::Quit => self.app.should_quit = true,
        }
    }

    fn selection(&mut self) -> Option<(&mut Option<usize>, usize)> {
        match self.app.current_view {
            View::Positions => Some((
                &mut self.positions.selected,
                self.positions.positions.len(),
            )),
            View::Orders => Some((&mut self.orders.selected_order, self.orders.orders.len())),
            View::Trades => Some((&mut self.orders.selected_trade, self.orders.trades.len())),
            View::Algorithms => Some((
                &mut self.algorithms.selected,
                self.algorithms.algorithms.len(),
            )),
            View::Account => None,
        }
    }

    fn scroll(&mut self, delta: i32) {
        if let Some((selected, len)) = self.selection() {
            if len == 0 {
                *selected = None;
                return;
            }
            let current = selected.unwrap_or(0) as i32;
            let new_index = (current + delta).max(0) as usize;
            *selected = Some(new_index.min(len - 1));
        }
    }

    fn select_at(&mut self, index: impl FnOnce(usize) -> usize) {
        if let Some((selected, len)) = self.selection() {
            *selected = (len > 0).then(|| index(len));
        }
    }
}
