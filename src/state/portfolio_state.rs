//! Account and position state.

use crate::api::types::{
    AccountInfo, DashboardStats, PortfolioBalance, PortfolioHistoryPoint, PositionRecord,
    PositionStatus, TradingStatus,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Everything shown on the account view, fetched in one refresh.
#[derive(Debug, Clone, Default)]
pub struct AccountSnapshot {
    pub info: Option<AccountInfo>,
    pub balance: Option<PortfolioBalance>,
    pub stats: Option<DashboardStats>,
    pub history: Vec<PortfolioHistoryPoint>,
    pub automation: Option<TradingStatus>,
}

/// Account state.
#[derive(Debug, Default)]
pub struct AccountState {
    pub snapshot: AccountSnapshot,
    /// Last update timestamp.
    pub last_updated: Option<DateTime<Utc>>,
}

impl AccountState {
    /// Equity, preferring the broker account over the balance endpoint.
    pub fn equity(&self) -> Option<Decimal> {
        self.snapshot
            .info
            .as_ref()
            .and_then(|i| i.equity)
            .or_else(|| self.snapshot.balance.as_ref().and_then(|b| b.equity))
    }

    /// Equity change over the loaded history window.
    pub fn history_change(&self) -> Option<Decimal> {
        let first = self.snapshot.history.first()?;
        let last = self.snapshot.history.last()?;
        Some(last.equity - first.equity)
    }

    /// Whether automated trading is switched on.
    pub fn automation_active(&self) -> bool {
        self.snapshot
            .automation
            .as_ref()
            .is_some_and(|s| s.is_active)
    }
}

/// Position state.
#[derive(Debug, Default)]
pub struct PositionState {
    pub positions: Vec<PositionRecord>,
    /// Currently selected position index.
    pub selected: Option<usize>,
    /// Last update timestamp.
    pub last_updated: Option<DateTime<Utc>>,
}

impl PositionState {
    /// Get the currently selected position.
    pub fn selected_position(&self) -> Option<&PositionRecord> {
        self.selected.and_then(|i| self.positions.get(i))
    }

    pub fn open_positions(&self) -> impl Iterator<Item = &PositionRecord> {
        self.positions
            .iter()
            .filter(|p| p.status == PositionStatus::Open)
    }

    /// Market value of open positions.
    pub fn total_value(&self) -> Decimal {
        self.open_positions().map(|p| p.market_value()).sum()
    }

    /// Unrealized PnL of open positions.
    pub fn total_unrealized_pnl(&self) -> Decimal {
        self.open_positions().map(|p| p.unrealized_pnl()).sum()
    }
}
