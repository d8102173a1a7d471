//! Order and trade state.

use crate::api::types::{OpenOrder, TradeRecord};
use chrono::{DateTime, Utc};

/// State for orders and the trade log.
#[derive(Debug, Default)]
pub struct OrderState {
    /// Orders still working at the broker.
    pub orders: Vec<OpenOrder>,
    /// Recorded trades, newest first.
    pub trades: Vec<TradeRecord>,
    /// Selected order index.
    pub selected_order: Option<usize>,
    /// Selected trade index.
    pub selected_trade: Option<usize>,
    /// Last update timestamp.
    pub last_updated: Option<DateTime<Utc>>,
}

impl OrderState {
    /// Get the currently selected order.
    pub fn selected_order(&self) -> Option<&OpenOrder> {
        self.selected_order.and_then(|i| self.orders.get(i))
    }

    /// Get the currently selected trade.
    pub fn selected_trade(&self) -> Option<&TradeRecord> {
        self.selected_trade.and_then(|i| self.trades.get(i))
    }

    /// Remove a cancelled order and keep the selection in range.
    pub fn remove_order(&mut self, order_id: &str) {
        self.orders.retain(|o| o.id != order_id);
        self.selected_order = clamp_selection(self.selected_order, self.orders.len());
    }

    /// Count of trades per side, as `(buys, sells)`.
    pub fn side_counts(&self) -> (usize, usize) {
        self.trades
            .iter()
            .fold((0, 0), |(buys, sells), t| match t.side.as_str() {
                "buy" => (buys + 1, sells),
                "sell" => (buys, sells + 1),
                _ => (buys, sells),
            })
    }
}

/// Keep `selected` valid for a list of `len` items.
pub(crate) fn clamp_selection(selected: Option<usize>, len: usize) -> Option<usize> {
    match (selected, len) {
        (_, 0) => None,
        (None, _) => Some(0),
        (Some(i), len) => Some(i.min(len - 1)),
    }
}
