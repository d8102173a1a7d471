//! Trade log widget.

use ratatui::{
    Frame,
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    widgets::{Cell, Row, Table, TableState},
};

use super::{header_row, money, panel, render_empty, truncate_string};
use crate::api::types::as_utc;
use crate::state::{Resource, Store};

/// Trade log widget.
pub struct TradeList;

impl TradeList {
    pub fn render(frame: &mut Frame, area: Rect, store: &Store) {
        let trades = &store.orders.trades;
        let header = header_row(&["Time", "Symbol", "Side", "Qty", "Price", "Notional", "Status", "Order"]);

        let rows = trades.iter().map(|trade| {
            let side_style = match trade.side.as_str() {
                "buy" => Style::default().fg(Color::Green),
                "sell" => Style::default().fg(Color::Red),
                _ => Style::default(),
            };
            let status_style = match trade.status.as_str() {
                "filled" => Style::default().fg(Color::Blue),
                "cancelled" | "rejected" => Style::default().fg(Color::Red),
                _ => Style::default().fg(Color::Yellow),
            };

            Row::new(vec![
                Cell::from(as_utc(trade.created_at).format("%m-%d %H:%M").to_string()),
                Cell::from(trade.symbol.clone()),
                Cell::from(trade.side.to_uppercase()).style(side_style),
                Cell::from(trade.quantity.normalize().to_string()),
                Cell::from(money(trade.price)),
                Cell::from(money(trade.notional_value())),
                Cell::from(trade.status.clone()).style(status_style),
                Cell::from(truncate_string(&trade.order_id, 12)),
            ])
            .height(1)
        });

        let (buys, sells) = store.orders.side_counts();
        let table = Table::new(
            rows,
            [
                Constraint::Length(12),
                Constraint::Length(8),
                Constraint::Length(5),
                Constraint::Length(8),
                Constraint::Length(11),
                Constraint::Length(12),
                Constraint::Length(10),
                Constraint::Min(12),
            ],
        )
        .header(header)
        .block(panel(format!(
            " Trades ({}) | {buys} buys, {sells} sells ",
            trades.len()
        )))
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("▶ ");

        let mut state = TableState::default();
        state.select(store.orders.selected_trade);
        frame.render_stateful_widget(table, area, &mut state);

        if trades.is_empty() {
            render_empty(
                frame,
                area,
                store.app.is_loading_resource(Resource::Orders),
                "trades",
            );
        }
    }
}
