//! Position list widget.

use ratatui::{
    Frame,
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    widgets::{Cell, Row, Table, TableState},
};

use super::{header_row, panel, pnl_style, render_empty, signed_money};
use crate::api::types::PositionStatus;
use crate::state::{Resource, Store};

/// Position list widget.
pub struct PositionList;

impl PositionList {
    /// Render the position list.
    pub fn render(frame: &mut Frame, area: Rect, store: &Store) {
        let state = &store.positions;
        let positions = &state.positions;

        let header = header_row(&[
            "Symbol", "Qty", "Entry", "Current", "Value", "P&L", "P&L %", "Status",
        ]);

        let rows = positions.iter().map(|position| {
            let pnl = position.unrealized_pnl();
            let status_style = match position.status {
                PositionStatus::Open => Style::default().fg(Color::Green),
                PositionStatus::Pending => Style::default().fg(Color::Yellow),
                PositionStatus::Closed => Style::default().fg(Color::DarkGray),
            };

            Row::new(vec![
                Cell::from(position.symbol.clone()),
                Cell::from(format!("{:.2}", position.quantity)),
                Cell::from(format!("{:.2}", position.entry_price)),
                Cell::from(format!("{:.2}", position.current_price)),
                Cell::from(format!("{:.2}", position.market_value())),
                Cell::from(signed_money(pnl)).style(pnl_style(pnl)),
                Cell::from(format!("{:.1}%", position.unrealized_pnl_percent()))
                    .style(pnl_style(pnl)),
                Cell::from(position.status.to_string()).style(status_style),
            ])
            .height(1)
        });

        let total_pnl = state.total_unrealized_pnl();
        let title = format!(
            " Positions ({}) | Value: ${:.2} | P&L: {} ",
            positions.len(),
            state.total_value(),
            signed_money(total_pnl)
        );

        let table = Table::new(
            rows,
            [
                Constraint::Length(10),
                Constraint::Length(10),
                Constraint::Length(10),
                Constraint::Length(10),
                Constraint::Length(12),
                Constraint::Length(12),
                Constraint::Length(9),
                Constraint::Min(8),
            ],
        )
        .header(header)
        .block(panel(title))
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("▶ ");

        let mut table_state = TableState::default();
        table_state.select(state.selected);
        frame.render_stateful_widget(table, area, &mut table_state);

        if positions.is_empty() {
            render_empty(
                frame,
                area,
                store.app.is_loading_resource(Resource::Positions),
                "positions",
            );
        }
    }
}
