//! Open order list widget.

use ratatui::{
    Frame,
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    widgets::{Cell, Row, Table, TableState},
};

use super::{header_row, panel, render_empty};
use crate::state::{Resource, Store};

/// Open order list widget.
pub struct OrderList;

impl OrderList {
    /// Render the open orders.
    pub fn render(frame: &mut Frame, area: Rect, store: &Store) {
        let orders = &store.orders.orders;
        let header = header_row(&["Symbol", "Side", "Type", "Qty", "Filled", "Status", "Submitted"]);

        let rows = orders.iter().map(|order| {
            let side = order.side.as_deref().unwrap_or("-");
            let side_style = match side {
                "buy" => Style::default().fg(Color::Green),
                "sell" => Style::default().fg(Color::Red),
                _ => Style::default(),
            };
            let quantity = |q: Option<rust_decimal::Decimal>| {
                q.map(|q| q.normalize().to_string())
                    .unwrap_or_else(|| "-".into())
            };

            Row::new(vec![
                Cell::from(order.symbol.clone().unwrap_or_else(|| "-".into())),
                Cell::from(side.to_uppercase()).style(side_style),
                Cell::from(order.order_type.clone().unwrap_or_else(|| "-".into())),
                Cell::from(quantity(order.qty)),
                Cell::from(quantity(order.filled_qty)),
                Cell::from(order.status.clone().unwrap_or_else(|| "-".into()))
                    .style(Style::default().fg(Color::Yellow)),
                Cell::from(
                    order
                        .submitted_at
                        .as_deref()
                        .map(|s| s.chars().take(19).collect::<String>())
                        .unwrap_or_default(),
                ),
            ])
            .height(1)
        });

        let table = Table::new(
            rows,
            [
                Constraint::Length(10),
                Constraint::Length(6),
                Constraint::Length(8),
                Constraint::Length(10),
                Constraint::Length(10),
                Constraint::Length(18),
                Constraint::Min(19),
            ],
        )
        .header(header)
        .block(panel(format!(" Open Orders ({}) ", orders.len())))
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("▶ ");

        let mut state = TableState::default();
        state.select(store.orders.selected_order);
        frame.render_stateful_widget(table, area, &mut state);

        if orders.is_empty() {
            render_empty(
                frame,
                area,
                store.app.is_loading_resource(Resource::Orders),
                "open orders",
            );
        }
    }
}
