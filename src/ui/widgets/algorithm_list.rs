//! Algorithm list widget.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table, TableState},
};

use super::{header_row, panel, render_empty};
use crate::api::types::{AlgoRunResult, SignalKind};
use crate::state::{Resource, Store};

/// Algorithm list with the last crossover result below it.
pub struct AlgorithmList;

impl AlgorithmList {
    pub fn render(frame: &mut Frame, area: Rect, store: &Store) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(5), Constraint::Length(4)])
            .split(area);

        let state = &store.algorithms;
        let header = header_row(&["Symbol", "Type", "Short", "Long", "Active", "Updated"]);

        let rows = state.algorithms.iter().map(|algorithm| {
            let window = |name| {
                algorithm
                    .int_parameter(name)
                    .map(|w| w.to_string())
                    .unwrap_or_else(|| "-".into())
            };
            let active = if algorithm.is_active {
                Cell::from("● on").style(Style::default().fg(Color::Green))
            } else {
                Cell::from("○ off").style(Style::default().fg(Color::DarkGray))
            };

            Row::new(vec![
                Cell::from(algorithm.symbol.clone()),
                Cell::from(algorithm.algorithm_type.to_string()),
                Cell::from(window("short_window")),
                Cell::from(window("long_window")),
                active,
                Cell::from(algorithm.updated_at.format("%Y-%m-%d %H:%M").to_string()),
            ])
            .height(1)
        });

        let table = Table::new(
            rows,
            [
                Constraint::Length(10),
                Constraint::Length(14),
                Constraint::Length(7),
                Constraint::Length(7),
                Constraint::Length(8),
                Constraint::Min(16),
            ],
        )
        .header(header)
        .block(panel(format!(
            " Algorithms ({}) | {} active ",
            state.algorithms.len(),
            state.active_count()
        )))
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("▶ ");

        let mut table_state = TableState::default();
        table_state.select(state.selected);
        frame.render_stateful_widget(table, chunks[0], &mut table_state);

        if state.algorithms.is_empty() {
            render_empty(
                frame,
                chunks[0],
                store.app.is_loading_resource(Resource::Algorithms),
                "algorithms",
            );
        }

        let last_run = match &state.last_run {
            Some(result) => run_summary(result),
            None => Line::from(Span::styled(
                "No crossover check run yet",
                Style::default().fg(Color::DarkGray),
            )),
        };
        frame.render_widget(
            Paragraph::new(last_run).block(panel(" Last run ".to_string())),
            chunks[1],
        );
    }
}

fn run_summary(result: &AlgoRunResult) -> Line<'static> {
    let signal = result.signal();
    let color = match signal {
        SignalKind::Buy => Color::Green,
        SignalKind::Sell => Color::Red,
        SignalKind::Hold => Color::Yellow,
    };
    let ma = |v: Option<f64>| v.map(|v| format!("{v:.2}")).unwrap_or_else(|| "-".into());

    Line::from(vec![
        Span::styled(
            format!("{} {} ", result.symbol, signal),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(
            "short MA {} / long MA {} over {} prices",
            ma(result.short_ma_last),
            ma(result.long_ma_last),
            result.num_prices
        )),
    ])
}
