//! TUI widgets.

mod account;
mod algorithm_list;
mod help;
mod order_list;
mod position_list;
mod status_bar;
mod tab_bar;
mod toasts;
mod trade_list;

pub use account::AccountPanel;
pub use algorithm_list::AlgorithmList;
pub use help::HelpPanel;
pub use order_list::OrderList;
pub use position_list::PositionList;
pub use status_bar::StatusBar;
pub use tab_bar::TabBar;
pub use toasts::{render_error, render_toasts};
pub use trade_list::TradeList;

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row},
};
use rust_decimal::Decimal;

fn header_row<'a>(titles: &'a [&'a str]) -> Row<'a> {
    let cells = titles.iter().map(|h| {
        Cell::from(*h).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    });
    Row::new(cells).height(1).bottom_margin(1)
}

fn panel(title: String) -> Block<'static> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
}

fn pnl_style(value: Decimal) -> Style {
    if value >= Decimal::ZERO {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::Red)
    }
}

fn signed_money(value: Decimal) -> String {
    if value >= Decimal::ZERO {
        format!("+${:.2}", value)
    } else {
        format!("-${:.2}", value.abs())
    }
}

fn money(value: Option<Decimal>) -> String {
    value
        .map(|v| format!("${:.2}", v))
        .unwrap_or_else(|| "-".to_string())
}

fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

/// Centered hint for an empty list.
fn render_empty(frame: &mut Frame, area: Rect, loading: bool, what: &str) {
    let inner = Block::default().borders(Borders::ALL).inner(area);
    if inner.height == 0 {
        return;
    }
    let text = if loading {
        Span::styled(
            "Loading...",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::ITALIC),
        )
    } else {
        Span::styled(format!("No {what}"), Style::default().fg(Color::DarkGray))
    };
    let line_area = Rect {
        y: inner.y + inner.height / 2,
        height: 1,
        ..inner
    };
    frame.render_widget(
        Paragraph::new(Line::from(text)).alignment(ratatui::layout::Alignment::Center),
        line_area,
    );
}
