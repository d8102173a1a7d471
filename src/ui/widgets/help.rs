//! Help panel widget.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use super::super::layout::centered_rect;
use crate::config::KeyBindings;

/// Help panel showing keybindings.
pub struct HelpPanel;

impl HelpPanel {
    /// Render the help panel.
    pub fn render(frame: &mut Frame, area: Rect, keys: &KeyBindings) {
        let popup_area = centered_rect(60, 80, area);

        // Clear the area behind the popup
        frame.render_widget(Clear, popup_area);

        let mut lines = Vec::new();
        section(&mut lines, "Navigation");
        entry(&mut lines, &format!("{}/↓", keys.down), "Move down");
        entry(&mut lines, &format!("{}/↑", keys.up), "Move up");
        entry(&mut lines, "Home/End", "Go to top/bottom");
        entry(&mut lines, "Tab", "Next view");

        section(&mut lines, "Views");
        entry(&mut lines, &keys.account, "Account");
        entry(&mut lines, &keys.positions, "Positions");
        entry(&mut lines, &keys.orders, "Open orders");
        entry(&mut lines, &keys.trades, "Trades");
        entry(&mut lines, &keys.algorithms, "Algorithms");

        section(&mut lines, "Actions");
        entry(&mut lines, &keys.refresh, "Refresh data");
        entry(&mut lines, &keys.cancel_order, "Cancel selected order");
        entry(&mut lines, &keys.toggle_algorithm, "Activate/deactivate algorithm");
        entry(&mut lines, &keys.run_algorithm, "Run crossover check");
        entry(&mut lines, &keys.toggle_automation, "Toggle automated trading");
        entry(&mut lines, &keys.help, "Toggle help");
        entry(&mut lines, &keys.quit, "Quit");

        let help = Paragraph::new(lines)
            .block(
                Block::default()
                    .title(" Help ")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Yellow)),
            )
            .style(Style::default().fg(Color::White));

        frame.render_widget(help, popup_area);
    }
}

fn section(lines: &mut Vec<Line<'static>>, title: &'static str) {
    if !lines.is_empty() {
        lines.push(Line::from(""));
    }
    lines.push(Line::from(Span::styled(
        title,
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    )));
}

fn entry(lines: &mut Vec<Line<'static>>, key: &str, description: &'static str) {
    lines.push(Line::from(vec![
        Span::styled(format!("  {key:<9}"), Style::default().fg(Color::Cyan)),
        Span::raw(description),
    ]));
}
