//! Toast rendering.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::notify::{Toast, ToastLevel};
use crate::ui::Layout;

/// Render visible toasts, newest at the bottom.
pub fn render_toasts(frame: &mut Frame, layout: &Layout, toasts: &[Toast]) {
    for (index, toast) in toasts.iter().rev().enumerate() {
        let Some(area) = layout.toast_area(index) else {
            break;
        };
        render_toast(frame, area, toast);
    }
}

fn render_toast(frame: &mut Frame, area: Rect, toast: &Toast) {
    frame.render_widget(Clear, area);

    let (border_color, icon) = match toast.level {
        ToastLevel::Loading => (Color::Yellow, "…"),
        ToastLevel::Info => (Color::Cyan, "ℹ"),
        ToastLevel::Success => (Color::Green, "✓"),
        ToastLevel::Error => (Color::Red, "✗"),
    };

    let content = Line::from(vec![
        Span::styled(format!("{} ", icon), Style::default().fg(border_color)),
        Span::raw(toast.message.as_str()),
    ]);

    let paragraph = Paragraph::new(content)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border_color)),
        )
        .style(Style::default().fg(Color::White));

    frame.render_widget(paragraph, area);
}

/// Render an error line above the toasts.
pub fn render_error(frame: &mut Frame, area: Rect, error: &str) {
    frame.render_widget(Clear, area);

    let content = Line::from(vec![
        Span::styled(
            "✗ Error: ",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        Span::raw(error),
    ]);

    frame.render_widget(
        Paragraph::new(content).style(Style::default().fg(Color::White)),
        area,
    );
}
