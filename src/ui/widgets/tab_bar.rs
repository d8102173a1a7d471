//! Tab bar widget.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::api::ExecutionState;
use crate::state::{Store, View};

/// Tab bar widget.
pub struct TabBar;

impl TabBar {
    /// Render the tab bar. Each tab carries a marker for its resource:
    /// `~` while loading, `!` after a failed request.
    pub fn render(frame: &mut Frame, area: Rect, store: &Store) {
        let mut spans = vec![Span::raw(" ")];

        for (i, view) in View::ALL.iter().enumerate() {
            let name_style = if store.app.current_view == *view {
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
            } else {
                Style::default().fg(Color::White)
            };

            spans.push(Span::styled(
                format!("[{}] ", i + 1),
                Style::default().fg(Color::DarkGray),
            ));
            spans.push(Span::styled(view.title(), name_style));
            spans.push(marker(store.app.requests.get(&view.resource())));
            spans.push(Span::raw(" "));
        }

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}

fn marker(state: Option<&ExecutionState>) -> Span<'static> {
    match state {
        Some(s) if s.loading => Span::styled("~", Style::default().fg(Color::Yellow)),
        Some(s) if s.error.is_some() => Span::styled("!", Style::default().fg(Color::Red)),
        _ => Span::raw(" "),
    }
}
