//! Status bar widget.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::state::Store;

/// Status bar widget.
pub struct StatusBar;

impl StatusBar {
    /// Render the status bar.
    pub fn render(frame: &mut Frame, area: Rect, store: &Store) {
        let session = match &store.app.user {
            Some(email) => Span::styled(format!("● {email}"), Style::default().fg(Color::Green)),
            None => Span::styled("○ Signed out", Style::default().fg(Color::Red)),
        };

        let automation = if store.account.automation_active() {
            Span::styled(" AUTO ", Style::default().fg(Color::Black).bg(Color::Green))
        } else {
            Span::styled(" manual ", Style::default().fg(Color::Yellow))
        };

        let activity = match store.app.retrying() {
            Some((resource, count)) => Span::styled(
                format!(" Retrying {} ({count})... ", resource.label()),
                Style::default()
                    .fg(Color::LightRed)
                    .add_modifier(Modifier::ITALIC),
            ),
            None if store.app.is_loading() => Span::styled(
                " Loading... ",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::ITALIC),
            ),
            None => Span::raw(""),
        };

        let help_hint = Span::styled(" Press ? for help ", Style::default().fg(Color::Gray));

        let mut spans = vec![
            Span::styled(
                " algodesk ",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" | "),
            session,
            Span::raw(" | "),
            automation,
            activity,
        ];

        // Right-align the help hint
        let left_len: usize = spans.iter().map(|s| s.width()).sum();
        let padding = (area.width as usize).saturating_sub(left_len + help_hint.width());
        spans.push(Span::raw(" ".repeat(padding)));
        spans.push(help_hint);

        let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));

        frame.render_widget(paragraph, area);
    }
}
