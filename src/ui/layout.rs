//! Layout management for the TUI.

use ratatui::layout::{Constraint, Direction, Layout as RatatuiLayout, Rect};

/// Widest a toast gets.
const TOAST_WIDTH: u16 = 48;

/// UI layout areas.
pub struct Layout {
    /// Status bar area (top).
    pub status_area: Rect,
    /// Tab bar area.
    pub tab_area: Rect,
    /// Main content area.
    pub main_area: Rect,
}

impl Layout {
    /// Create a new layout from the terminal area.
    pub fn new(area: Rect) -> Self {
        let chunks = RatatuiLayout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Status bar
                Constraint::Length(1), // Tab bar
                Constraint::Min(0),    // Main content
            ])
            .split(area);

        Self {
            status_area: chunks[0],
            tab_area: chunks[1],
            main_area: chunks[2],
        }
    }

    /// Area for the `index`-th toast, stacked upwards from the bottom right
    /// of the main area. `None` once the stack no longer fits.
    pub fn toast_area(&self, index: usize) -> Option<Rect> {
        let area = self.main_area;
        let height = 3u16;
        let width = TOAST_WIDTH.min(area.width);
        let offset = height.checked_mul(u16::try_from(index + 1).ok()?)?;
        if offset > area.height {
            return None;
        }

        Some(Rect {
            x: area.x + area.width - width,
            y: area.y + area.height - offset,
            width,
            height,
        })
    }
}

/// Create a centered popup area.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = RatatuiLayout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    RatatuiLayout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
