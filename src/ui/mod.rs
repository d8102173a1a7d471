//! UI rendering using ratatui.
//!
//! This module contains all TUI components and rendering logic.

mod layout;
mod widgets;

pub use layout::Layout;
pub use widgets::{
    AccountPanel, AlgorithmList, HelpPanel, OrderList, PositionList, StatusBar, TabBar, TradeList,
};

use crate::config::KeyBindings;
use crate::state::{Store, View};
use ratatui::{Frame, layout::Rect};

/// Main UI renderer.
pub struct Ui;

impl Ui {
    /// Render the entire UI.
    pub fn render(frame: &mut Frame, store: &Store, keys: &KeyBindings) {
        let layout = Layout::new(frame.area());

        StatusBar::render(frame, layout.status_area, store);
        TabBar::render(frame, layout.tab_area, store);

        match store.app.current_view {
            View::Account => AccountPanel::render(frame, layout.main_area, store),
            View::Positions => PositionList::render(frame, layout.main_area, store),
            View::Orders => OrderList::render(frame, layout.main_area, store),
            View::Trades => TradeList::render(frame, layout.main_area, store),
            View::Algorithms => AlgorithmList::render(frame, layout.main_area, store),
        }

        if store.app.show_help {
            HelpPanel::render(frame, frame.area(), keys);
        }

        widgets::render_toasts(frame, &layout, &store.app.toasts);

        if let Some(error) = &store.app.error {
            let area = Rect {
                y: layout.main_area.y,
                height: 1,
                ..layout.main_area
            };
            widgets::render_error(frame, area, error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{Toast, ToastHandle, ToastLevel};
    use crate::state::Action;
    use ratatui::{Terminal, backend::TestBackend};
    use serde_json::json;
    use tokio::sync::mpsc;

    fn draw(store: &Store) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal
            .draw(|frame| Ui::render(frame, store, &KeyBindings::default()))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn store() -> Store {
        let (tx, _rx) = mpsc::unbounded_channel();
        Store::new(tx)
    }

    #[test]
    fn test_every_view_renders() {
        let mut store = store();
        for view in View::ALL {
            store.reduce(Action::SetView(view));
            let screen = draw(&store);
            assert!(screen.contains(view.title()), "{view:?} missing title");
        }
    }

    #[test]
    fn test_positions_and_toasts_render() {
        let mut store = store();
        store.reduce(Action::SessionChanged(Some("trader@example.com".into())));
        store.reduce(Action::PositionsLoaded(vec![
            serde_json::from_value(json!({
                "id": 1, "symbol": "NVDA", "quantity": 2.0, "entry_price": 400.0,
                "current_price": 450.0, "status": "open",
                "entry_time": "2024-03-01T14:30:00", "last_updated": "2024-03-01T14:30:00"
            }))
            .unwrap(),
        ]));
        store.reduce(Action::SetView(View::Positions));
        store.reduce(Action::ShowToast(Toast::new(
            ToastHandle(1),
            ToastLevel::Error,
            "Alpaca Service not available",
        )));

        let screen = draw(&store);
        assert!(screen.contains("NVDA"));
        assert!(screen.contains("+$100.00"));
        assert!(screen.contains("trader@example.com"));
        assert!(screen.contains("Alpaca Service not available"));
    }

    #[test]
    fn test_help_lists_bindings() {
        let mut store = store();
        store.reduce(Action::ToggleHelp);
        let screen = draw(&store);
        assert!(screen.contains("Toggle automated trading"));
    }
}
