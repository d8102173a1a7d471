//! Event handler turning input into actions.

use super::{Event, InputEvent};
use crate::config::KeyBindings;
use crate::state::{Action, Store, View};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, MouseEvent, MouseEventKind};

/// Handles input events and produces actions.
pub struct EventHandler {
    /// Key bindings.
    keybindings: KeyBindings,
    /// Store state relevant to key handling.
    snapshot: StoreSnapshot,
}

/// Snapshot of relevant store state for event handling.
#[derive(Debug, Clone, Default)]
struct StoreSnapshot {
    current_view: View,
    show_help: bool,
    has_selected_order: bool,
    has_selected_algorithm: bool,
}

impl EventHandler {
    pub fn new(keybindings: KeyBindings) -> Self {
        Self {
            keybindings,
            snapshot: StoreSnapshot::default(),
        }
    }

    /// Update the store snapshot for state-aware event handling.
    pub fn update_store_snapshot(&mut self, store: &Store) {
        self.snapshot = StoreSnapshot {
            current_view: store.app.current_view,
            show_help: store.app.show_help,
            has_selected_order: store.orders.selected_order().is_some(),
            has_selected_algorithm: store.algorithms.selected_algorithm().is_some(),
        };
    }

    /// Map a terminal event to an action.
    pub fn handle_event(&self, event: &Event) -> Option<Action> {
        match event {
            Event::Tick => Some(Action::Tick),
            Event::Key(key) => self.handle_key(*key),
            Event::Mouse(mouse) => self.handle_mouse(*mouse),
            Event::Resize(_, _) | Event::Other => None,
        }
    }

    fn handle_key(&self, key: KeyEvent) -> Option<Action> {
        // Only process key press events
        if key.kind != KeyEventKind::Press {
            return None;
        }

        let input = InputEvent::from(key);
        let bindings = &self.keybindings;

        if input.matches(&bindings.quit) {
            return Some(Action::Quit);
        }
        if input.matches(&bindings.help) {
            return Some(Action::ToggleHelp);
        }
        if self.snapshot.show_help {
            return (key.code == KeyCode::Esc).then_some(Action::ToggleHelp);
        }
        if input.matches(&bindings.refresh) {
            return Some(Action::RefreshAll);
        }

        // View switching
        let views = [
            (&bindings.account, View::Account),
            (&bindings.positions, View::Positions),
            (&bindings.orders, View::Orders),
            (&bindings.trades, View::Trades),
            (&bindings.algorithms, View::Algorithms),
        ];
        if let Some((_, view)) = views.iter().find(|(binding, _)| input.matches(binding)) {
            return Some(Action::SetView(*view));
        }

        match key.code {
            KeyCode::Tab => return Some(Action::NextView),
            KeyCode::BackTab => return Some(Action::PrevView),
            KeyCode::Up => return Some(Action::ScrollUp),
            KeyCode::Down => return Some(Action::ScrollDown),
            KeyCode::PageUp => return Some(Action::PageUp),
            KeyCode::PageDown => return Some(Action::PageDown),
            KeyCode::Home => return Some(Action::GoToTop),
            KeyCode::End => return Some(Action::GoToBottom),
            _ => {}
        }
        if input.matches(&bindings.up) {
            return Some(Action::ScrollUp);
        }
        if input.matches(&bindings.down) {
            return Some(Action::ScrollDown);
        }

        if input.matches(&bindings.toggle_automation) {
            return Some(Action::ToggleAutomation);
        }

        match self.snapshot.current_view {
            View::Orders => self.handle_orders_view(input),
            View::Algorithms => self.handle_algorithms_view(input),
            View::Account | View::Positions | View::Trades => None,
        }
    }

    fn handle_mouse(&self, mouse: MouseEvent) -> Option<Action> {
        match mouse.kind {
            MouseEventKind::ScrollUp => Some(Action::ScrollUp),
            MouseEventKind::ScrollDown => Some(Action::ScrollDown),
            _ => None,
        }
    }

    fn handle_orders_view(&self, input: InputEvent) -> Option<Action> {
        (input.matches(&self.keybindings.cancel_order) && self.snapshot.has_selected_order)
            .then_some(Action::CancelSelectedOrder)
    }

    fn handle_algorithms_view(&self, input: InputEvent) -> Option<Action> {
        if !self.snapshot.has_selected_algorithm {
            return None;
        }
        if input.matches(&self.keybindings.toggle_algorithm) {
            return Some(Action::ToggleSelectedAlgorithm);
        }
        if input.matches(&self.keybindings.run_algorithm) {
            return Some(Action::RunSelectedAlgorithm);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use serde_json::json;
    use tokio::sync::mpsc;

    fn key(c: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
    }

    fn store() -> Store {
        let (tx, _rx) = mpsc::unbounded_channel();
        Store::new(tx)
    }

    fn handler_for(store: &Store) -> EventHandler {
        let mut handler = EventHandler::new(KeyBindings::default());
        handler.update_store_snapshot(store);
        handler
    }

    #[test]
    fn test_global_keys() {
        let handler = handler_for(&store());

        assert!(matches!(handler.handle_event(&key('q')), Some(Action::Quit)));
        assert!(matches!(
            handler.handle_event(&key('r')),
            Some(Action::RefreshAll)
        ));
        assert!(matches!(
            handler.handle_event(&key('5')),
            Some(Action::SetView(View::Algorithms))
        ));
        assert!(matches!(
            handler.handle_event(&key('a')),
            Some(Action::ToggleAutomation)
        ));
        assert!(matches!(handler.handle_event(&Event::Tick), Some(Action::Tick)));
    }

    #[test]
    fn test_cancel_requires_selected_order() {
        let mut store = store();
        store.reduce(Action::SetView(View::Orders));
        assert!(handler_for(&store).handle_event(&key('x')).is_none());

        store.reduce(Action::OrdersLoaded {
            orders: vec![serde_json::from_value(json!({ "id": "ord-1" })).unwrap()],
            trades: Vec::new(),
        });
        assert!(matches!(
            handler_for(&store).handle_event(&key('x')),
            Some(Action::CancelSelectedOrder)
        ));
    }

    #[test]
    fn test_algorithm_keys_only_in_algorithms_view() {
        let mut store = store();
        store.reduce(Action::AlgorithmsLoaded(vec![
            serde_json::from_value(json!({
                "id": 1, "user_id": "u1", "symbol": "AAPL",
                "type": "moving_average_crossover", "parameters": {}, "is_active": false,
                "created_at": "2024-01-01T00:00:00", "updated_at": "2024-01-01T00:00:00"
            }))
            .unwrap(),
        ]));
        assert!(handler_for(&store).handle_event(&key('t')).is_none());

        store.reduce(Action::SetView(View::Algorithms));
        let handler = handler_for(&store);
        assert!(matches!(
            handler.handle_event(&key('t')),
            Some(Action::ToggleSelectedAlgorithm)
        ));
        assert!(matches!(
            handler.handle_event(&key('g')),
            Some(Action::RunSelectedAlgorithm)
        ));
    }

    #[test]
    fn test_help_overlay_swallows_keys() {
        let mut store = store();
        store.reduce(Action::ToggleHelp);
        let handler = handler_for(&store);

        assert!(handler.handle_event(&key('r')).is_none());
        assert!(matches!(
            handler.handle_event(&Event::Key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE))),
            Some(Action::ToggleHelp)
        ));
    }
}
