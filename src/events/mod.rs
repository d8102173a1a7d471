//! Event handling for algodesk.
//!
//! This module provides terminal input handling and an event loop that
//! interleaves input with periodic ticks.

mod handler;
mod input;

pub use handler::EventHandler;
pub use input::{InputEvent, Key, Modifiers};

use crate::config::UiConfig;
use crate::error::Result;
use crossterm::event::{Event as CrosstermEvent, KeyEvent, MouseEvent};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Terminal event types.
#[derive(Debug, Clone)]
pub enum Event {
    /// Terminal tick (toast expiry, redraw).
    Tick,
    /// Key press event.
    Key(KeyEvent),
    /// Mouse event.
    Mouse(MouseEvent),
    /// Terminal resize event.
    Resize(u16, u16),
    /// Focus gained or lost, pastes.
    Other,
}

/// Configuration for the event loop.
#[derive(Debug, Clone)]
pub struct EventConfig {
    /// Tick rate for the event loop.
    pub tick_rate: Duration,
    /// Whether to forward mouse events.
    pub mouse_capture: bool,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self::from(&UiConfig::default())
    }
}

impl From<&UiConfig> for EventConfig {
    fn from(ui: &UiConfig) -> Self {
        Self {
            tick_rate: Duration::from_millis(ui.tick_rate_ms),
            mouse_capture: ui.mouse_support,
        }
    }
}

/// Event loop for handling terminal events.
pub struct EventLoop {
    config: EventConfig,
}

impl EventLoop {
    /// Create a new event loop.
    pub fn new(config: EventConfig) -> Self {
        Self { config }
    }

    /// Start reading terminal events until `shutdown` fires or the receiver
    /// is dropped.
    pub fn start(
        self,
        shutdown: CancellationToken,
    ) -> (mpsc::UnboundedReceiver<Event>, JoinHandle<()>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let EventConfig {
            tick_rate,
            mouse_capture,
        } = self.config;

        let handle = tokio::spawn(async move {
            let mut tick_interval = tokio::time::interval(tick_rate);

            loop {
                let event = tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = tick_interval.tick() => Event::Tick,
                    maybe_event = Self::read_crossterm_event() => {
                        match maybe_event {
                            Ok(Some(Event::Mouse(_))) if !mouse_capture => continue,
                            Ok(Some(event)) => event,
                            Ok(None) => continue,
                            Err(e) => {
                                tracing::warn!(error = %e, "Failed to read terminal event");
                                continue;
                            }
                        }
                    }
                };

                if event_tx.send(event).is_err() {
                    break;
                }
            }
        });

        (event_rx, handle)
    }

    async fn read_crossterm_event() -> Result<Option<Event>> {
        if crossterm::event::poll(Duration::from_millis(10))? {
            let event = crossterm::event::read()?;
            Ok(Some(match event {
                CrosstermEvent::Key(key) => Event::Key(key),
                CrosstermEvent::Mouse(mouse) => Event::Mouse(mouse),
                CrosstermEvent::Resize(w, h) => Event::Resize(w, h),
                _ => Event::Other,
            }))
        } else {
            tokio::task::yield_now().await;
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_config_from_ui() {
        let ui = UiConfig {
            tick_rate_ms: 100,
            mouse_support: false,
            ..UiConfig::default()
        };
        let config = EventConfig::from(&ui);
        assert_eq!(config.tick_rate, Duration::from_millis(100));
        assert!(!config.mouse_capture);
    }
}
