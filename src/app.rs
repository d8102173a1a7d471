//! Main application module.
//!
//! This module contains the main `App` struct that coordinates
//! the event loop, state management, request tasks and rendering.

use crate::api::types::{AutomatedTradingConfig, OpenOrder};
use crate::api::{ApiClient, ApiClientBuilder, Session};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::events::{EventConfig, EventHandler, EventLoop};
use crate::notify::{Notifier, ToastCenter};
use crate::state::{AccountSnapshot, Action, Resource, Store};
use crate::ui::Ui;

use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::future::Future;
use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// One client per resource, so executor states never interleave.
struct Clients {
    account: Arc<ApiClient>,
    positions: Arc<ApiClient>,
    orders: Arc<ApiClient>,
    algorithms: Arc<ApiClient>,
    commands: Arc<ApiClient>,
}

impl Clients {
    fn new(root: ApiClient) -> Self {
        Self {
            account: Arc::new(root.sibling()),
            positions: Arc::new(root.sibling()),
            orders: Arc::new(root.sibling()),
            algorithms: Arc::new(root.sibling()),
            commands: Arc::new(root),
        }
    }

    fn get(&self, resource: Resource) -> &Arc<ApiClient> {
        match resource {
            Resource::Account => &self.account,
            Resource::Positions => &self.positions,
            Resource::Orders => &self.orders,
            Resource::Algorithms => &self.algorithms,
            Resource::Commands => &self.commands,
        }
    }

    fn all(&self) -> [(Resource, &Arc<ApiClient>); 5] {
        [
            (Resource::Account, &self.account),
            (Resource::Positions, &self.positions),
            (Resource::Orders, &self.orders),
            (Resource::Algorithms, &self.algorithms),
            (Resource::Commands, &self.commands),
        ]
    }
}

/// The main application.
pub struct App {
    /// Terminal.
    terminal: Terminal<CrosstermBackend<Stdout>>,
    /// Application store.
    store: Store,
    /// Event handler.
    event_handler: EventHandler,
    /// Action receiver.
    action_rx: mpsc::UnboundedReceiver<Action>,
    /// API clients.
    clients: Clients,
    /// Toast surface shared by all clients.
    notifier: Arc<ToastCenter>,
    /// Cancelled on quit; every request task holds a child token.
    shutdown: CancellationToken,
    /// Spawned request and watcher tasks.
    tasks: JoinSet<()>,
    /// Configuration.
    config: Config,
    /// Why the startup sign-in failed, if it did.
    sign_in_error: Option<String>,
}

impl App {
    /// Create a new application using `session` for authentication.
    pub fn new(config: Config, session: Arc<Session>) -> Result<Self> {
        // Create action channel
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let store = Store::new(action_tx.clone());
        let notifier = Arc::new(ToastCenter::new(action_tx));

        let client = ApiClientBuilder::new()
            .config(config.api.clone())
            .requests(&config.requests)
            .notifier(notifier.clone())
            .session(session)
            .build()?;

        // Set up terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        if config.ui.mouse_support {
            execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        } else {
            execute!(stdout, EnterAlternateScreen)?;
        }
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;

        let mut app = Self {
            terminal,
            store,
            event_handler: EventHandler::new(config.keybindings.clone()),
            action_rx,
            clients: Clients::new(client),
            notifier,
            shutdown: CancellationToken::new(),
            tasks: JoinSet::new(),
            config,
            sign_in_error: None,
        };
        app.watch_requests();
        Ok(app)
    }

    /// Report a failed startup sign-in while signed out.
    pub fn with_sign_in_error(mut self, error: Option<String>) -> Self {
        self.sign_in_error = error;
        self
    }

    /// Run the application event loop.
    pub async fn run(&mut self) -> Result<()> {
        let (mut events, event_task) = EventLoop::new(EventConfig::from(&self.config.ui))
            .start(self.shutdown.child_token());

        let user = self.clients.commands.session().email();
        self.store.reduce(Action::SessionChanged(user));
        self.refresh_all();

        // Zero disables auto refresh
        let auto_refresh_enabled = self.config.ui.auto_refresh_secs > 0;
        let refresh_every = Duration::from_secs(self.config.ui.auto_refresh_secs.max(1));
        let mut auto_refresh =
            tokio::time::interval_at(tokio::time::Instant::now() + refresh_every, refresh_every);
        auto_refresh.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            self.event_handler.update_store_snapshot(&self.store);

            self.terminal.draw(|frame| {
                Ui::render(frame, &self.store, &self.config.keybindings);
            })?;

            tokio::select! {
                Some(event) = events.recv() => {
                    if let Some(action) = self.event_handler.handle_event(&event) {
                        self.handle_action(action);
                    }
                }
                Some(action) = self.action_rx.recv() => {
                    self.handle_action(action);
                }
                _ = auto_refresh.tick(), if auto_refresh_enabled => {
                    tracing::debug!("Auto refresh");
                    self.refresh_all();
                }
                else => break,
            }

            // Reap finished tasks
            while self.tasks.try_join_next().is_some() {}

            if self.store.app.should_quit {
                break;
            }
        }

        self.shutdown.cancel();
        while self.tasks.join_next().await.is_some() {}
        if let Err(e) = event_task.await {
            tracing::warn!(error = %e, "Event loop task failed");
        }
        tracing::info!("Shut down");
        Ok(())
    }

    /// Handle an action.
    fn handle_action(&mut self, action: Action) {
        match action {
            Action::RefreshAll => self.refresh_all(),
            Action::CancelSelectedOrder => self.cancel_selected_order(),
            Action::ToggleSelectedAlgorithm => self.toggle_selected_algorithm(),
            Action::RunSelectedAlgorithm => self.run_selected_algorithm(),
            Action::ToggleAutomation => self.toggle_automation(),
            Action::Quit => {
                self.shutdown.cancel();
                self.store.reduce(Action::Quit);
            }
            Action::RequestStateChanged(resource, state) => {
                let unauthorized = state.error.as_ref().and_then(|e| e.status) == Some(401);
                self.store
                    .reduce(Action::RequestStateChanged(resource, state));
                if unauthorized {
                    self.store.reduce(Action::SessionChanged(None));
                }
            }
            other => self.store.reduce(other),
        }
    }

    /// Forward each executor's state into the store.
    fn watch_requests(&mut self) {
        for (resource, client) in self.clients.all() {
            let mut rx = client.subscribe();
            let tx = self.store.sender();
            let shutdown = self.shutdown.clone();

            self.tasks.spawn(async move {
                loop {
                    tokio::select! {
                        _ = shutdown.cancelled() => break,
                        changed = rx.changed() => {
                            if changed.is_err() {
                                break;
                            }
                            let state = rx.borrow_and_update().clone();
                            if tx.send(Action::RequestStateChanged(resource, state)).is_err() {
                                break;
                            }
                        }
                    }
                }
            });
        }
    }

    /// Run `request` on `resource`'s client in a background task and
    /// dispatch the action it produces.
    fn spawn_request<F, Fut>(&mut self, resource: Resource, request: F)
    where
        F: FnOnce(Arc<ApiClient>, CancellationToken) -> Fut,
        Fut: Future<Output = Result<Action>> + Send + 'static,
    {
        let client = self.clients.get(resource).clone();
        let tx = self.store.sender();
        let future = request(client, self.shutdown.child_token());

        self.tasks.spawn(async move {
            let action = match future.await {
                Ok(action) => action,
                Err(e) => match failure_action(resource, &e) {
                    Some(action) => action,
                    None => return,
                },
            };
            if tx.send(action).is_err() {
                tracing::debug!("Store is gone, dropping result");
            }
        });
    }

    /// Refresh every resource.
    fn refresh_all(&mut self) {
        if !self.clients.commands.is_authenticated() {
            let message = signed_out_message(self.sign_in_error.as_deref());
            self.store.reduce(Action::SetError(message));
            return;
        }
        self.store.reduce(Action::ClearError);

        let period = self.config.ui.history_period.clone();
        self.spawn_request(Resource::Account, |client, cancel| async move {
            let snapshot = AccountSnapshot {
                info: partial(client.account_info(&cancel).await)?,
                balance: partial(client.portfolio_balance(&cancel).await)?,
                stats: partial(client.dashboard_stats(&cancel).await)?,
                history: partial(client.portfolio_history(&period, &cancel).await)?
                    .unwrap_or_default(),
                automation: partial(client.automated_trading_status(&cancel).await)?,
            };
            Ok(Action::AccountLoaded(Box::new(snapshot)))
        });

        self.spawn_request(Resource::Positions, |client, cancel| async move {
            Ok(Action::PositionsLoaded(client.positions(&cancel).await?))
        });

        self.spawn_request(Resource::Orders, |client, cancel| async move {
            let orders: Vec<OpenOrder> =
                partial(client.open_orders(&cancel).await)?.unwrap_or_default();
            let trades = client.trades(&cancel).await?;
            Ok(Action::OrdersLoaded { orders, trades })
        });

        self.spawn_request(Resource::Algorithms, |client, cancel| async move {
            Ok(Action::AlgorithmsLoaded(client.algorithms(&cancel).await?))
        });
    }

    fn cancel_selected_order(&mut self) {
        let Some(order_id) = self.store.orders.selected_order().map(|o| o.id.clone()) else {
            return;
        };
        let notifier = self.notifier.clone();

        self.spawn_request(Resource::Commands, |client, cancel| async move {
            client.cancel_order(&order_id, &cancel).await?;
            notifier.show_success("Order cancelled");
            Ok(Action::OrderCancelled(order_id))
        });
    }

    fn toggle_selected_algorithm(&mut self) {
        let Some((id, active)) = self
            .store
            .algorithms
            .selected_algorithm()
            .map(|a| (a.id, a.is_active))
        else {
            return;
        };

        self.spawn_request(Resource::Commands, move |client, cancel| async move {
            let algorithm = client.set_algorithm_active(id, !active, &cancel).await?;
            Ok(Action::AlgorithmUpdated(algorithm))
        });
    }

    fn run_selected_algorithm(&mut self) {
        let Some(request) = self
            .store
            .algorithms
            .selected_algorithm()
            .map(|a| a.run_request())
        else {
            return;
        };
        let notifier = self.notifier.clone();

        self.spawn_request(Resource::Commands, |client, cancel| async move {
            let result = client.run_algorithm(&request, &cancel).await?;
            notifier.show_success(&format!("{}: {}", result.symbol, result.signal()));
            Ok(Action::AlgorithmRan(result))
        });
    }

    fn toggle_automation(&mut self) {
        let config = AutomatedTradingConfig {
            is_active: !self.store.account.automation_active(),
            ..AutomatedTradingConfig::default()
        };
        let notifier = self.notifier.clone();

        self.spawn_request(Resource::Commands, |client, cancel| async move {
            let applied = client.configure_automated_trading(&config, &cancel).await?;
            notifier.show_success(if applied.is_active {
                "Automated trading started"
            } else {
                "Automated trading stopped"
            });
            let status = client.automated_trading_status(&cancel).await?;
            Ok(Action::AutomationUpdated(status))
        });
    }
}

/// What to show for a request that failed. Executor failures already
/// reached the user as toasts and state; the rest never went through it.
fn failure_action(resource: Resource, err: &Error) -> Option<Action> {
    match err {
        Error::Cancelled => {
            tracing::debug!(resource = resource.label(), "Request cancelled");
            None
        }
        Error::Busy if resource == Resource::Commands => {
            tracing::info!("Command rejected, another is still running");
            Some(Action::SetError(
                "Another command is still running".to_string(),
            ))
        }
        Error::Busy => {
            tracing::debug!(resource = resource.label(), "Request already in flight");
            None
        }
        Error::Auth(_) | Error::InvalidInput(_) => Some(Action::SetError(err.user_message())),
        _ => {
            tracing::warn!(resource = resource.label(), error = %err, "Request failed");
            None
        }
    }
}

fn signed_out_message(sign_in_error: Option<&str>) -> String {
    match sign_in_error {
        Some(reason) => format!("Sign-in failed: {reason}. Check auth.email and auth.password."),
        None => "Not signed in. Set auth.email and auth.password and restart.".to_string(),
    }
}

/// Keep going after a failed part of a composite refresh. The executor
/// has already reported the failure; cancellation still aborts.
fn partial<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(Error::Cancelled) => Err(Error::Cancelled),
        Err(e) => {
            tracing::warn!(error = %e, "Partial refresh failed");
            Ok(None)
        }
    }
}

impl Drop for App {
    fn drop(&mut self) {
        // Restore terminal state
        let _ = disable_raw_mode();
        let _ = execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        );
        let _ = self.terminal.show_cursor();
    }
}
