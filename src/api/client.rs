//! Typed client for the trading backend.

use super::executor::{ExecutionState, ExecutorOptions, RequestExecutor};
use super::request::RequestDescriptor;
use super::session::Session;
use super::transport::{ReqwestTransport, Transport};
use super::types::{
    AccountInfo, AlgoRunRequest, AlgoRunResult, AlgorithmRecord, AlgorithmStatusUpdate,
    AutomatedTradingConfig, BackupInfo, BackupList, DashboardStats, MessageResponse, OpenOrder,
    OrderReceipt, OrderRequest, PortfolioBalance, PortfolioHistoryPoint, PositionRecord,
    RegisterRequest, Token, TradeRecord, TradingStatus, UserProfile,
};
use crate::config::{ApiConfig, RequestConfig};
use crate::error::{Error, Result};
use crate::notify::{Notifier, SilentNotifier};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Builder for creating an API client.
pub struct ApiClientBuilder {
    config: ApiConfig,
    options: ExecutorOptions,
    transport: Option<Arc<dyn Transport>>,
    notifier: Option<Arc<dyn Notifier>>,
    session: Option<Arc<Session>>,
}

impl ApiClientBuilder {
    /// Create a new builder with default config.
    pub fn new() -> Self {
        Self {
            config: ApiConfig::default(),
            options: ExecutorOptions::default(),
            transport: None,
            notifier: None,
            session: None,
        }
    }

    /// Set the API configuration.
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.config = config;
        self
    }

    /// Set retry/toast behaviour from the request configuration.
    pub fn requests(mut self, requests: &RequestConfig) -> Self {
        self.options = ExecutorOptions::from(requests);
        self
    }

    /// Set executor options directly.
    pub fn options(mut self, options: ExecutorOptions) -> Self {
        self.options = options;
        self
    }

    /// Use a custom transport instead of `reqwest`.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Set the notification surface.
    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Share an existing session.
    pub fn session(mut self, session: Arc<Session>) -> Self {
        self.session = Some(session);
        self
    }

    /// Build the API client.
    pub fn build(self) -> Result<ApiClient> {
        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(&self.config)?),
        };
        let notifier = self
            .notifier
            .unwrap_or_else(|| Arc::new(SilentNotifier::default()));
        let session = self
            .session
            .unwrap_or_else(|| Arc::new(Session::in_memory()));

        Ok(ApiClient::new(transport, notifier, session, self.options))
    }
}

impl Default for ApiClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// High-level client for the trading backend.
///
/// Each client owns one [`RequestExecutor`], so its loading/error state
/// reflects only its own calls. Use [`ApiClient::sibling`] to get another
/// client sharing transport, notifier and session.
pub struct ApiClient {
    executor: RequestExecutor,
    transport: Arc<dyn Transport>,
    notifier: Arc<dyn Notifier>,
    session: Arc<Session>,
}

impl ApiClient {
    /// Create a new API client.
    pub fn new(
        transport: Arc<dyn Transport>,
        notifier: Arc<dyn Notifier>,
        session: Arc<Session>,
        options: ExecutorOptions,
    ) -> Self {
        let executor = RequestExecutor::new(transport.clone(), notifier.clone(), options);
        Self {
            executor,
            transport,
            notifier,
            session,
        }
    }

    /// Another client with its own executor state.
    pub fn sibling(&self) -> Self {
        Self::new(
            self.transport.clone(),
            self.notifier.clone(),
            self.session.clone(),
            self.executor.options().clone(),
        )
    }

    /// The shared session.
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Check if the client holds a token.
    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Snapshot of this client's execution state.
    pub fn state(&self) -> ExecutionState {
        self.executor.state()
    }

    /// Watch this client's execution state.
    pub fn subscribe(&self) -> watch::Receiver<ExecutionState> {
        self.executor.subscribe()
    }

    // --- Authentication ---

    /// Create an account.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        cancel: &CancellationToken,
    ) -> Result<UserProfile> {
        let request = RequestDescriptor::post("/register").json(&RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
        })?;
        self.call(request, cancel).await
    }

    /// Exchange credentials for a token and store it in the session.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        cancel: &CancellationToken,
    ) -> Result<Token> {
        let request =
            RequestDescriptor::post("/token").form([("username", email), ("password", password)]);
        let token: Token = self.call(request, cancel).await?;
        self.session
            .set_token(token.access_token.clone(), Some(email.to_string()))?;
        tracing::info!(email, "Signed in");
        Ok(token)
    }

    /// Forget the stored token.
    pub fn logout(&self) -> Result<()> {
        self.session.clear()
    }

    /// Profile of the signed-in user.
    pub async fn current_user(&self, cancel: &CancellationToken) -> Result<UserProfile> {
        self.authorized_call(RequestDescriptor::get("/users/me"), cancel)
            .await
    }

    // --- Account ---

    /// Broker account snapshot.
    pub async fn account_info(&self, cancel: &CancellationToken) -> Result<AccountInfo> {
        self.authorized_call(RequestDescriptor::get("/account-info"), cancel)
            .await
    }

    /// Cash, equity and buying power.
    pub async fn portfolio_balance(&self, cancel: &CancellationToken) -> Result<PortfolioBalance> {
        self.authorized_call(RequestDescriptor::get("/api/portfolio/balance"), cancel)
            .await
    }

    /// Equity curve for `period` (e.g. `1M`).
    pub async fn portfolio_history(
        &self,
        period: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<PortfolioHistoryPoint>> {
        let request = RequestDescriptor::get("/api/portfolio/history").query("period", period);
        self.authorized_call(request, cancel).await
    }

    /// Dashboard counters.
    pub async fn dashboard_stats(&self, cancel: &CancellationToken) -> Result<DashboardStats> {
        self.authorized_call(RequestDescriptor::get("/api/dashboard/stats"), cancel)
            .await
    }

    /// Positions of the signed-in user.
    pub async fn positions(&self, cancel: &CancellationToken) -> Result<Vec<PositionRecord>> {
        self.authorized_call(RequestDescriptor::get("/api/positions"), cancel)
            .await
    }

    // --- Orders and trades ---

    /// Trades of the signed-in user, newest first.
    pub async fn trades(&self, cancel: &CancellationToken) -> Result<Vec<TradeRecord>> {
        self.authorized_call(RequestDescriptor::get("/trades"), cancel)
            .await
    }

    /// Delete a recorded trade.
    pub async fn delete_trade(&self, trade_id: i64, cancel: &CancellationToken) -> Result<()> {
        let request = RequestDescriptor::delete("/trades/:trade_id").param("trade_id", trade_id);
        self.authorized_unit(request, cancel).await
    }

    /// Orders still working at the broker.
    pub async fn open_orders(&self, cancel: &CancellationToken) -> Result<Vec<OpenOrder>> {
        self.authorized_call(RequestDescriptor::get("/orders/open"), cancel)
            .await
    }

    /// Submit a market order.
    pub async fn place_order(
        &self,
        order: &OrderRequest,
        cancel: &CancellationToken,
    ) -> Result<OrderReceipt> {
        order.validate()?;
        let request = RequestDescriptor::post("/place-order").json(order)?;
        let receipt: OrderReceipt = self.authorized_call(request, cancel).await?;
        tracing::info!(
            symbol = %order.symbol,
            side = %order.side,
            quantity = %order.quantity,
            order_id = receipt.order_id.as_deref().unwrap_or("-"),
            "Order placed"
        );
        Ok(receipt)
    }

    /// Refresh and return an order's broker status.
    pub async fn trade_status(
        &self,
        order_id: &str,
        cancel: &CancellationToken,
    ) -> Result<OrderReceipt> {
        let request =
            RequestDescriptor::get("/trade-status/:order_id").param("order_id", order_id);
        self.authorized_call(request, cancel).await
    }

    /// Cancel a working order.
    pub async fn cancel_order(&self, order_id: &str, cancel: &CancellationToken) -> Result<()> {
        let request = RequestDescriptor::delete("/orders/:order_id").param("order_id", order_id);
        self.authorized_unit(request, cancel).await?;
        tracing::info!(order_id, "Order cancelled");
        Ok(())
    }

    // --- Algorithms ---

    /// Algorithms of the signed-in user.
    pub async fn algorithms(&self, cancel: &CancellationToken) -> Result<Vec<AlgorithmRecord>> {
        self.authorized_call(RequestDescriptor::get("/api/algorithms"), cancel)
            .await
    }

    /// Activate or deactivate an algorithm.
    pub async fn set_algorithm_active(
        &self,
        algorithm_id: i64,
        is_active: bool,
        cancel: &CancellationToken,
    ) -> Result<AlgorithmRecord> {
        let request = RequestDescriptor::patch("/api/algorithms/:algorithm_id/status")
            .param("algorithm_id", algorithm_id)
            .json(&AlgorithmStatusUpdate { is_active })?;
        self.authorized_call(request, cancel).await
    }

    /// Run a moving-average crossover check on the backend.
    pub async fn run_algorithm(
        &self,
        input: &AlgoRunRequest,
        cancel: &CancellationToken,
    ) -> Result<AlgoRunResult> {
        input.validate()?;
        let request = RequestDescriptor::post("/run-algo").json(input)?;
        self.authorized_call(request, cancel).await
    }

    /// Start or stop automated trading.
    pub async fn configure_automated_trading(
        &self,
        config: &AutomatedTradingConfig,
        cancel: &CancellationToken,
    ) -> Result<AutomatedTradingConfig> {
        config.validate()?;
        let request = RequestDescriptor::post("/api/automated-trading/config").json(config)?;
        self.authorized_call(request, cancel).await
    }

    /// State of automated trading.
    pub async fn automated_trading_status(
        &self,
        cancel: &CancellationToken,
    ) -> Result<TradingStatus> {
        self.authorized_call(RequestDescriptor::get("/api/automated-trading/status"), cancel)
            .await
    }

    // --- Backups ---

    /// Snapshot the backend database.
    pub async fn create_backup(&self, cancel: &CancellationToken) -> Result<BackupInfo> {
        self.authorized_call(RequestDescriptor::post("/api/backup/create"), cancel)
            .await
    }

    /// Available backups.
    pub async fn list_backups(&self, cancel: &CancellationToken) -> Result<BackupList> {
        self.authorized_call(RequestDescriptor::get("/api/backup/list"), cancel)
            .await
    }

    /// Delete all but the `keep_last_n` newest backups.
    pub async fn cleanup_backups(
        &self,
        keep_last_n: u32,
        cancel: &CancellationToken,
    ) -> Result<MessageResponse> {
        let request = RequestDescriptor::delete("/api/backup/cleanup")
            .query("keep_last_n", keep_last_n.to_string());
        self.authorized_call(request, cancel).await
    }

    // --- Plumbing ---

    fn authorize(&self, request: RequestDescriptor) -> Result<RequestDescriptor> {
        let token = self
            .session
            .token()
            .ok_or_else(|| Error::auth("Not signed in"))?;
        Ok(request.bearer(&token))
    }

    async fn authorized_call<T: DeserializeOwned>(
        &self,
        request: RequestDescriptor,
        cancel: &CancellationToken,
    ) -> Result<T> {
        let request = self.authorize(request)?;
        self.call(request, cancel).await
    }

    async fn authorized_unit(
        &self,
        request: RequestDescriptor,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let request = self.authorize(request)?;
        self.executor
            .execute(&request, cancel)
            .await
            .map(|_| ())
            .inspect_err(|e| self.on_error(e))
    }

    async fn call<T: DeserializeOwned>(
        &self,
        request: RequestDescriptor,
        cancel: &CancellationToken,
    ) -> Result<T> {
        self.executor
            .execute_json(&request, cancel)
            .await
            .inspect_err(|e| self.on_error(e))
    }

    fn on_error(&self, err: &Error) {
        if err.is_unauthorized() && self.session.is_authenticated() {
            tracing::warn!("Token rejected, clearing session");
            if let Err(e) = self.session.clear() {
                tracing::warn!(error = %e, "Failed to clear session");
            }
        }
    }
}
