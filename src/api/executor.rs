//! Resilient request executor.
//!
//! One executor wraps one logical call at a time: it resolves the URL
//! template, issues the request, retries transient failures with a fixed
//! delay, and keeps loading/error state plus toast lifecycle in sync.

use super::request::RequestDescriptor;
use super::transport::{HttpRequest, HttpResponse, Transport};
use crate::config::RequestConfig;
use crate::error::{ApiError, Error, Result};
use crate::notify::{Notifier, ToastHandle};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Retry and notification behaviour of an executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorOptions {
    /// Upper bound on automatic retries for qualifying failures.
    pub max_retries: u32,
    /// Fixed delay between a qualifying failure and the next attempt.
    pub retry_delay: Duration,
    /// Open a loading toast for the duration of the call.
    pub show_loading_toast: bool,
    /// Show an error toast on terminal failure.
    pub show_error_toast: bool,
    /// Text of the loading toast.
    pub loading_message: String,
}

impl Default for ExecutorOptions {
    fn default() -> Self {
        Self::from(&RequestConfig::default())
    }
}

impl From<&RequestConfig> for ExecutorOptions {
    fn from(config: &RequestConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            retry_delay: Duration::from_millis(config.retry_delay_ms),
            show_loading_toast: config.show_loading_toast,
            show_error_toast: config.show_error_toast,
            loading_message: config.loading_message.clone(),
        }
    }
}

impl ExecutorOptions {
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn with_loading_toast(mut self, show: bool) -> Self {
        self.show_loading_toast = show;
        self
    }

    pub fn with_error_toast(mut self, show: bool) -> Self {
        self.show_error_toast = show;
        self
    }
}

/// Observable state of an executor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionState {
    /// Payload of the last successful call.
    pub data: Option<Value>,
    /// Whether a call chain is in flight.
    pub loading: bool,
    /// Error of the last failed attempt.
    pub error: Option<ApiError>,
    /// Retries performed by the current chain.
    pub retry_count: u32,
}

/// Clears the in-flight flag when the chain settles, however it settles.
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Executes requests with bounded fixed-delay retries.
pub struct RequestExecutor {
    transport: Arc<dyn Transport>,
    notifier: Arc<dyn Notifier>,
    options: ExecutorOptions,
    state: watch::Sender<ExecutionState>,
    in_flight: AtomicBool,
}

impl std::fmt::Debug for RequestExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestExecutor")
            .field("options", &self.options)
            .field("in_flight", &self.is_in_flight())
            .finish()
    }
}

impl RequestExecutor {
    /// Create an executor.
    pub fn new(
        transport: Arc<dyn Transport>,
        notifier: Arc<dyn Notifier>,
        options: ExecutorOptions,
    ) -> Self {
        let (state, _) = watch::channel(ExecutionState::default());
        Self {
            transport,
            notifier,
            options,
            state,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Executor options.
    pub fn options(&self) -> &ExecutorOptions {
        &self.options
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> ExecutionState {
        self.state.borrow().clone()
    }

    /// Watch state changes.
    pub fn subscribe(&self) -> watch::Receiver<ExecutionState> {
        self.state.subscribe()
    }

    /// Whether a call chain is running.
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Execute `request` and deserialize the payload.
    ///
    /// A payload that does not match `T` settles the chain as a failure,
    /// so state and toasts report it like any other error.
    pub async fn execute_json<T: DeserializeOwned>(
        &self,
        request: &RequestDescriptor,
        cancel: &CancellationToken,
    ) -> Result<T> {
        self.run_chain(request, cancel, |value| {
            T::deserialize(value).map_err(Error::from)
        })
        .await
    }

    /// Execute one logical call chain.
    ///
    /// Returns the parsed JSON payload (`null` for empty success bodies).
    /// Fails with [`Error::Busy`] if another chain is in flight on this
    /// executor and with [`Error::Cancelled`] once `cancel` fires.
    pub async fn execute(
        &self,
        request: &RequestDescriptor,
        cancel: &CancellationToken,
    ) -> Result<Value> {
        self.run_chain(request, cancel, |value| Ok(value.clone()))
            .await
    }

    async fn run_chain<T, F>(
        &self,
        request: &RequestDescriptor,
        cancel: &CancellationToken,
        decode: F,
    ) -> Result<T>
    where
        F: FnOnce(&Value) -> Result<T>,
    {
        let _guard = InFlightGuard::acquire(&self.in_flight).ok_or(Error::Busy)?;

        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        self.state.send_modify(|state| {
            state.loading = true;
            state.error = None;
            state.retry_count = 0;
        });

        let url = match request.resolve_path() {
            Ok(url) => url,
            Err(err) => return Err(self.settle_failure(err, None)),
        };

        let toast = self
            .options
            .show_loading_toast
            .then(|| self.notifier.show_loading(&self.options.loading_message));

        let http_request = HttpRequest {
            method: request.method,
            url,
            query: request.query.clone(),
            headers: request.headers.clone(),
            body: request.body.clone(),
        };

        let value = match self.run_attempts(&http_request, cancel).await {
            Ok(_) if cancel.is_cancelled() => return Err(self.settle_cancelled(toast)),
            Ok(value) => value,
            Err(Error::Cancelled) => return Err(self.settle_cancelled(toast)),
            Err(err) => return Err(self.settle_failure(err, toast)),
        };

        let decoded = match decode(&value) {
            Ok(decoded) => decoded,
            Err(err) => return Err(self.settle_failure(err, toast)),
        };

        if let Some(handle) = toast {
            self.notifier.dismiss(handle);
        }
        self.state.send_modify(|state| {
            state.data = Some(value);
            state.error = None;
            state.retry_count = 0;
            state.loading = false;
        });
        tracing::debug!(method = %http_request.method, url = %http_request.url, "Request succeeded");
        Ok(decoded)
    }

    /// Attempt loop. Only qualifying failures loop; everything else returns.
    async fn run_attempts(
        &self,
        request: &HttpRequest,
        cancel: &CancellationToken,
    ) -> Result<Value> {
        let mut retries = 0;

        loop {
            let err = match self.attempt(request, cancel).await {
                Ok(value) => return Ok(value),
                Err(Error::Cancelled) => return Err(Error::Cancelled),
                Err(err) => err,
            };

            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }

            let api_error = err.api_error();
            self.state
                .send_modify(|state| state.error = Some(api_error));

            if !err.is_retryable() || retries >= self.options.max_retries {
                return Err(err);
            }

            retries += 1;
            self.state.send_modify(|state| state.retry_count = retries);
            tracing::warn!(
                method = %request.method,
                url = %request.url,
                attempt = retries,
                max_retries = self.options.max_retries,
                error = %err,
                "Request failed, retrying"
            );

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(Error::Cancelled),
                _ = tokio::time::sleep(self.options.retry_delay) => {}
            }
        }
    }

    async fn attempt(&self, request: &HttpRequest, cancel: &CancellationToken) -> Result<Value> {
        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            result = self.transport.send(request.clone()) => result?,
        };
        parse_response(response)
    }

    /// Stop a cancelled chain: drop the loading toast and clear `loading`.
    /// Data from the last successful chain is kept.
    fn settle_cancelled(&self, toast: Option<ToastHandle>) -> Error {
        if let Some(handle) = toast {
            self.notifier.dismiss(handle);
        }
        self.state.send_modify(|state| state.loading = false);
        tracing::debug!("Request chain cancelled");
        Error::Cancelled
    }

    /// Record a terminal failure and convert or dismiss the loading toast.
    fn settle_failure(&self, err: Error, toast: Option<ToastHandle>) -> Error {
        let api_error = err.api_error();
        self.state.send_modify(|state| {
            state.error = Some(api_error);
            state.loading = false;
        });

        let message = err.user_message();
        match (self.options.show_error_toast, toast) {
            (true, Some(handle)) => self.notifier.update_to_error(handle, &message),
            (true, None) => self.notifier.show_error(&message),
            (false, Some(handle)) => self.notifier.dismiss(handle),
            (false, None) => {}
        }

        tracing::error!(error = %err, "Request failed");
        err
    }
}

/// Turn a raw response into a payload or a structured error.
fn parse_response(response: HttpResponse) -> Result<Value> {
    if !response.is_success() {
        return Err(Error::Http(error_from_response(&response)));
    }

    if response.status == 204 || response.body.is_empty() {
        return Ok(Value::Null);
    }

    if !response.is_json() {
        return Err(Error::invalid_format(format!(
            "expected a JSON response, got {}",
            response.content_type.as_deref().unwrap_or("no content type")
        )));
    }

    serde_json::from_slice(&response.body).map_err(|e| Error::invalid_format(e.to_string()))
}

/// Build an [`ApiError`] from a `{ detail, code? }` error body.
fn error_from_response(response: &HttpResponse) -> ApiError {
    let generic = format!("Request failed with status {}", response.status);
    let body: Option<Value> = response
        .is_json()
        .then(|| serde_json::from_slice(&response.body).ok())
        .flatten();

    let Some(body) = body else {
        return ApiError::unknown(generic, Some(response.status));
    };

    let message = match body.get("detail") {
        Some(Value::String(detail)) => detail.clone(),
        // Validation errors arrive as a list of `{ loc, msg, type }`.
        Some(Value::Array(items)) => {
            let msgs: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            if msgs.is_empty() {
                generic
            } else {
                msgs.join("; ")
            }
        }
        _ => generic,
    };

    match body.get("code").and_then(Value::as_str) {
        Some(code) => ApiError::new(message, Some(response.status), code),
        None => ApiError::unknown(message, Some(response.status)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::transport::MockTransport;
    use crate::error::UNKNOWN_ERROR_CODE;
    use crate::notify::MockNotifier;
    use mockall::predicate::eq;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Mutex;
    use tokio::time::Instant;

    const DELAY: Duration = Duration::from_millis(1000);

    fn options() -> ExecutorOptions {
        ExecutorOptions::default()
            .with_max_retries(3)
            .with_retry_delay(DELAY)
    }

    fn quiet_notifier() -> MockNotifier {
        let mut notifier = MockNotifier::new();
        notifier.expect_show_loading().returning(|_| ToastHandle(1));
        notifier.expect_dismiss().return_const(());
        notifier.expect_update_to_error().return_const(());
        notifier.expect_show_error().return_const(());
        notifier
    }

    fn executor(transport: MockTransport, notifier: MockNotifier) -> RequestExecutor {
        RequestExecutor::new(Arc::new(transport), Arc::new(notifier), options())
    }

    fn text_response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            content_type: Some("text/plain".to_string()),
            body: body.as_bytes().to_vec(),
        }
    }

    #[tokio::test]
    async fn test_success_resets_state() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .times(1)
            .returning(|_| Ok(HttpResponse::json(200, &json!({ "equity": "1000" }))));

        let exec = executor(transport, quiet_notifier());
        let value = exec
            .execute(&RequestDescriptor::get("/account-info"), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(value, json!({ "equity": "1000" }));
        let state = exec.state();
        assert_eq!(state.retry_count, 0);
        assert_eq!(state.error, None);
        assert!(!state.loading);
        assert_eq!(state.data, Some(json!({ "equity": "1000" })));
        assert!(!exec.is_in_flight());
    }

    #[tokio::test]
    async fn test_success_after_transient_failure_resets_retry_count() {
        let mut transport = MockTransport::new();
        let mut seq = mockall::Sequence::new();
        transport
            .expect_send()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(Error::network("connection reset")));
        transport
            .expect_send()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(HttpResponse::json(200, &json!([]))));

        let exec = RequestExecutor::new(
            Arc::new(transport),
            Arc::new(quiet_notifier()),
            options().with_retry_delay(Duration::ZERO),
        );
        exec.execute(&RequestDescriptor::get("/trades"), &CancellationToken::new())
            .await
            .unwrap();

        let state = exec.state();
        assert_eq!(state.retry_count, 0);
        assert_eq!(state.error, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_503_exhausts_retries_with_fixed_delay() {
        let attempts = Arc::new(Mutex::new(Vec::new()));
        let recorded = attempts.clone();

        let mut transport = MockTransport::new();
        transport.expect_send().times(4).returning(move |_| {
            recorded.lock().unwrap().push(Instant::now());
            Ok(HttpResponse::json(
                503,
                &json!({ "detail": "Alpaca Service not available" }),
            ))
        });

        let exec = executor(transport, quiet_notifier());
        let err = exec
            .execute(&RequestDescriptor::get("/account-info"), &CancellationToken::new())
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(503));
        let attempts = attempts.lock().unwrap();
        assert_eq!(attempts.len(), 4);
        for pair in attempts.windows(2) {
            assert_eq!(pair[1] - pair[0], DELAY);
        }

        let state = exec.state();
        assert_eq!(state.retry_count, 3);
        assert!(!state.loading);
        assert_eq!(
            state.error,
            Some(ApiError::unknown("Alpaca Service not available", Some(503)))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_network_errors_are_retried() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .times(3)
            .returning(|_| Err(Error::network("connection refused")));

        let exec = RequestExecutor::new(
            Arc::new(transport),
            Arc::new(quiet_notifier()),
            options().with_max_retries(2),
        );
        let err = exec
            .execute(&RequestDescriptor::get("/orders/open"), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Network(_)));
        let state = exec.state();
        assert_eq!(state.retry_count, 2);
        assert_eq!(state.error.map(|e| e.status), Some(None));
    }

    #[tokio::test(start_paused = true)]
    async fn test_404_is_not_retried() {
        let mut transport = MockTransport::new();
        transport.expect_send().times(1).returning(|_| {
            Ok(HttpResponse::json(
                404,
                &json!({ "detail": "Trade not found", "code": "TRADE_NOT_FOUND" }),
            ))
        });

        let exec = executor(transport, quiet_notifier());
        let start = Instant::now();
        let err = exec
            .execute(
                &RequestDescriptor::delete("/trades/:trade_id").param("trade_id", 9),
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();

        assert_eq!(start.elapsed(), Duration::ZERO);
        match err {
            Error::Http(api) => {
                assert_eq!(api.status, Some(404));
                assert_eq!(api.code, "TRADE_NOT_FOUND");
                assert_eq!(api.message, "Trade not found");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(exec.state().retry_count, 0);
    }

    #[tokio::test]
    async fn test_path_substitution_reaches_transport() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|req| req.url == "/api/items/42")
            .times(1)
            .returning(|_| Ok(HttpResponse::json(200, &json!({ "id": 42 }))));

        let exec = executor(transport, quiet_notifier());
        exec.execute(
            &RequestDescriptor::get("/api/items/:id").param("id", "42"),
            &CancellationToken::new(),
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_missing_path_parameter_sends_nothing() {
        let mut transport = MockTransport::new();
        transport.expect_send().never();

        let mut notifier = MockNotifier::new();
        notifier.expect_show_loading().never();
        notifier.expect_show_error().times(1).return_const(());

        let exec = executor(transport, notifier);
        let err = exec
            .execute(&RequestDescriptor::get("/api/items/:id"), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::MissingPathParameter(ref key) if key == "id"));
        let state = exec.state();
        assert!(!state.loading);
        assert_eq!(
            state.error.map(|e| e.code),
            Some("MISSING_PATH_PARAMETER".to_string())
        );
    }

    #[tokio::test]
    async fn test_non_json_success_is_invalid_format() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .times(1)
            .returning(|_| Ok(text_response(200, "Hello World")));

        let exec = executor(transport, quiet_notifier());
        let err = exec
            .execute(&RequestDescriptor::get("/"), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::InvalidFormat(_)));
        assert_eq!(exec.state().data, None);
        assert_eq!(exec.state().retry_count, 0);
    }

    #[tokio::test]
    async fn test_non_json_error_body_uses_generic_message() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .times(1)
            .returning(|_| Ok(text_response(403, "Forbidden")));

        let exec = executor(transport, quiet_notifier());
        let err = exec
            .execute(&RequestDescriptor::get("/trades"), &CancellationToken::new())
            .await
            .unwrap_err();

        match err {
            Error::Http(api) => {
                assert_eq!(api.message, "Request failed with status 403");
                assert_eq!(api.code, UNKNOWN_ERROR_CODE);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_no_content_yields_null() {
        let mut transport = MockTransport::new();
        transport.expect_send().times(1).returning(|_| {
            Ok(HttpResponse {
                status: 204,
                content_type: None,
                body: Vec::new(),
            })
        });

        let exec = executor(transport, quiet_notifier());
        let value = exec
            .execute(
                &RequestDescriptor::delete("/orders/:order_id").param("order_id", "abc"),
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        assert_eq!(value, Value::Null);
    }

    #[tokio::test]
    async fn test_validation_detail_list_is_joined() {
        let response = HttpResponse::json(
            422,
            &json!({ "detail": [
                { "loc": ["body", "quantity"], "msg": "value must be greater than 0" },
                { "loc": ["body", "side"], "msg": "string does not match pattern" }
            ]}),
        );
        let api = error_from_response(&response);
        assert_eq!(
            api.message,
            "value must be greater than 0; string does not match pattern"
        );
        assert_eq!(api.code, UNKNOWN_ERROR_CODE);
    }

    #[tokio::test]
    async fn test_error_toast_disabled_dismisses_loading_toast() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .times(1)
            .returning(|_| Ok(HttpResponse::json(400, &json!({ "detail": "Invalid token" }))));

        let mut notifier = MockNotifier::new();
        notifier
            .expect_show_loading()
            .times(1)
            .returning(|_| ToastHandle(7));
        notifier
            .expect_dismiss()
            .with(eq(ToastHandle(7)))
            .times(1)
            .return_const(());
        notifier.expect_update_to_error().never();
        notifier.expect_show_error().never();

        let exec = RequestExecutor::new(
            Arc::new(transport),
            Arc::new(notifier),
            options().with_error_toast(false),
        );
        let err = exec
            .execute(&RequestDescriptor::get("/account-info"), &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(400));
    }

    #[tokio::test]
    async fn test_loading_toast_converted_to_error() {
        let mut transport = MockTransport::new();
        transport.expect_send().times(1).returning(|_| {
            Ok(HttpResponse::json(
                404,
                &json!({ "detail": "Algorithm not found or not authorized" }),
            ))
        });

        let mut notifier = MockNotifier::new();
        notifier
            .expect_show_loading()
            .with(eq("Loading..."))
            .times(1)
            .returning(|_| ToastHandle(3));
        notifier
            .expect_update_to_error()
            .with(eq(ToastHandle(3)), eq("Algorithm not found or not authorized"))
            .times(1)
            .return_const(());
        notifier.expect_dismiss().never();

        let exec = executor(transport, notifier);
        exec.execute(
            &RequestDescriptor::patch("/api/algorithms/:id/status").param("id", 1),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();
    }

    #[tokio::test]
    async fn test_no_toasts_when_disabled() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .times(1)
            .returning(|_| Ok(HttpResponse::json(200, &json!({}))));

        let mut notifier = MockNotifier::new();
        notifier.expect_show_loading().never();
        notifier.expect_dismiss().never();

        let exec = RequestExecutor::new(
            Arc::new(transport),
            Arc::new(notifier),
            options().with_loading_toast(false),
        );
        exec.execute(&RequestDescriptor::get("/users/me"), &CancellationToken::new())
            .await
            .unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_retry_delay_stops_chain() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .times(2)
            .returning(|_| Ok(HttpResponse::json(503, &json!({ "detail": "down" }))));

        let mut notifier = MockNotifier::new();
        notifier
            .expect_show_loading()
            .times(1)
            .returning(|_| ToastHandle(1));
        notifier
            .expect_dismiss()
            .with(eq(ToastHandle(1)))
            .times(1)
            .return_const(());
        notifier.expect_update_to_error().never();
        notifier.expect_show_error().never();

        let exec = executor(transport, notifier);
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(1500)).await;
            trigger.cancel();
        });

        let err = exec
            .execute(&RequestDescriptor::get("/account-info"), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Cancelled));
        assert!(!exec.is_in_flight());

        let state = exec.state();
        assert!(!state.loading);
        assert_eq!(state.retry_count, 2);
        assert_eq!(state.data, None);
    }

    #[tokio::test]
    async fn test_already_cancelled_token_sends_nothing() {
        let mut transport = MockTransport::new();
        transport.expect_send().never();

        let exec = executor(transport, MockNotifier::new());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = exec
            .execute(&RequestDescriptor::get("/trades"), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Cancelled));
        assert_eq!(exec.state(), ExecutionState::default());
    }

    struct SlowTransport;

    #[async_trait::async_trait]
    impl Transport for SlowTransport {
        async fn send(&self, _request: HttpRequest) -> Result<HttpResponse> {
            tokio::time::sleep(Duration::from_millis(100)).await;
            Ok(HttpResponse::json(200, &json!({ "ok": true })))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_call_is_busy() {
        let exec = RequestExecutor::new(
            Arc::new(SlowTransport),
            Arc::new(quiet_notifier()),
            options(),
        );
        let cancel = CancellationToken::new();
        let request = RequestDescriptor::get("/api/positions");

        let (first, second) = tokio::join!(
            exec.execute(&request, &cancel),
            exec.execute(&request, &cancel)
        );

        assert_eq!(first.unwrap(), json!({ "ok": true }));
        assert!(matches!(second, Err(Error::Busy)));

        // Once settled the executor accepts new chains again.
        assert!(exec.execute(&request, &cancel).await.is_ok());
    }

    #[tokio::test]
    async fn test_subscribers_see_settled_state() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .returning(|_| Ok(HttpResponse::json(200, &json!([1, 2, 3]))));

        let exec = executor(transport, quiet_notifier());
        let mut rx = exec.subscribe();
        exec.execute(&RequestDescriptor::get("/trades"), &CancellationToken::new())
            .await
            .unwrap();

        assert!(rx.has_changed().unwrap());
        let state = rx.borrow_and_update().clone();
        assert_eq!(state.data, Some(json!([1, 2, 3])));
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn test_execute_json_deserializes() {
        #[derive(serde::Deserialize)]
        struct Me {
            email: String,
        }

        let mut transport = MockTransport::new();
        transport.expect_send().returning(|_| {
            Ok(HttpResponse::json(
                200,
                &json!({ "email": "a@b.com", "is_active": true }),
            ))
        });

        let exec = executor(transport, quiet_notifier());
        let me: Me = exec
            .execute_json(&RequestDescriptor::get("/users/me"), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(me.email, "a@b.com");
    }

    #[tokio::test]
    async fn test_execute_json_shape_mismatch_settles_as_failure() {
        #[derive(Debug, serde::Deserialize)]
        struct Me {
            #[allow(dead_code)]
            email: String,
        }

        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .times(1)
            .returning(|_| Ok(HttpResponse::json(200, &json!({ "unexpected": 1 }))));

        let mut notifier = MockNotifier::new();
        notifier
            .expect_show_loading()
            .times(1)
            .returning(|_| ToastHandle(4));
        notifier
            .expect_update_to_error()
            .withf(|handle, message| *handle == ToastHandle(4) && message.contains("email"))
            .times(1)
            .return_const(());
        notifier.expect_dismiss().never();

        let exec = executor(transport, notifier);
        let err = exec
            .execute_json::<Me>(&RequestDescriptor::get("/users/me"), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Serialization(_)));
        let state = exec.state();
        assert!(!state.loading);
        assert_eq!(state.data, None);
        assert!(state.error.is_some_and(|e| e.message.contains("missing field")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_while_sending_keeps_previous_data() {
        let exec = RequestExecutor::new(
            Arc::new(SlowTransport),
            Arc::new(quiet_notifier()),
            options(),
        );
        let request = RequestDescriptor::get("/api/positions");
        exec.execute(&request, &CancellationToken::new())
            .await
            .unwrap();

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let err = exec.execute(&request, &cancel).await.unwrap_err();
        assert!(matches!(err, Error::Cancelled));

        let state = exec.state();
        assert!(!state.loading);
        assert_eq!(state.data, Some(json!({ "ok": true })));
    }
}
