//! HTTP transport seam.
//!
//! The executor talks to the network only through [`Transport`], which keeps
//! retry and notification logic testable without a server.

use super::request::{Method, RequestBody};
use crate::config::ApiConfig;
use crate::error::Result;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};

/// A fully resolved outgoing request.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    /// Resolved path (or absolute URL).
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<RequestBody>,
}

/// Raw response as received from the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    /// Declared `Content-Type`, if any.
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Build a JSON response. Mostly useful for tests.
    pub fn json(status: u16, body: &serde_json::Value) -> Self {
        Self {
            status,
            content_type: Some("application/json".to_string()),
            body: body.to_string().into_bytes(),
        }
    }

    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Whether the declared content type is JSON (`application/json`,
    /// `application/problem+json`, ...).
    pub fn is_json(&self) -> bool {
        self.content_type.as_deref().is_some_and(|ct| {
            let mime = ct.split(';').next().unwrap_or_default().trim();
            mime.eq_ignore_ascii_case("application/json")
                || (mime.starts_with("application/") && mime.ends_with("+json"))
        })
    }
}

/// Sends one HTTP request. Failures to obtain any response are reported as
/// [`crate::Error::Network`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// [`Transport`] backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: String,
}

impl ReqwestTransport {
    /// Create a transport for the configured backend.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .cookie_store(true)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Join a resolved path onto the base URL.
    fn absolute_url(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else if url.starts_with('/') {
            format!("{}{}", self.base_url, url)
        } else {
            format!("{}/{}", self.base_url, url)
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        };

        let url = self.absolute_url(&request.url);
        let mut builder = self
            .client
            .request(method, &url)
            .header(ACCEPT, "application/json");

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder = match &request.body {
            Some(RequestBody::Json(value)) => builder.json(value),
            Some(RequestBody::Form(pairs)) => builder.form(pairs),
            None => builder.header(CONTENT_TYPE, "application/json"),
        };

        tracing::debug!(method = %request.method, %url, "Sending request");

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?.to_vec();

        Ok(HttpResponse {
            status,
            content_type,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn config_for(url: &str) -> ApiConfig {
        ApiConfig {
            base_url: url.to_string(),
            ..ApiConfig::default()
        }
    }

    #[test]
    fn test_is_json() {
        let mut response = HttpResponse::json(200, &serde_json::json!({}));
        assert!(response.is_json());

        response.content_type = Some("application/json; charset=utf-8".to_string());
        assert!(response.is_json());

        response.content_type = Some("application/problem+json".to_string());
        assert!(response.is_json());

        response.content_type = Some("text/plain".to_string());
        assert!(!response.is_json());

        response.content_type = None;
        assert!(!response.is_json());
    }

    #[test]
    fn test_absolute_url() {
        let transport = ReqwestTransport::new(&config_for("http://localhost:8000/")).unwrap();
        assert_eq!(transport.absolute_url("/trades"), "http://localhost:8000/trades");
        assert_eq!(transport.absolute_url("trades"), "http://localhost:8000/trades");
        assert_eq!(
            transport.absolute_url("https://other.example.com/x"),
            "https://other.example.com/x"
        );
    }

    #[tokio::test]
    async fn test_send_json_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/place-order")
            .match_header("authorization", "Bearer tok")
            .match_body(mockito::Matcher::Json(serde_json::json!({
                "symbol": "AAPL", "quantity": 1.0, "side": "buy"
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"order_id":"abc","status":"accepted"}"#)
            .create_async()
            .await;

        let transport = ReqwestTransport::new(&config_for(&server.url())).unwrap();
        let response = transport
            .send(HttpRequest {
                method: Method::Post,
                url: "/place-order".to_string(),
                query: Vec::new(),
                headers: vec![("Authorization".to_string(), "Bearer tok".to_string())],
                body: Some(RequestBody::Json(serde_json::json!({
                    "symbol": "AAPL", "quantity": 1.0, "side": "buy"
                }))),
            })
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(response.status, 200);
        assert!(response.is_json());
        assert!(response.is_success());
    }

    #[tokio::test]
    async fn test_send_form_and_query() {
        let mut server = mockito::Server::new_async().await;
        let token = server
            .mock("POST", "/token")
            .match_header("content-type", "application/x-www-form-urlencoded")
            .match_body("username=a%40b.com&password=pw")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token":"t","token_type":"bearer"}"#)
            .create_async()
            .await;
        let history = server
            .mock("GET", "/api/portfolio/history")
            .match_query(mockito::Matcher::UrlEncoded("period".into(), "1M".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("[]")
            .create_async()
            .await;

        let transport = ReqwestTransport::new(&config_for(&server.url())).unwrap();
        transport
            .send(HttpRequest {
                method: Method::Post,
                url: "/token".to_string(),
                query: Vec::new(),
                headers: Vec::new(),
                body: Some(RequestBody::Form(vec![
                    ("username".to_string(), "a@b.com".to_string()),
                    ("password".to_string(), "pw".to_string()),
                ])),
            })
            .await
            .unwrap();
        transport
            .send(HttpRequest {
                method: Method::Get,
                url: "/api/portfolio/history".to_string(),
                query: vec![("period".to_string(), "1M".to_string())],
                headers: Vec::new(),
                body: None,
            })
            .await
            .unwrap();

        token.assert_async().await;
        history.assert_async().await;
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        // Port 9 (discard) is almost never listening locally.
        let transport = ReqwestTransport::new(&config_for("http://127.0.0.1:9")).unwrap();
        let err = transport
            .send(HttpRequest {
                method: Method::Get,
                url: "/".to_string(),
                query: Vec::new(),
                headers: Vec::new(),
                body: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, crate::Error::Network(_)));
    }
}
