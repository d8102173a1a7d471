//! Request descriptors and URL template resolution.

use crate::error::{Error, Result};
use serde::Serialize;
use std::collections::HashMap;

/// HTTP verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl Method {
    /// Canonical uppercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request payload.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// JSON document.
    Json(serde_json::Value),
    /// `application/x-www-form-urlencoded` pairs.
    Form(Vec<(String, String)>),
}

/// Everything needed to issue one logical call.
///
/// Descriptors are cheap, built at call time and never persisted. Retries
/// reuse the same descriptor so every attempt sends identical arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    /// URL template, e.g. `/orders/:order_id`.
    pub target: String,
    /// HTTP verb.
    pub method: Method,
    /// Optional payload.
    pub body: Option<RequestBody>,
    /// Placeholder substitutions for `target`.
    pub path_params: HashMap<String, String>,
    /// Query string pairs.
    pub query: Vec<(String, String)>,
    /// Extra headers (the bearer header is attached by the caller).
    pub headers: Vec<(String, String)>,
}

impl RequestDescriptor {
    /// Create a descriptor for `method target`.
    pub fn new(method: Method, target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            method,
            body: None,
            path_params: HashMap::new(),
            query: Vec::new(),
            headers: Vec::new(),
        }
    }

    pub fn get(target: impl Into<String>) -> Self {
        Self::new(Method::Get, target)
    }

    pub fn post(target: impl Into<String>) -> Self {
        Self::new(Method::Post, target)
    }

    pub fn patch(target: impl Into<String>) -> Self {
        Self::new(Method::Patch, target)
    }

    pub fn delete(target: impl Into<String>) -> Self {
        Self::new(Method::Delete, target)
    }

    /// Attach a JSON body.
    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self> {
        self.body = Some(RequestBody::Json(serde_json::to_value(body)?));
        Ok(self)
    }

    /// Attach a form body.
    pub fn form<K, V>(mut self, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.body = Some(RequestBody::Form(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        ));
        self
    }

    /// Substitute `:key` in the target with `value`.
    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.path_params.insert(key.into(), value.to_string());
        self
    }

    /// Append a query pair.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Append a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Attach `Authorization: Bearer <token>`.
    pub fn bearer(self, token: &str) -> Self {
        self.header("Authorization", format!("Bearer {}", token))
    }

    /// Resolve the target against the path parameters.
    pub fn resolve_path(&self) -> Result<String> {
        resolve_path(&self.target, &self.path_params)
    }
}

/// Replace every `:name` placeholder in `template` with its value.
///
/// A placeholder name starts with an ASCII letter or underscore and continues
/// with ASCII alphanumerics or underscores, so `host:8000` is left alone.
/// Fails with [`Error::MissingPathParameter`] on the first placeholder with no
/// value.
pub fn resolve_path(template: &str, params: &HashMap<String, String>) -> Result<String> {
    let mut resolved = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        let starts_name = chars
            .peek()
            .is_some_and(|&(_, next)| next.is_ascii_alphabetic() || next == '_');

        if c != ':' || !starts_name {
            resolved.push(c);
            continue;
        }

        let start = idx + 1;
        let mut end = start;
        while let Some(&(i, next)) = chars.peek() {
            if next.is_ascii_alphanumeric() || next == '_' {
                end = i + next.len_utf8();
                chars.next();
            } else {
                break;
            }
        }

        let name = &template[start..end];
        let value = params
            .get(name)
            .ok_or_else(|| Error::MissingPathParameter(name.to_string()))?;
        resolved.push_str(value);
    }

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_resolve_single_placeholder() {
        let resolved = resolve_path("/api/items/:id", &params(&[("id", "42")])).unwrap();
        assert_eq!(resolved, "/api/items/42");
    }

    #[test]
    fn test_resolve_multiple_placeholders() {
        let resolved = resolve_path(
            "/api/:kind/:item_id/status",
            &params(&[("kind", "algorithms"), ("item_id", "7")]),
        )
        .unwrap();
        assert_eq!(resolved, "/api/algorithms/7/status");
    }

    #[test]
    fn test_resolve_without_placeholders() {
        let resolved = resolve_path("/orders/open", &HashMap::new()).unwrap();
        assert_eq!(resolved, "/orders/open");
    }

    #[test]
    fn test_missing_placeholder_fails_fast() {
        let err = resolve_path("/orders/:order_id", &HashMap::new()).unwrap_err();
        assert!(matches!(err, Error::MissingPathParameter(ref name) if name == "order_id"));
    }

    #[test]
    fn test_colon_without_name_is_literal() {
        let resolved = resolve_path("http://localhost:8000/a:/:id", &params(&[("id", "1")])).unwrap();
        assert_eq!(resolved, "http://localhost:8000/a:/1");
    }

    #[test]
    fn test_unused_params_are_ignored() {
        let resolved = resolve_path("/trades", &params(&[("id", "1")])).unwrap();
        assert_eq!(resolved, "/trades");
    }

    #[test]
    fn test_descriptor_builder() {
        let desc = RequestDescriptor::patch("/api/algorithms/:algorithm_id/status")
            .param("algorithm_id", 12)
            .json(&serde_json::json!({ "is_active": true }))
            .unwrap()
            .bearer("abc");

        assert_eq!(desc.method, Method::Patch);
        assert_eq!(desc.resolve_path().unwrap(), "/api/algorithms/12/status");
        assert_eq!(
            desc.headers,
            vec![("Authorization".to_string(), "Bearer abc".to_string())]
        );
        assert!(matches!(desc.body, Some(RequestBody::Json(_))));
    }
}
