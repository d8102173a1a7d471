//! Trading backend integration.
//!
//! This module provides the resilient request executor and a typed client
//! built on it, handling authentication, retries and notifications.

mod client;
mod executor;
mod request;
mod session;
mod transport;
pub mod types;

pub use client::{ApiClient, ApiClientBuilder};
pub use executor::{ExecutionState, ExecutorOptions, RequestExecutor};
pub use request::{Method, RequestBody, RequestDescriptor, resolve_path};
pub use session::Session;
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};
