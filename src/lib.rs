//! # algodesk
//!
//! A terminal dashboard for a hosted trading-algorithm API: account
//! overview, positions, orders, trades and algorithm control.
//!
//! ## Architecture
//!
//! - **API**: resilient request executor, typed backend client, session
//! - **Notify**: toast surface the executor reports through
//! - **State**: centralized store with actions and a reducer
//! - **Events**: terminal input and ticks
//! - **UI**: layout and rendering
//! - **App**: event loop and request tasks
//! - **Config**: configuration management

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod events;
pub mod notify;
pub mod state;
pub mod ui;

pub use app::App;
pub use config::Config;
pub use error::{Error, Result};
