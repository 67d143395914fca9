//! Command-line client for the Kaiwa chat server.
//!
//! - `api`: REST calls (create / delete room, send message)
//! - `session`: an interactive WebSocket session for one participant
//! - `runner`: reconnection around `session`

pub mod api;
pub mod domain;
pub mod error;
pub mod formatter;
pub mod runner;
pub mod session;
pub mod ui;

pub use api::ApiClient;
pub use error::ClientError;
pub use runner::run_client;
