//! Kaiwa chat server.
//!
//! Layers:
//! - `domain`: entities, value objects and the persistence / stream ports
//! - `registry`: live rooms, their delivery queues and connected streams
//! - `usecase`: room lifecycle, message gateway and delivery use cases
//! - `infrastructure`: in-memory persistence, WebSocket stream, DTOs
//! - `ui`: axum router, handlers and access policy
//! - `app`: wiring of the above into the server state

pub mod app;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod registry;
pub mod ui;
pub mod usecase;

#[cfg(test)]
mod testing;
