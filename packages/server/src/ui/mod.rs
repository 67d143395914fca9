//! HTTP / WebSocket surface of the chat server.

pub mod error;
mod handler;
pub mod policy;
mod server;
mod signal;
pub mod state; // bin からも AppState を組み立てるため public

pub use server::{Server, build_router};
