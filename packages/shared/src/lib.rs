//! Utilities shared between the Kaiwa server and client.

pub mod logger;
pub mod time;
