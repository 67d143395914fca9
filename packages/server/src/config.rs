//! Server configuration.
//!
//! Every option can be given as a command-line flag or through the
//! environment; flags win over environment variables.

use clap::Parser;

use crate::registry::DEFAULT_QUEUE_CAPACITY;

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "kaiwa-server")]
#[command(about = "Real-time chat server with per-room fan-out", long_about = None)]
pub struct ServerConfig {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "KAIWA_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "KAIWA_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Capacity of each room's delivery queue; senders wait while it is full
    #[arg(
        long,
        env = "KAIWA_QUEUE_CAPACITY",
        default_value_t = DEFAULT_QUEUE_CAPACITY,
        value_parser = parse_capacity
    )]
    pub queue_capacity: usize,

    /// Default log level when RUST_LOG is not set
    #[arg(long, env = "KAIWA_LOG_LEVEL", default_value = "debug")]
    pub log_level: String,

    /// Bearer tokens accepted by the access policy (all requests allowed when empty)
    #[arg(long = "access-token", env = "KAIWA_ACCESS_TOKENS", value_delimiter = ',')]
    pub access_tokens: Vec<String>,
}

fn parse_capacity(value: &str) -> Result<usize, String> {
    let capacity: usize = value
        .parse()
        .map_err(|e| format!("invalid queue capacity '{}': {}", value, e))?;
    if capacity == 0 {
        return Err("queue capacity must be at least 1".to_string());
    }
    Ok(capacity)
}
