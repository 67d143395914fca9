//! Real-time chat server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin kaiwa-server
//! cargo run --bin kaiwa-server -- --host 0.0.0.0 --port 3000
//! KAIWA_ACCESS_TOKENS=secret cargo run --bin kaiwa-server
//! ```

use clap::Parser;
use kaiwa_server::{
    app::build_app_state, config::ServerConfig, infrastructure::repository::InMemoryDatabase,
    ui::Server,
};
use kaiwa_shared::logger::setup_logger;

#[tokio::main]
async fn main() {
    let config = ServerConfig::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &config.log_level);

    // Wire repositories, registry and use cases, recovering persisted rooms
    let app_state = match build_app_state(
        InMemoryDatabase::new(),
        config.queue_capacity,
        &config.access_tokens,
    )
    .await
    {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("Failed to start: {}", e);
            std::process::exit(1);
        }
    };

    // Run the server
    let server = Server::new(app_state);
    if let Err(e) = server.run(config.host, config.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
