//! Chattrix server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin chattrix-server -- --port 5000
//! ```

use chattrix_server::Config;
use chattrix_shared::logger::setup_logger;

#[tokio::main]
async fn main() {
    let config = Config::load();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &config.log_level);

    // Run the server
    if let Err(e) = chattrix_server::run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
