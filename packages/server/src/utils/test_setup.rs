use dotenvy::dotenv;
use std::sync::Once;

use crate::models::config::ServerConfig;
use crate::state::AppState;

static INIT: Once = Once::new();

pub fn setup_test_env() {
    INIT.call_once(|| {
        dotenv().ok();
        // RUST_LOG wins when set; otherwise keep test output quiet
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("blackout_server=warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Fresh state with default rules, so tests never depend on `BLACKOUT_*`
/// variables leaking in from the environment.
pub fn test_state() -> AppState {
    setup_test_env();
    AppState::new(ServerConfig::default())
}
