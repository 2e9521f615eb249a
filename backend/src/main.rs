//! # Hearth Server
//!
//! Thin entry point that delegates to lib-web for server setup.
//!
//! `BIND_ADDRESS` overrides the listen address; everything else is read by
//! `lib_core::Config::from_env` during startup.

use lib_web::{start_server, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let mut config = ServerConfig::default();
    if let Ok(addr) = std::env::var("BIND_ADDRESS") {
        config.bind_address = addr;
    }
    if let Ok(origins) = std::env::var("ALLOWED_ORIGINS") {
        config.allowed_origins = origins
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect();
    }

    start_server(config).await
}
