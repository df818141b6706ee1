#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Hazard map API server binary.
//!
//! Reads its configuration from the environment and runs until shutdown.
//! See [`hazard_map_server::config::ServerConfig`] for the variables.

use hazard_map_server::{ServerError, config::ServerConfig, run_server};

#[actix_web::main]
async fn main() -> Result<(), ServerError> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let config = ServerConfig::from_env()?;
    run_server(config).await
}
