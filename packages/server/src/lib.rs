#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for hazard reporting.
//!
//! Serves the REST API for reporting hazards and querying hazards near a
//! coordinate. Every handler goes through a shared
//! [`hazard_map_reports::HazardService`]; the store behind it is chosen at
//! startup from [`config::ServerConfig`].

pub mod config;
mod handlers;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpResponse, HttpServer, error::InternalError, middleware, web};
use hazard_map_database::{
    DatabaseHazardStore, DbError, HazardStore, MemoryHazardStore, db, run_migrations,
};
use hazard_map_reports::HazardService;
use hazard_map_server_models::ApiError;

use crate::config::{ServerConfig, StoreBackend};

/// Errors that stop the server from starting.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Invalid configuration.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of what went wrong.
        message: String,
    },

    /// The store could not be opened or migrated.
    #[error(transparent)]
    Database(#[from] DbError),

    /// The HTTP server failed to bind or run.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shared application state.
pub struct AppState {
    /// Hazard operations over the configured store.
    pub service: HazardService,
}

impl AppState {
    /// Wraps a service for use as actix `app_data`.
    #[must_use]
    pub const fn new(service: HazardService) -> Self {
        Self { service }
    }
}

/// Opens the store selected by `config`.
///
/// For `PostgreSQL` this connects and runs migrations; a failure here is
/// fatal to startup.
///
/// # Errors
///
/// Returns [`ServerError::Database`] if the connection or migrations fail.
pub async fn open_store(config: &ServerConfig) -> Result<Arc<dyn HazardStore>, ServerError> {
    match config.store {
        StoreBackend::Postgres => {
            log::info!("Connecting to database...");
            let db_conn = db::connect(&config.database_url, &config.statement_timeout).await?;

            log::info!("Running migrations...");
            run_migrations(db_conn.as_ref()).await?;

            Ok(Arc::new(DatabaseHazardStore::new(Arc::from(db_conn))))
        }
        StoreBackend::Memory => {
            log::warn!("Using in-memory hazard store; reports are lost on restart");
            Ok(Arc::new(MemoryHazardStore::new()))
        }
    }
}

/// Registers every route and the JSON body error handler.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        let body = ApiError::new("Invalid request body").with_message(err.to_string());
        InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
    }))
    .route("/", web::get().to(handlers::index))
    .route("/health", web::get().to(handlers::health))
    .service(
        web::scope("/api")
            .route("/hazards", web::get().to(handlers::list_hazards))
            .route("/hazards", web::post().to(handlers::report_hazard))
            .route("/hazards/cleanup", web::post().to(handlers::cleanup))
            .route("/hazards/{id}", web::delete().to(handlers::delete_hazard))
            .route("/stats", web::get().to(handlers::stats)),
    );
}

/// Starts the hazard map API server.
///
/// Opens the configured store (connecting and migrating `PostgreSQL` when
/// selected) and runs the Actix-Web HTTP server until shutdown. The caller
/// provides the async runtime (e.g. via `#[actix_web::main]`) and the
/// logger.
///
/// # Errors
///
/// Returns [`ServerError`] if the store cannot be opened or the HTTP
/// server fails to bind or encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let store = open_store(&config).await?;
    let state = web::Data::new(AppState::new(HazardService::new(store)));

    log::info!(
        "Starting server on {}:{} ({} store)",
        config.bind_addr,
        config.port,
        config.store
    );

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((config.bind_addr.as_str(), config.port))?
    .run()
    .await?;

    log::info!("Server stopped");
    Ok(())
}
