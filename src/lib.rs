//! Read-only HTTP query API over seeded climate observation data.
//!
//! Visualization front-ends query observation rows, per-metric summary
//! statistics and trend/anomaly/seasonality analyses for geographic
//! locations. The store is SQLite behind Diesel, populated exactly once at
//! startup from a static JSON payload; every request path is a bounded
//! synchronous read.

pub mod config;
pub mod db {
    pub mod models;
    pub mod pool;
}
pub mod error;
pub mod handlers;
pub mod models {
    pub mod api;
    pub mod quality;
    pub mod seed;
}
pub mod schema;
pub mod services {
    pub mod filters;
    pub mod observations;
    pub mod sample;
    pub mod seed;
    pub mod summary;
    pub mod trends;
}

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use diesel::prelude::*;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use log::{info, warn};

use crate::config::Config;
use crate::db::pool::DbPool;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Shared application state.
pub struct AppState {
    /// Read connection pool over the seeded store.
    pub pool: Arc<DbPool>,
}

/// Applies any pending schema migrations.
pub fn run_migrations(conn: &mut SqliteConnection) -> Result<(), String> {
    match conn.run_pending_migrations(MIGRATIONS) {
        Ok(applied) => {
            if applied.is_empty() {
                info!("Database schema is up to date; no migrations were applied");
            } else {
                let names = applied
                    .iter()
                    .map(|v| v.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                info!("Applied {} database migration(s): {}", applied.len(), names);
            }
            Ok(())
        }
        Err(e) => Err(format!("Applying database migrations failed: {}", e)),
    }
}

/// Mounts the API routes. Shared between [`run_server`] and the endpoint
/// tests.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/health", web::get().to(handlers::health))
            .route("/climate", web::get().to(handlers::climate))
            .route("/locations", web::get().to(handlers::list_locations))
            .route("/metrics", web::get().to(handlers::list_metrics))
            .route("/summary", web::get().to(handlers::summary))
            .route("/trends", web::get().to(handlers::trends)),
    );
}

/// Starts the API server: connect the pool, apply migrations, seed the store
/// if it is empty, then serve. Seeding problems are logged and swallowed so
/// the service still starts (possibly empty); connection or migration
/// failures are fatal.
pub async fn run_server(cfg: Config) -> std::io::Result<()> {
    info!("Opening database at {}", cfg.database_url);
    let pool = DbPool::connect(&cfg.database_url, cfg.pool_size)
        .map_err(|e| std::io::Error::other(format!("failed to open database: {}", e)))?;

    {
        let mut conn = pool.acquire();
        run_migrations(&mut conn).map_err(std::io::Error::other)?;

        match services::seed::seed_if_empty(&mut conn, &cfg.seed_data_path) {
            Ok(Some(_)) => {}
            Ok(None) => info!("Store already contains data; skipping seed"),
            Err(e) => warn!("Seeding failed, starting with an empty store: {}", e),
        }
    }

    let state = web::Data::new(AppState {
        pool: Arc::new(pool),
    });

    info!("Starting server on {}:{}", cfg.bind_addr, cfg.port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure_routes)
    })
    .bind((cfg.bind_addr.clone(), cfg.port))?
    .run()
    .await
}
