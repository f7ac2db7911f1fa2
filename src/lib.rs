pub mod application;
pub mod config;
pub mod currency;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;
pub mod state;
pub mod storefront;

use std::sync::Arc;

use actix_web::{error, middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use thiserror::Error;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use config::{AppConfig, ConfigError, StorageBackend};
use domain::errors::DomainError;
use errors::AppError;
use infrastructure::memory_store::InMemoryStore;
use infrastructure::menu_repo::DieselMenuRepository;
use infrastructure::order_repo::DieselOrderRepository;

pub use db::{create_pool, DbPool};
pub use state::AppState;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to create database connection pool: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Failed to run database migrations: {0}")]
    Migrations(String),

    #[error("Failed to seed menu: {0}")]
    Seed(#[from] DomainError),
}

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), StartupError> {
    let mut conn = pool.get()?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| StartupError::Migrations(e.to_string()))?;
    Ok(())
}

/// Wire repositories for the configured storage backend, migrating and
/// seeding as configured.
pub fn build_state(config: &AppConfig) -> Result<AppState, StartupError> {
    let state = match config.storage {
        StorageBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .ok_or(ConfigError::Missing("DATABASE_URL"))?;
            let pool = create_pool(database_url)?;
            run_migrations(&pool)?;
            AppState::new(
                Arc::new(DieselMenuRepository::new(pool.clone())),
                Arc::new(DieselOrderRepository::new(pool)),
                config.order_policy.clone(),
                config.currency,
            )
        }
        StorageBackend::Memory => {
            log::warn!("Using in-memory storage; orders are lost on restart");
            let store = Arc::new(InMemoryStore::new());
            AppState::new(
                store.clone(),
                store,
                config.order_policy.clone(),
                config.currency,
            )
        }
    };

    if config.seed_menu {
        state
            .menu
            .seed_if_empty(infrastructure::seed::sample_menu())?;
    }
    Ok(state)
}

/// Malformed JSON bodies get the same error shape as every other 400.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let message = format!("Invalid request body: {}", err);
        error::Error::from(AppError::bad_request(message))
    })
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/menu", web::get().to(handlers::menu::list_menu))
        .route("/menu-list", web::get().to(handlers::menu::list_menu))
        .route("/menu/{id}", web::get().to(handlers::menu::get_menu_item))
        .service(
            web::scope("/orders")
                .route("", web::post().to(handlers::orders::create_order))
                .route("", web::get().to(handlers::orders::list_orders))
                .route(
                    "/{order_number}",
                    web::get().to(handlers::orders::get_order),
                ),
        );
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    state: AppState,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let state = web::Data::new(state);
    Ok(HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(json_config())
            .wrap(Logger::default())
            .configure(routes)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", handlers::ApiDoc::openapi()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn memory_backend_starts_seeded() {
        let vars: HashMap<&str, &str> = HashMap::from([("STORAGE", "memory")]);
        let config =
            AppConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string())).expect("config");

        let state = build_state(&config).expect("state");

        assert_eq!(state.menu.list(None).expect("menu").len(), 9);
    }

    #[test]
    fn openapi_document_lists_every_route() {
        let doc = handlers::ApiDoc::openapi();
        let paths: Vec<_> = doc.paths.paths.keys().cloned().collect();

        for expected in ["/menu", "/menu/{id}", "/orders", "/orders/{order_number}"] {
            assert!(paths.iter().any(|p| p == expected), "missing {}", expected);
        }
    }
}
