//! Shortlist JSON API Server

use std::process;

use salvo::oapi::{
    OpenApi,
    security::{ApiKey, ApiKeyValue, SecurityScheme},
    swagger_ui::SwaggerUi,
};
use salvo::prelude::*;
use tracing::{error, info};

use shortlist_app::{
    context::{AppContext, AppSettings},
    database::{self, Db},
    domain::payments::providers::HttpProviderConfig,
};

use crate::{config::ServerConfig, state::State};

mod actors;
mod config;
mod extensions;
mod healthcheck;
mod observability;
mod payments;
mod router;
mod shortlists;
mod shutdown;
mod state;
#[cfg(test)]
mod test_helpers;

/// Shortlist JSON API Server entry point
#[tokio::main]
pub async fn main() {
    // Load configuration from .env and CLI arguments
    let config = ServerConfig::load().unwrap_or_else(|e| {
        #[expect(
            clippy::print_stderr,
            reason = "logging not initialized yet, must use eprintln for config errors"
        )]
        {
            eprintln!("Configuration error: {e}");
        }

        process::exit(1);
    });

    if let Err(init_error) = observability::init(&config) {
        #[expect(
            clippy::print_stderr,
            reason = "logging failed to initialize, must use eprintln"
        )]
        {
            eprintln!("Logging error: {init_error}");
        }

        process::exit(1);
    }

    let pool = match database::connect(&config.database.database_url).await {
        Ok(pool) => pool,
        Err(connect_error) => {
            error!("failed to connect to database: {connect_error}");

            process::exit(1);
        }
    };

    if config.database.run_migrations {
        if let Err(migrate_error) = database::migrate(&pool).await {
            error!("failed to run migrations: {migrate_error}");

            process::exit(1);
        }

        info!("migrations applied");
    }

    let app = AppContext::new(
        Db::new(pool),
        AppSettings {
            provider_name: config.payments.provider_name.clone(),
            provider: HttpProviderConfig {
                base_url: config.payments.provider_url.clone(),
                api_key: config.payments.provider_api_key.clone(),
            },
            matching: config.matching.matching(),
            follow_up: config.matching.follow_up(),
        },
    );

    let router = router::router(State::shared(app, config.payments.webhook_token.clone()));

    let doc = OpenApi::new("Shortlist API", env!("CARGO_PKG_VERSION"))
        .add_security_scheme(
            "actor",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(
                actors::ACTOR_UUID_HEADER,
            ))),
        )
        .add_security_scheme(
            "webhook_token",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(
                payments::webhook::WEBHOOK_TOKEN_HEADER,
            ))),
        )
        .merge_router(&router);

    let router = router
        .push(doc.into_router("/api-doc/openapi.json"))
        .push(SwaggerUi::new("/api-doc/openapi.json").into_router("docs"));

    let addr = config.socket_addr();

    info!("Starting server on {addr}");

    let listener = TcpListener::new(addr).bind().await;

    let server = Server::new(listener);

    let handle = server.handle();
    let grace = config.server.shutdown_grace();

    // Listen for shutdown signal
    tokio::spawn(async move {
        if let Err(error) = shutdown::listen(handle, grace).await {
            error!("failed to listen for shutdown signal: {error}");
        }
    });

    // Start serving requests
    server.serve(router).await;
}
