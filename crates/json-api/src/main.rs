//! Aurum JSON API Server

use std::process;

use salvo::{
    affix_state::inject,
    catch_panic::CatchPanic,
    oapi::{
        OpenApi,
        security::{ApiKey, ApiKeyValue, SecurityScheme},
        swagger_ui::SwaggerUi,
    },
    prelude::*,
    trailing_slash::remove_slash,
};
use tracing::{error, info};

use aurum_app::context::AppContext;

use crate::{
    config::ServerConfig,
    identity::USER_ID_HEADER,
    observability::{Observability, request_logging},
    state::State,
};

mod config;
mod extensions;
mod healthcheck;
mod identity;
mod inventory;
mod metals;
mod observability;
mod orders;
mod payments;
mod router;
mod shutdown;
mod state;
#[cfg(test)]
mod test_helpers;

/// Aurum JSON API Server entry point
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

    if let Err(init_error) = Observability::init(&config) {
        #[expect(
            clippy::print_stderr,
            reason = "logging failed to initialize, must use eprintln"
        )]
        {
            eprintln!("Observability error: {init_error}");
        }

        process::exit(1);
    }

    let app_config = match config.app_config() {
        Ok(app_config) => app_config,
        Err(config_error) => {
            error!("invalid configuration: {config_error}");

            process::exit(1);
        }
    };

    let addr = config.socket_addr();
    let grace = config.server.shutdown_grace();

    info!("Starting server on {addr}");

    // Bind server
    let listener = TcpListener::new(addr).bind().await;

    let app = match AppContext::from_config(&app_config).await {
        Ok(app) => app,
        Err(init_error) => {
            error!("failed to initialize app context: {init_error}");

            process::exit(1);
        }
    };

    let router = Router::new()
        .hoop(CatchPanic::new())
        .hoop(remove_slash())
        .hoop(request_logging)
        .hoop(inject(State::from_app_context(app)))
        .push(router::app_router());

    let doc = OpenApi::new("Aurum API", env!("CARGO_PKG_VERSION"))
        .add_security_scheme(
            "identity",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(USER_ID_HEADER))),
        )
        .merge_router(&router);

    let router = router
        .push(doc.into_router("/api-doc/openapi.json"))
        .push(SwaggerUi::new("/api-doc/openapi.json").into_router("docs"));

    let server = Server::new(listener);

    let handle = server.handle();

    // Listen for shutdown signal
    tokio::spawn(async move {
        if let Err(error) = shutdown::listen(handle, grace).await {
            error!("failed to listen for shutdown signal: {error}");
        }
    });

    // Start serving requests
    server.serve(router).await;
}
