use std::net::SocketAddr;

use method_ai::api::{start_server, ApiContext};
use method_ai::config::{self, Settings};

#[tokio::main]
async fn main() {
    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{}: {e}", config::APP_NAME);
            std::process::exit(1);
        }
    };

    method_ai::init_tracing(&settings);
    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let addr = match resolve_bind_addr(&settings.api_host, settings.api_port).await {
        Some(addr) => addr,
        None => {
            tracing::error!(host = %settings.api_host, "Cannot resolve API_HOST");
            std::process::exit(1);
        }
    };

    if !settings.rxn_configured() {
        tracing::info!("RXN_API_KEY not set, serving placeholder plans");
    }

    let ctx = ApiContext::new(settings);
    tracing::info!(
        path = %ctx.feedback.path().display(),
        records = ctx.feedback.count(),
        "Feedback log"
    );

    let mut server = match start_server(ctx, addr).await {
        Ok(server) => server,
        Err(e) => {
            tracing::error!(error = %e, "Failed to start API server");
            std::process::exit(1);
        }
    };
    tracing::info!(
        session_id = %server.session.session_id,
        addr = %server.session.server_addr,
        started_at = %server.session.started_at,
        "Listening"
    );

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for ctrl-c");
    }

    server.shutdown();
    server.stopped().await;
}

async fn resolve_bind_addr(host: &str, port: u16) -> Option<SocketAddr> {
    tokio::net::lookup_host((host, port)).await.ok()?.next()
}
