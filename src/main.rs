use std::env;

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;

use buildmate_backend::core::logging;
use buildmate_backend::server;
use buildmate_backend::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let state = AppState::initialize().await?;
    logging::init(&state.paths);

    // PORT overrides the configured bind address, keeping the host part.
    let bind_addr = match env::var("PORT").ok().and_then(|val| val.parse::<u16>().ok()) {
        Some(port) => {
            let host = state
                .settings
                .server
                .bind_addr
                .rsplit_once(':')
                .map(|(host, _)| host.to_string())
                .unwrap_or_else(|| "0.0.0.0".to_string());
            format!("{}:{}", host, port)
        }
        None => state.settings.server.bind_addr.clone(),
    };

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    let addr = listener.local_addr()?;

    tracing::info!("Listening on {}", addr);

    let app: Router = server::router::router(state.clone());

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
