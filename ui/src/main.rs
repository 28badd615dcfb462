use anyhow::Context;
use rag_client::{BackendClient, BackendConfig};
use rag_ui::{build_router, AppState};

const BIND_ADDR: &str = "127.0.0.1:8501";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize environment variables and logging
    dotenv::dotenv().ok();
    env_logger::init();

    let config = BackendConfig::from_env().context("BACKEND_URL is not usable")?;
    log::info!("Backend: {}", config.base_url());

    let app = build_router(AppState::new(BackendClient::new(config)));

    let listener = tokio::net::TcpListener::bind(BIND_ADDR)
        .await
        .with_context(|| format!("failed to bind {BIND_ADDR}"))?;
    log::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
