use anyhow::Context;
use plainly::{api, config, logging, processing::ProcessingService};
use std::net::Ipv4Addr;
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    config::init_config();
    logging::init_tracing();

    let config = config::get_config();
    let service = ProcessingService::from_config(config)
        .context("Failed to initialize the text-generation client")?;
    let app = api::create_router(Arc::new(service), config.upload_max_bytes);

    let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, config.server_port))
        .await
        .with_context(|| format!("Failed to bind port {}", config.server_port))?;
    tracing::info!("Listening on http://0.0.0.0:{}", config.server_port);
    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
