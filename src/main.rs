use anyhow::Context;
use dotenvy::dotenv;
use sipkl::logging::init_tracing;
use sipkl::router::init_router;
use sipkl::state::init_app_state;
use sipkl_config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    if let Err(e) = init_tracing() {
        eprintln!("Failed to initialize file logging: {}", e);
    }

    let state = init_app_state()
        .await
        .context("Failed to open the workbook")?;
    let app = init_router(state);

    let config = ServerConfig::from_env();
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;

    tracing::info!(addr = %config.bind_addr, "Server running");
    tracing::info!("Swagger UI available at /swagger-ui");
    axum::serve(listener, app).await?;
    Ok(())
}
