use armetix_api::config::ApiConfig;
use armetix_observability::LogFormat;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = ApiConfig::from_env()?;
    armetix_observability::init(&config.log_level, LogFormat::from_json_flag(config.log_json));

    let app = armetix_api::app::build_app(&config);

    let listener = tokio::net::TcpListener::bind(config.server_addr()).await?;
    tracing::info!(
        addr = %listener.local_addr()?,
        low_stock_threshold = config.low_stock_threshold,
        "listening"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
