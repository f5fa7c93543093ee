use shop_server::{Config, Server, init_logger};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    let _ = dotenvy::dotenv();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!("invalid configuration: {e}"))?;

    init_logger(&config.log_level, config.log_json, config.log_dir.as_deref());

    tracing::info!(
        environment = %config.environment,
        port = config.http_port,
        "Starting shop-server"
    );

    Server::new(config).run().await?;

    Ok(())
}
