use clap::Parser;
use garden_gate::adapters::http;
use garden_gate::utils::{logger, validation::Validate};
use garden_gate::{build_dispatcher, CliConfig};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_server_logger(cli.verbose);

    tracing::info!("Starting garden-gate");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let config = match cli.load_gateway_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Failed to load configuration: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let dispatcher = Arc::new(build_dispatcher(&config)?);
    tracing::info!(
        endpoint = %config.upstream.endpoint,
        model = %config.upstream.model,
        audit = ?config.audit.sink,
        "Gateway ready"
    );

    http::serve(&cli.bind, dispatcher).await?;
    Ok(())
}
