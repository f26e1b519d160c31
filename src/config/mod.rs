pub mod gateway;

pub use gateway::{AuditConfig, AuditSinkKind, GatewayConfig, LexiconConfig, UpstreamConfig};

#[cfg(feature = "server")]
use clap::Parser;

#[cfg(feature = "server")]
#[derive(Debug, Clone, Parser)]
#[command(name = "garden-gate")]
#[command(about = "Topic-gated HTTP gateway for a gardening assistant")]
pub struct CliConfig {
    #[arg(long, default_value = "0.0.0.0:8787")]
    pub bind: String,

    /// Path to a TOML configuration file; environment variables are used when omitted
    #[arg(short, long)]
    pub config: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "server")]
impl CliConfig {
    pub fn load_gateway_config(&self) -> crate::utils::error::Result<GatewayConfig> {
        match &self.config {
            Some(path) => {
                tracing::info!("📁 Loading configuration from: {}", path);
                Ok(GatewayConfig::from_file(path)?.with_env_api_key())
            }
            None => {
                tracing::info!("No config file given, reading environment");
                GatewayConfig::from_env()
            }
        }
    }
}
