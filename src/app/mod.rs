// Composition root: turns a validated configuration into a ready dispatcher.

use crate::adapters::audit::build_audit_sink;
use crate::adapters::upstream::MessagesClient;
use crate::config::GatewayConfig;
use crate::core::classifier::Classifier;
use crate::core::dispatch::Dispatcher;
use crate::utils::error::Result;
use std::sync::Arc;

pub fn build_dispatcher(config: &GatewayConfig) -> Result<Dispatcher> {
    // 詞彙只在啟動時載入一次，之後唯讀共用
    let lexicon = Arc::new(config.build_lexicon()?);
    tracing::info!(
        in_scope = lexicon.in_scope().count(),
        off_topic = lexicon.off_topic().count(),
        "Lexicon ready"
    );

    let upstream = Arc::new(MessagesClient::from_config(&config.upstream)?);
    let audit = build_audit_sink(&config.audit)?;

    Ok(Dispatcher::new(Classifier::new(lexicon), upstream, audit))
}
