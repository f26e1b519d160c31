use crate::core::lexicon::Lexicon;
use crate::utils::error::{GatewayError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_required_field, validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

pub const DEFAULT_UPSTREAM_ENDPOINT: &str = "https://api.anthropic.com/v1/messages";
pub const DEFAULT_UPSTREAM_MODEL: &str = "claude-3-5-haiku-latest";
pub const DEFAULT_API_VERSION: &str = "2023-06-01";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub audit: AuditConfig,
    #[serde(default)]
    pub lexicon: LexiconConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditSinkKind {
    #[default]
    Log,
    File,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditConfig {
    #[serde(default)]
    pub sink: AuditSinkKind,
    pub path: Option<String>,
}

/// Inline lists take precedence over the file; anything left unset uses the defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LexiconConfig {
    pub path: Option<String>,
    pub in_scope: Option<Vec<String>>,
    pub off_topic: Option<Vec<String>>,
}

fn default_endpoint() -> String {
    DEFAULT_UPSTREAM_ENDPOINT.to_string()
}

fn default_model() -> String {
    DEFAULT_UPSTREAM_MODEL.to_string()
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            api_version: default_api_version(),
            api_key: None,
        }
    }
}

impl GatewayConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = substitute_env_vars(content)?;
        Ok(toml::from_str(&processed)?)
    }

    /// Configuration for environments without a config file (edge functions, containers).
    pub fn from_env() -> Result<Self> {
        let sink = match env::var("AUDIT_SINK") {
            Ok(value) => match value.to_ascii_lowercase().as_str() {
                "log" => AuditSinkKind::Log,
                "file" => AuditSinkKind::File,
                other => {
                    return Err(GatewayError::InvalidConfigValueError {
                        field: "AUDIT_SINK".to_string(),
                        value: other.to_string(),
                        reason: "Expected 'log' or 'file'".to_string(),
                    })
                }
            },
            Err(_) => AuditSinkKind::Log,
        };

        Ok(Self {
            upstream: UpstreamConfig {
                endpoint: env::var("UPSTREAM_ENDPOINT").unwrap_or_else(|_| default_endpoint()),
                model: env::var("UPSTREAM_MODEL").unwrap_or_else(|_| default_model()),
                api_version: env::var("UPSTREAM_API_VERSION")
                    .unwrap_or_else(|_| default_api_version()),
                api_key: env::var("UPSTREAM_API_KEY").ok(),
            },
            audit: AuditConfig {
                sink,
                path: env::var("AUDIT_LOG_PATH").ok(),
            },
            lexicon: LexiconConfig {
                path: env::var("LEXICON_PATH").ok(),
                in_scope: None,
                off_topic: None,
            },
        })
    }

    /// Fill the API key from the environment when the file left it out.
    pub fn with_env_api_key(mut self) -> Self {
        if self.upstream.api_key.is_none() {
            self.upstream.api_key = env::var("UPSTREAM_API_KEY").ok();
        }
        self
    }

    pub fn build_lexicon(&self) -> Result<Lexicon> {
        let base = match &self.lexicon.path {
            Some(path) => Some(Lexicon::from_file(path)?),
            None => None,
        };

        let in_scope = self.lexicon.in_scope.clone().or_else(|| {
            base.as_ref()
                .map(|l| l.in_scope().map(str::to_string).collect())
        });
        let off_topic = self.lexicon.off_topic.clone().or_else(|| {
            base.as_ref()
                .map(|l| l.off_topic().map(str::to_string).collect())
        });

        Ok(Lexicon::from_parts(in_scope, off_topic))
    }
}

impl Validate for GatewayConfig {
    fn validate(&self) -> Result<()> {
        validate_url("upstream.endpoint", &self.upstream.endpoint)?;
        validate_non_empty_string("upstream.model", &self.upstream.model)?;
        validate_non_empty_string("upstream.api_version", &self.upstream.api_version)?;

        let api_key = validate_required_field("upstream.api_key", &self.upstream.api_key)?;
        validate_non_empty_string("upstream.api_key", api_key)?;

        if self.audit.sink == AuditSinkKind::File {
            let path = validate_required_field("audit.path", &self.audit.path)?;
            validate_path("audit.path", path)?;
        }

        if let Some(path) = &self.lexicon.path {
            validate_path("lexicon.path", path)?;
        }

        tracing::info!("✅ Gateway configuration validation passed");
        Ok(())
    }
}

/// 替換環境變數 (例如 ${UPSTREAM_API_KEY})；未設定的變數保持原樣
fn substitute_env_vars(content: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| GatewayError::ConfigError {
        message: format!("Invalid substitution pattern: {}", e),
    })?;

    let result = re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
    });

    Ok(result.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[upstream]
endpoint = "https://llm.example.com/v1/messages"
model = "garden-model"
api_key = "secret"

[audit]
sink = "file"
path = "logs/rejections.jsonl"

[lexicon]
in_scope = ["bonsai"]
"#;

        let config = GatewayConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.upstream.endpoint, "https://llm.example.com/v1/messages");
        assert_eq!(config.upstream.model, "garden-model");
        assert_eq!(config.upstream.api_version, DEFAULT_API_VERSION);
        assert_eq!(config.audit.sink, AuditSinkKind::File);
        assert!(config.validate().is_ok());

        let lexicon = config.build_lexicon().unwrap();
        assert!(lexicon.contains_in_scope("bonsai"));
        assert!(!lexicon.contains_in_scope("compost"));
        assert!(lexicon.contains_off_topic("python"));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = GatewayConfig::from_toml_str("").unwrap();
        assert_eq!(config.upstream.endpoint, DEFAULT_UPSTREAM_ENDPOINT);
        assert_eq!(config.audit.sink, AuditSinkKind::Log);
        assert!(config.build_lexicon().unwrap().contains_in_scope("compost"));
    }

    #[test]
    fn test_env_substitution() {
        std::env::set_var("GARDEN_GATE_TEST_KEY", "from-env");
        let config = GatewayConfig::from_toml_str(
            r#"
[upstream]
api_key = "${GARDEN_GATE_TEST_KEY}"
"#,
        )
        .unwrap();
        assert_eq!(config.upstream.api_key.as_deref(), Some("from-env"));

        // 未設定的變數保留原字串
        let config = GatewayConfig::from_toml_str(
            r#"
[upstream]
model = "${GARDEN_GATE_TEST_UNSET_VAR}"
"#,
        )
        .unwrap();
        assert_eq!(config.upstream.model, "${GARDEN_GATE_TEST_UNSET_VAR}");
    }

    #[test]
    fn test_validation_failures() {
        let mut config = GatewayConfig::default();
        assert!(matches!(
            config.validate(),
            Err(GatewayError::MissingConfigError { .. })
        ));

        config.upstream.api_key = Some("secret".to_string());
        assert!(config.validate().is_ok());

        config.audit.sink = AuditSinkKind::File;
        assert!(config.validate().is_err());

        config.audit.path = Some("audit.jsonl".to_string());
        config.upstream.endpoint = "ftp://example.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_lexicon_file_with_inline_override() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "in_scope = [\"orchid\"]\noff_topic = [\"chess\"]").unwrap();

        let config = GatewayConfig {
            lexicon: LexiconConfig {
                path: Some(file.path().to_string_lossy().to_string()),
                in_scope: None,
                off_topic: Some(vec!["poker".to_string()]),
            },
            ..GatewayConfig::default()
        };

        let lexicon = config.build_lexicon().unwrap();
        assert!(lexicon.contains_in_scope("orchid care"));
        assert!(lexicon.contains_off_topic("poker night"));
        assert!(!lexicon.contains_off_topic("chess"));
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            GatewayConfig::from_toml_str("[upstream"),
            Err(GatewayError::TomlError(_))
        ));
    }
}
