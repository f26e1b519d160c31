use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Upstream request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Upstream returned status {status}: {body}")]
    UpstreamError { status: u16, body: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Audit sink error: {message}")]
    AuditError { message: String },
}

impl GatewayError {
    /// 上游服務相關的錯誤
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::HttpError(_) | Self::UpstreamError { .. })
    }

    /// Raw upstream text (or the transport error) without the wrapping prefix.
    pub fn upstream_details(&self) -> String {
        match self {
            Self::UpstreamError { body, .. } => body.clone(),
            other => other.to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::HttpError(_) | Self::UpstreamError { .. } => {
                "The AI service could not be reached or rejected the request".to_string()
            }
            Self::IoError(e) => format!("File system error: {}", e),
            Self::SerializationError(_) => "Failed to read or write JSON data".to_string(),
            Self::TomlError(_) => "The configuration file is not valid TOML".to_string(),
            Self::ConfigError { message } => format!("Configuration problem: {}", message),
            Self::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid setting '{}': {}", field, reason)
            }
            Self::MissingConfigError { field } => {
                format!("Required setting '{}' is missing", field)
            }
            Self::AuditError { message } => format!("Audit log problem: {}", message),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::HttpError(_) => "Check network connectivity and the upstream endpoint",
            Self::UpstreamError { status, .. } if *status == 401 || *status == 403 => {
                "Check that UPSTREAM_API_KEY is set to a valid key"
            }
            Self::UpstreamError { .. } => "Check the upstream model name and service status",
            Self::IoError(_) => "Check that the path exists and is writable",
            Self::SerializationError(_) => "Check that the payload is valid JSON",
            Self::TomlError(_) => "Fix the TOML syntax in the configuration file",
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => {
                "Review the configuration file or the environment variables"
            }
            Self::AuditError { .. } => "Check the audit sink settings",
        }
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;
