use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why the classifier accepted or rejected a piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VerdictReason {
    InScope,
    OffTopic,
    TooVague,
}

impl VerdictReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InScope => "in-scope",
            Self::OffTopic => "off-topic",
            Self::TooVague => "too-vague",
        }
    }
}

impl fmt::Display for VerdictReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub allowed: bool,
    pub reason: VerdictReason,
}

impl Verdict {
    pub fn allow() -> Self {
        Self {
            allowed: true,
            reason: VerdictReason::InScope,
        }
    }

    pub fn reject(reason: VerdictReason) -> Self {
        Self {
            allowed: false,
            reason,
        }
    }
}

/// The four request kinds the gateway forwards upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Operation {
    Consult,
    Plan,
    Diagnose,
    GridPlan,
}

impl Operation {
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Consult => "consult",
            Self::Plan => "plan",
            Self::Diagnose => "diagnose",
            Self::GridPlan => "grid-plan",
        }
    }

    /// Token budget handed to the upstream call.
    pub fn max_tokens(&self) -> u32 {
        match self {
            Self::Consult => 1000,
            Self::Plan => 1200,
            Self::Diagnose => 1000,
            Self::GridPlan => 1500,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// One rejected query. Created at rejection time and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub timestamp: String,
    pub operation: Operation,
    pub query: String,
    pub query_length: usize,
}

impl AuditEntry {
    pub fn new(operation: Operation, query: &str) -> Self {
        Self::at(Utc::now(), operation, query)
    }

    pub fn at(timestamp: DateTime<Utc>, operation: Operation, query: &str) -> Self {
        Self {
            timestamp: timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            operation,
            query: query.to_string(),
            query_length: query.chars().count(),
        }
    }
}

/// Body of every 200 response from the four operations, generated or refused.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponsePayload {
    pub response: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<serde_json::Value>,
    pub is_off_topic: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_reason: Option<VerdictReason>,
}

impl ResponsePayload {
    pub fn generated(response: String, usage: Option<serde_json::Value>) -> Self {
        Self {
            response,
            usage,
            is_off_topic: false,
            validation_reason: None,
        }
    }

    pub fn refused(response: String, reason: VerdictReason) -> Self {
        Self {
            response,
            usage: None,
            is_off_topic: true,
            validation_reason: Some(reason),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultRequest {
    pub question: Option<String>,
    pub context: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRequest {
    pub space_size: Option<String>,
    pub soil_type: Option<String>,
    pub goals: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnoseRequest {
    pub plant: Option<String>,
    pub problem: Option<String>,
    pub timeframe: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridPlanRequest {
    pub width: Option<Dimension>,
    pub length: Option<Dimension>,
    pub plants: Option<String>,
    pub location: Option<String>,
    pub zone: Option<String>,
    pub soil_type: Option<String>,
}

/// A plot dimension; browsers send either a number or the raw input string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Dimension {
    Number(f64),
    Text(String),
}

impl Dimension {
    /// Empty strings and non-positive numbers count as absent.
    pub fn is_present(&self) -> bool {
        match self {
            Self::Number(n) => *n > 0.0,
            Self::Text(s) => !s.trim().is_empty(),
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s.trim()),
        }
    }
}
