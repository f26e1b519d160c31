//! Transport-agnostic request routing.
//!
//! Every transport (HTTP server, edge function) hands the raw method, path and
//! body to [`Dispatcher::dispatch`] and writes back the [`GatewayResponse`] with
//! [`CORS_HEADERS`] attached.

use crate::core::classifier::Classifier;
use crate::core::prompts::{
    build_consult_prompt, build_diagnose_prompt, build_grid_plan_prompt, build_plan_prompt,
    ConsultPrompt, DiagnosePrompt, GridPlanPrompt, PlanPrompt,
};
use crate::core::rejection::compose_rejection;
use crate::domain::model::{
    AuditEntry, ConsultRequest, DiagnoseRequest, Dimension, GridPlanRequest, Operation,
    PlanRequest, ResponsePayload, Verdict,
};
use crate::domain::ports::{AuditSink, TextGenerator};
use crate::utils::error::GatewayError;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;

/// Permissive cross-origin headers carried by every response. Names are lowercase.
pub const CORS_HEADERS: [(&str, &str); 3] = [
    ("access-control-allow-origin", "*"),
    ("access-control-allow-methods", "GET, POST, OPTIONS"),
    ("access-control-allow-headers", "Content-Type"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Preflight,
    Health,
    Operation(Operation),
}

impl Route {
    pub fn resolve(method: &str, path: &str) -> Option<Self> {
        if method == "OPTIONS" {
            return Some(Self::Preflight);
        }

        let path = if path.len() > 1 {
            path.trim_end_matches('/')
        } else {
            path
        };

        match (method, path) {
            ("GET", "/api/health") => Some(Self::Health),
            ("POST", "/api/ask") => Some(Self::Operation(Operation::Consult)),
            ("POST", "/api/plan") => Some(Self::Operation(Operation::Plan)),
            ("POST", "/api/diagnose") => Some(Self::Operation(Operation::Diagnose)),
            ("POST", "/api/grid-plan") => Some(Self::Operation(Operation::GridPlan)),
            _ => None,
        }
    }
}

/// Status code plus optional JSON body; transports add the headers.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayResponse {
    pub status: u16,
    pub body: Option<Value>,
}

impl GatewayResponse {
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            body: Some(body),
        }
    }

    pub fn empty() -> Self {
        Self {
            status: 200,
            body: None,
        }
    }

    pub fn body_string(&self) -> String {
        self.body
            .as_ref()
            .map(Value::to_string)
            .unwrap_or_default()
    }
}

/// Failures that end a request before a payload is produced.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("Invalid JSON body: {0}")]
    MalformedBody(#[from] serde_json::Error),

    #[error("Failed to get response from AI service")]
    Upstream(#[source] GatewayError),

    #[error("Internal server error")]
    Internal(#[source] GatewayError),
}

impl DispatchError {
    pub fn status(&self) -> u16 {
        match self {
            Self::MissingFields(_) => 400,
            Self::MalformedBody(_) | Self::Upstream(_) | Self::Internal(_) => 500,
        }
    }

    pub fn into_response(self) -> GatewayResponse {
        let status = self.status();
        let body = match &self {
            Self::MissingFields(_) => json!({ "error": self.to_string() }),
            Self::MalformedBody(e) => json!({
                "error": "Internal server error",
                "details": format!("Invalid JSON body: {}", e),
            }),
            Self::Upstream(e) => json!({
                "error": self.to_string(),
                "details": e.upstream_details(),
            }),
            Self::Internal(e) => json!({
                "error": self.to_string(),
                "details": e.to_string(),
            }),
        };
        GatewayResponse::json(status, body)
    }
}

/// A request whose required fields are all present.
#[derive(Debug, Clone)]
enum ValidatedRequest {
    Consult {
        question: String,
        context: Option<String>,
    },
    Plan {
        space_size: String,
        soil_type: String,
        goals: String,
        location: String,
    },
    Diagnose {
        plant: String,
        problem: String,
        timeframe: String,
        location: String,
    },
    GridPlan {
        width: Dimension,
        length: Dimension,
        plants: String,
        location: Option<String>,
        zone: Option<String>,
        soil_type: Option<String>,
    },
}

impl ValidatedRequest {
    fn parse(operation: Operation, body: &[u8]) -> Result<Self, DispatchError> {
        let mut missing = Vec::new();

        let request = match operation {
            Operation::Consult => {
                let req: ConsultRequest = parse_body(body)?;
                Self::Consult {
                    question: require_text(&mut missing, "question", req.question),
                    context: req.context,
                }
            }
            Operation::Plan => {
                let req: PlanRequest = parse_body(body)?;
                Self::Plan {
                    space_size: require_text(&mut missing, "spaceSize", req.space_size),
                    soil_type: require_text(&mut missing, "soilType", req.soil_type),
                    goals: require_text(&mut missing, "goals", req.goals),
                    location: require_text(&mut missing, "location", req.location),
                }
            }
            Operation::Diagnose => {
                let req: DiagnoseRequest = parse_body(body)?;
                Self::Diagnose {
                    plant: require_text(&mut missing, "plant", req.plant),
                    problem: require_text(&mut missing, "problem", req.problem),
                    timeframe: require_text(&mut missing, "timeframe", req.timeframe),
                    location: require_text(&mut missing, "location", req.location),
                }
            }
            Operation::GridPlan => {
                let req: GridPlanRequest = parse_body(body)?;
                Self::GridPlan {
                    width: require_dimension(&mut missing, "width", req.width),
                    length: require_dimension(&mut missing, "length", req.length),
                    plants: require_text(&mut missing, "plants", req.plants),
                    location: req.location,
                    zone: req.zone,
                    soil_type: req.soil_type,
                }
            }
        };

        if missing.is_empty() {
            Ok(request)
        } else {
            Err(DispatchError::MissingFields(missing))
        }
    }

    /// Free-text fields to classify, in declaration order.
    fn classified_fields(&self) -> Vec<(&'static str, &str)> {
        match self {
            Self::Consult { question, .. } => vec![("question", question.as_str())],
            Self::Plan { goals, .. } => vec![("goals", goals.as_str())],
            Self::Diagnose { plant, problem, .. } => {
                vec![("plant", plant.as_str()), ("problem", problem.as_str())]
            }
            Self::GridPlan { plants, .. } => vec![("plants", plants.as_str())],
        }
    }

    fn prompt(&self) -> String {
        match self {
            Self::Consult { question, context } => build_consult_prompt(&ConsultPrompt {
                question,
                context: context.as_deref(),
            }),
            Self::Plan {
                space_size,
                soil_type,
                goals,
                location,
            } => build_plan_prompt(&PlanPrompt {
                space_size,
                soil_type,
                goals,
                location,
            }),
            Self::Diagnose {
                plant,
                problem,
                timeframe,
                location,
            } => build_diagnose_prompt(&DiagnosePrompt {
                plant,
                problem,
                timeframe,
                location,
            }),
            Self::GridPlan {
                width,
                length,
                plants,
                location,
                zone,
                soil_type,
            } => build_grid_plan_prompt(&GridPlanPrompt {
                width,
                length,
                plants,
                location: location.as_deref(),
                zone: zone.as_deref(),
                soil_type: soil_type.as_deref(),
            }),
        }
    }
}

fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, DispatchError> {
    Ok(serde_json::from_slice(body)?)
}

// null、空字串與純空白都視為缺少
fn require_text(missing: &mut Vec<&'static str>, field: &'static str, value: Option<String>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => {
            missing.push(field);
            String::new()
        }
    }
}

fn require_dimension(
    missing: &mut Vec<&'static str>,
    field: &'static str,
    value: Option<Dimension>,
) -> Dimension {
    match value {
        Some(d) if d.is_present() => d,
        _ => {
            missing.push(field);
            Dimension::Number(0.0)
        }
    }
}

/// The first rejected field in declaration order.
struct Rejection<'a> {
    field: &'static str,
    text: &'a str,
    verdict: Verdict,
}

pub struct Dispatcher {
    classifier: Classifier,
    upstream: Arc<dyn TextGenerator>,
    audit: Arc<dyn AuditSink>,
}

impl Dispatcher {
    pub fn new(
        classifier: Classifier,
        upstream: Arc<dyn TextGenerator>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            classifier,
            upstream,
            audit,
        }
    }

    pub async fn dispatch(&self, method: &str, path: &str, body: &[u8]) -> GatewayResponse {
        match Route::resolve(method, path) {
            Some(Route::Preflight) => GatewayResponse::empty(),
            Some(Route::Health) => GatewayResponse::json(
                200,
                json!({ "status": "ok", "timestamp": Utc::now().to_rfc3339() }),
            ),
            Some(Route::Operation(operation)) => match self.handle(operation, body).await {
                Ok(payload) => match serde_json::to_value(&payload) {
                    Ok(value) => GatewayResponse::json(200, value),
                    Err(e) => DispatchError::Internal(e.into()).into_response(),
                },
                Err(err) => {
                    if err.status() >= 500 {
                        tracing::error!(operation = %operation, error = ?err, "Request failed");
                    } else {
                        tracing::warn!(operation = %operation, "{}", err);
                    }
                    err.into_response()
                }
            },
            None => {
                tracing::debug!(method, path, "No route matched");
                GatewayResponse::json(404, json!({ "error": "Not found" }))
            }
        }
    }

    pub async fn handle(
        &self,
        operation: Operation,
        body: &[u8],
    ) -> Result<ResponsePayload, DispatchError> {
        let request = ValidatedRequest::parse(operation, body)?;

        if let Some(rejection) = self.first_rejection(&request) {
            tracing::info!(
                operation = %operation,
                field = rejection.field,
                reason = %rejection.verdict.reason,
                "Query rejected by topic filter"
            );
            self.record_rejection(AuditEntry::new(operation, rejection.text))
                .await;
            return Ok(ResponsePayload::refused(
                compose_rejection(&rejection.verdict),
                rejection.verdict.reason,
            ));
        }

        let prompt = request.prompt();
        let generation = self
            .upstream
            .generate(&prompt, operation.max_tokens())
            .await
            .map_err(|e| {
                if e.is_upstream() {
                    DispatchError::Upstream(e)
                } else {
                    DispatchError::Internal(e)
                }
            })?;

        tracing::info!(operation = %operation, "✅ Upstream response returned");
        Ok(ResponsePayload::generated(generation.text, generation.usage))
    }

    fn first_rejection<'a>(&self, request: &'a ValidatedRequest) -> Option<Rejection<'a>> {
        // 每個欄位都獨立分類，再依宣告順序取第一個被拒絕的
        let verdicts: Vec<Rejection<'a>> = request
            .classified_fields()
            .into_iter()
            .map(|(field, text)| Rejection {
                field,
                text,
                verdict: self.classifier.classify(text),
            })
            .collect();

        verdicts.into_iter().find(|r| !r.verdict.allowed)
    }

    /// Best effort: sink errors and panics are logged and dropped.
    async fn record_rejection(&self, entry: AuditEntry) {
        let sink = Arc::clone(&self.audit);
        let task = tokio::spawn(async move { sink.record(&entry).await });

        match task.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!(error = %e, "Failed to record rejected query"),
            Err(e) => tracing::warn!(error = %e, "Audit sink task aborted"),
        }
    }
}
