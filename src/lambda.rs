use garden_gate::utils::{logger, validation::Validate};
use garden_gate::{build_dispatcher, Dispatcher, GatewayConfig, GatewayResponse, CORS_HEADERS};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

/// API Gateway proxy event; covers both the REST (v1) and HTTP (v2) shapes.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyEvent {
    pub http_method: Option<String>,
    pub path: Option<String>,
    pub raw_path: Option<String>,
    pub request_context: Option<RequestContext>,
    pub body: Option<String>,
    #[serde(default)]
    pub is_base64_encoded: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct RequestContext {
    pub http: Option<HttpContext>,
}

#[derive(Debug, Default, Deserialize)]
pub struct HttpContext {
    pub method: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyResponse {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
    pub is_base64_encoded: bool,
}

impl ProxyEvent {
    fn method(&self) -> &str {
        self.request_context
            .as_ref()
            .and_then(|ctx| ctx.http.as_ref())
            .and_then(|http| http.method.as_deref())
            .or(self.http_method.as_deref())
            .unwrap_or("GET")
    }

    fn path(&self) -> &str {
        self.raw_path
            .as_deref()
            .or(self.path.as_deref())
            .unwrap_or("/")
    }
}

impl From<GatewayResponse> for ProxyResponse {
    fn from(response: GatewayResponse) -> Self {
        let mut headers: HashMap<String, String> = CORS_HEADERS
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        if response.body.is_some() {
            headers.insert("content-type".to_string(), "application/json".to_string());
        }

        Self {
            status_code: response.status,
            headers,
            body: response.body_string(),
            is_base64_encoded: false,
        }
    }
}

async fn handle_event(dispatcher: &Dispatcher, request: &ProxyEvent) -> ProxyResponse {
    // 二進位 body 不在支援範圍內
    if request.is_base64_encoded {
        tracing::warn!("Rejecting base64-encoded body");
        return GatewayResponse::json(
            500,
            json!({
                "error": "Internal server error",
                "details": "Base64-encoded request bodies are not supported",
            }),
        )
        .into();
    }

    let body = request.body.as_deref().unwrap_or("");
    dispatcher
        .dispatch(request.method(), request.path(), body.as_bytes())
        .await
        .into()
}

async fn function_handler(
    dispatcher: &Dispatcher,
    event: LambdaEvent<ProxyEvent>,
) -> Result<ProxyResponse, Error> {
    let request = event.payload;
    tracing::info!(
        method = request.method(),
        path = request.path(),
        request_id = %event.context.request_id,
        "Handling request"
    );
    Ok(handle_event(dispatcher, &request).await)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    logger::init_lambda_logger();

    let config = GatewayConfig::from_env()?;
    config.validate()?;

    // cold start 時建立一次，之後所有 invocation 共用
    let dispatcher = Arc::new(build_dispatcher(&config)?);

    run(service_fn(move |event: LambdaEvent<ProxyEvent>| {
        let dispatcher = Arc::clone(&dispatcher);
        async move { function_handler(&dispatcher, event).await }
    }))
    .await
}
