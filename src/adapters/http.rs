use crate::core::dispatch::{Dispatcher, GatewayResponse, CORS_HEADERS};
use crate::utils::error::Result;
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderName, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json, Router,
};
use std::sync::Arc;
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

/// Every request goes through the dispatcher's own route table, so unknown
/// paths and methods get the same JSON 404 and CORS headers as everything else.
pub fn create_router(dispatcher: Arc<Dispatcher>) -> Router {
    let mut router = Router::new().fallback(handle).with_state(dispatcher);

    for (name, value) in CORS_HEADERS {
        router = router.layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        ));
    }

    router.layer(TraceLayer::new_for_http())
}

pub async fn serve(bind: &str, dispatcher: Arc<Dispatcher>) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    tracing::info!("🚀 Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, create_router(dispatcher)).await?;
    Ok(())
}

async fn handle(
    State(dispatcher): State<Arc<Dispatcher>>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> Response {
    let result = dispatcher.dispatch(method.as_str(), uri.path(), &body).await;
    into_http_response(result)
}

fn into_http_response(result: GatewayResponse) -> Response {
    let status = StatusCode::from_u16(result.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    match result.body {
        Some(body) => (status, Json(body)).into_response(),
        None => status.into_response(),
    }
}
