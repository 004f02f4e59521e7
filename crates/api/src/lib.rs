use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::{Json, Path as AxumPath, Query, State};
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use salon_agents::{DispatchOutcome, SalonResponder};
use salon_channels::adapter_for;
use salon_core::{Catalog, Platform};
use salon_observability::{AppMetrics, MetricsSnapshot};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

pub const DEFAULT_CATALOG_PATH: &str = "catalog/salon_catalog.json";
pub const DEFAULT_BIND: &str = "0.0.0.0:5000";
const MAX_BODY_BYTES: usize = 64 * 1024;
const DEFAULT_DEMO_USER: &str = "demo_user";
const DEFAULT_DEMO_SERVICE: &str = "Corte de cabello";
const DEFAULT_DEMO_TIME: &str = "10:00";

#[derive(Debug, Clone, Default)]
pub struct ApiConfig {
    pub catalog_path: PathBuf,
    pub whatsapp_verify_token: Option<String>,
    pub instagram_verify_token: Option<String>,
    pub allowed_origins: Vec<String>,
}

impl ApiConfig {
    pub fn from_env() -> Self {
        Self {
            catalog_path: env::var("SALON_CATALOG_PATH")
                .unwrap_or_else(|_| DEFAULT_CATALOG_PATH.to_string())
                .into(),
            whatsapp_verify_token: non_empty_env("WHATSAPP_VERIFY_TOKEN"),
            instagram_verify_token: non_empty_env("INSTAGRAM_VERIFY_TOKEN"),
            allowed_origins: parse_allowed_origins(),
        }
    }
}

/// `SALON_BIND` gives the listen address; `PORT` replaces only its port.
pub fn bind_address_from_env() -> String {
    resolve_bind_address(non_empty_env("SALON_BIND"), non_empty_env("PORT"))
}

pub fn resolve_bind_address(bind: Option<String>, port: Option<String>) -> String {
    let bind = bind.unwrap_or_else(|| DEFAULT_BIND.to_string());
    let Some(port) = port else {
        return bind;
    };
    let host = match bind.rsplit_once(':') {
        Some((host, _)) if !host.is_empty() => host,
        _ => "0.0.0.0",
    };
    format!("{host}:{port}")
}

#[derive(Clone)]
pub struct ApiState {
    pub responder: Arc<SalonResponder>,
    pub metrics: Arc<AppMetrics>,
    pub whatsapp_verify_token: Option<String>,
    pub instagram_verify_token: Option<String>,
    pub allowed_origins: Arc<Vec<String>>,
}

impl ApiState {
    fn verify_token(&self, platform: Platform) -> Option<&str> {
        match platform {
            Platform::WhatsApp => self.whatsapp_verify_token.as_deref(),
            Platform::Instagram => self.instagram_verify_token.as_deref(),
            Platform::Web => None,
        }
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp_utc: String,
    bot_name: String,
    metrics: MetricsSnapshot,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct DemoBookingRequest {
    user_id: Option<String>,
    service: Option<String>,
    date: Option<String>,
    time: Option<String>,
}

pub async fn build_app(config: ApiConfig) -> Result<Router> {
    let catalog = Catalog::load(&config.catalog_path).with_context(|| {
        format!(
            "failed to load catalog from {}",
            config.catalog_path.display()
        )
    })?;

    let metrics = AppMetrics::shared();
    let responder = SalonResponder::new(Arc::new(catalog), metrics.clone())
        .context("catalog does not cover the classification rules")?;

    info!(
        bot_name = %responder.catalog().bot_name(),
        rules = responder.classifier().rules().len(),
        whatsapp_verify = config.whatsapp_verify_token.is_some(),
        instagram_verify = config.instagram_verify_token.is_some(),
        "catalog loaded"
    );

    Ok(build_router(ApiState {
        responder: Arc::new(responder),
        metrics,
        whatsapp_verify_token: config.whatsapp_verify_token,
        instagram_verify_token: config.instagram_verify_token,
        allowed_origins: Arc::new(config.allowed_origins),
    }))
}

pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/config", get(business_config))
        .route("/greeting", get(greeting))
        .route(
            "/webhook/whatsapp",
            get(whatsapp_subscribe).post(whatsapp_webhook),
        )
        .route(
            "/webhook/instagram",
            get(instagram_subscribe).post(instagram_webhook),
        )
        .route("/webhook/web", post(web_webhook))
        .route("/booking/demo", post(demo_booking))
        .route("/slots/:date", get(slots))
        .layer(build_cors_layer(&state.allowed_origins))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .with_state(state)
}

async fn health(State(state): State<ApiState>) -> impl IntoResponse {
    let payload = HealthResponse {
        status: "healthy",
        timestamp_utc: chrono::Utc::now().to_rfc3339(),
        bot_name: state.responder.catalog().bot_name().to_string(),
        metrics: state.metrics.snapshot(),
    };
    (StatusCode::OK, Json(payload))
}

async fn business_config(State(state): State<ApiState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.responder.catalog().profile().clone()))
}

async fn greeting(State(state): State<ApiState>) -> impl IntoResponse {
    let reply = state.responder.greeting();
    (
        StatusCode::OK,
        Json(adapter_for(Platform::Web).render(&reply, "")),
    )
}

async fn whatsapp_subscribe(
    State(state): State<ApiState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    subscription_handshake(&state, Platform::WhatsApp, &params)
}

async fn instagram_subscribe(
    State(state): State<ApiState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    subscription_handshake(&state, Platform::Instagram, &params)
}

async fn whatsapp_webhook(
    State(state): State<ApiState>,
    Query(params): Query<HashMap<String, String>>,
    body: Bytes,
) -> Response {
    if let Some(challenge) = verification_echo(&state, Platform::WhatsApp, &params) {
        return (StatusCode::OK, challenge).into_response();
    }
    dispatch(&state, Platform::WhatsApp, &body)
}

async fn instagram_webhook(
    State(state): State<ApiState>,
    Query(params): Query<HashMap<String, String>>,
    body: Bytes,
) -> Response {
    if let Some(challenge) = verification_echo(&state, Platform::Instagram, &params) {
        return (StatusCode::OK, challenge).into_response();
    }
    dispatch(&state, Platform::Instagram, &body)
}

async fn web_webhook(State(state): State<ApiState>, body: Bytes) -> Response {
    dispatch(&state, Platform::Web, &body)
}

async fn demo_booking(State(state): State<ApiState>, body: Bytes) -> Response {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        DemoBookingRequest::default()
    } else {
        match serde_json::from_slice::<DemoBookingRequest>(&body) {
            Ok(request) => request,
            Err(err) => {
                warn!(error = %err, "rejected demo booking body");
                return json_error(
                    StatusCode::BAD_REQUEST,
                    "invalid_json",
                    "booking body must be a JSON object",
                );
            }
        }
    };
    let date = request
        .date
        .unwrap_or_else(|| chrono::Local::now().format("%Y-%m-%d").to_string());

    let booking = state.responder.create_demo_booking(
        request.user_id.as_deref().unwrap_or(DEFAULT_DEMO_USER),
        request.service.as_deref().unwrap_or(DEFAULT_DEMO_SERVICE),
        &date,
        request.time.as_deref().unwrap_or(DEFAULT_DEMO_TIME),
    );

    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "message": format!("Reserva {} creada exitosamente", booking.booking_id),
            "booking": booking,
        })),
    )
        .into_response()
}

async fn slots(State(state): State<ApiState>, AxumPath(date): AxumPath<String>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "date": date,
            "available_slots": state.responder.available_slots(),
        })),
    )
}

fn dispatch(state: &ApiState, platform: Platform, body: &[u8]) -> Response {
    let payload = match serde_json::from_slice::<Value>(body) {
        Ok(payload) => payload,
        Err(err) => {
            warn!(platform = %platform, error = %err, "webhook body is not JSON");
            return json_error(StatusCode::BAD_REQUEST, "invalid_json", "request body must be JSON");
        }
    };
    info!(platform = %platform, bytes = body.len(), "webhook received");

    match state.responder.handle(platform, &payload) {
        Ok(DispatchOutcome::Reply(reply)) => (StatusCode::OK, Json(reply)).into_response(),
        Ok(DispatchOutcome::NoOp) if platform == Platform::Web => json_error(
            StatusCode::BAD_REQUEST,
            "invalid_payload",
            "expected an object with a `message` field",
        ),
        Ok(DispatchOutcome::NoOp) => {
            (StatusCode::OK, Json(json!({ "status": "ok" }))).into_response()
        }
        Err(err) => {
            error!(platform = %platform, error = %err, "catalog lookup failed");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "internal server error",
            )
        }
    }
}

/// Meta-style subscription check: echo `hub.challenge` when the token matches.
fn verification_echo(
    state: &ApiState,
    platform: Platform,
    params: &HashMap<String, String>,
) -> Option<String> {
    let expected = state.verify_token(platform)?;
    let provided = params.get("hub.verify_token")?;
    if provided != expected {
        return None;
    }
    Some(params.get("hub.challenge").cloned().unwrap_or_default())
}

fn subscription_handshake(
    state: &ApiState,
    platform: Platform,
    params: &HashMap<String, String>,
) -> Response {
    let mode_ok = params
        .get("hub.mode")
        .map_or(true, |mode| mode == "subscribe");

    match verification_echo(state, platform, params) {
        Some(challenge) if mode_ok => {
            info!(platform = %platform, "webhook subscription verified");
            (StatusCode::OK, challenge).into_response()
        }
        _ => {
            warn!(platform = %platform, "webhook verification rejected");
            json_error(
                StatusCode::FORBIDDEN,
                "verification_failed",
                "verify token does not match",
            )
        }
    }
}

fn json_error(status: StatusCode, code: &str, message: &str) -> Response {
    (
        status,
        Json(json!({
            "error": code,
            "message": message,
        })),
    )
        .into_response()
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_allowed_origins() -> Vec<String> {
    env::var("SALON_ALLOWED_ORIGINS")
        .ok()
        .map(|value| {
            value
                .split(',')
                .map(|origin| origin.trim().trim_end_matches('/').to_string())
                .filter(|origin| !origin.is_empty())
                .collect::<Vec<_>>()
        })
        .unwrap_or_else(|| vec!["http://localhost:5000".to_string()])
}

fn build_cors_layer(allowed_origins: &Arc<Vec<String>>) -> CorsLayer {
    let origins = allowed_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect::<Vec<_>>();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}
