//! HTTP endpoints

use axum::{
    extract::{Path, Query, State},
    http::{HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use krishi_core::{AdvisoryRequest, CropAdvisory, Language, SourceRef, WeatherForecast};
use krishi_genai::GenAiError;
use krishi_store::{SmsType, StoreError};

use crate::state::AppState;
use crate::websocket::ws_handler;

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let cors_layer = build_cors_layer(
        &state.settings.server.cors_origins,
        state.settings.server.cors_enabled,
    );

    Router::new()
        // Advisory pipeline
        .route("/api/advisory", post(generate_advisory))
        .route("/api/weather", get(get_weather))
        .route("/api/speech", post(synthesize_speech))
        // Mocked services
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/feedback", post(submit_feedback))
        .route("/api/notifications/:phone", get(notification_history))
        // Live conversation
        .route("/ws/live", get(ws_handler))
        // Health
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
}

/// Build the CORS layer from configured origins; empty config defaults to
/// localhost for safety.
fn build_cors_layer(origins: &[String], enabled: bool) -> CorsLayer {
    if !enabled {
        tracing::warn!("CORS is disabled - allowing all origins (NOT FOR PRODUCTION)");
        return CorsLayer::permissive();
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin, "Invalid CORS origin ignored");
                None
            }
        })
        .collect();

    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    if parsed.is_empty() {
        layer.allow_origin("http://localhost:3000".parse::<HeaderValue>().unwrap())
    } else {
        layer.allow_origin(AllowOrigin::list(parsed))
    }
}

// ── Error mapping ──────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    kind: &'static str,
}

/// Handler error that maps each failure kind to a distinct status so the
/// presentation layer can pick a specific recovery affordance.
#[derive(Debug)]
pub(crate) enum ApiError {
    GenAi(GenAiError),
    Store(StoreError),
    BadRequest(String),
}

impl From<GenAiError> for ApiError {
    fn from(err: GenAiError) -> Self {
        Self::GenAi(err)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

pub(crate) fn genai_status(err: &GenAiError) -> (StatusCode, &'static str) {
    match err {
        // The body text is the contract the UI matches to show setup help.
        GenAiError::CredentialMissing => (StatusCode::SERVICE_UNAVAILABLE, "credential_missing"),
        GenAiError::CredentialInvalid(_) => (StatusCode::UNAUTHORIZED, "credential_invalid"),
        GenAiError::RateLimited => (StatusCode::TOO_MANY_REQUESTS, "rate_limited"),
        GenAiError::Timeout => (StatusCode::GATEWAY_TIMEOUT, "timeout"),
        GenAiError::EmptyModelResponse => (StatusCode::BAD_GATEWAY, "empty_model_response"),
        GenAiError::MalformedModelOutput(_) => (StatusCode::BAD_GATEWAY, "malformed_model_output"),
        GenAiError::NoAudioData => (StatusCode::BAD_GATEWAY, "no_audio_data"),
        GenAiError::Api { .. } | GenAiError::Network(_) | GenAiError::InvalidResponse(_) => {
            (StatusCode::BAD_GATEWAY, "provider_error")
        }
    }
}

fn store_status(err: &StoreError) -> (StatusCode, &'static str) {
    match err {
        StoreError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "invalid_credentials"),
        StoreError::UserExists(_) => (StatusCode::CONFLICT, "user_exists"),
        StoreError::InvalidPhone(_) => (StatusCode::BAD_REQUEST, "invalid_phone"),
        StoreError::InvalidRating(_) => (StatusCode::BAD_REQUEST, "invalid_rating"),
        StoreError::Io(_) | StoreError::Serde(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "store_error")
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match &self {
            ApiError::GenAi(err) => {
                let (status, kind) = genai_status(err);
                (status, kind, err.to_string())
            }
            ApiError::Store(err) => {
                let (status, kind) = store_status(err);
                (status, kind, err.to_string())
            }
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, "bad_request", message.clone())
            }
        };
        (status, Json(ErrorBody { error: message, kind })).into_response()
    }
}

// ── Handlers ───────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct AdvisoryResponse {
    advisory: CropAdvisory,
    sources: Vec<SourceRef>,
}

/// POST /api/advisory: the full grounded, schema-constrained pipeline.
/// On success a simulated advisory-ready SMS is recorded; its failure does
/// not sour the advisory.
async fn generate_advisory(
    State(state): State<AppState>,
    Json(request): Json<AdvisoryRequest>,
) -> Result<Json<AdvisoryResponse>, ApiError> {
    let generators = state.generators()?;
    let outcome = generators.advisory.generate(&request).await?;

    let message = format!(
        "Krishi GPT: your crop advisory is ready. Recommended crop: {}.",
        outcome.advisory.suggested_crop_for_cultivation
    );
    if let Err(error) = state
        .sms
        .send_sms(&request.phone_number, &message, SmsType::AdvisoryReady)
        .await
    {
        tracing::warn!(%error, "Advisory-ready notification failed");
    }

    Ok(Json(AdvisoryResponse { advisory: outcome.advisory, sources: outcome.sources }))
}

#[derive(Debug, Deserialize)]
struct WeatherQuery {
    location: String,
    #[serde(default)]
    lang: Option<String>,
}

/// GET /api/weather?location=...&lang=..
async fn get_weather(
    State(state): State<AppState>,
    Query(query): Query<WeatherQuery>,
) -> Result<Json<WeatherForecast>, ApiError> {
    if query.location.trim().is_empty() {
        return Err(ApiError::BadRequest("location must not be empty".into()));
    }
    let language = resolve_language(query.lang.as_deref())?;
    let generators = state.generators()?;
    let forecast = generators.weather.forecast(&query.location, language).await?;
    Ok(Json(forecast))
}

#[derive(Debug, Deserialize)]
struct SpeechRequest {
    text: String,
    #[serde(default)]
    lang: Option<String>,
}

#[derive(Debug, Serialize)]
struct SpeechResponse {
    /// Base64-encoded 24 kHz mono PCM
    audio_base64: String,
    mime_type: &'static str,
}

/// POST /api/speech
async fn synthesize_speech(
    State(state): State<AppState>,
    Json(request): Json<SpeechRequest>,
) -> Result<Json<SpeechResponse>, ApiError> {
    if request.text.trim().is_empty() {
        return Err(ApiError::BadRequest("text must not be empty".into()));
    }
    // Unknown locales fall back to the default voice rather than failing.
    let language = request
        .lang
        .as_deref()
        .and_then(Language::from_code)
        .unwrap_or_default();
    let generators = state.generators()?;
    let audio_base64 = generators.speech.speak(&request.text, language).await?;
    Ok(Json(SpeechResponse { audio_base64, mime_type: "audio/pcm;rate=24000" }))
}

fn resolve_language(code: Option<&str>) -> Result<Language, ApiError> {
    match code {
        None => Ok(Language::default()),
        Some(code) => Language::from_code(code)
            .ok_or_else(|| ApiError::BadRequest(format!("unsupported language: {code}"))),
    }
}

// ── Mocked services ────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RegisterRequest {
    name: String,
    phone_number: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    phone_number: String,
    password: String,
}

#[derive(Debug, Serialize)]
struct UserResponse {
    user_id: String,
    name: String,
    phone_number: String,
}

async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .auth
        .register(&request.name, &request.phone_number, &request.password)
        .await?;
    Ok(Json(UserResponse {
        user_id: user.user_id.to_string(),
        name: user.name,
        phone_number: user.phone_number,
    }))
}

async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.auth.login(&request.phone_number, &request.password).await?;
    Ok(Json(UserResponse {
        user_id: user.user_id.to_string(),
        name: user.name,
        phone_number: user.phone_number,
    }))
}

#[derive(Debug, Deserialize)]
struct FeedbackRequest {
    rating: u8,
    #[serde(default)]
    comment: String,
    #[serde(default)]
    phone_number: Option<String>,
}

async fn submit_feedback(
    State(state): State<AppState>,
    Json(request): Json<FeedbackRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let record = state
        .feedback
        .submit(request.rating, &request.comment, request.phone_number.as_deref())
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "feedback_id": record.feedback_id })),
    ))
}

async fn notification_history(
    State(state): State<AppState>,
    Path(phone): Path<String>,
) -> Result<Json<Vec<krishi_store::SmsMessage>>, ApiError> {
    Ok(Json(state.sms.history(&phone).await?))
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_missing_maps_to_503_with_contract_text() {
        let err = GenAiError::CredentialMissing;
        let (status, kind) = genai_status(&err);
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(kind, "credential_missing");
        assert_eq!(err.to_string(), "API_KEY environment variable is not configured");
    }

    #[test]
    fn failure_kinds_map_to_distinct_statuses() {
        assert_eq!(
            genai_status(&GenAiError::RateLimited).0,
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            genai_status(&GenAiError::CredentialInvalid("bad".into())).0,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            genai_status(&GenAiError::EmptyModelResponse).0,
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            genai_status(&GenAiError::MalformedModelOutput("x".into())).0,
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(genai_status(&GenAiError::Timeout).0, StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn unknown_language_is_a_bad_request() {
        assert!(resolve_language(Some("xx")).is_err());
        assert_eq!(resolve_language(Some("hi")).unwrap(), Language::Hindi);
        assert_eq!(resolve_language(None).unwrap(), Language::English);
    }
}
