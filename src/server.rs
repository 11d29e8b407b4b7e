//! HTTP server.
//!
//! Serves the login/registration flow and the flower search endpoint. The
//! search and index routes require a session; without one they redirect to
//! `/login`.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Health check (returns version) |
//! | `GET`  | `/login` | Login form |
//! | `POST` | `/login` | Log in (`email`, `password` form fields) |
//! | `GET`  | `/register` | Registration form |
//! | `POST` | `/register` | Create an account (`name`, `email`, `password`) |
//! | `GET`  | `/logout` | End the session |
//! | `GET`  | `/` | Current user (session required) |
//! | `POST` | `/search` | Search for a flower (`query` form field, session required) |
//!
//! # Error Contract
//!
//! Search errors are JSON:
//!
//! ```json
//! { "error": { "code": "not_relevant", "message": "No flower found matching \"xyzabc\"" },
//!   "suggestions": ["jazmín", "orquídea", "rosa"] }
//! ```
//!
//! Error codes: `bad_request` (400), `not_relevant` (400), `not_found` (404),
//! `internal` (500). Form routes report errors by redirecting back to the
//! form with `?error={code}`.

use axum::{
    extract::{FromRequestParts, State},
    http::{
        header::{COOKIE, SET_COOKIE},
        request::Parts,
        HeaderMap, StatusCode,
    },
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::any::Any;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as AnyOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::aggregate::{panic_message, Aggregator};
use crate::auth::{self, AuthError};
use crate::config::{Config, DEV_SECRET_KEY};
use crate::db;
use crate::migrate;
use crate::models::{CompositeResult, User};
use crate::search::{search_flowers, SearchError};
use crate::traits::SourceSet;

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
struct AppState {
    config: Arc<Config>,
    pool: SqlitePool,
    aggregator: Aggregator,
    /// Cookie signing key.
    secret: Arc<str>,
}

/// Starts the HTTP server with the HTTP-backed sources from `config`.
///
/// Binds to `[server].bind`, applies migrations, and runs until the
/// process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    run_server_with_sources(config, SourceSet::from_config(config)?).await
}

/// Like [`run_server`], but searches the given sources.
pub async fn run_server_with_sources(config: &Config, sources: SourceSet) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();

    let pool = db::connect(config).await?;
    migrate::apply(&pool).await?;

    let purged = auth::purge_expired_sessions(&pool).await?;
    if purged > 0 {
        tracing::info!(purged, "removed expired sessions");
    }

    let secret = match config.auth.resolve_secret() {
        Some(secret) => secret,
        None => {
            tracing::warn!(
                env = %config.auth.secret_key_env,
                "no secret key configured, using the development key"
            );
            DEV_SECRET_KEY.to_string()
        }
    };

    let state = AppState {
        aggregator: Aggregator::new(sources, &config.search),
        config: Arc::new(config.clone()),
        pool,
        secret: Arc::from(secret),
    };

    let cors = CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods(AnyOrigin)
        .allow_headers(AnyOrigin);

    let app = Router::new()
        .route("/", get(handle_index))
        .route("/search", post(handle_search))
        .route("/login", get(handle_login_form).post(handle_login))
        .route("/register", get(handle_register_form).post(handle_register))
        .route("/logout", get(handle_logout))
        .route("/health", get(handle_health))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    println!("BloomHub server listening on http://{}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
    #[serde(skip_serializing_if = "Option::is_none")]
    suggestions: Option<Vec<String>>,
}

#[derive(Serialize)]
struct ErrorDetail {
    /// Machine-readable error code (e.g., `"bad_request"`, `"not_found"`).
    code: String,
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
struct AppError {
    status: StatusCode,
    code: String,
    message: String,
    suggestions: Option<Vec<String>>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
            suggestions: self.suggestions,
        };
        (self.status, Json(body)).into_response()
    }
}

/// Constructs a 400 Bad Request error.
fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
        suggestions: None,
    }
}

/// Constructs a 404 Not Found error.
fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        code: "not_found".to_string(),
        message: message.into(),
        suggestions: None,
    }
}

/// Constructs the generic 500 error. Details go to the log only.
fn internal_error() -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal".to_string(),
        message: "An error occurred while searching for flower information".to_string(),
        suggestions: None,
    }
}

impl From<SearchError> for AppError {
    fn from(err: SearchError) -> Self {
        let message = err.to_string();
        match err {
            SearchError::QueryTooShort { .. } => AppError {
                suggestions: Some(Vec::new()),
                ..bad_request(message)
            },
            SearchError::NotRelevant { suggestions, .. } => AppError {
                code: "not_relevant".to_string(),
                suggestions: Some(suggestions),
                ..bad_request(message)
            },
            SearchError::NotFound { suggestions } => AppError {
                suggestions: Some(suggestions),
                ..not_found(message)
            },
            SearchError::Internal(e) => {
                tracing::error!(error = %e, "search failed");
                internal_error()
            }
        }
    }
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic_message(&*err);
    tracing::error!(panic = %detail, "request handler panicked");
    internal_error().into_response()
}

// ============ Sessions ============

/// The logged-in user. Rejects with a redirect to `/login`.
struct CurrentUser(User);

fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

fn session_token(headers: &HeaderMap, state: &AppState) -> Option<String> {
    let cookie = cookie_value(headers, &state.config.auth.cookie_name)?;
    auth::verify_signed_token(&state.secret, cookie)
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(token) = session_token(&parts.headers, state) else {
            return Err(Redirect::to("/login").into_response());
        };

        match auth::find_session_user(&state.pool, &token).await {
            Ok(Some(user)) => Ok(CurrentUser(user)),
            Ok(None) => Err(Redirect::to("/login").into_response()),
            Err(e) => {
                tracing::error!(error = %e, "session lookup failed");
                Err(internal_error().into_response())
            }
        }
    }
}

fn session_cookie(state: &AppState, value: &str, max_age: i64) -> String {
    let secure = if state.config.auth.secure_cookie {
        "; Secure"
    } else {
        ""
    };
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}{}",
        state.config.auth.cookie_name, value, max_age, secure
    )
}

// ============ GET /health ============

/// JSON response body for `GET /health`.
#[derive(Serialize)]
struct HealthResponse {
    /// Always `"ok"` when the server is running.
    status: String,
    /// The crate version from `Cargo.toml`.
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ GET / ============

#[derive(Serialize)]
struct IndexResponse {
    user: String,
}

async fn handle_index(CurrentUser(user): CurrentUser) -> Json<IndexResponse> {
    Json(IndexResponse { user: user.name })
}

// ============ POST /search ============

#[derive(Deserialize)]
struct SearchForm {
    #[serde(default)]
    query: String,
}

async fn handle_search(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Form(form): Form<SearchForm>,
) -> Result<Json<CompositeResult>, AppError> {
    tracing::debug!(user = user.id, query = %form.query, "search request");
    let result = search_flowers(&state.aggregator, &state.config.search, &form.query).await?;
    Ok(Json(result))
}

// ============ /login ============

const LOGIN_PAGE: &str = r#"<!doctype html>
<html lang="es">
<head><meta charset="utf-8"><title>BloomHub · Iniciar sesión</title></head>
<body>
  <h1>BloomHub</h1>
  <form method="post" action="/login">
    <label>Correo <input type="email" name="email" required></label>
    <label>Contraseña <input type="password" name="password" required></label>
    <button type="submit">Entrar</button>
  </form>
  <p><a href="/register">Crear una cuenta</a></p>
</body>
</html>
"#;

#[derive(Deserialize)]
struct LoginForm {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

async fn handle_login_form() -> Html<&'static str> {
    Html(LOGIN_PAGE)
}

async fn handle_login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    let user = match auth::verify_credentials(&state.pool, &form.email, &form.password).await {
        Ok(user) => user,
        Err(AuthError::Internal(e)) => {
            tracing::error!(error = %e, "login failed");
            return Redirect::to("/login?error=internal").into_response();
        }
        Err(e) => {
            tracing::info!(code = e.code(), "login rejected");
            return Redirect::to(&format!("/login?error={}", e.code())).into_response();
        }
    };

    let signed = match auth::create_session(&state.pool, user.id, state.config.auth.session_ttl())
        .await
        .and_then(|token| auth::sign_token(&state.secret, &token))
    {
        Ok(signed) => signed,
        Err(e) => {
            tracing::error!(error = %e, "could not open session");
            return Redirect::to("/login?error=internal").into_response();
        }
    };

    tracing::info!(user = user.id, "user logged in");
    let max_age = state.config.auth.session_ttl().num_seconds();
    (
        [(SET_COOKIE, session_cookie(&state, &signed, max_age))],
        Redirect::to("/"),
    )
        .into_response()
}

// ============ /register ============

const REGISTER_PAGE: &str = r#"<!doctype html>
<html lang="es">
<head><meta charset="utf-8"><title>BloomHub · Registro</title></head>
<body>
  <h1>Crear cuenta</h1>
  <form method="post" action="/register">
    <label>Nombre <input type="text" name="name" required></label>
    <label>Correo <input type="email" name="email" required></label>
    <label>Contraseña <input type="password" name="password" required></label>
    <button type="submit">Registrarse</button>
  </form>
  <p><a href="/login">Ya tengo cuenta</a></p>
</body>
</html>
"#;

#[derive(Deserialize)]
struct RegisterForm {
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

async fn handle_register_form() -> Html<&'static str> {
    Html(REGISTER_PAGE)
}

async fn handle_register(State(state): State<AppState>, Form(form): Form<RegisterForm>) -> Redirect {
    let registered = auth::register_user(
        &state.pool,
        &form.name,
        &form.email,
        &form.password,
        state.config.auth.bcrypt_cost,
    )
    .await;

    match registered {
        Ok(user) => {
            tracing::info!(user = user.id, "user registered");
            Redirect::to("/login?registered=1")
        }
        Err(e) => {
            if let AuthError::Internal(inner) = &e {
                tracing::error!(error = %inner, "registration failed");
            }
            Redirect::to(&format!("/register?error={}", e.code()))
        }
    }
}

// ============ GET /logout ============

async fn handle_logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = session_token(&headers, &state) {
        if let Err(e) = auth::delete_session(&state.pool, &token).await {
            tracing::error!(error = %e, "could not delete session");
        }
    }

    (
        [(SET_COOKIE, session_cookie(&state, "", 0))],
        Redirect::to("/login"),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    async fn read_body(response: Response) -> (StatusCode, String) {
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_panic_becomes_generic_500() {
        let (status, text) = read_body(handle_panic(Box::new("secret detail"))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!text.contains("secret detail"), "body leaked: {}", text);

        let body: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(body["error"]["code"], "internal");
        assert!(body.get("suggestions").is_none());
    }

    #[tokio::test]
    async fn test_owned_panic_payload_not_leaked() {
        let payload = Box::new(String::from("db password is hunter2"));
        let (status, text) = read_body(handle_panic(payload)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!text.contains("hunter2"));
    }

    #[tokio::test]
    async fn test_internal_search_error_hides_cause() {
        let err = SearchError::Internal(anyhow::anyhow!("orchestration panicked: index 7"));
        let (status, text) = read_body(AppError::from(err).into_response()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!text.contains("index 7"));

        let body: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(body["error"]["code"], "internal");
        assert_eq!(
            body["error"]["message"],
            "An error occurred while searching for flower information"
        );
    }

    #[tokio::test]
    async fn test_search_errors_map_to_status_and_code() {
        let not_relevant = SearchError::NotRelevant {
            query: "xyzabc".into(),
            suggestions: vec!["rosa".into()],
        };
        let (status, text) = read_body(AppError::from(not_relevant).into_response()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(body["error"]["code"], "not_relevant");
        assert_eq!(body["suggestions"], serde_json::json!(["rosa"]));

        let not_found = SearchError::NotFound {
            suggestions: vec!["peonía".into()],
        };
        let (status, _) = read_body(AppError::from(not_found).into_response()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, text) =
            read_body(AppError::from(SearchError::QueryTooShort { min: 2 }).into_response()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(body["error"]["code"], "bad_request");
        assert_eq!(body["suggestions"], serde_json::json!([]));
    }
}
