use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, PathRejection},
        Path, State,
    },
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN,
        },
        HeaderName, HeaderValue, Method, StatusCode,
    },
    response::{IntoResponse, Response},
    routing::{get, MethodRouter},
    Router,
};
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::{info, instrument, warn};

use crate::{
    error::ApiError,
    response::{ApiResponse, Payload},
    state::AppState,
    users::{dto::UserInput, repo},
};

pub const USERS_PREFIX: &str = "/api/users";

const CORS_HEADERS: [(HeaderName, &str); 3] = [
    (ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
    (ACCESS_CONTROL_ALLOW_METHODS, "GET, POST, PUT, DELETE, OPTIONS"),
    (ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"),
];

// --- public router ---

pub fn user_routes() -> Router<AppState> {
    let collection: MethodRouter<AppState> = get(list_users)
        .post(create_user)
        .options(preflight)
        .fallback(method_not_allowed);
    let item: MethodRouter<AppState> = get(get_user)
        .put(update_user)
        .delete(delete_user)
        .options(preflight)
        .fallback(method_not_allowed);

    let mut router = Router::new()
        .route("/api/users", collection.clone())
        .route("/api/users/", collection)
        .route("/api/users/:id", item);
    for (name, value) in CORS_HEADERS {
        router = router.layer(SetResponseHeaderLayer::overriding(
            name,
            HeaderValue::from_static(value),
        ));
    }
    router
}

/// Whether `path` lies under the users prefix, routed or not.
pub fn owns_path(path: &str) -> bool {
    path.strip_prefix(USERS_PREFIX)
        .is_some_and(|rest| rest.starts_with('/'))
}

/// Answer for a path under the prefix that no route matched, e.g.
/// `/api/users/1/x`: the trailing segments can't be a user id.
pub fn unmatched_subpath(method: Method) -> Response {
    let cors = CORS_HEADERS.map(|(name, value)| (name, HeaderValue::from_static(value)));
    if method == Method::OPTIONS {
        return (cors, StatusCode::OK).into_response();
    }
    warn!(%method, "unroutable users subpath");
    (cors, ApiError::InvalidInput("invalid user id")).into_response()
}

// --- handlers ---

#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> Result<ApiResponse, ApiError> {
    let users = repo::list_all(&state.db).await?;
    Ok(ApiResponse::ok("users fetched", Payload::Users(users)))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    raw_id: Result<Path<String>, PathRejection>,
) -> Result<ApiResponse, ApiError> {
    let id = path_id(raw_id)?;
    let user = repo::get_by_id(&state.db, id).await?;
    Ok(ApiResponse::ok("user fetched", Payload::User(user)))
}

/// POST /api/users { name, email, age }
#[instrument(skip(state, body))]
pub async fn create_user(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<ApiResponse, ApiError> {
    let input = decode_input(body)?;
    let user = repo::create(&state.db, &input).await?;
    info!(user_id = user.id, "user created");
    Ok(ApiResponse::new(
        StatusCode::CREATED,
        "user created",
        Payload::User(user),
    ))
}

/// PUT /api/users/{id} { name, email, age }
#[instrument(skip(state, body))]
pub async fn update_user(
    State(state): State<AppState>,
    raw_id: Result<Path<String>, PathRejection>,
    body: Result<Bytes, BytesRejection>,
) -> Result<ApiResponse, ApiError> {
    let id = path_id(raw_id)?;
    let input = decode_input(body)?;
    let user = repo::update(&state.db, id, &input).await?;
    info!(user_id = user.id, "user updated");
    Ok(ApiResponse::ok("user updated", Payload::User(user)))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    raw_id: Result<Path<String>, PathRejection>,
) -> Result<ApiResponse, ApiError> {
    let id = path_id(raw_id)?;
    repo::delete(&state.db, id).await?;
    info!(user_id = id, "user deleted");
    Ok(ApiResponse::ok("user deleted", Payload::None))
}

/// Cross-origin preflight: headers only, no body.
async fn preflight() -> StatusCode {
    StatusCode::OK
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

fn path_id(raw: Result<Path<String>, PathRejection>) -> Result<i64, ApiError> {
    match raw {
        Ok(Path(raw)) => parse_id(&raw),
        Err(e) => {
            warn!(error = %e, "user id segment rejected");
            Err(ApiError::InvalidInput("invalid user id"))
        }
    }
}

fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| {
            warn!(id = raw, "invalid user id");
            ApiError::InvalidInput("invalid user id")
        })
}

fn decode_input(body: Result<Bytes, BytesRejection>) -> Result<UserInput, ApiError> {
    let body = body.map_err(|e| {
        warn!(error = %e, "request body rejected");
        ApiError::InvalidInput("malformed request body")
    })?;
    let input: UserInput = serde_json::from_slice(&body).map_err(|e| {
        warn!(error = %e, "malformed request body");
        ApiError::InvalidInput("malformed request body")
    })?;
    input.validate().map_err(|msg| {
        warn!("user payload failed validation");
        ApiError::InvalidInput(msg)
    })?;
    Ok(input)
}
