use axum::{extract::State, http::StatusCode, routing::post, Router};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, LoginResponse, PublicUser, RegisterRequest, RegisteredResponse},
        password::{hash_password, verify_password},
        repo_types::User,
        token,
    },
    error::ApiError,
    extract::Json,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisteredResponse>), ApiError> {
    // Pre-check for a friendly conflict; the unique index still backs this
    // up when two registrations race.
    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::Conflict("User already exists".into()));
    }

    let hash = hash_password(&payload.password)?;
    let user = User::create(&state.db, &payload.email, &hash)
        .await
        .map_err(|e| {
            if matches!(&e, sqlx::Error::Database(db) if db.is_unique_violation()) {
                ApiError::Conflict("User already exists".into())
            } else {
                ApiError::from(e)
            }
        })?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(RegisteredResponse {
            message: "User registered successfully".into(),
            user: PublicUser::from(&user),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    // Unknown email and wrong password answer identically so the endpoint
    // cannot be used to probe for accounts.
    let Some(user) = User::find_by_email(&state.db, &payload.email).await? else {
        warn!(email = %payload.email, "login with unknown email");
        return Err(ApiError::Unauthorized("Invalid credentials".into()));
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login with wrong password");
        return Err(ApiError::Unauthorized("Invalid credentials".into()));
    }

    let token = token::issue(user.id);
    info!(user_id = %user.id, "user logged in");
    Ok(Json(LoginResponse {
        token_type: "bearer".into(),
        token,
        user: PublicUser::from(&user),
    }))
}
