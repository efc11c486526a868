use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    assignments::{
        dto::{CreateAssignment, UpdateAssignment},
        repo_types::Assignment,
    },
    auth::extractors::CurrentUser,
    error::ApiError,
    extract::Json,
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/assignments", get(list).post(create))
        .route(
            "/assignments/:id",
            get(get_one).put(update).patch(update).delete(delete_one),
        )
}

// Ids come in as strings; anything that is not a uuid can't name a row, so
// it reads as "not found" rather than a syntax error.
fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound("Assignment not found".into()))
}

#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn list(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<Assignment>>, ApiError> {
    let assignments = Assignment::list_by_user(&state.db, user.id).await?;
    Ok(Json(assignments))
}

#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<CreateAssignment>,
) -> Result<(StatusCode, Json<Assignment>), ApiError> {
    if payload.title.trim().is_empty() {
        return Err(ApiError::Validation("Title is required".into()));
    }

    let assignment = Assignment::create(
        &state.db,
        user.id,
        &payload.title,
        payload.description.as_deref(),
        payload.due_date,
    )
    .await?;

    info!(assignment_id = %assignment.id, "assignment created");
    Ok((StatusCode::CREATED, Json(assignment)))
}

#[instrument(skip_all, fields(user_id = %user.id, %id))]
pub async fn get_one(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Assignment>, ApiError> {
    let id = parse_id(&id)?;
    let assignment = Assignment::find_by_id_and_user(&state.db, id, user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Assignment not found".into()))?;
    Ok(Json(assignment))
}

#[instrument(skip_all, fields(user_id = %user.id, %id))]
pub async fn update(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateAssignment>,
) -> Result<Json<Assignment>, ApiError> {
    let id = parse_id(&id)?;
    if matches!(&payload.title, Some(t) if t.trim().is_empty()) {
        return Err(ApiError::Validation("Title is required".into()));
    }

    let updated = Assignment::update(&state.db, id, user.id, &payload.into_patch())
        .await?
        .ok_or_else(|| ApiError::NotFound("Assignment not found".into()))?;

    info!(assignment_id = %updated.id, "assignment updated");
    Ok(Json(updated))
}

#[instrument(skip_all, fields(user_id = %user.id, %id))]
pub async fn delete_one(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    if !Assignment::delete(&state.db, id, user.id).await? {
        return Err(ApiError::NotFound("Assignment not found".into()));
    }

    info!(assignment_id = %id, "assignment deleted");
    Ok(StatusCode::NO_CONTENT)
}
