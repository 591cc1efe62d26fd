use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use serde::Deserialize;
use uuid::Uuid;

use super::ApiResponse;
use crate::db::tag_repo;
use crate::errors::{is_unique_violation, AppError};
use crate::models::{CreateTagInput, CurrentUser, Tag, TagKind};
use crate::AppState;

#[derive(Deserialize)]
pub struct TagQuery {
    pub kind: Option<TagKind>,
}

/// GET /api/tags?kind=pair
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<TagQuery>,
) -> Result<Json<ApiResponse<Vec<Tag>>>, AppError> {
    let tags = tag_repo::list_tags(&state.db, user.id, query.kind).await?;
    Ok(Json(ApiResponse::ok(tags)))
}

/// POST /api/tags
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(body): Json<CreateTagInput>,
) -> Result<Json<ApiResponse<Tag>>, AppError> {
    let name = body.name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("name must not be empty".into()));
    }

    match tag_repo::create_tag(&state.db, user.id, body.kind, name).await {
        Ok(tag) => Ok(Json(ApiResponse::ok(tag))),
        Err(e) if is_unique_violation(&e) => Err(AppError::Conflict(format!(
            "{} tag '{}' already exists",
            body.kind, name
        ))),
        Err(e) => Err(e.into()),
    }
}

/// DELETE /api/tags/:id: detaches the tag from every trade
pub async fn remove(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    if !tag_repo::delete_tag(&state.db, user.id, id).await? {
        return Err(AppError::NotFound("tag not found".into()));
    }

    Ok(Json(ApiResponse::ok(())))
}
