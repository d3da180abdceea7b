//! Categories API endpoints.

use api_types::{
    category::{CategoryNew, CategoryUpdate, CategoryView},
    page::{PageQuery, PageResponse},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{EngineError, ErrorCode};

use crate::{Actor, ServerError, map_page, page_request, server::ServerState};

pub(crate) fn map_category(category: engine::Category) -> CategoryView {
    CategoryView {
        id: category.id,
        name: category.name,
        order: category.order,
        description: category.description,
    }
}

pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PageResponse<CategoryView>>, ServerError> {
    let page = state.engine.list_categories(&page_request(query)).await?;
    Ok(Json(map_page(page, map_category)))
}

pub async fn list_by_order(
    State(state): State<ServerState>,
) -> Result<Json<Vec<CategoryView>>, ServerError> {
    let categories = state
        .engine
        .list_categories_by_order()
        .await?
        .into_iter()
        .map(map_category)
        .collect();
    Ok(Json(categories))
}

pub async fn by_name(
    State(state): State<ServerState>,
    Path(name): Path<String>,
) -> Result<Json<CategoryView>, ServerError> {
    let category = state
        .engine
        .category_by_name(&name)
        .await?
        .ok_or(EngineError::NotFound(ErrorCode::CategoryNotFound))?;
    Ok(Json(map_category(category)))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<CategoryView>, ServerError> {
    let category = state.engine.category(id).await?;
    Ok(Json(map_category(category)))
}

pub async fn create(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Json(payload): Json<CategoryNew>,
) -> Result<(StatusCode, Json<CategoryView>), ServerError> {
    let mut cmd = engine::CategoryNew::new(payload.name);
    if let Some(order) = payload.order {
        cmd = cmd.order(order);
    }
    if let Some(description) = payload.description {
        cmd = cmd.description(description);
    }

    let category = state.engine.create_category(cmd, actor.name()).await?;
    Ok((StatusCode::CREATED, Json(map_category(category))))
}

pub async fn update(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<CategoryUpdate>,
) -> Result<Json<CategoryView>, ServerError> {
    let patch = engine::CategoryPatch {
        name: payload.name,
        order: payload.order,
        description: payload.description,
    };
    let category = state
        .engine
        .update_category(id, patch, actor.name())
        .await?;
    Ok(Json(map_category(category)))
}

pub async fn delete(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_category(id, actor.name()).await?;
    Ok(StatusCode::NO_CONTENT)
}
