//! Products API endpoints.

use api_types::{
    page::{PageQuery, PageResponse},
    product::{ProductNameQuery, ProductNew, ProductUpdate, ProductView},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::{
    Actor, ServerError, categories::map_category, map_page, page_request, server::ServerState,
};

fn map_product(product: engine::Product) -> ProductView {
    ProductView {
        id: product.id,
        name: product.name,
        count: product.count,
        category: map_category(product.category),
    }
}

fn map_products(products: Vec<engine::Product>) -> Vec<ProductView> {
    products.into_iter().map(map_product).collect()
}

pub async fn list_page(
    State(state): State<ServerState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PageResponse<ProductView>>, ServerError> {
    let page = state
        .engine
        .list_products_page(&page_request(query))
        .await?;
    Ok(Json(map_page(page, map_product)))
}

pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<ProductView>>, ServerError> {
    Ok(Json(map_products(state.engine.list_products().await?)))
}

pub async fn available(
    State(state): State<ServerState>,
) -> Result<Json<Vec<ProductView>>, ServerError> {
    Ok(Json(map_products(state.engine.available_products().await?)))
}

pub async fn by_name(
    State(state): State<ServerState>,
    Query(query): Query<ProductNameQuery>,
) -> Result<Json<Vec<ProductView>>, ServerError> {
    Ok(Json(map_products(
        state.engine.products_by_name(&query.name).await?,
    )))
}

pub async fn by_category(
    State(state): State<ServerState>,
    Path(category_id): Path<i64>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PageResponse<ProductView>>, ServerError> {
    let page = state
        .engine
        .products_by_category_page(category_id, &page_request(query))
        .await?;
    Ok(Json(map_page(page, map_product)))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<ProductView>, ServerError> {
    Ok(Json(map_product(state.engine.product(id).await?)))
}

pub async fn create(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Json(payload): Json<ProductNew>,
) -> Result<(StatusCode, Json<ProductView>), ServerError> {
    let cmd = engine::ProductNew::new(payload.name, payload.count, payload.category_id);
    let product = state.engine.create_product(cmd, actor.name()).await?;
    Ok((StatusCode::CREATED, Json(map_product(product))))
}

pub async fn update(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<ProductUpdate>,
) -> Result<Json<ProductView>, ServerError> {
    let patch = engine::ProductPatch {
        name: payload.name,
        count: payload.count,
        category_id: payload.category_id,
    };
    let product = state.engine.update_product(id, patch, actor.name()).await?;
    Ok(Json(map_product(product)))
}

pub async fn delete(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_product(id, actor.name()).await?;
    Ok(StatusCode::NO_CONTENT)
}
