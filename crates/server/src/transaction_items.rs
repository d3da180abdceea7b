//! Transaction items API endpoints (read only).

use api_types::{
    page::{PageQuery, PageResponse},
    transaction::TransactionItemView,
};
use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::{ServerError, map_page, page_request, server::ServerState};

pub(crate) fn map_item(item: engine::TransactionItem) -> TransactionItemView {
    TransactionItemView {
        id: item.id,
        transaction_id: item.transaction_id,
        product_id: item.product_id,
        count: item.count,
        amount_minor: item.amount.cents(),
        total_amount_minor: item.total_amount.cents(),
    }
}

pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PageResponse<TransactionItemView>>, ServerError> {
    let page = state
        .engine
        .list_transaction_items(&page_request(query))
        .await?;
    Ok(Json(map_page(page, map_item)))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<TransactionItemView>, ServerError> {
    Ok(Json(map_item(state.engine.transaction_item(id).await?)))
}

pub async fn by_transaction(
    State(state): State<ServerState>,
    Path(transaction_id): Path<i64>,
) -> Result<Json<Vec<TransactionItemView>>, ServerError> {
    let items = state
        .engine
        .transaction_items_by_transaction(transaction_id)
        .await?
        .into_iter()
        .map(map_item)
        .collect();
    Ok(Json(items))
}

pub async fn by_product(
    State(state): State<ServerState>,
    Path(product_id): Path<i64>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PageResponse<TransactionItemView>>, ServerError> {
    let page = state
        .engine
        .transaction_items_by_product(product_id, &page_request(query))
        .await?;
    Ok(Json(map_page(page, map_item)))
}
