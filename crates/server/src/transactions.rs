//! Transactions (sales) API endpoints.

use api_types::{
    page::{PageQuery, PageResponse},
    transaction::{DateRangeQuery, TransactionNew, TransactionView},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{Money, TransactionItemNew};

use crate::{
    Actor, ServerError, map_page, page_request, server::ServerState,
    transaction_items::map_item,
};

fn map_transaction(tx: engine::Transaction) -> TransactionView {
    TransactionView {
        id: tx.id,
        user_id: tx.user_id,
        total_amount_minor: tx.total_amount.cents(),
        date: tx.date,
        items: tx.items.into_iter().map(map_item).collect(),
    }
}

/// Every sale in the shop; the `x-user-id` caller must be an ADMIN.
pub async fn list(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PageResponse<TransactionView>>, ServerError> {
    let caller = actor.require_user()?;
    let page = state
        .engine
        .list_transactions(caller.id, &page_request(query))
        .await?;
    Ok(Json(map_page(page, map_transaction)))
}

/// Sales of one user. The caller is the `x-user-id` user: listing someone
/// else's sales needs the ADMIN role.
pub async fn by_user(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Path(user_id): Path<i64>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PageResponse<TransactionView>>, ServerError> {
    let caller = actor.require_user()?;
    let page = state
        .engine
        .list_transactions_by_user(caller.id, user_id, &page_request(query))
        .await?;
    Ok(Json(map_page(page, map_transaction)))
}

pub async fn by_date_range(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Query(range): Query<DateRangeQuery>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PageResponse<TransactionView>>, ServerError> {
    let caller = actor.require_user()?;
    let page = state
        .engine
        .list_transactions_by_date_range(caller.id, range.from, range.to, &page_request(query))
        .await?;
    Ok(Json(map_page(page, map_transaction)))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<TransactionView>, ServerError> {
    Ok(Json(map_transaction(state.engine.transaction(id).await?)))
}

pub async fn create(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Json(payload): Json<TransactionNew>,
) -> Result<(StatusCode, Json<TransactionView>), ServerError> {
    let mut cmd = engine::TransactionNew::new(payload.user_id).items(
        payload.items.into_iter().map(|item| {
            TransactionItemNew::new(item.product_id, item.count, Money::new(item.amount_minor))
        }),
    );
    if let Some(date) = payload.date {
        cmd = cmd.date(date);
    }

    let tx = state.engine.create_transaction(cmd, actor.name()).await?;
    Ok((StatusCode::CREATED, Json(map_transaction(tx))))
}

pub async fn delete(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_transaction(id, actor.name()).await?;
    Ok(StatusCode::NO_CONTENT)
}
