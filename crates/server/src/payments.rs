//! Payments API endpoints.

use api_types::{
    page::{PageQuery, PageResponse},
    payment::{DateQuery, PaymentNew, PaymentTotal, PaymentView},
    transaction::DateRangeQuery,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::Money;

use crate::{Actor, ServerError, map_page, page_request, server::ServerState};

fn map_payment(payment: engine::Payment) -> PaymentView {
    PaymentView {
        id: payment.id,
        user_id: payment.user_id,
        amount_minor: payment.amount.cents(),
        date: payment.date,
    }
}

pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PageResponse<PaymentView>>, ServerError> {
    let page = state.engine.list_payments(&page_request(query)).await?;
    Ok(Json(map_page(page, map_payment)))
}

pub async fn by_user(
    State(state): State<ServerState>,
    Path(user_id): Path<i64>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PageResponse<PaymentView>>, ServerError> {
    let page = state
        .engine
        .payments_by_user(user_id, &page_request(query))
        .await?;
    Ok(Json(map_page(page, map_payment)))
}

pub async fn total_by_user(
    State(state): State<ServerState>,
    Path(user_id): Path<i64>,
) -> Result<Json<PaymentTotal>, ServerError> {
    let total = state.engine.total_payment_by_user(user_id).await?;
    Ok(Json(PaymentTotal {
        user_id,
        total_minor: total.cents(),
    }))
}

pub async fn by_date(
    State(state): State<ServerState>,
    Query(date): Query<DateQuery>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PageResponse<PaymentView>>, ServerError> {
    let page = state
        .engine
        .payments_by_date(date.date, &page_request(query))
        .await?;
    Ok(Json(map_page(page, map_payment)))
}

pub async fn by_date_range(
    State(state): State<ServerState>,
    Query(range): Query<DateRangeQuery>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PageResponse<PaymentView>>, ServerError> {
    let page = state
        .engine
        .payments_by_date_range(range.from, range.to, &page_request(query))
        .await?;
    Ok(Json(map_page(page, map_payment)))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<PaymentView>, ServerError> {
    Ok(Json(map_payment(state.engine.payment(id).await?)))
}

pub async fn create(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Json(payload): Json<PaymentNew>,
) -> Result<(StatusCode, Json<PaymentView>), ServerError> {
    let mut cmd = engine::PaymentNew::new(payload.user_id, Money::new(payload.amount_minor));
    if let Some(date) = payload.date {
        cmd = cmd.date(date);
    }

    let payment = state.engine.create_payment(cmd, actor.name()).await?;
    Ok((StatusCode::CREATED, Json(map_payment(payment))))
}

pub async fn delete(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_payment(id, actor.name()).await?;
    Ok(StatusCode::NO_CONTENT)
}
