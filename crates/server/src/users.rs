//! Users API endpoints.

use api_types::{
    page::{PageQuery, PageResponse},
    user::{Role, UserNew, UserUpdate, UserView},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::Money;

use crate::{Actor, ServerError, map_page, page_request, server::ServerState};

fn map_role(role: engine::Role) -> Role {
    match role {
        engine::Role::User => Role::User,
        engine::Role::Admin => Role::Admin,
    }
}

fn engine_role(role: Role) -> engine::Role {
    match role {
        Role::User => engine::Role::User,
        Role::Admin => engine::Role::Admin,
    }
}

fn map_user(user: engine::User) -> UserView {
    UserView {
        id: user.id,
        username: user.username,
        full_name: user.full_name,
        balance_minor: user.balance.cents(),
        role: map_role(user.role),
    }
}

pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PageResponse<UserView>>, ServerError> {
    let page = state.engine.list_users(&page_request(query)).await?;
    Ok(Json(map_page(page, map_user)))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<UserView>, ServerError> {
    Ok(Json(map_user(state.engine.user(id).await?)))
}

pub async fn create(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Json(payload): Json<UserNew>,
) -> Result<(StatusCode, Json<UserView>), ServerError> {
    let mut cmd = engine::UserNew::new(payload.username)
        .role(engine_role(payload.role.unwrap_or_default()));
    if let Some(full_name) = payload.full_name {
        cmd = cmd.full_name(full_name);
    }
    if let Some(balance) = payload.balance_minor {
        cmd = cmd.balance(Money::new(balance));
    }

    let user = state.engine.create_user(cmd, actor.name()).await?;
    Ok((StatusCode::CREATED, Json(map_user(user))))
}

pub async fn update(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<UserUpdate>,
) -> Result<Json<UserView>, ServerError> {
    let patch = engine::UserPatch {
        username: payload.username,
        full_name: payload.full_name,
        role: payload.role.map(engine_role),
        balance: payload.balance_minor.map(Money::new),
    };
    let user = state.engine.update_user(id, patch, actor.name()).await?;
    Ok(Json(map_user(user)))
}

pub async fn delete(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_user(id, actor.name()).await?;
    Ok(StatusCode::NO_CONTENT)
}
