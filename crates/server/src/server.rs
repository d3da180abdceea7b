use axum::{
    Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::get,
};
use axum_extra::{
    TypedHeader,
    headers::{Error as AxumError, Header},
};

use std::sync::Arc;

use crate::{
    ServerError, categories, payments, products, transaction_items, transactions, users,
};
use engine::{Engine, ErrorKind, SYSTEM_ACTOR, User};

static USER_ID_HEADER: axum::http::HeaderName = axum::http::HeaderName::from_static("x-user-id");

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

/// `TypedHeader` for the acting user
///
/// Requests may carry an "x-user-id" entry with the numeric id of the user
/// performing them.
#[derive(Debug)]
struct UserIdHeader(i64);

impl Header for UserIdHeader {
    fn name() -> &'static axum::http::HeaderName {
        &USER_ID_HEADER
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, AxumError>
    where
        Self: Sized,
        I: Iterator<Item = &'i axum::http::HeaderValue>,
    {
        let value = values.next().ok_or_else(AxumError::invalid)?;
        let Ok(value) = value.to_str() else {
            return Err(AxumError::invalid());
        };
        let Ok(value) = value.trim().parse() else {
            return Err(AxumError::invalid());
        };

        Ok(UserIdHeader(value))
    }

    fn encode<E: Extend<axum::http::HeaderValue>>(&self, values: &mut E) {
        let as_string = self.0.to_string();
        match axum::http::HeaderValue::from_str(&as_string) {
            Ok(value) => values.extend(std::iter::once(value)),
            Err(_) => tracing::error!("failed to encode x-user-id header"),
        }
    }
}

/// Identity a request runs as. Without the header it is the system actor.
#[derive(Clone, Debug)]
pub struct Actor {
    pub user: Option<User>,
}

impl Actor {
    /// Name stamped in the audit columns.
    pub fn name(&self) -> &str {
        self.user
            .as_ref()
            .map_or(SYSTEM_ACTOR, |user| user.username.as_str())
    }

    /// The authenticated user, required by per-user policies.
    pub fn require_user(&self) -> Result<&User, ServerError> {
        self.user
            .as_ref()
            .ok_or_else(|| ServerError::Unauthorized("x-user-id header required".to_string()))
    }
}

async fn actor(
    user_header: Option<TypedHeader<UserIdHeader>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let user = match user_header {
        Some(TypedHeader(UserIdHeader(id))) => match state.engine.user(id).await {
            Ok(user) => Some(user),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::debug!(user_id = id, "unknown x-user-id");
                return Err(ServerError::Unauthorized(format!("unknown user {id}")));
            }
            Err(err) => return Err(ServerError::Engine(err)),
        },
        None => None,
    };

    request.extensions_mut().insert(Actor { user });
    Ok(next.run(request).await)
}

fn api(state: ServerState) -> Router<ServerState> {
    Router::new()
        .route(
            "/categories",
            get(categories::list).post(categories::create),
        )
        .route("/categories/ordered", get(categories::list_by_order))
        .route("/categories/by-name/{name}", get(categories::by_name))
        .route(
            "/categories/{id}",
            get(categories::get)
                .patch(categories::update)
                .delete(categories::delete),
        )
        .route("/products", get(products::list_page).post(products::create))
        .route("/products/all", get(products::list))
        .route("/products/available", get(products::available))
        .route("/products/by-name", get(products::by_name))
        .route(
            "/products/by-category/{category_id}",
            get(products::by_category),
        )
        .route(
            "/products/{id}",
            get(products::get)
                .patch(products::update)
                .delete(products::delete),
        )
        .route("/users", get(users::list).post(users::create))
        .route(
            "/users/{id}",
            get(users::get).patch(users::update).delete(users::delete),
        )
        .route("/users/{id}/transactions", get(transactions::by_user))
        .route("/users/{id}/payments", get(payments::by_user))
        .route("/users/{id}/payments/total", get(payments::total_by_user))
        .route(
            "/transactions",
            get(transactions::list).post(transactions::create),
        )
        .route("/transactions/by-date", get(transactions::by_date_range))
        .route(
            "/transactions/{id}",
            get(transactions::get).delete(transactions::delete),
        )
        .route("/transactions/{id}/items", get(transaction_items::by_transaction))
        .route("/transaction-items", get(transaction_items::list))
        .route("/transaction-items/{id}", get(transaction_items::get))
        .route(
            "/transaction-items/by-product/{product_id}",
            get(transaction_items::by_product),
        )
        .route("/payments", get(payments::list).post(payments::create))
        .route("/payments/by-date", get(payments::by_date))
        .route("/payments/by-date-range", get(payments::by_date_range))
        .route(
            "/payments/{id}",
            get(payments::get).delete(payments::delete),
        )
        .route_layer(middleware::from_fn_with_state(state, actor))
}

/// Full application router, rooted at `/api/v1`.
pub fn router(engine: Arc<Engine>) -> Router {
    let state = ServerState { engine };
    Router::new()
        .nest("/api/v1", api(state.clone()))
        .with_state(state)
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(Arc::new(engine))).await
}
