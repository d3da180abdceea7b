use api_types::{
    error::ErrorBody,
    page::{PageQuery, PageResponse, SortDir},
};
use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::{EngineError, ErrorCode, ErrorKind, Page, PageRequest, SortOrder};

pub use server::{Actor, ServerState, router, run_with_listener};

mod categories;
mod payments;
mod products;
mod server;
mod transaction_items;
mod transactions;
mod users;

pub mod types {
    pub mod page {
        pub use api_types::page::{PageQuery, PageResponse, SortDir};
    }

    pub mod error {
        pub use api_types::error::ErrorBody;
    }

    pub mod category {
        pub use api_types::category::{CategoryNew, CategoryUpdate, CategoryView};
    }

    pub mod product {
        pub use api_types::product::{ProductNameQuery, ProductNew, ProductUpdate, ProductView};
    }

    pub mod user {
        pub use api_types::user::{Role, UserNew, UserUpdate, UserView};
    }

    pub mod transaction {
        pub use api_types::transaction::{
            DateRangeQuery, TransactionItemNew, TransactionItemView, TransactionNew,
            TransactionView,
        };
    }

    pub mod payment {
        pub use api_types::payment::{DateQuery, PaymentNew, PaymentTotal, PaymentView};
    }
}

pub enum ServerError {
    Engine(EngineError),
    Unauthorized(String),
    Generic(String),
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err.kind() {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::AlreadyExists => StatusCode::CONFLICT,
        ErrorKind::InvalidInput => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn message_for_engine_error(err: &EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        EngineError::Internal(detail) => {
            tracing::error!("internal error: {detail}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

fn error_body(code: ErrorCode, error: String, args: Vec<String>) -> ErrorBody {
    ErrorBody {
        code: code.code(),
        key: code.as_str().to_string(),
        error,
        args,
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            ServerError::Engine(err) => (
                status_for_engine_error(&err),
                error_body(err.code(), message_for_engine_error(&err), err.args()),
            ),
            ServerError::Unauthorized(err) => (
                StatusCode::UNAUTHORIZED,
                error_body(ErrorCode::OperationForbidden, err, Vec::new()),
            ),
            ServerError::Generic(err) => (
                StatusCode::BAD_REQUEST,
                error_body(ErrorCode::InvalidInput, err, Vec::new()),
            ),
        };

        (status, Json(body)).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

fn page_request(query: PageQuery) -> PageRequest {
    let default = PageRequest::default();
    let sort = match query.sort.unwrap_or_default() {
        SortDir::Asc => SortOrder::Asc,
        SortDir::Desc => SortOrder::Desc,
    };
    PageRequest::new(
        query.page.unwrap_or(default.page),
        query.size.unwrap_or(default.size),
    )
    .sort(sort)
}

fn map_page<T, U, F>(page: Page<T>, f: F) -> PageResponse<U>
where
    F: FnMut(T) -> U,
{
    let page = page.map(f);
    PageResponse {
        items: page.items,
        page: page.page,
        size: page.size,
        total_items: page.total_items,
        total_pages: page.total_pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_forbidden_maps_to_403() {
        let res = ServerError::from(EngineError::Forbidden {
            code: ErrorCode::UserNotAdmin,
            message: "forbidden".to_string(),
            args: vec!["bob".to_string()],
        })
        .into_response();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn engine_not_found_maps_to_404() {
        let res =
            ServerError::from(EngineError::NotFound(ErrorCode::CategoryNotFound)).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn engine_conflict_maps_to_409() {
        let res = ServerError::from(EngineError::AlreadyExists {
            code: ErrorCode::UserAlreadyExists,
            value: "bob".to_string(),
        })
        .into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn engine_validation_maps_to_422() {
        let res = ServerError::from(EngineError::Invalid {
            code: ErrorCode::InvalidPaymentAmount,
            message: "x".to_string(),
            args: Vec::new(),
        })
        .into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn engine_internal_maps_to_500() {
        let res = ServerError::from(EngineError::Internal("boom".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn page_query_defaults_and_clamps() {
        let request = page_request(PageQuery::default());
        assert_eq!(request, PageRequest::default());

        let request = page_request(PageQuery {
            page: Some(2),
            size: Some(500),
            sort: Some(SortDir::Desc),
        });
        assert_eq!(request.page, 2);
        assert_eq!(request.size, PageRequest::MAX_SIZE);
        assert_eq!(request.sort, SortOrder::Desc);
    }
}
