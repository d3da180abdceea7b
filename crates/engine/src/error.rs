//! The module contains the errors the engine can throw.
//!
//! Every domain error carries an [`ErrorCode`]: a stable numeric code plus
//! the arguments a boundary layer needs to render a localized message.
//! The errors fall in five kinds (see [`ErrorKind`]):
//!
//! - [`NotFound`] thrown when an entity is missing or soft-deleted.
//! - [`AlreadyExists`] thrown on a duplicate category name or username.
//! - [`Invalid`] thrown on bad counts, amounts, dates or blank fields.
//! - [`Forbidden`] thrown when a non-admin asks for an admin-only read.
//! - [`Internal`] and [`Database`] for everything unexpected.
//!
//!  [`NotFound`]: EngineError::NotFound
//!  [`AlreadyExists`]: EngineError::AlreadyExists
//!  [`Invalid`]: EngineError::Invalid
//!  [`Forbidden`]: EngineError::Forbidden
//!  [`Internal`]: EngineError::Internal
//!  [`Database`]: EngineError::Database
use std::fmt;

use sea_orm::DbErr;
use thiserror::Error;

use crate::Money;

/// Coarse error family, used by the boundary layer to pick a status code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    InvalidInput,
    Forbidden,
    Internal,
}

/// Stable error codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    CategoryNotFound,
    CategoryAlreadyExists,
    CategoryInUse,

    ProductNotFound,
    InsufficientProductCount,
    InvalidProductCount,

    UserNotFound,
    UserAlreadyExists,
    InvalidUsername,
    InsufficientUserBalance,
    UserNotAdmin,

    TransactionNotFound,
    InvalidTransactionAmount,
    TransactionItemNotFound,
    InvalidTransactionDate,

    PaymentTransactionNotFound,
    InvalidPaymentAmount,
    InvalidPaymentDate,

    InvalidInput,
    OperationForbidden,
    InternalServerError,
}

impl ErrorCode {
    /// Numeric code exposed to clients.
    #[must_use]
    pub const fn code(self) -> u16 {
        match self {
            Self::CategoryNotFound => 1001,
            Self::CategoryAlreadyExists => 1002,
            Self::CategoryInUse => 1003,
            Self::ProductNotFound => 1101,
            Self::InsufficientProductCount => 1103,
            Self::InvalidProductCount => 1104,
            Self::UserNotFound => 1201,
            Self::UserAlreadyExists => 1202,
            Self::InvalidUsername => 1203,
            Self::InsufficientUserBalance => 1204,
            Self::UserNotAdmin => 1205,
            Self::TransactionNotFound => 1301,
            Self::InvalidTransactionAmount => 1302,
            Self::TransactionItemNotFound => 1303,
            Self::InvalidTransactionDate => 1304,
            Self::PaymentTransactionNotFound => 1401,
            Self::InvalidPaymentAmount => 1402,
            Self::InvalidPaymentDate => 1404,
            Self::InvalidInput => 1501,
            Self::OperationForbidden => 1502,
            Self::InternalServerError => 1503,
        }
    }

    /// Message key, also used as the display form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CategoryNotFound => "CATEGORY_NOT_FOUND",
            Self::CategoryAlreadyExists => "CATEGORY_ALREADY_EXISTS",
            Self::CategoryInUse => "CATEGORY_IN_USE",
            Self::ProductNotFound => "PRODUCT_NOT_FOUND",
            Self::InsufficientProductCount => "INSUFFICIENT_PRODUCT_COUNT",
            Self::InvalidProductCount => "INVALID_PRODUCT_COUNT",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::UserAlreadyExists => "USER_ALREADY_EXISTS",
            Self::InvalidUsername => "INVALID_USERNAME",
            Self::InsufficientUserBalance => "INSUFFICIENT_USER_BALANCE",
            Self::UserNotAdmin => "USER_NOT_ADMIN",
            Self::TransactionNotFound => "TRANSACTION_NOT_FOUND",
            Self::InvalidTransactionAmount => "INVALID_TRANSACTION_AMOUNT",
            Self::TransactionItemNotFound => "TRANSACTION_ITEM_NOT_FOUND",
            Self::InvalidTransactionDate => "INVALID_TRANSACTION_DATE",
            Self::PaymentTransactionNotFound => "PAYMENT_TRANSACTION_NOT_FOUND",
            Self::InvalidPaymentAmount => "INVALID_PAYMENT_AMOUNT",
            Self::InvalidPaymentDate => "INVALID_PAYMENT_DATE",
            Self::InvalidInput => "INVALID_INPUT",
            Self::OperationForbidden => "OPERATION_FORBIDDEN",
            Self::InternalServerError => "INTERNAL_SERVER_ERROR",
        }
    }

    /// Human name of the entity a `*_NOT_FOUND` code refers to.
    fn subject(self) -> &'static str {
        match self {
            Self::CategoryNotFound => "category",
            Self::ProductNotFound => "product",
            Self::UserNotFound => "user",
            Self::TransactionNotFound => "transaction",
            Self::TransactionItemNotFound => "transaction item",
            Self::PaymentTransactionNotFound => "payment transaction",
            _ => "item",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("{} not found!", .0.subject())]
    NotFound(ErrorCode),
    #[error("\"{value}\" already present!")]
    AlreadyExists { code: ErrorCode, value: String },
    #[error("{message}")]
    Invalid {
        code: ErrorCode,
        message: String,
        args: Vec<String>,
    },
    #[error("{message}")]
    Forbidden {
        code: ErrorCode,
        message: String,
        args: Vec<String>,
    },
    #[error("internal error: {0}")]
    Internal(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    /// The stable code of this error.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound(code) => *code,
            Self::AlreadyExists { code, .. }
            | Self::Invalid { code, .. }
            | Self::Forbidden { code, .. } => *code,
            Self::Internal(_) | Self::Database(_) => ErrorCode::InternalServerError,
        }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            Self::Invalid { .. } => ErrorKind::InvalidInput,
            Self::Forbidden { .. } => ErrorKind::Forbidden,
            Self::Internal(_) | Self::Database(_) => ErrorKind::Internal,
        }
    }

    /// Message arguments, in the order a localized template expects them.
    ///
    /// Internal errors never expose their detail.
    #[must_use]
    pub fn args(&self) -> Vec<String> {
        match self {
            Self::NotFound(_) | Self::Internal(_) | Self::Database(_) => Vec::new(),
            Self::AlreadyExists { value, .. } => vec![value.clone()],
            Self::Invalid { args, .. } | Self::Forbidden { args, .. } => args.clone(),
        }
    }

    pub(crate) fn category_exists(name: &str) -> Self {
        Self::AlreadyExists {
            code: ErrorCode::CategoryAlreadyExists,
            value: name.to_string(),
        }
    }

    pub(crate) fn category_in_use(name: &str) -> Self {
        Self::Invalid {
            code: ErrorCode::CategoryInUse,
            message: format!("category \"{name}\" is still in use"),
            args: vec![name.to_string()],
        }
    }

    pub(crate) fn user_exists(username: &str) -> Self {
        Self::AlreadyExists {
            code: ErrorCode::UserAlreadyExists,
            value: username.to_string(),
        }
    }

    pub(crate) fn insufficient_user_balance(username: &str, balance: Money, amount: Money) -> Self {
        Self::Invalid {
            code: ErrorCode::InsufficientUserBalance,
            message: format!("user \"{username}\": balance {balance} is below {amount}"),
            args: vec![username.to_string(), balance.to_string(), amount.to_string()],
        }
    }

    pub(crate) fn user_not_admin(username: &str) -> Self {
        Self::Forbidden {
            code: ErrorCode::UserNotAdmin,
            message: format!("user \"{username}\" does not have admin privileges"),
            args: vec![username.to_string()],
        }
    }

    pub(crate) fn invalid_product_count(count: i64) -> Self {
        Self::Invalid {
            code: ErrorCode::InvalidProductCount,
            message: format!("invalid product count: {count}"),
            args: vec![count.to_string()],
        }
    }

    pub(crate) fn insufficient_product_count(name: &str, requested: i64, available: i64) -> Self {
        Self::Invalid {
            code: ErrorCode::InsufficientProductCount,
            message: format!(
                "product \"{name}\": requested {requested}, available {available}"
            ),
            args: vec![
                name.to_string(),
                requested.to_string(),
                available.to_string(),
            ],
        }
    }

    pub(crate) fn invalid_transaction_amount(amount: Money) -> Self {
        Self::Invalid {
            code: ErrorCode::InvalidTransactionAmount,
            message: format!("invalid transaction amount: {amount}"),
            args: vec![amount.to_string()],
        }
    }

    pub(crate) fn invalid_payment_amount(amount: Money) -> Self {
        Self::Invalid {
            code: ErrorCode::InvalidPaymentAmount,
            message: format!("invalid payment amount: {amount}"),
            args: vec![amount.to_string()],
        }
    }

    pub(crate) fn invalid_date_range(code: ErrorCode, from: &str, to: &str) -> Self {
        Self::Invalid {
            code,
            message: format!("invalid date range: {from} is after {to}"),
            args: vec![from.to_string(), to.to_string()],
        }
    }

    pub(crate) fn invalid_input(field: &str, reason: &str) -> Self {
        Self::Invalid {
            code: ErrorCode::InvalidInput,
            message: format!("invalid input for field {field}: {reason}"),
            args: vec![field.to_string(), reason.to_string()],
        }
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (
                Self::AlreadyExists { code: a, value: va },
                Self::AlreadyExists { code: b, value: vb },
            ) => a == b && va == vb,
            (
                Self::Invalid {
                    code: a, args: aa, ..
                },
                Self::Invalid {
                    code: b, args: ab, ..
                },
            ) => a == b && aa == ab,
            (
                Self::Forbidden {
                    code: a, args: aa, ..
                },
                Self::Forbidden {
                    code: b, args: ab, ..
                },
            ) => a == b && aa == ab,
            (Self::Internal(a), Self::Internal(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_keeps_code_and_hides_args() {
        let err = EngineError::NotFound(ErrorCode::ProductNotFound);
        assert_eq!(err.code().code(), 1101);
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err.args().is_empty());
        assert_eq!(err.to_string(), "product not found!");
    }

    #[test]
    fn insufficient_stock_carries_requested_and_available() {
        let err = EngineError::insufficient_product_count("Apple", 12, 10);
        assert_eq!(err.code(), ErrorCode::InsufficientProductCount);
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(err.args(), vec!["Apple", "12", "10"]);
    }

    #[test]
    fn database_errors_are_internal() {
        let err = EngineError::from(DbErr::Custom("boom".to_string()));
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(err.code(), ErrorCode::InternalServerError);
        assert!(err.args().is_empty());
    }

    #[test]
    fn codes_render_as_message_keys() {
        assert_eq!(ErrorCode::UserNotAdmin.to_string(), "USER_NOT_ADMIN");
        assert_eq!(ErrorCode::CategoryAlreadyExists.code(), 1002);
        assert_eq!(ErrorCode::InsufficientUserBalance.code(), 1204);
        assert_eq!(
            ErrorCode::InsufficientUserBalance.to_string(),
            "INSUFFICIENT_USER_BALANCE"
        );
    }
}
