//! Back-office engine for a small shop.
//!
//! The [`Engine`] owns the database connection and exposes the services:
//! categories, products, users, sales ([`Transaction`]) and payments. Every
//! table goes through the soft-delete aware [`repository::Repository`], so
//! trashed rows never show up in regular reads.

pub use categories::Category;
pub use commands::{
    CategoryNew, CategoryPatch, PaymentNew, ProductNew, ProductPatch, TransactionItemNew,
    TransactionNew, UserNew, UserPatch,
};
pub use error::{EngineError, ErrorCode, ErrorKind};
pub use money::Money;
pub use ops::{Engine, EngineBuilder, MIN_PAYMENT_AMOUNT};
pub use payment_transactions::Payment;
pub use products::Product;
pub use repository::{Page, PageRequest, SortOrder};
pub use transaction_items::TransactionItem;
pub use transactions::Transaction;
pub use users::{Role, User};

mod categories;
mod commands;
mod error;
mod money;
mod ops;
mod payment_transactions;
mod products;
pub mod repository;
mod transaction_items;
mod transactions;
mod users;
mod util;

pub type ResultEngine<T> = Result<T, EngineError>;

/// Identity stamped on rows written without an authenticated caller.
pub const SYSTEM_ACTOR: &str = "system";
