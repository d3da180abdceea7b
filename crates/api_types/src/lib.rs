//! Request and response bodies of the HTTP API.
//!
//! Monetary values travel as integer minor units (`*_minor`, cents).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub mod page {
    use super::*;

    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum SortDir {
        #[default]
        Asc,
        Desc,
    }

    /// `?page=&size=&sort=` query parameters. `page` is zero based.
    #[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
    pub struct PageQuery {
        pub page: Option<u64>,
        pub size: Option<u64>,
        pub sort: Option<SortDir>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PageResponse<T> {
        pub items: Vec<T>,
        pub page: u64,
        pub size: u64,
        pub total_items: u64,
        pub total_pages: u64,
    }
}

pub mod error {
    use super::*;

    /// Error body returned with every non-2xx response.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ErrorBody {
        /// Stable numeric code.
        pub code: u16,
        /// Message key, e.g. `CATEGORY_NOT_FOUND`.
        pub key: String,
        /// Human readable message (English).
        pub error: String,
        /// Message arguments, for localized rendering.
        pub args: Vec<String>,
    }
}

pub mod category {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryNew {
        pub name: String,
        /// Display order, defaults to 100.
        pub order: Option<i64>,
        pub description: Option<String>,
    }

    /// Partial update: absent fields are left untouched.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct CategoryUpdate {
        pub name: Option<String>,
        pub order: Option<i64>,
        pub description: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryView {
        pub id: i64,
        pub name: String,
        pub order: i64,
        pub description: Option<String>,
    }
}

pub mod product {
    use super::*;
    use crate::category::CategoryView;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProductNew {
        pub name: String,
        pub count: i64,
        pub category_id: i64,
    }

    /// Partial update: absent fields are left untouched.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ProductUpdate {
        pub name: Option<String>,
        pub count: Option<i64>,
        pub category_id: Option<i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProductView {
        pub id: i64,
        pub name: String,
        pub count: i64,
        pub category: CategoryView,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProductNameQuery {
        pub name: String,
    }
}

pub mod user {
    use super::*;

    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "UPPERCASE")]
    pub enum Role {
        #[default]
        User,
        Admin,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserNew {
        pub username: String,
        pub full_name: Option<String>,
        pub balance_minor: Option<i64>,
        pub role: Option<Role>,
    }

    /// Partial update: absent fields are left untouched.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct UserUpdate {
        pub username: Option<String>,
        pub full_name: Option<String>,
        pub role: Option<Role>,
        pub balance_minor: Option<i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserView {
        pub id: i64,
        pub username: String,
        pub full_name: Option<String>,
        pub balance_minor: i64,
        pub role: Role,
    }
}

pub mod transaction {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionItemNew {
        pub product_id: i64,
        pub count: i64,
        /// Unit price.
        pub amount_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionNew {
        pub user_id: i64,
        /// Sale date, defaults to now.
        pub date: Option<DateTime<Utc>>,
        pub items: Vec<TransactionItemNew>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionItemView {
        pub id: i64,
        pub transaction_id: i64,
        pub product_id: i64,
        pub count: i64,
        pub amount_minor: i64,
        pub total_amount_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: i64,
        pub user_id: i64,
        pub total_amount_minor: i64,
        pub date: DateTime<Utc>,
        pub items: Vec<TransactionItemView>,
    }

    /// Inclusive calendar range, UTC.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct DateRangeQuery {
        pub from: NaiveDate,
        pub to: NaiveDate,
    }
}

pub mod payment {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PaymentNew {
        pub user_id: i64,
        pub amount_minor: i64,
        /// Payment date, defaults to now.
        pub date: Option<DateTime<Utc>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PaymentView {
        pub id: i64,
        pub user_id: i64,
        pub amount_minor: i64,
        pub date: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PaymentTotal {
        pub user_id: i64,
        pub total_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DateQuery {
        pub date: NaiveDate,
    }
}
