//! Command structs for engine operations.
//!
//! These types group parameters for write operations, keeping call sites
//! readable and avoiding long argument lists. `*Patch` types carry partial
//! updates: a field left `None` keeps its stored value.

use chrono::{DateTime, Utc};

use crate::{Money, Role, categories::DEFAULT_ORDER};

/// Create a category.
#[derive(Clone, Debug)]
pub struct CategoryNew {
    pub name: String,
    pub order: i64,
    pub description: Option<String>,
}

impl CategoryNew {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            order: DEFAULT_ORDER,
            description: None,
        }
    }

    #[must_use]
    pub fn order(mut self, order: i64) -> Self {
        self.order = order;
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Partial category update.
#[derive(Clone, Debug, Default)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub order: Option<i64>,
    pub description: Option<String>,
}

impl CategoryPatch {
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn order(mut self, order: i64) -> Self {
        self.order = Some(order);
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Create a product.
#[derive(Clone, Debug)]
pub struct ProductNew {
    pub name: String,
    pub count: i64,
    pub category_id: i64,
}

impl ProductNew {
    #[must_use]
    pub fn new(name: impl Into<String>, count: i64, category_id: i64) -> Self {
        Self {
            name: name.into(),
            count,
            category_id,
        }
    }
}

/// Partial product update.
#[derive(Clone, Debug, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub count: Option<i64>,
    pub category_id: Option<i64>,
}

impl ProductPatch {
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn count(mut self, count: i64) -> Self {
        self.count = Some(count);
        self
    }

    #[must_use]
    pub fn category_id(mut self, category_id: i64) -> Self {
        self.category_id = Some(category_id);
        self
    }
}

/// Create a user.
#[derive(Clone, Debug)]
pub struct UserNew {
    pub username: String,
    pub full_name: Option<String>,
    pub balance: Money,
    pub role: Role,
}

impl UserNew {
    #[must_use]
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            full_name: None,
            balance: Money::ZERO,
            role: Role::User,
        }
    }

    #[must_use]
    pub fn full_name(mut self, full_name: impl Into<String>) -> Self {
        self.full_name = Some(full_name.into());
        self
    }

    #[must_use]
    pub fn balance(mut self, balance: Money) -> Self {
        self.balance = balance;
        self
    }

    #[must_use]
    pub fn role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }
}

/// Partial user update. `balance` is the administrative correction path.
#[derive(Clone, Debug, Default)]
pub struct UserPatch {
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub role: Option<Role>,
    pub balance: Option<Money>,
}

impl UserPatch {
    #[must_use]
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    #[must_use]
    pub fn full_name(mut self, full_name: impl Into<String>) -> Self {
        self.full_name = Some(full_name.into());
        self
    }

    #[must_use]
    pub fn role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    #[must_use]
    pub fn balance(mut self, balance: Money) -> Self {
        self.balance = Some(balance);
        self
    }
}

/// One requested sale line: `amount` is the unit price.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransactionItemNew {
    pub product_id: i64,
    pub count: i64,
    pub amount: Money,
}

impl TransactionItemNew {
    #[must_use]
    pub fn new(product_id: i64, count: i64, amount: Money) -> Self {
        Self {
            product_id,
            count,
            amount,
        }
    }
}

/// Create a sale.
#[derive(Clone, Debug)]
pub struct TransactionNew {
    pub user_id: i64,
    pub date: Option<DateTime<Utc>>,
    pub items: Vec<TransactionItemNew>,
}

impl TransactionNew {
    #[must_use]
    pub fn new(user_id: i64) -> Self {
        Self {
            user_id,
            date: None,
            items: Vec::new(),
        }
    }

    #[must_use]
    pub fn item(mut self, product_id: i64, count: i64, amount: Money) -> Self {
        self.items
            .push(TransactionItemNew::new(product_id, count, amount));
        self
    }

    #[must_use]
    pub fn items(mut self, items: impl IntoIterator<Item = TransactionItemNew>) -> Self {
        self.items.extend(items);
        self
    }

    /// Sale date; defaults to now.
    #[must_use]
    pub fn date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }
}

/// Create a payment (balance top-up).
#[derive(Clone, Debug)]
pub struct PaymentNew {
    pub user_id: i64,
    pub amount: Money,
    pub date: Option<DateTime<Utc>>,
}

impl PaymentNew {
    #[must_use]
    pub fn new(user_id: i64, amount: Money) -> Self {
        Self {
            user_id,
            amount,
            date: None,
        }
    }

    /// Payment date; defaults to now.
    #[must_use]
    pub fn date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }
}
