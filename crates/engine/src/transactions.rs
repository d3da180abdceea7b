//! Sales.
//!
//! A `Transaction` is the header of a sale made by one user. Its
//! `total_amount` is derived: it always equals the sum of the line totals of
//! its [`TransactionItem`](crate::TransactionItem)s, which are created with
//! it and share its lifecycle.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{Money, TransactionItem, repository::soft_delete_entity};

/// Aggregate view: header plus materialized items.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub user_id: i64,
    pub total_amount: Money,
    pub date: DateTime<Utc>,
    pub items: Vec<TransactionItem>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub created_at: DateTimeUtc,
    pub modified_at: DateTimeUtc,
    pub created_by: Option<String>,
    pub modified_by: Option<String>,
    pub deleted: bool,
    pub user_id: i64,
    pub total_amount: i64,
    pub date: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    User,
    #[sea_orm(has_many = "super::transaction_items::Entity")]
    Items,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::transaction_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

soft_delete_entity!();

impl Transaction {
    pub(crate) fn from_parts(model: Model, items: Vec<TransactionItem>) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            total_amount: Money::new(model.total_amount),
            date: model.date,
            items,
        }
    }
}
