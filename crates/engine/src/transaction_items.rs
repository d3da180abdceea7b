//! Sale lines.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{Money, repository::soft_delete_entity};

/// One line of a sale: `total_amount = amount * count`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionItem {
    pub id: i64,
    pub transaction_id: i64,
    pub product_id: i64,
    pub count: i64,
    pub amount: Money,
    pub total_amount: Money,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transaction_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub created_at: DateTimeUtc,
    pub modified_at: DateTimeUtc,
    pub created_by: Option<String>,
    pub modified_by: Option<String>,
    pub deleted: bool,
    pub transaction_id: i64,
    pub product_id: i64,
    pub count: i64,
    pub amount: i64,
    pub total_amount: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::transactions::Entity",
        from = "Column::TransactionId",
        to = "super::transactions::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Transaction,
    #[sea_orm(
        belongs_to = "super::products::Entity",
        from = "Column::ProductId",
        to = "super::products::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Product,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transaction.def()
    }
}

impl Related<super::products::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

soft_delete_entity!();

impl From<Model> for TransactionItem {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            transaction_id: model.transaction_id,
            product_id: model.product_id,
            count: model.count,
            amount: Money::new(model.amount),
            total_amount: Money::new(model.total_amount),
        }
    }
}
