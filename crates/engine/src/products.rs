//! Catalog products.
//!
//! A product belongs to exactly one category and carries its stock `count`,
//! which never goes negative.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{Category, repository::soft_delete_entity};

/// Product view, with its category embedded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub count: i64,
    pub category: Category,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub created_at: DateTimeUtc,
    pub modified_at: DateTimeUtc,
    pub created_by: Option<String>,
    pub modified_by: Option<String>,
    pub deleted: bool,
    pub name: String,
    pub count: i64,
    pub category_id: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Category,
    #[sea_orm(has_many = "super::transaction_items::Entity")]
    TransactionItems,
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::transaction_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TransactionItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

soft_delete_entity!();

impl Product {
    pub(crate) fn from_parts(model: Model, category: Category) -> Self {
        Self {
            id: model.id,
            name: model.name,
            count: model.count,
            category,
        }
    }
}
