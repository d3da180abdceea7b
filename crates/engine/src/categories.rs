//! Product categories.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::repository::soft_delete_entity;

/// Default display order for a new category.
pub const DEFAULT_ORDER: i64 = 100;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub order: i64,
    pub description: Option<String>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub created_at: DateTimeUtc,
    pub modified_at: DateTimeUtc,
    pub created_by: Option<String>,
    pub modified_by: Option<String>,
    pub deleted: bool,
    pub name: String,
    pub sort_order: i64,
    pub description: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::products::Entity")]
    Products,
}

impl Related<super::products::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Products.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

soft_delete_entity!();

impl From<Model> for Category {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            order: model.sort_order,
            description: model.description,
        }
    }
}
