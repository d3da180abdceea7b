//! User payments (top-ups).
//!
//! A live payment row always comes with the matching increase of the user
//! balance: both are written, or trashed, in the same database transaction.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{Money, repository::soft_delete_entity};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: i64,
    pub user_id: i64,
    pub amount: Money,
    pub date: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "user_payment_transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub created_at: DateTimeUtc,
    pub modified_at: DateTimeUtc,
    pub created_by: Option<String>,
    pub modified_by: Option<String>,
    pub deleted: bool,
    pub user_id: i64,
    pub amount: i64,
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
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

soft_delete_entity!();

impl From<Model> for Payment {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            amount: Money::new(model.amount),
            date: model.date,
        }
    }
}
