//! Soft-delete aware data access.
//!
//! Every table carries the same base shape (`id`, audit columns, `deleted`).
//! [`Repository`] is the one place that knows what that shape means:
//!
//! - reads go through [`Repository::not_deleted`] so trashed rows never leak,
//! - writes go through [`Repository::insert`] / [`Repository::update`], which
//!   stamp the audit columns,
//! - deletes are logical ([`Repository::trash`]).
//!
//! Entity modules opt in with [`soft_delete_entity!`] and get a
//! `Repository<ActiveModel>` alias; entity specific queries live in
//! `impl Repository<xxx::ActiveModel>` blocks next to the services using them.
//!
//! Concurrent `trash` calls on the same id race at the storage layer (last
//! write wins, both callers see success). Nothing relies on `deleted` for
//! uniqueness.

use std::marker::PhantomData;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait,
    IntoActiveModel, Order, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select,
};

use crate::ResultEngine;

/// Entity carrying the base shape.
pub trait SoftDelete: EntityTrait {
    fn id_column() -> Self::Column;
    fn deleted_column() -> Self::Column;
    fn is_deleted(model: &Self::Model) -> bool;
}

/// Audit hook: the repository is the only caller.
pub trait Audited {
    fn stamp_created(&mut self, actor: &str, at: DateTime<Utc>);
    fn stamp_modified(&mut self, actor: &str, at: DateTime<Utc>);
    fn set_deleted(&mut self, deleted: bool);
}

/// Implements [`SoftDelete`] and [`Audited`] for the `Entity`/`ActiveModel`
/// of the module it is invoked in.
macro_rules! soft_delete_entity {
    () => {
        impl $crate::repository::SoftDelete for Entity {
            fn id_column() -> Column {
                Column::Id
            }

            fn deleted_column() -> Column {
                Column::Deleted
            }

            fn is_deleted(model: &Model) -> bool {
                model.deleted
            }
        }

        impl $crate::repository::Audited for ActiveModel {
            fn stamp_created(&mut self, actor: &str, at: ::chrono::DateTime<::chrono::Utc>) {
                self.created_at = ::sea_orm::ActiveValue::Set(at);
                self.created_by = ::sea_orm::ActiveValue::Set(Some(actor.to_string()));
                self.modified_at = ::sea_orm::ActiveValue::Set(at);
                self.modified_by = ::sea_orm::ActiveValue::Set(Some(actor.to_string()));
            }

            fn stamp_modified(&mut self, actor: &str, at: ::chrono::DateTime<::chrono::Utc>) {
                self.modified_at = ::sea_orm::ActiveValue::Set(at);
                self.modified_by = ::sea_orm::ActiveValue::Set(Some(actor.to_string()));
            }

            fn set_deleted(&mut self, deleted: bool) {
                self.deleted = ::sea_orm::ActiveValue::Set(deleted);
            }
        }

        /// Soft-delete aware repository for this entity.
        pub type Repo = $crate::repository::Repository<ActiveModel>;
    };
}

pub(crate) use soft_delete_entity;

type ModelOf<A> = <<A as ActiveModelTrait>::Entity as EntityTrait>::Model;

/// Outcome of an unfiltered lookup by id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Lookup<M> {
    Missing,
    Deleted(M),
    Live(M),
}

impl<M> Lookup<M> {
    /// The row, only when present and not flagged deleted.
    pub fn live(self) -> Option<M> {
        match self {
            Self::Live(model) => Some(model),
            Self::Missing | Self::Deleted(_) => None,
        }
    }

    /// The row regardless of the deleted flag.
    pub fn raw(self) -> Option<M> {
        match self {
            Self::Live(model) | Self::Deleted(model) => Some(model),
            Self::Missing => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl From<SortOrder> for Order {
    fn from(value: SortOrder) -> Self {
        match value {
            SortOrder::Asc => Order::Asc,
            SortOrder::Desc => Order::Desc,
        }
    }
}

/// Offset/limit pagination request. `page` is zero based.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub size: u64,
    pub sort: SortOrder,
}

impl PageRequest {
    pub const DEFAULT_SIZE: u64 = 20;
    pub const MAX_SIZE: u64 = 100;

    /// Build a request, clamping `size` to `1..=MAX_SIZE`.
    #[must_use]
    pub fn new(page: u64, size: u64) -> Self {
        Self {
            page,
            size: size.clamp(1, Self::MAX_SIZE),
            sort: SortOrder::Asc,
        }
    }

    #[must_use]
    pub fn sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    fn offset(&self) -> u64 {
        self.page.saturating_mul(self.size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(0, Self::DEFAULT_SIZE)
    }
}

/// One page of results.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub size: u64,
    pub total_items: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    fn new(items: Vec<T>, request: &PageRequest, total_items: u64) -> Self {
        Self {
            items,
            page: request.page,
            size: request.size,
            total_items,
            total_pages: total_items.div_ceil(request.size),
        }
    }

    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total_items: self.total_items,
            total_pages: self.total_pages,
        }
    }

    pub fn try_map<U, F>(self, f: F) -> ResultEngine<Page<U>>
    where
        F: FnMut(T) -> ResultEngine<U>,
    {
        Ok(Page {
            items: self.items.into_iter().map(f).collect::<ResultEngine<Vec<U>>>()?,
            page: self.page,
            size: self.size,
            total_items: self.total_items,
            total_pages: self.total_pages,
        })
    }
}

/// Generic soft-delete repository, parametrized by the entity `ActiveModel`.
///
/// It holds no state: every call takes the connection to run on, which is
/// either the engine database or an open `DatabaseTransaction`.
pub struct Repository<A>(PhantomData<A>);

impl<A> Repository<A>
where
    A: ActiveModelTrait + ActiveModelBehavior + Audited + Send + 'static,
    A::Entity: SoftDelete,
    ModelOf<A>: IntoActiveModel<A> + Send + Sync + 'static,
{
    /// Base query with the deleted filter applied.
    pub fn not_deleted() -> Select<A::Entity> {
        <A::Entity as EntityTrait>::find()
            .filter(<A::Entity as SoftDelete>::deleted_column().eq(false))
    }

    /// Unfiltered lookup telling apart missing and trashed rows.
    pub async fn lookup<C>(db: &C, id: i64) -> ResultEngine<Lookup<ModelOf<A>>>
    where
        C: ConnectionTrait,
    {
        let model = <A::Entity as EntityTrait>::find()
            .filter(<A::Entity as SoftDelete>::id_column().eq(id))
            .one(db)
            .await?;
        Ok(match model {
            None => Lookup::Missing,
            Some(model) if <A::Entity as SoftDelete>::is_deleted(&model) => {
                Lookup::Deleted(model)
            }
            Some(model) => Lookup::Live(model),
        })
    }

    /// Unfiltered lookup by id.
    pub async fn find_by_id<C>(db: &C, id: i64) -> ResultEngine<Option<ModelOf<A>>>
    where
        C: ConnectionTrait,
    {
        Ok(Self::lookup(db, id).await?.raw())
    }

    pub async fn find_by_id_not_deleted<C>(db: &C, id: i64) -> ResultEngine<Option<ModelOf<A>>>
    where
        C: ConnectionTrait,
    {
        Ok(Self::lookup(db, id).await?.live())
    }

    pub async fn find_all_not_deleted<C>(db: &C) -> ResultEngine<Vec<ModelOf<A>>>
    where
        C: ConnectionTrait,
    {
        Ok(Self::not_deleted()
            .order_by_asc(<A::Entity as SoftDelete>::id_column())
            .all(db)
            .await?)
    }

    pub async fn find_all_not_deleted_page<C>(
        db: &C,
        request: &PageRequest,
    ) -> ResultEngine<Page<ModelOf<A>>>
    where
        C: ConnectionTrait,
    {
        Self::page(db, Self::not_deleted(), request).await
    }

    /// Paginate a query built from [`Self::not_deleted`].
    ///
    /// Rows are ordered by any ordering already on `query`, then by id in
    /// the requested direction.
    pub async fn page<C>(
        db: &C,
        query: Select<A::Entity>,
        request: &PageRequest,
    ) -> ResultEngine<Page<ModelOf<A>>>
    where
        C: ConnectionTrait,
    {
        let total_items = query.clone().count(db).await?;
        let items = query
            .order_by(
                <A::Entity as SoftDelete>::id_column(),
                Order::from(request.sort),
            )
            .offset(request.offset())
            .limit(request.size)
            .all(db)
            .await?;
        Ok(Page::new(items, request, total_items))
    }

    /// Insert a new row, stamping the audit columns.
    pub async fn insert<C>(db: &C, mut active: A, actor: &str) -> ResultEngine<ModelOf<A>>
    where
        C: ConnectionTrait,
    {
        active.stamp_created(actor, Utc::now());
        active.set_deleted(false);
        Ok(active.insert(db).await?)
    }

    /// Persist the changed columns of an existing row.
    pub async fn update<C>(db: &C, mut active: A, actor: &str) -> ResultEngine<ModelOf<A>>
    where
        C: ConnectionTrait,
    {
        active.stamp_modified(actor, Utc::now());
        Ok(active.update(db).await?)
    }

    /// Logically delete a row.
    ///
    /// Returns `None` when the row is missing or already trashed: a trashed
    /// id is unreachable through normal reads, so trashing it again is a
    /// not-found.
    pub async fn trash<C>(db: &C, id: i64, actor: &str) -> ResultEngine<Option<ModelOf<A>>>
    where
        C: ConnectionTrait,
    {
        let Lookup::Live(model) = Self::lookup(db, id).await? else {
            return Ok(None);
        };
        let mut active: A = model.into_active_model();
        active.set_deleted(true);
        Self::update(db, active, actor).await.map(Some)
    }

    /// [`Self::trash`] applied to every id, in input order.
    ///
    /// A missing id yields `None` at its position and does not stop the
    /// remaining ids from being trashed.
    pub async fn trash_list<C>(
        db: &C,
        ids: &[i64],
        actor: &str,
    ) -> ResultEngine<Vec<Option<ModelOf<A>>>>
    where
        C: ConnectionTrait,
    {
        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            out.push(Self::trash(db, *id, actor).await?);
        }
        Ok(out)
    }
}
