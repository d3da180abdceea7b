use sea_orm::{
    ActiveValue, IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
    prelude::*,
};

use crate::{
    Category, CategoryNew, CategoryPatch, EngineError, ErrorCode, Page, PageRequest,
    ResultEngine, categories, products,
    util::{normalize_optional_text, normalize_required_name},
};

use super::{Engine, with_tx};

impl categories::Repo {
    async fn find_by_name<C>(db: &C, name: &str) -> ResultEngine<Option<categories::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(Self::not_deleted()
            .filter(categories::Column::Name.eq(name))
            .one(db)
            .await?)
    }

    pub(super) async fn require<C>(db: &C, id: i64) -> ResultEngine<categories::Model>
    where
        C: ConnectionTrait,
    {
        Self::find_by_id_not_deleted(db, id)
            .await?
            .ok_or(EngineError::NotFound(ErrorCode::CategoryNotFound))
    }
}

impl Engine {
    /// Create a category. Names are unique among live categories.
    pub async fn create_category(&self, cmd: CategoryNew, actor: &str) -> ResultEngine<Category> {
        let name = normalize_required_name(&cmd.name, "name")?;
        let description = normalize_optional_text(cmd.description.as_deref());
        with_tx!(self, |db_tx| {
            if categories::Repo::find_by_name(&db_tx, &name).await?.is_some() {
                return Err(EngineError::category_exists(&name));
            }

            let active = categories::ActiveModel {
                name: ActiveValue::Set(name),
                sort_order: ActiveValue::Set(cmd.order),
                description: ActiveValue::Set(description),
                ..Default::default()
            };
            let model = categories::Repo::insert(&db_tx, active, actor).await?;
            tracing::debug!(category_id = model.id, "category created");
            Ok(Category::from(model))
        })
    }

    pub async fn category(&self, id: i64) -> ResultEngine<Category> {
        categories::Repo::require(&self.database, id)
            .await
            .map(Category::from)
    }

    pub async fn list_categories(&self, page: &PageRequest) -> ResultEngine<Page<Category>> {
        Ok(
            categories::Repo::find_all_not_deleted_page(&self.database, page)
                .await?
                .map(Category::from),
        )
    }

    /// Every live category, by display order then name.
    pub async fn list_categories_by_order(&self) -> ResultEngine<Vec<Category>> {
        let models = categories::Repo::not_deleted()
            .order_by_asc(categories::Column::SortOrder)
            .order_by_asc(categories::Column::Name)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(Category::from).collect())
    }

    pub async fn category_by_name(&self, name: &str) -> ResultEngine<Option<Category>> {
        let name = normalize_required_name(name, "name")?;
        Ok(categories::Repo::find_by_name(&self.database, &name)
            .await?
            .map(Category::from))
    }

    /// Apply a partial update. Renaming onto another live category's name
    /// is rejected.
    pub async fn update_category(
        &self,
        id: i64,
        patch: CategoryPatch,
        actor: &str,
    ) -> ResultEngine<Category> {
        let name = patch
            .name
            .as_deref()
            .map(|name| normalize_required_name(name, "name"))
            .transpose()?;
        with_tx!(self, |db_tx| {
            let model = categories::Repo::require(&db_tx, id).await?;

            if let Some(name) = &name
                && let Some(other) = categories::Repo::find_by_name(&db_tx, name).await?
                && other.id != id
            {
                return Err(EngineError::category_exists(name));
            }

            let mut active = model.into_active_model();
            if let Some(name) = name {
                active.name = ActiveValue::Set(name);
            }
            if let Some(order) = patch.order {
                active.sort_order = ActiveValue::Set(order);
            }
            if let Some(description) = patch.description {
                active.description =
                    ActiveValue::Set(normalize_optional_text(Some(description.as_str())));
            }
            let model = categories::Repo::update(&db_tx, active, actor).await?;
            Ok(Category::from(model))
        })
    }

    /// Trash a category. Rejected while a live product still points at it.
    pub async fn delete_category(&self, id: i64, actor: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = categories::Repo::require(&db_tx, id).await?;

            let in_use = products::Repo::not_deleted()
                .filter(products::Column::CategoryId.eq(id))
                .count(&db_tx)
                .await?;
            if in_use > 0 {
                return Err(EngineError::category_in_use(&model.name));
            }

            categories::Repo::trash(&db_tx, id, actor)
                .await?
                .ok_or(EngineError::NotFound(ErrorCode::CategoryNotFound))?;
            tracing::debug!(category_id = id, "category trashed");
            Ok(())
        })
    }
}
