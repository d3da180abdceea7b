use std::collections::HashMap;

use sea_orm::{
    ActiveValue, IntoActiveModel, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};

use crate::{
    Category, EngineError, ErrorCode, Page, PageRequest, Product, ProductNew, ProductPatch,
    ResultEngine, categories, products, util::normalize_required_name,
};

use super::{Engine, with_tx};

fn check_count(count: i64) -> ResultEngine<i64> {
    if count < 0 {
        return Err(EngineError::invalid_product_count(count));
    }
    Ok(count)
}

impl products::Repo {
    pub(super) async fn require<C>(db: &C, id: i64) -> ResultEngine<products::Model>
    where
        C: ConnectionTrait,
    {
        Self::find_by_id_not_deleted(db, id)
            .await?
            .ok_or(EngineError::NotFound(ErrorCode::ProductNotFound))
    }
}

impl Engine {
    /// Attach the category view to each product.
    ///
    /// Categories are looked up unfiltered: the embedded view reflects the
    /// row the product points at.
    async fn product_views<C>(db: &C, models: Vec<products::Model>) -> ResultEngine<Vec<Product>>
    where
        C: ConnectionTrait,
    {
        let mut ids: Vec<i64> = models.iter().map(|m| m.category_id).collect();
        ids.sort_unstable();
        ids.dedup();

        let by_id: HashMap<i64, Category> = categories::Entity::find()
            .filter(categories::Column::Id.is_in(ids))
            .all(db)
            .await?
            .into_iter()
            .map(|model| (model.id, Category::from(model)))
            .collect();

        models
            .into_iter()
            .map(|model| {
                let category = by_id
                    .get(&model.category_id)
                    .cloned()
                    .ok_or(EngineError::NotFound(ErrorCode::CategoryNotFound))?;
                Ok(Product::from_parts(model, category))
            })
            .collect()
    }

    async fn product_page<C>(
        db: &C,
        page: Page<products::Model>,
    ) -> ResultEngine<Page<Product>>
    where
        C: ConnectionTrait,
    {
        let Page {
            items,
            page,
            size,
            total_items,
            total_pages,
        } = page;
        Ok(Page {
            items: Self::product_views(db, items).await?,
            page,
            size,
            total_items,
            total_pages,
        })
    }

    /// Create a product inside a live category.
    pub async fn create_product(&self, cmd: ProductNew, actor: &str) -> ResultEngine<Product> {
        let name = normalize_required_name(&cmd.name, "name")?;
        let count = check_count(cmd.count)?;
        with_tx!(self, |db_tx| {
            let category = categories::Repo::require(&db_tx, cmd.category_id).await?;

            let active = products::ActiveModel {
                name: ActiveValue::Set(name),
                count: ActiveValue::Set(count),
                category_id: ActiveValue::Set(category.id),
                ..Default::default()
            };
            let model = products::Repo::insert(&db_tx, active, actor).await?;
            tracing::debug!(product_id = model.id, category_id = category.id, "product created");
            Ok(Product::from_parts(model, Category::from(category)))
        })
    }

    pub async fn product(&self, id: i64) -> ResultEngine<Product> {
        let model = products::Repo::require(&self.database, id).await?;
        let mut views = Self::product_views(&self.database, vec![model]).await?;
        views
            .pop()
            .ok_or(EngineError::NotFound(ErrorCode::ProductNotFound))
    }

    pub async fn list_products(&self) -> ResultEngine<Vec<Product>> {
        let models = products::Repo::find_all_not_deleted(&self.database).await?;
        Self::product_views(&self.database, models).await
    }

    pub async fn list_products_page(&self, page: &PageRequest) -> ResultEngine<Page<Product>> {
        let page = products::Repo::find_all_not_deleted_page(&self.database, page).await?;
        Self::product_page(&self.database, page).await
    }

    /// Live products with exactly this name.
    pub async fn products_by_name(&self, name: &str) -> ResultEngine<Vec<Product>> {
        let name = normalize_required_name(name, "name")?;
        let models = products::Repo::not_deleted()
            .filter(products::Column::Name.eq(name))
            .order_by_asc(products::Column::Id)
            .all(&self.database)
            .await?;
        Self::product_views(&self.database, models).await
    }

    pub async fn products_by_category(&self, category_id: i64) -> ResultEngine<Vec<Product>> {
        let category = categories::Repo::require(&self.database, category_id).await?;
        let models = products::Repo::not_deleted()
            .filter(products::Column::CategoryId.eq(category.id))
            .order_by_asc(products::Column::Id)
            .all(&self.database)
            .await?;
        let category = Category::from(category);
        Ok(models
            .into_iter()
            .map(|model| Product::from_parts(model, category.clone()))
            .collect())
    }

    pub async fn products_by_category_page(
        &self,
        category_id: i64,
        page: &PageRequest,
    ) -> ResultEngine<Page<Product>> {
        let category = Category::from(categories::Repo::require(&self.database, category_id).await?);
        let query = products::Repo::not_deleted()
            .filter(products::Column::CategoryId.eq(category.id));
        Ok(products::Repo::page(&self.database, query, page)
            .await?
            .map(|model| Product::from_parts(model, category.clone())))
    }

    /// Live products with stock left.
    pub async fn available_products(&self) -> ResultEngine<Vec<Product>> {
        let models = products::Repo::not_deleted()
            .filter(products::Column::Count.gt(0))
            .order_by_asc(products::Column::Id)
            .all(&self.database)
            .await?;
        Self::product_views(&self.database, models).await
    }

    /// Apply a partial update. A new category must be live.
    pub async fn update_product(
        &self,
        id: i64,
        patch: ProductPatch,
        actor: &str,
    ) -> ResultEngine<Product> {
        let name = patch
            .name
            .as_deref()
            .map(|name| normalize_required_name(name, "name"))
            .transpose()?;
        let count = patch.count.map(check_count).transpose()?;
        with_tx!(self, |db_tx| {
            let model = products::Repo::require(&db_tx, id).await?;
            let category = match patch.category_id {
                Some(category_id) => categories::Repo::require(&db_tx, category_id).await?,
                None => categories::Repo::find_by_id(&db_tx, model.category_id)
                    .await?
                    .ok_or(EngineError::NotFound(ErrorCode::CategoryNotFound))?,
            };

            let mut active = model.into_active_model();
            if let Some(name) = name {
                active.name = ActiveValue::Set(name);
            }
            if let Some(count) = count {
                active.count = ActiveValue::Set(count);
            }
            if patch.category_id.is_some() {
                active.category_id = ActiveValue::Set(category.id);
            }
            let model = products::Repo::update(&db_tx, active, actor).await?;
            Ok(Product::from_parts(model, Category::from(category)))
        })
    }

    /// Trash a product. Past sale lines keep pointing at the trashed row.
    pub async fn delete_product(&self, id: i64, actor: &str) -> ResultEngine<()> {
        products::Repo::trash(&self.database, id, actor)
            .await?
            .ok_or(EngineError::NotFound(ErrorCode::ProductNotFound))?;
        tracing::debug!(product_id = id, "product trashed");
        Ok(())
    }
}
