use sea_orm::{QueryFilter, QueryOrder, prelude::*};

use crate::{
    EngineError, ErrorCode, Page, PageRequest, ResultEngine, TransactionItem, products,
    transaction_items, transactions,
};

use super::Engine;

// Sale lines are read-only here: they are written by the sale workflow.
impl Engine {
    pub async fn transaction_item(&self, id: i64) -> ResultEngine<TransactionItem> {
        transaction_items::Repo::find_by_id_not_deleted(&self.database, id)
            .await?
            .map(TransactionItem::from)
            .ok_or(EngineError::NotFound(ErrorCode::TransactionItemNotFound))
    }

    pub async fn list_transaction_items(
        &self,
        page: &PageRequest,
    ) -> ResultEngine<Page<TransactionItem>> {
        Ok(
            transaction_items::Repo::find_all_not_deleted_page(&self.database, page)
                .await?
                .map(TransactionItem::from),
        )
    }

    pub async fn transaction_items_by_transaction(
        &self,
        transaction_id: i64,
    ) -> ResultEngine<Vec<TransactionItem>> {
        transactions::Repo::require(&self.database, transaction_id).await?;
        let models = transaction_items::Repo::not_deleted()
            .filter(transaction_items::Column::TransactionId.eq(transaction_id))
            .order_by_asc(transaction_items::Column::Id)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(TransactionItem::from).collect())
    }

    pub async fn transaction_items_by_product(
        &self,
        product_id: i64,
        page: &PageRequest,
    ) -> ResultEngine<Page<TransactionItem>> {
        products::Repo::require(&self.database, product_id).await?;
        let query = transaction_items::Repo::not_deleted()
            .filter(transaction_items::Column::ProductId.eq(product_id));
        Ok(transaction_items::Repo::page(&self.database, query, page)
            .await?
            .map(TransactionItem::from))
    }
}
