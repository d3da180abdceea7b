//! Sale workflow.
//!
//! A sale is written as one aggregate: the header, its lines and the stock
//! decrement of every product commit together or not at all.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveValue, IntoActiveModel, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};

use crate::{
    EngineError, ErrorCode, Money, Page, PageRequest, ResultEngine, Transaction,
    TransactionItem, TransactionNew, products, transaction_items, transactions, users,
};

use super::{Engine, day_range, with_tx};

/// A validated sale line with its computed total.
struct Line {
    product_id: i64,
    count: i64,
    amount: Money,
    total_amount: Money,
}

/// Validate the requested lines and compute `amount * count` for each.
fn price_lines(cmd: &TransactionNew) -> ResultEngine<(Vec<Line>, Money)> {
    if cmd.items.is_empty() {
        return Err(EngineError::invalid_input(
            "items",
            "at least one item is required",
        ));
    }

    let mut lines = Vec::with_capacity(cmd.items.len());
    for item in &cmd.items {
        if item.count < 1 {
            return Err(EngineError::invalid_product_count(item.count));
        }
        if item.amount.is_negative() {
            return Err(EngineError::invalid_transaction_amount(item.amount));
        }
        let total_amount = item
            .amount
            .checked_mul(item.count)
            .ok_or_else(|| EngineError::invalid_transaction_amount(item.amount))?;
        lines.push(Line {
            product_id: item.product_id,
            count: item.count,
            amount: item.amount,
            total_amount,
        });
    }

    let total = Money::try_sum(lines.iter().map(|line| line.total_amount))?;
    Ok((lines, total))
}

impl transactions::Repo {
    pub(super) async fn require<C>(db: &C, id: i64) -> ResultEngine<transactions::Model>
    where
        C: ConnectionTrait,
    {
        Self::find_by_id_not_deleted(db, id)
            .await?
            .ok_or(EngineError::NotFound(ErrorCode::TransactionNotFound))
    }
}

impl Engine {
    /// Live items of the given sales, grouped by sale id.
    async fn items_by_transaction<C>(
        db: &C,
        transaction_ids: Vec<i64>,
    ) -> ResultEngine<HashMap<i64, Vec<TransactionItem>>>
    where
        C: ConnectionTrait,
    {
        let models = transaction_items::Repo::not_deleted()
            .filter(transaction_items::Column::TransactionId.is_in(transaction_ids))
            .order_by_asc(transaction_items::Column::Id)
            .all(db)
            .await?;

        let mut grouped: HashMap<i64, Vec<TransactionItem>> = HashMap::new();
        for model in models {
            grouped
                .entry(model.transaction_id)
                .or_default()
                .push(TransactionItem::from(model));
        }
        Ok(grouped)
    }

    async fn transaction_page<C>(
        db: &C,
        page: Page<transactions::Model>,
    ) -> ResultEngine<Page<Transaction>>
    where
        C: ConnectionTrait,
    {
        let ids = page.items.iter().map(|model| model.id).collect();
        let mut items = Self::items_by_transaction(db, ids).await?;
        Ok(page.map(|model| {
            let lines = items.remove(&model.id).unwrap_or_default();
            Transaction::from_parts(model, lines)
        }))
    }

    /// Record a sale.
    ///
    /// The user is resolved first, then every line is priced as `amount * count` and the header total is the
    /// exact sum of the line totals. The requested quantity of each product
    /// (summed across lines) must be in stock and is taken out of it. Any
    /// failure rolls back the whole sale.
    pub async fn create_transaction(
        &self,
        cmd: TransactionNew,
        actor: &str,
    ) -> ResultEngine<Transaction> {
        let date = cmd.date.unwrap_or_else(Utc::now);

        with_tx!(self, |db_tx| {
            let user = users::Repo::require(&db_tx, cmd.user_id).await?;
            let (lines, total) = price_lines(&cmd)?;

            // Resolve products in request order; remember the total quantity per product.
            let mut order: Vec<i64> = Vec::new();
            let mut stock: HashMap<i64, (products::Model, i64)> = HashMap::new();
            for line in &lines {
                if let Some((_, requested)) = stock.get_mut(&line.product_id) {
                    *requested = requested
                        .checked_add(line.count)
                        .ok_or_else(|| EngineError::invalid_product_count(line.count))?;
                    continue;
                }
                let product = products::Repo::require(&db_tx, line.product_id).await?;
                order.push(line.product_id);
                stock.insert(line.product_id, (product, line.count));
            }

            for product_id in order {
                let Some((product, requested)) = stock.remove(&product_id) else {
                    continue;
                };
                if requested > product.count {
                    return Err(EngineError::insufficient_product_count(
                        &product.name,
                        requested,
                        product.count,
                    ));
                }
                let remaining = product.count - requested;
                let mut active = product.into_active_model();
                active.count = ActiveValue::Set(remaining);
                products::Repo::update(&db_tx, active, actor).await?;
            }

            let header = transactions::ActiveModel {
                user_id: ActiveValue::Set(user.id),
                total_amount: ActiveValue::Set(total.cents()),
                date: ActiveValue::Set(date),
                ..Default::default()
            };
            let header = transactions::Repo::insert(&db_tx, header, actor).await?;

            let mut items = Vec::with_capacity(lines.len());
            for line in &lines {
                let active = transaction_items::ActiveModel {
                    transaction_id: ActiveValue::Set(header.id),
                    product_id: ActiveValue::Set(line.product_id),
                    count: ActiveValue::Set(line.count),
                    amount: ActiveValue::Set(line.amount.cents()),
                    total_amount: ActiveValue::Set(line.total_amount.cents()),
                    ..Default::default()
                };
                let model = transaction_items::Repo::insert(&db_tx, active, actor).await?;
                items.push(TransactionItem::from(model));
            }

            tracing::info!(
                transaction_id = header.id,
                user_id = user.id,
                items = items.len(),
                total = %total,
                "transaction created"
            );
            Ok(Transaction::from_parts(header, items))
        })
    }

    /// Sale header with its items, read in one database transaction.
    pub async fn transaction(&self, id: i64) -> ResultEngine<Transaction> {
        with_tx!(self, |db_tx| {
            let header = transactions::Repo::require(&db_tx, id).await?;
            let items = Self::items_by_transaction(&db_tx, vec![id])
                .await?
                .remove(&id)
                .unwrap_or_default();
            Ok(Transaction::from_parts(header, items))
        })
    }

    /// Every sale in the shop. Only an ADMIN caller may list them.
    pub async fn list_transactions(
        &self,
        caller_id: i64,
        page: &PageRequest,
    ) -> ResultEngine<Page<Transaction>> {
        with_tx!(self, |db_tx| {
            users::Repo::require_admin(&db_tx, caller_id).await?;
            let page = transactions::Repo::find_all_not_deleted_page(&db_tx, page).await?;
            Self::transaction_page(&db_tx, page).await
        })
    }

    /// Sales of `user_id`, as seen by `caller_id`.
    ///
    /// Anyone may list their own sales; listing another user's sales
    /// requires the ADMIN role.
    pub async fn list_transactions_by_user(
        &self,
        caller_id: i64,
        user_id: i64,
        page: &PageRequest,
    ) -> ResultEngine<Page<Transaction>> {
        with_tx!(self, |db_tx| {
            if caller_id != user_id {
                users::Repo::require_admin(&db_tx, caller_id).await?;
            }
            let user = users::Repo::require(&db_tx, user_id).await?;

            let query =
                transactions::Repo::not_deleted().filter(transactions::Column::UserId.eq(user.id));
            let page = transactions::Repo::page(&db_tx, query, page).await?;
            Self::transaction_page(&db_tx, page).await
        })
    }

    /// Sales of every user dated between `from` and `to`, both days
    /// included (UTC). Only an ADMIN caller may list them.
    pub async fn list_transactions_by_date_range(
        &self,
        caller_id: i64,
        from: NaiveDate,
        to: NaiveDate,
        page: &PageRequest,
    ) -> ResultEngine<Page<Transaction>> {
        let (start, end) = day_range(from, to, ErrorCode::InvalidTransactionDate)?;
        with_tx!(self, |db_tx| {
            users::Repo::require_admin(&db_tx, caller_id).await?;
            let query = transactions::Repo::not_deleted()
                .filter(transactions::Column::Date.gte(start))
                .filter(transactions::Column::Date.lt(end));
            let page = transactions::Repo::page(&db_tx, query, page).await?;
            Self::transaction_page(&db_tx, page).await
        })
    }

    /// Trash a sale together with its items and put the sold quantities
    /// back in stock.
    pub async fn delete_transaction(&self, id: i64, actor: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            transactions::Repo::trash(&db_tx, id, actor)
                .await?
                .ok_or(EngineError::NotFound(ErrorCode::TransactionNotFound))?;

            let item_ids: Vec<i64> = transaction_items::Repo::not_deleted()
                .filter(transaction_items::Column::TransactionId.eq(id))
                .order_by_asc(transaction_items::Column::Id)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(|model| model.id)
                .collect();

            let trashed = transaction_items::Repo::trash_list(&db_tx, &item_ids, actor).await?;
            for item in trashed.into_iter().flatten() {
                let Some(product) = products::Repo::find_by_id(&db_tx, item.product_id).await?
                else {
                    continue;
                };
                let restored = product
                    .count
                    .checked_add(item.count)
                    .ok_or_else(|| EngineError::invalid_product_count(item.count))?;
                let mut active = product.into_active_model();
                active.count = ActiveValue::Set(restored);
                products::Repo::update(&db_tx, active, actor).await?;
            }

            tracing::info!(transaction_id = id, items = item_ids.len(), "transaction trashed");
            Ok(())
        })
    }
}
