//! Payment workflow.
//!
//! A payment tops up the user balance. The payment row and the balance
//! change are always written together, and undone together on delete.

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveValue, IntoActiveModel, QueryFilter, QuerySelect, TransactionTrait, prelude::*,
};

use crate::{
    EngineError, ErrorCode, Money, Page, PageRequest, Payment, PaymentNew, ResultEngine,
    payment_transactions, users,
};

use super::{Engine, day_range, with_tx};

/// Smallest accepted payment.
pub const MIN_PAYMENT_AMOUNT: Money = Money::new(100);

fn overflow(balance: Money) -> EngineError {
    EngineError::invalid_input("balance", &format!("balance {balance} out of range"))
}

impl Engine {
    /// Record a payment and credit it to the user balance.
    pub async fn create_payment(&self, cmd: PaymentNew, actor: &str) -> ResultEngine<Payment> {
        if cmd.amount < MIN_PAYMENT_AMOUNT {
            return Err(EngineError::invalid_payment_amount(cmd.amount));
        }
        let date = cmd.date.unwrap_or_else(Utc::now);

        with_tx!(self, |db_tx| {
            let user = users::Repo::require(&db_tx, cmd.user_id).await?;
            let current = Money::new(user.balance);
            let balance = current
                .checked_add(cmd.amount)
                .ok_or_else(|| overflow(current))?;
            let user_id = user.id;

            let mut active = user.into_active_model();
            active.balance = ActiveValue::Set(balance.cents());
            users::Repo::update(&db_tx, active, actor).await?;

            let payment = payment_transactions::ActiveModel {
                user_id: ActiveValue::Set(user_id),
                amount: ActiveValue::Set(cmd.amount.cents()),
                date: ActiveValue::Set(date),
                ..Default::default()
            };
            let model = payment_transactions::Repo::insert(&db_tx, payment, actor).await?;
            tracing::info!(
                payment_id = model.id,
                user_id,
                amount = %cmd.amount,
                balance = %balance,
                "payment created"
            );
            Ok(Payment::from(model))
        })
    }

    pub async fn payment(&self, id: i64) -> ResultEngine<Payment> {
        payment_transactions::Repo::find_by_id_not_deleted(&self.database, id)
            .await?
            .map(Payment::from)
            .ok_or(EngineError::NotFound(ErrorCode::PaymentTransactionNotFound))
    }

    pub async fn list_payments(&self, page: &PageRequest) -> ResultEngine<Page<Payment>> {
        Ok(
            payment_transactions::Repo::find_all_not_deleted_page(&self.database, page)
                .await?
                .map(Payment::from),
        )
    }

    pub async fn payments_by_user(
        &self,
        user_id: i64,
        page: &PageRequest,
    ) -> ResultEngine<Page<Payment>> {
        users::Repo::require(&self.database, user_id).await?;
        let query = payment_transactions::Repo::not_deleted()
            .filter(payment_transactions::Column::UserId.eq(user_id));
        Ok(payment_transactions::Repo::page(&self.database, query, page)
            .await?
            .map(Payment::from))
    }

    /// Payments dated on `date` (UTC).
    pub async fn payments_by_date(
        &self,
        date: NaiveDate,
        page: &PageRequest,
    ) -> ResultEngine<Page<Payment>> {
        self.payments_by_date_range(date, date, page).await
    }

    /// Payments dated between `from` and `to`, both days included (UTC).
    pub async fn payments_by_date_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        page: &PageRequest,
    ) -> ResultEngine<Page<Payment>> {
        let (start, end) = day_range(from, to, ErrorCode::InvalidPaymentDate)?;
        let query = payment_transactions::Repo::not_deleted()
            .filter(payment_transactions::Column::Date.gte(start))
            .filter(payment_transactions::Column::Date.lt(end));
        Ok(payment_transactions::Repo::page(&self.database, query, page)
            .await?
            .map(Payment::from))
    }

    /// Sum of the user's live payments.
    pub async fn total_payment_by_user(&self, user_id: i64) -> ResultEngine<Money> {
        users::Repo::require(&self.database, user_id).await?;
        let amounts: Vec<i64> = payment_transactions::Repo::not_deleted()
            .filter(payment_transactions::Column::UserId.eq(user_id))
            .select_only()
            .column(payment_transactions::Column::Amount)
            .into_tuple()
            .all(&self.database)
            .await?;
        Money::try_sum(amounts.into_iter().map(Money::new))
    }

    /// Trash a payment and take its amount back out of the user balance.
    pub async fn delete_payment(&self, id: i64, actor: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let payment = payment_transactions::Repo::trash(&db_tx, id, actor)
                .await?
                .ok_or(EngineError::NotFound(ErrorCode::PaymentTransactionNotFound))?;

            // The owner may be trashed already; its balance is still kept consistent.
            let user = users::Repo::find_by_id(&db_tx, payment.user_id)
                .await?
                .ok_or(EngineError::NotFound(ErrorCode::UserNotFound))?;
            let current = Money::new(user.balance);
            let amount = Money::new(payment.amount);
            let balance = current
                .checked_sub(amount)
                .ok_or_else(|| overflow(current))?;
            if balance.is_negative() {
                return Err(EngineError::insufficient_user_balance(
                    &user.username,
                    current,
                    amount,
                ));
            }

            let mut active = user.into_active_model();
            active.balance = ActiveValue::Set(balance.cents());
            users::Repo::update(&db_tx, active, actor).await?;

            tracing::info!(
                payment_id = id,
                user_id = payment.user_id,
                balance = %balance,
                "payment trashed"
            );
            Ok(())
        })
    }
}
