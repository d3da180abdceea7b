use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use sea_orm::DatabaseConnection;

use crate::{EngineError, ErrorCode, ResultEngine};

mod categories;
mod payments;
mod products;
mod transaction_items;
mod transactions;
mod users;

pub use payments::MIN_PAYMENT_AMOUNT;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

/// Half-open UTC interval `[from 00:00, to + 1 day 00:00)` covering both
/// calendar days.
fn day_range(
    from: NaiveDate,
    to: NaiveDate,
    code: ErrorCode,
) -> ResultEngine<(DateTime<Utc>, DateTime<Utc>)> {
    let invalid = || EngineError::invalid_date_range(code, &from.to_string(), &to.to_string());
    if from > to {
        return Err(invalid());
    }
    let end = to.checked_add_days(Days::new(1)).ok_or_else(invalid)?;
    Ok((
        from.and_time(NaiveTime::MIN).and_utc(),
        end.and_time(NaiveTime::MIN).and_utc(),
    ))
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_range_includes_both_days() {
        let from = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let (start, end) = day_range(from, to, ErrorCode::InvalidTransactionDate).unwrap();
        assert_eq!(start.to_rfc3339(), "2026-03-01T00:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2026-03-03T00:00:00+00:00");
    }

    #[test]
    fn day_range_rejects_reversed_bounds() {
        let from = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let to = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let err = day_range(from, to, ErrorCode::InvalidPaymentDate).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidPaymentDate);
        assert_eq!(err.args(), vec!["2026-03-02", "2026-03-01"]);
    }
}
