//! Shop schema.
//!
//! Every table shares the same base columns:
//!
//! - `id`: surrogate integer key
//! - `created_at` / `modified_at`: set by the engine repository
//! - `created_by` / `modified_by`: acting identity, set by the engine repository
//! - `deleted`: soft-delete flag, indexed because every read filters on it
//!
//! Tables:
//!
//! - `categories`
//! - `products` -> `categories`
//! - `users`
//! - `transactions` -> `users`
//! - `transaction_items` -> `transactions`, `products`
//! - `user_payment_transactions` -> `users`

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Base {
    Id,
    CreatedAt,
    ModifiedAt,
    CreatedBy,
    ModifiedBy,
    Deleted,
}

#[derive(Iden)]
enum Categories {
    Table,
    Name,
    SortOrder,
    Description,
}

#[derive(Iden)]
enum Products {
    Table,
    Name,
    Count,
    CategoryId,
}

#[derive(Iden)]
enum Users {
    Table,
    Username,
    FullName,
    Balance,
    Role,
}

#[derive(Iden)]
enum Transactions {
    Table,
    UserId,
    TotalAmount,
    Date,
}

#[derive(Iden)]
enum TransactionItems {
    Table,
    TransactionId,
    ProductId,
    Count,
    Amount,
    TotalAmount,
}

#[derive(Iden)]
enum UserPaymentTransactions {
    Table,
    UserId,
    Amount,
    Date,
}

/// Table skeleton carrying the shared id/audit/soft-delete columns.
fn base_table<T: IntoIden + 'static>(table: T) -> TableCreateStatement {
    Table::create()
        .table(table)
        .if_not_exists()
        .col(
            ColumnDef::new(Base::Id)
                .integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(ColumnDef::new(Base::CreatedAt).timestamp().not_null())
        .col(ColumnDef::new(Base::ModifiedAt).timestamp().not_null())
        .col(ColumnDef::new(Base::CreatedBy).string())
        .col(ColumnDef::new(Base::ModifiedBy).string())
        .col(
            ColumnDef::new(Base::Deleted)
                .boolean()
                .not_null()
                .default(false),
        )
        .to_owned()
}

fn index<T, C>(name: &str, table: T, column: C) -> IndexCreateStatement
where
    T: IntoIden + 'static,
    C: IntoIden + 'static,
{
    Index::create()
        .name(name)
        .table(table)
        .col(column)
        .if_not_exists()
        .to_owned()
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Categories
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                base_table(Categories::Table)
                    .col(ColumnDef::new(Categories::Name).string().not_null())
                    .col(
                        ColumnDef::new(Categories::SortOrder)
                            .big_integer()
                            .not_null()
                            .default(100),
                    )
                    .col(ColumnDef::new(Categories::Description).string())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Products
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                base_table(Products::Table)
                    .col(ColumnDef::new(Products::Name).string().not_null())
                    .col(
                        ColumnDef::new(Products::Count)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Products::CategoryId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-products-category_id")
                            .from(Products::Table, Products::CategoryId)
                            .to(Categories::Table, Base::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                base_table(Users::Table)
                    .col(ColumnDef::new(Users::Username).string().not_null())
                    .col(ColumnDef::new(Users::FullName).string())
                    .col(
                        ColumnDef::new(Users::Balance)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Users::Role).string_len(32).not_null())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Transactions
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                base_table(Transactions::Table)
                    .col(ColumnDef::new(Transactions::UserId).integer().not_null())
                    .col(
                        ColumnDef::new(Transactions::TotalAmount)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::Date).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-user_id")
                            .from(Transactions::Table, Transactions::UserId)
                            .to(Users::Table, Base::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Transaction items
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                base_table(TransactionItems::Table)
                    .col(
                        ColumnDef::new(TransactionItems::TransactionId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TransactionItems::ProductId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TransactionItems::Count)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TransactionItems::Amount)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TransactionItems::TotalAmount)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transaction_items-transaction_id")
                            .from(TransactionItems::Table, TransactionItems::TransactionId)
                            .to(Transactions::Table, Base::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transaction_items-product_id")
                            .from(TransactionItems::Table, TransactionItems::ProductId)
                            .to(Products::Table, Base::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. User payment transactions
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                base_table(UserPaymentTransactions::Table)
                    .col(
                        ColumnDef::new(UserPaymentTransactions::UserId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserPaymentTransactions::Amount)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserPaymentTransactions::Date)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-user_payment_transactions-user_id")
                            .from(
                                UserPaymentTransactions::Table,
                                UserPaymentTransactions::UserId,
                            )
                            .to(Users::Table, Base::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // Indexes
        // ───────────────────────────────────────────────────────────────────
        let indexes = [
            index("idx-categories-deleted", Categories::Table, Base::Deleted),
            index("idx-categories-name", Categories::Table, Categories::Name),
            index("idx-products-deleted", Products::Table, Base::Deleted),
            index("idx-products-category_id", Products::Table, Products::CategoryId),
            index("idx-products-name", Products::Table, Products::Name),
            index("idx-users-deleted", Users::Table, Base::Deleted),
            index("idx-users-username", Users::Table, Users::Username),
            index("idx-transactions-deleted", Transactions::Table, Base::Deleted),
            index("idx-transactions-user_id", Transactions::Table, Transactions::UserId),
            index("idx-transactions-date", Transactions::Table, Transactions::Date),
            index(
                "idx-transaction_items-deleted",
                TransactionItems::Table,
                Base::Deleted,
            ),
            index(
                "idx-transaction_items-transaction_id",
                TransactionItems::Table,
                TransactionItems::TransactionId,
            ),
            index(
                "idx-transaction_items-product_id",
                TransactionItems::Table,
                TransactionItems::ProductId,
            ),
            index(
                "idx-user_payment_transactions-deleted",
                UserPaymentTransactions::Table,
                Base::Deleted,
            ),
            index(
                "idx-user_payment_transactions-user_id",
                UserPaymentTransactions::Table,
                UserPaymentTransactions::UserId,
            ),
            index(
                "idx-user_payment_transactions-date",
                UserPaymentTransactions::Table,
                UserPaymentTransactions::Date,
            ),
        ];
        for statement in indexes {
            manager.create_index(statement).await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(UserPaymentTransactions::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .table(TransactionItems::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(Transactions::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Products::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}
