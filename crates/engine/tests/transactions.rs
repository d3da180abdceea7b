use chrono::{NaiveDate, TimeZone, Utc};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{
    CategoryNew, Engine, EngineError, ErrorCode, ErrorKind, Money, PageRequest, ProductNew,
    ProductPatch, Role, TransactionNew, User, UserNew,
};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

async fn count_rows(db: &DatabaseConnection, table: &str) -> i64 {
    let backend = db.get_database_backend();
    let row = db
        .query_one(Statement::from_string(
            backend,
            format!("SELECT COUNT(*) AS n FROM {table}"),
        ))
        .await
        .unwrap()
        .unwrap();
    row.try_get::<i64>("", "n").unwrap()
}

struct Shop {
    bob: User,
    apple: i64,
    pear: i64,
}

/// Fruit category with Apple (10 in stock) and Pear (5 in stock), plus user bob.
async fn shop(engine: &Engine) -> Shop {
    let fruit = engine
        .create_category(CategoryNew::new("Fruit").order(1), "alice")
        .await
        .unwrap();
    let apple = engine
        .create_product(ProductNew::new("Apple", 10, fruit.id), "alice")
        .await
        .unwrap();
    let pear = engine
        .create_product(ProductNew::new("Pear", 5, fruit.id), "alice")
        .await
        .unwrap();
    let bob = engine
        .create_user(UserNew::new("bob"), "alice")
        .await
        .unwrap();
    Shop {
        bob,
        apple: apple.id,
        pear: pear.id,
    }
}

#[tokio::test]
async fn sale_total_is_exact_sum_of_lines() {
    let (engine, _db) = engine_with_db().await;
    let shop = shop(&engine).await;

    let tx = engine
        .create_transaction(
            TransactionNew::new(shop.bob.id).item(shop.apple, 2, "3.50".parse().unwrap()),
            "bob",
        )
        .await
        .unwrap();

    assert_eq!(tx.total_amount, Money::new(7_00));
    assert_eq!(tx.total_amount.to_string(), "7.00");
    assert_eq!(tx.items.len(), 1);
    assert_eq!(tx.items[0].total_amount, Money::new(7_00));
    assert_eq!(tx.items[0].transaction_id, tx.id);

    let loaded = engine.transaction(tx.id).await.unwrap();
    assert_eq!(loaded, tx);
}

#[tokio::test]
async fn cents_do_not_drift() {
    let (engine, _db) = engine_with_db().await;
    let shop = shop(&engine).await;

    let tx = engine
        .create_transaction(
            TransactionNew::new(shop.bob.id)
                .item(shop.apple, 3, "0.10".parse().unwrap())
                .item(shop.pear, 1, "0.20".parse().unwrap()),
            "bob",
        )
        .await
        .unwrap();

    let sum: Money = tx.items.iter().map(|i| i.total_amount).sum();
    assert_eq!(tx.total_amount, sum);
    assert_eq!(tx.total_amount, Money::new(50));
}

#[tokio::test]
async fn missing_product_rolls_back_everything() {
    let (engine, db) = engine_with_db().await;
    let shop = shop(&engine).await;

    let err = engine
        .create_transaction(
            TransactionNew::new(shop.bob.id)
                .item(shop.apple, 2, Money::new(3_50))
                .item(999, 1, Money::new(1_00)),
            "bob",
        )
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::NotFound(ErrorCode::ProductNotFound));

    assert_eq!(count_rows(&db, "transactions").await, 0);
    assert_eq!(count_rows(&db, "transaction_items").await, 0);
    assert_eq!(engine.product(shop.apple).await.unwrap().count, 10);
}

#[tokio::test]
async fn trashed_product_cannot_be_sold() {
    let (engine, db) = engine_with_db().await;
    let shop = shop(&engine).await;
    engine.delete_product(shop.pear, "alice").await.unwrap();

    let err = engine
        .create_transaction(
            TransactionNew::new(shop.bob.id)
                .item(shop.apple, 1, Money::new(1_00))
                .item(shop.pear, 1, Money::new(1_00)),
            "bob",
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::ProductNotFound);
    assert_eq!(count_rows(&db, "transactions").await, 0);
}

#[tokio::test]
async fn unknown_user_is_rejected() {
    let (engine, _db) = engine_with_db().await;
    let shop = shop(&engine).await;

    let err = engine
        .create_transaction(
            TransactionNew::new(999).item(shop.apple, 1, Money::new(1_00)),
            "bob",
        )
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::NotFound(ErrorCode::UserNotFound));

    // The user is resolved before the lines are validated.
    let err = engine
        .create_transaction(
            TransactionNew::new(999).item(shop.apple, 0, Money::new(1_00)),
            "bob",
        )
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::NotFound(ErrorCode::UserNotFound));
}

#[tokio::test]
async fn late_stock_failure_undoes_earlier_decrements() {
    let (engine, db) = engine_with_db().await;
    let shop = shop(&engine).await;

    let err = engine
        .create_transaction(
            TransactionNew::new(shop.bob.id)
                .item(shop.apple, 2, Money::new(1_00))
                .item(shop.pear, 6, Money::new(1_00)),
            "bob",
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::InsufficientProductCount);
    assert_eq!(err.args(), vec!["Pear", "6", "5"]);

    assert_eq!(engine.product(shop.apple).await.unwrap().count, 10);
    assert_eq!(engine.product(shop.pear).await.unwrap().count, 5);
    assert_eq!(count_rows(&db, "transactions").await, 0);
    assert_eq!(count_rows(&db, "transaction_items").await, 0);
}

#[tokio::test]
async fn stock_is_checked_across_lines_and_decremented() {
    let (engine, db) = engine_with_db().await;
    let shop = shop(&engine).await;

    let err = engine
        .create_transaction(
            TransactionNew::new(shop.bob.id)
                .item(shop.pear, 3, Money::new(1_00))
                .item(shop.pear, 3, Money::new(1_00)),
            "bob",
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::InsufficientProductCount);
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert_eq!(err.args(), vec!["Pear", "6", "5"]);
    assert_eq!(count_rows(&db, "transactions").await, 0);

    engine
        .create_transaction(
            TransactionNew::new(shop.bob.id)
                .item(shop.pear, 2, Money::new(1_00))
                .item(shop.apple, 10, Money::new(1_00)),
            "bob",
        )
        .await
        .unwrap();
    assert_eq!(engine.product(shop.pear).await.unwrap().count, 3);
    assert_eq!(engine.product(shop.apple).await.unwrap().count, 0);
    assert!(engine
        .available_products()
        .await
        .unwrap()
        .iter()
        .all(|p| p.id != shop.apple));
}

#[tokio::test]
async fn sale_does_not_touch_user_balance() {
    let (engine, _db) = engine_with_db().await;
    let shop = shop(&engine).await;

    engine
        .create_transaction(
            TransactionNew::new(shop.bob.id).item(shop.apple, 1, Money::new(5_00)),
            "bob",
        )
        .await
        .unwrap();
    assert_eq!(engine.user(shop.bob.id).await.unwrap().balance, Money::ZERO);
}

#[tokio::test]
async fn invalid_lines_are_rejected_before_writing() {
    let (engine, db) = engine_with_db().await;
    let shop = shop(&engine).await;

    let err = engine
        .create_transaction(TransactionNew::new(shop.bob.id), "bob")
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidInput);

    let err = engine
        .create_transaction(
            TransactionNew::new(shop.bob.id).item(shop.apple, 0, Money::new(1_00)),
            "bob",
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidProductCount);

    let err = engine
        .create_transaction(
            TransactionNew::new(shop.bob.id).item(shop.apple, 1, Money::new(-1)),
            "bob",
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidTransactionAmount);

    assert_eq!(count_rows(&db, "transactions").await, 0);
}

#[tokio::test]
async fn only_admins_list_other_users_sales() {
    let (engine, _db) = engine_with_db().await;
    let shop = shop(&engine).await;
    let carol = engine
        .create_user(UserNew::new("carol"), "alice")
        .await
        .unwrap();
    let admin = engine
        .create_user(UserNew::new("root").role(Role::Admin), "alice")
        .await
        .unwrap();

    engine
        .create_transaction(
            TransactionNew::new(shop.bob.id).item(shop.apple, 1, Money::new(1_00)),
            "bob",
        )
        .await
        .unwrap();

    let own = engine
        .list_transactions_by_user(shop.bob.id, shop.bob.id, &PageRequest::default())
        .await
        .unwrap();
    assert_eq!(own.total_items, 1);
    assert_eq!(own.items[0].items.len(), 1);

    let err = engine
        .list_transactions_by_user(carol.id, shop.bob.id, &PageRequest::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);
    assert_eq!(err.code(), ErrorCode::UserNotAdmin);
    assert_eq!(err.args(), vec!["carol"]);

    let seen_by_admin = engine
        .list_transactions_by_user(admin.id, shop.bob.id, &PageRequest::default())
        .await
        .unwrap();
    assert_eq!(seen_by_admin, own);

    let err = engine
        .list_transactions_by_user(admin.id, 999, &PageRequest::default())
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::UserNotFound);
}

#[tokio::test]
async fn only_admins_list_every_sale() {
    let (engine, _db) = engine_with_db().await;
    let shop = shop(&engine).await;
    let admin = engine
        .create_user(UserNew::new("root").role(Role::Admin), "alice")
        .await
        .unwrap();

    engine
        .create_transaction(
            TransactionNew::new(shop.bob.id)
                .item(shop.apple, 1, Money::new(1_00))
                .date(Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()),
            "bob",
        )
        .await
        .unwrap();
    let day = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();

    let err = engine
        .list_transactions(shop.bob.id, &PageRequest::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);
    assert_eq!(err.code(), ErrorCode::UserNotAdmin);
    assert_eq!(err.args(), vec!["bob"]);

    let err = engine
        .list_transactions_by_date_range(shop.bob.id, day, day, &PageRequest::default())
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::UserNotAdmin);

    let err = engine
        .list_transactions(999, &PageRequest::default())
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::UserNotFound);

    let all = engine
        .list_transactions(admin.id, &PageRequest::default())
        .await
        .unwrap();
    assert_eq!(all.total_items, 1);
    let by_day = engine
        .list_transactions_by_date_range(admin.id, day, day, &PageRequest::default())
        .await
        .unwrap();
    assert_eq!(by_day, all);
}

#[tokio::test]
async fn restock_overflow_keeps_the_sale() {
    let (engine, _db) = engine_with_db().await;
    let shop = shop(&engine).await;

    let tx = engine
        .create_transaction(
            TransactionNew::new(shop.bob.id).item(shop.apple, 1, Money::new(1_00)),
            "bob",
        )
        .await
        .unwrap();
    engine
        .update_product(shop.apple, ProductPatch::default().count(i64::MAX), "alice")
        .await
        .unwrap();

    let err = engine.delete_transaction(tx.id, "alice").await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidProductCount);

    assert_eq!(engine.transaction(tx.id).await.unwrap(), tx);
    assert_eq!(engine.product(shop.apple).await.unwrap().count, i64::MAX);
}

#[tokio::test]
async fn delete_trashes_items_and_restocks() {
    let (engine, db) = engine_with_db().await;
    let shop = shop(&engine).await;

    let tx = engine
        .create_transaction(
            TransactionNew::new(shop.bob.id)
                .item(shop.apple, 4, Money::new(1_00))
                .item(shop.pear, 1, Money::new(2_00)),
            "bob",
        )
        .await
        .unwrap();
    assert_eq!(engine.product(shop.apple).await.unwrap().count, 6);

    engine.delete_transaction(tx.id, "alice").await.unwrap();

    assert_eq!(
        engine.transaction(tx.id).await.unwrap_err(),
        EngineError::NotFound(ErrorCode::TransactionNotFound)
    );
    for item in &tx.items {
        assert_eq!(
            engine.transaction_item(item.id).await.unwrap_err().code(),
            ErrorCode::TransactionItemNotFound
        );
    }
    assert_eq!(engine.product(shop.apple).await.unwrap().count, 10);
    assert_eq!(engine.product(shop.pear).await.unwrap().count, 5);

    // Rows are trashed, not removed.
    assert_eq!(count_rows(&db, "transactions").await, 1);
    assert_eq!(count_rows(&db, "transaction_items").await, 2);

    let err = engine.delete_transaction(tx.id, "alice").await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::TransactionNotFound);
}

#[tokio::test]
async fn date_range_is_inclusive() {
    let (engine, _db) = engine_with_db().await;
    let shop = shop(&engine).await;
    let admin = engine
        .create_user(UserNew::new("root").role(Role::Admin), "alice")
        .await
        .unwrap();

    for day in [1, 2, 3] {
        engine
            .create_transaction(
                TransactionNew::new(shop.bob.id)
                    .item(shop.apple, 1, Money::new(1_00))
                    .date(Utc.with_ymd_and_hms(2026, 3, day, 23, 59, 0).unwrap()),
                "bob",
            )
            .await
            .unwrap();
    }

    let from = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
    let to = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
    let page = engine
        .list_transactions_by_date_range(admin.id, from, to, &PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.total_items, 2);

    let err = engine
        .list_transactions_by_date_range(admin.id, to, from, &PageRequest::default())
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidTransactionDate);

    let all = engine
        .list_transactions(admin.id, &PageRequest::default())
        .await
        .unwrap();
    assert_eq!(all.total_items, 3);
    assert!(all.items.iter().all(|t| t.items.len() == 1));
}

#[tokio::test]
async fn transaction_items_are_readable_by_sale_and_product() {
    let (engine, _db) = engine_with_db().await;
    let shop = shop(&engine).await;

    let first = engine
        .create_transaction(
            TransactionNew::new(shop.bob.id)
                .item(shop.apple, 1, Money::new(1_00))
                .item(shop.pear, 1, Money::new(1_00)),
            "bob",
        )
        .await
        .unwrap();
    engine
        .create_transaction(
            TransactionNew::new(shop.bob.id).item(shop.apple, 2, Money::new(1_00)),
            "bob",
        )
        .await
        .unwrap();

    let lines = engine
        .transaction_items_by_transaction(first.id)
        .await
        .unwrap();
    assert_eq!(lines, first.items);

    let apple_lines = engine
        .transaction_items_by_product(shop.apple, &PageRequest::default())
        .await
        .unwrap();
    assert_eq!(apple_lines.total_items, 2);

    let all = engine
        .list_transaction_items(&PageRequest::new(0, 2))
        .await
        .unwrap();
    assert_eq!(all.total_items, 3);
    assert_eq!(all.total_pages, 2);

    let err = engine
        .transaction_items_by_transaction(999)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::TransactionNotFound);
}
