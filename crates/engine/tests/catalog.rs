use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{
    CategoryNew, CategoryPatch, Engine, EngineError, ErrorCode, ErrorKind, PageRequest,
    ProductNew, ProductPatch,
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

async fn deleted_flag(db: &DatabaseConnection, table: &str, id: i64) -> Option<bool> {
    let backend = db.get_database_backend();
    let row = db
        .query_one(Statement::from_sql_and_values(
            backend,
            format!("SELECT deleted FROM {table} WHERE id = ?"),
            vec![id.into()],
        ))
        .await
        .unwrap()?;
    Some(row.try_get::<bool>("", "deleted").unwrap())
}

#[tokio::test]
async fn duplicate_category_name_is_rejected() {
    let (engine, _db) = engine_with_db().await;

    engine
        .create_category(CategoryNew::new("Fruit").order(1), "alice")
        .await
        .unwrap();
    let err = engine
        .create_category(CategoryNew::new("  Fruit "), "alice")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::AlreadyExists);
    assert_eq!(err.code(), ErrorCode::CategoryAlreadyExists);
    assert_eq!(err.args(), vec!["Fruit"]);
}

#[tokio::test]
async fn trashed_category_name_can_be_reused() {
    let (engine, db) = engine_with_db().await;

    let first = engine
        .create_category(CategoryNew::new("Fruit"), "alice")
        .await
        .unwrap();
    engine.delete_category(first.id, "alice").await.unwrap();

    let second = engine
        .create_category(CategoryNew::new("Fruit"), "alice")
        .await
        .unwrap();
    assert_ne!(first.id, second.id);

    // The trashed row is still stored.
    assert_eq!(deleted_flag(&db, "categories", first.id).await, Some(true));
    assert_eq!(deleted_flag(&db, "categories", second.id).await, Some(false));
}

#[tokio::test]
async fn trashed_category_is_not_found() {
    let (engine, _db) = engine_with_db().await;

    let fruit = engine
        .create_category(CategoryNew::new("Fruit"), "alice")
        .await
        .unwrap();
    engine.delete_category(fruit.id, "alice").await.unwrap();

    let err = engine.category(fruit.id).await.unwrap_err();
    assert_eq!(err, EngineError::NotFound(ErrorCode::CategoryNotFound));

    // A second delete does not reach the trashed row either.
    let err = engine.delete_category(fruit.id, "alice").await.unwrap_err();
    assert_eq!(err, EngineError::NotFound(ErrorCode::CategoryNotFound));

    let page = engine
        .list_categories(&PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.total_items, 0);
    assert!(engine.category_by_name("Fruit").await.unwrap().is_none());
}

#[tokio::test]
async fn category_in_use_cannot_be_deleted() {
    let (engine, _db) = engine_with_db().await;

    let fruit = engine
        .create_category(CategoryNew::new("Fruit"), "alice")
        .await
        .unwrap();
    let apple = engine
        .create_product(ProductNew::new("Apple", 10, fruit.id), "alice")
        .await
        .unwrap();

    let err = engine.delete_category(fruit.id, "alice").await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::CategoryInUse);
    assert_eq!(err.args(), vec!["Fruit"]);

    engine.delete_product(apple.id, "alice").await.unwrap();
    engine.delete_category(fruit.id, "alice").await.unwrap();
}

#[tokio::test]
async fn categories_by_order_sort_on_order_then_name() {
    let (engine, _db) = engine_with_db().await;

    engine
        .create_category(CategoryNew::new("Drinks"), "alice")
        .await
        .unwrap();
    engine
        .create_category(CategoryNew::new("Fruit").order(1), "alice")
        .await
        .unwrap();
    engine
        .create_category(CategoryNew::new("Bakery"), "alice")
        .await
        .unwrap();

    let names: Vec<String> = engine
        .list_categories_by_order()
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["Fruit", "Bakery", "Drinks"]);
}

#[tokio::test]
async fn category_update_is_partial() {
    let (engine, _db) = engine_with_db().await;

    let fruit = engine
        .create_category(CategoryNew::new("Fruit").order(1).description("fresh"), "alice")
        .await
        .unwrap();
    engine
        .create_category(CategoryNew::new("Vegetables"), "alice")
        .await
        .unwrap();

    let updated = engine
        .update_category(fruit.id, CategoryPatch::default().order(5), "bob")
        .await
        .unwrap();
    assert_eq!(updated.name, "Fruit");
    assert_eq!(updated.order, 5);
    assert_eq!(updated.description.as_deref(), Some("fresh"));

    let err = engine
        .update_category(fruit.id, CategoryPatch::default().name("Vegetables"), "bob")
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::CategoryAlreadyExists);

    // Renaming to its own name is not a conflict.
    let same = engine
        .update_category(fruit.id, CategoryPatch::default().name("Fruit"), "bob")
        .await
        .unwrap();
    assert_eq!(same.name, "Fruit");
}

#[tokio::test]
async fn product_requires_live_category() {
    let (engine, _db) = engine_with_db().await;

    let err = engine
        .create_product(ProductNew::new("Apple", 10, 42), "alice")
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::NotFound(ErrorCode::CategoryNotFound));

    let fruit = engine
        .create_category(CategoryNew::new("Fruit"), "alice")
        .await
        .unwrap();
    engine.delete_category(fruit.id, "alice").await.unwrap();

    let err = engine
        .create_product(ProductNew::new("Apple", 10, fruit.id), "alice")
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::CategoryNotFound);
}

#[tokio::test]
async fn negative_product_count_is_rejected() {
    let (engine, _db) = engine_with_db().await;

    let fruit = engine
        .create_category(CategoryNew::new("Fruit"), "alice")
        .await
        .unwrap();
    let err = engine
        .create_product(ProductNew::new("Apple", -1, fruit.id), "alice")
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidProductCount);
    assert_eq!(err.kind(), ErrorKind::InvalidInput);

    let apple = engine
        .create_product(ProductNew::new("Apple", 3, fruit.id), "alice")
        .await
        .unwrap();
    let err = engine
        .update_product(apple.id, ProductPatch::default().count(-5), "alice")
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidProductCount);
    assert_eq!(engine.product(apple.id).await.unwrap().count, 3);
}

#[tokio::test]
async fn product_queries_embed_category_and_skip_trashed() {
    let (engine, _db) = engine_with_db().await;

    let fruit = engine
        .create_category(CategoryNew::new("Fruit"), "alice")
        .await
        .unwrap();
    let drinks = engine
        .create_category(CategoryNew::new("Drinks"), "alice")
        .await
        .unwrap();
    let apple = engine
        .create_product(ProductNew::new("Apple", 10, fruit.id), "alice")
        .await
        .unwrap();
    engine
        .create_product(ProductNew::new("Pear", 0, fruit.id), "alice")
        .await
        .unwrap();
    let water = engine
        .create_product(ProductNew::new("Water", 4, drinks.id), "alice")
        .await
        .unwrap();
    assert_eq!(apple.category.name, "Fruit");

    let available: Vec<String> = engine
        .available_products()
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(available, vec!["Apple", "Water"]);

    let in_fruit = engine.products_by_category(fruit.id).await.unwrap();
    assert_eq!(in_fruit.len(), 2);
    assert!(in_fruit.iter().all(|p| p.category.id == fruit.id));

    let by_name = engine.products_by_name("Water").await.unwrap();
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0].category.name, "Drinks");

    engine.delete_product(water.id, "alice").await.unwrap();
    assert_eq!(
        engine.product(water.id).await.unwrap_err(),
        EngineError::NotFound(ErrorCode::ProductNotFound)
    );
    assert_eq!(engine.list_products().await.unwrap().len(), 2);

    let page = engine
        .products_by_category_page(fruit.id, &PageRequest::new(0, 1))
        .await
        .unwrap();
    assert_eq!(page.total_items, 2);
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.items[0].id, apple.id);

    let page = engine
        .list_products_page(&PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.total_items, 2);
}

#[tokio::test]
async fn product_update_moves_to_live_category_only() {
    let (engine, _db) = engine_with_db().await;

    let fruit = engine
        .create_category(CategoryNew::new("Fruit"), "alice")
        .await
        .unwrap();
    let sale = engine
        .create_category(CategoryNew::new("Sale"), "alice")
        .await
        .unwrap();
    let gone = engine
        .create_category(CategoryNew::new("Gone"), "alice")
        .await
        .unwrap();
    engine.delete_category(gone.id, "alice").await.unwrap();

    let apple = engine
        .create_product(ProductNew::new("Apple", 10, fruit.id), "alice")
        .await
        .unwrap();

    let err = engine
        .update_product(apple.id, ProductPatch::default().category_id(gone.id), "alice")
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::CategoryNotFound);

    let moved = engine
        .update_product(
            apple.id,
            ProductPatch::default().category_id(sale.id).name("Red apple"),
            "alice",
        )
        .await
        .unwrap();
    assert_eq!(moved.category.id, sale.id);
    assert_eq!(moved.name, "Red apple");
    assert_eq!(moved.count, 10);
}
