//! End-to-end resolution against a live MySQL database.
//!
//! Run with `cargo test -- --ignored` and a `TEST_DATABASE_URL` pointing
//! at a disposable database.

use std::path::PathBuf;
use std::{env, fs};

use anyhow::{Context, Result};
use sqlx::mysql::MySqlPoolOptions;
use sqlx::{MySqlPool, Row};

use rowsmith::{SynthesisOptions, create_id, get_or_create_id};

fn database_url() -> Result<String> {
    env::var("TEST_DATABASE_URL")
        .or_else(|_| env::var("DATABASE_URL"))
        .context("set TEST_DATABASE_URL or DATABASE_URL for integration tests")
}

async fn connect() -> Result<MySqlPool> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let db_url = database_url()?;
    MySqlPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(std::time::Duration::from_secs(10))
        .connect(&db_url)
        .await
        .context("connecting to MySQL")
}

async fn reset_fixtures(pool: &MySqlPool) -> Result<()> {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../rowsmith-introspect/tests/fixtures/sql/mysql/001_schema.sql");
    let script = fs::read_to_string(&path)
        .with_context(|| format!("reading fixture {}", path.display()))?;

    for statement in script.split(';') {
        let sql = statement.trim();
        if sql.is_empty() {
            continue;
        }
        sqlx::query(sql)
            .execute(pool)
            .await
            .with_context(|| format!("executing fixture {}", path.display()))?;
    }

    Ok(())
}

async fn count_rows(pool: &MySqlPool, table: &str) -> Result<i64> {
    let row = sqlx::query(&format!("SELECT COUNT(*) AS n FROM `{table}`"))
        .fetch_one(pool)
        .await?;
    Ok(row.try_get("n")?)
}

#[tokio::test]
#[ignore = "requires a MySQL server; set TEST_DATABASE_URL"]
async fn creates_a_product_with_valid_columns() -> Result<()> {
    let pool = connect().await?;
    reset_fixtures(&pool).await?;

    let id: i64 = create_id(&pool, "Products", SynthesisOptions::new()).await?;
    assert!(id > 0);

    let row = sqlx::query("SELECT Name, Subtitle, SKU FROM Products WHERE Id = ?")
        .bind(id)
        .fetch_one(&pool)
        .await?;

    let name: String = row.try_get("Name")?;
    assert!(!name.trim().is_empty());

    let subtitle: Option<String> = row.try_get("Subtitle")?;
    assert!(subtitle.is_none());

    let sku: String = row.try_get("SKU")?;
    assert_eq!(sku.chars().count(), 12);

    Ok(())
}

#[tokio::test]
#[ignore = "requires a MySQL server; set TEST_DATABASE_URL"]
async fn get_or_create_reuses_rows_until_forced() -> Result<()> {
    let pool = connect().await?;
    reset_fixtures(&pool).await?;

    let first: i64 = get_or_create_id(&pool, "Users", SynthesisOptions::new()).await?;
    let second: i64 = get_or_create_id(&pool, "Users", SynthesisOptions::new()).await?;
    assert_eq!(first, second);
    assert_eq!(count_rows(&pool, "Users").await?, 1);

    let third: i64 = create_id(&pool, "Users", SynthesisOptions::new()).await?;
    assert_ne!(first, third);
    assert_eq!(count_rows(&pool, "Users").await?, 2);

    Ok(())
}

#[tokio::test]
#[ignore = "requires a MySQL server; set TEST_DATABASE_URL"]
async fn orders_resolve_their_foreign_keys() -> Result<()> {
    let pool = connect().await?;
    reset_fixtures(&pool).await?;

    let order_id: i64 = create_id(&pool, "Orders", SynthesisOptions::new()).await?;

    let row = sqlx::query("SELECT UserId, ProductId, Currency FROM Orders WHERE Id = ?")
        .bind(order_id)
        .fetch_one(&pool)
        .await?;

    let user_id: i64 = row.try_get("UserId")?;
    let product_id: i64 = row.try_get("ProductId")?;
    let currency: String = row.try_get("Currency")?;
    assert_eq!(currency, "USD");
    assert_eq!(count_rows(&pool, "Users").await?, 1);
    assert_eq!(count_rows(&pool, "Products").await?, 1);

    let user_exists = sqlx::query("SELECT Id FROM Users WHERE Id = ?")
        .bind(user_id)
        .fetch_optional(&pool)
        .await?;
    assert!(user_exists.is_some());

    let product_exists = sqlx::query("SELECT Id FROM Products WHERE Id = ?")
        .bind(product_id)
        .fetch_optional(&pool)
        .await?;
    assert!(product_exists.is_some());

    Ok(())
}

#[tokio::test]
#[ignore = "requires a MySQL server; set TEST_DATABASE_URL"]
async fn self_referential_nodes_terminate() -> Result<()> {
    let pool = connect().await?;
    reset_fixtures(&pool).await?;

    let bare: i64 = create_id(&pool, "Nodes", SynthesisOptions::new()).await?;
    let parent_of_bare = sqlx::query("SELECT ParentId FROM Nodes WHERE Id = ?")
        .bind(bare)
        .fetch_one(&pool)
        .await?;
    let parent: Option<i64> = parent_of_bare.try_get("ParentId")?;
    assert!(parent.is_none());

    let populated: i64 = create_id(
        &pool,
        "Nodes",
        SynthesisOptions::new().force_populate_optional_columns(),
    )
    .await?;
    let row = sqlx::query("SELECT ParentId FROM Nodes WHERE Id = ?")
        .bind(populated)
        .fetch_one(&pool)
        .await?;
    let parent: Option<i64> = row.try_get("ParentId")?;
    let parent = parent.expect("populated node should have a parent");

    let grandparent = sqlx::query("SELECT ParentId FROM Nodes WHERE Id = ?")
        .bind(parent)
        .fetch_one(&pool)
        .await?;
    let grandparent: Option<i64> = grandparent.try_get("ParentId")?;
    assert!(grandparent.is_none(), "recursion must stop at depth 1");

    Ok(())
}

#[tokio::test]
#[ignore = "requires a MySQL server; set TEST_DATABASE_URL"]
async fn unique_emails_survive_repeated_creation() -> Result<()> {
    let pool = connect().await?;
    reset_fixtures(&pool).await?;

    for _ in 0..200 {
        let _: i64 = create_id(&pool, "Users", SynthesisOptions::new()).await?;
    }

    let distinct: i64 = sqlx::query("SELECT COUNT(DISTINCT Email) AS n FROM Users")
        .fetch_one(&pool)
        .await?
        .try_get("n")?;
    assert_eq!(distinct, 200);

    Ok(())
}
