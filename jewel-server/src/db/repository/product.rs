//! Product Repository

use super::{RepoError, RepoResult, category, like_pattern};
use shared::ErrorCode;
use shared::filter::search_text;
use shared::models::{Product, ProductCreate, ProductStatus, ProductUpdate};
use shared::request::AdminProductQuery;
use shared::util::now_millis;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

const COLUMNS: &str = "id, name, code, description, category_id, price, stock, status, is_featured, is_digital, show_in_store, show_in_catalog, created_at, updated_at";

/// Unique violations on `code` become a catalog conflict
fn code_conflict(err: sqlx::Error, code: &str) -> RepoError {
    match RepoError::from(err) {
        RepoError::Duplicate(_) => RepoError::Business(
            ErrorCode::ProductCodeExists,
            format!("Product code '{code}' already exists"),
        ),
        other => other,
    }
}

async fn ensure_category(pool: &SqlitePool, category_id: Option<i64>) -> RepoResult<()> {
    if let Some(id) = category_id
        && category::find_by_id(pool, id).await?.is_none()
    {
        return Err(RepoError::Business(
            ErrorCode::CategoryNotFound,
            format!("Category {id} not found"),
        ));
    }
    Ok(())
}

/// Storefront listing: active products, newest first
pub async fn find_public(pool: &SqlitePool) -> RepoResult<Vec<Product>> {
    let products = sqlx::query_as::<_, Product>(&format!(
        "SELECT {COLUMNS} FROM product WHERE status = 'active' AND show_in_store = 1 ORDER BY created_at DESC, id DESC"
    ))
    .fetch_all(pool)
    .await?;
    Ok(products)
}

fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, query: &AdminProductQuery) {
    qb.push(" WHERE 1 = 1");

    // SQLite LIKE only folds ASCII; both sides are lower-cased in Rust instead
    if let Some(term) = query.search_term() {
        qb.push(" AND search_text LIKE ")
            .push_bind(like_pattern(&term.to_lowercase()))
            .push(" ESCAPE '\\'");
    }
    if let Some(category_id) = query.category {
        qb.push(" AND category_id = ").push_bind(category_id);
    }
    if let Some(status) = query.status {
        qb.push(" AND status = ").push_bind(status.as_str());
    }
}

/// Admin listing: server-side search/category/status plus pagination
///
/// Returns the requested page and the total number of matching rows.
pub async fn find_page(pool: &SqlitePool, query: &AdminProductQuery) -> RepoResult<(Vec<Product>, u64)> {
    let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM product");
    push_filters(&mut count, query);
    let total = count.build_query_scalar::<i64>().fetch_one(pool).await?;

    let mut select = QueryBuilder::<Sqlite>::new(format!("SELECT {COLUMNS} FROM product"));
    push_filters(&mut select, query);
    select
        .push(" ORDER BY created_at DESC, id DESC LIMIT ")
        .push_bind(i64::from(query.limit()))
        .push(" OFFSET ")
        .push_bind(i64::try_from(query.offset()).unwrap_or(i64::MAX));
    let products = select.build_query_as::<Product>().fetch_all(pool).await?;

    Ok((products, u64::try_from(total).unwrap_or(0)))
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Product>> {
    let product = sqlx::query_as::<_, Product>(&format!("SELECT {COLUMNS} FROM product WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(product)
}

pub async fn count_by_category(pool: &SqlitePool, category_id: i64) -> RepoResult<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM product WHERE category_id = ?")
        .bind(category_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn create(pool: &SqlitePool, data: ProductCreate) -> RepoResult<Product> {
    ensure_category(pool, data.category_id).await?;
    let now = now_millis();

    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO product (name, code, description, category_id, price, stock, status, is_featured, is_digital, show_in_store, show_in_catalog, search_text, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(&data.name)
    .bind(&data.code)
    .bind(&data.description)
    .bind(data.category_id)
    .bind(data.price)
    .bind(data.stock)
    .bind(data.status.unwrap_or_default().as_str())
    .bind(data.is_featured.unwrap_or(false))
    .bind(data.is_digital.unwrap_or(false))
    .bind(data.show_in_store.unwrap_or(true))
    .bind(data.show_in_catalog.unwrap_or(true))
    .bind(search_text(&data.name, &data.code, data.description.as_deref()))
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await
    .map_err(|e| code_conflict(e, &data.code))?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create product".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: ProductUpdate) -> RepoResult<Product> {
    ensure_category(pool, data.category_id).await?;
    let mut tx = pool.begin().await?;

    let rows = sqlx::query(
        "UPDATE product SET name = COALESCE(?1, name), code = COALESCE(?2, code), description = COALESCE(?3, description), \
         category_id = COALESCE(?4, category_id), price = COALESCE(?5, price), stock = COALESCE(?6, stock), status = COALESCE(?7, status), \
         is_featured = COALESCE(?8, is_featured), is_digital = COALESCE(?9, is_digital), show_in_store = COALESCE(?10, show_in_store), \
         show_in_catalog = COALESCE(?11, show_in_catalog), updated_at = ?12 WHERE id = ?13",
    )
    .bind(&data.name)
    .bind(&data.code)
    .bind(&data.description)
    .bind(data.category_id)
    .bind(data.price)
    .bind(data.stock)
    .bind(data.status.map(|s: ProductStatus| s.as_str()))
    .bind(data.is_featured)
    .bind(data.is_digital)
    .bind(data.show_in_store)
    .bind(data.show_in_catalog)
    .bind(now_millis())
    .bind(id)
    .execute(&mut *tx)
    .await
    .map_err(|e| code_conflict(e, data.code.as_deref().unwrap_or_default()))?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::Business(
            ErrorCode::ProductNotFound,
            format!("Product {id} not found"),
        ));
    }

    let product = sqlx::query_as::<_, Product>(&format!("SELECT {COLUMNS} FROM product WHERE id = ?"))
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
    sqlx::query("UPDATE product SET search_text = ? WHERE id = ?")
        .bind(search_text(&product.name, &product.code, product.description.as_deref()))
        .bind(id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    Ok(product)
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM product WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}
