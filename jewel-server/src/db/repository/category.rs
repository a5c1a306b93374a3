//! Category Repository

use super::{RepoError, RepoResult, product};
use shared::ErrorCode;
use shared::models::{Category, CategoryCreate, CategoryUpdate};
use shared::util::now_millis;
use sqlx::SqlitePool;

fn name_conflict(err: sqlx::Error, name: &str) -> RepoError {
    match RepoError::from(err) {
        RepoError::Duplicate(_) => RepoError::Business(
            ErrorCode::CategoryNameExists,
            format!("Category '{name}' already exists"),
        ),
        other => other,
    }
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Category>> {
    let categories = sqlx::query_as::<_, Category>(
        "SELECT id, name, description, sort_order, is_active, created_at FROM category ORDER BY sort_order, name",
    )
    .fetch_all(pool)
    .await?;
    Ok(categories)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Category>> {
    let category = sqlx::query_as::<_, Category>(
        "SELECT id, name, description, sort_order, is_active, created_at FROM category WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(category)
}

pub async fn create(pool: &SqlitePool, data: CategoryCreate) -> RepoResult<Category> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO category (name, description, sort_order, created_at) VALUES (?, ?, ?, ?) RETURNING id",
    )
    .bind(&data.name)
    .bind(&data.description)
    .bind(data.sort_order.unwrap_or(0))
    .bind(now_millis())
    .fetch_one(pool)
    .await
    .map_err(|e| name_conflict(e, &data.name))?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create category".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: CategoryUpdate) -> RepoResult<Category> {
    let rows = sqlx::query(
        "UPDATE category SET name = COALESCE(?1, name), description = COALESCE(?2, description), sort_order = COALESCE(?3, sort_order), is_active = COALESCE(?4, is_active) WHERE id = ?5",
    )
    .bind(&data.name)
    .bind(&data.description)
    .bind(data.sort_order)
    .bind(data.is_active)
    .bind(id)
    .execute(pool)
    .await
    .map_err(|e| name_conflict(e, data.name.as_deref().unwrap_or_default()))?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::Business(
            ErrorCode::CategoryNotFound,
            format!("Category {id} not found"),
        ));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Category {id}")))
}

/// Delete a category that no product references
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let in_use = product::count_by_category(pool, id).await?;
    if in_use > 0 {
        return Err(RepoError::Business(
            ErrorCode::CategoryHasProducts,
            format!("Category {id} is used by {in_use} product(s)"),
        ));
    }

    let rows = sqlx::query("DELETE FROM category WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use shared::models::ProductCreate;

    fn named(name: &str, sort_order: i64) -> CategoryCreate {
        CategoryCreate {
            name: name.into(),
            description: None,
            sort_order: Some(sort_order),
        }
    }

    #[tokio::test]
    async fn test_ordering_and_duplicates() {
        let db = DbService::in_memory().await.unwrap();
        create(&db.pool, named("Necklaces", 2)).await.unwrap();
        create(&db.pool, named("Rings", 1)).await.unwrap();

        let names: Vec<_> = find_all(&db.pool)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, ["Rings", "Necklaces"]);

        let err = create(&db.pool, named("Rings", 3)).await.unwrap_err();
        assert!(matches!(err, RepoError::Business(ErrorCode::CategoryNameExists, _)));
    }

    #[tokio::test]
    async fn test_update() {
        let db = DbService::in_memory().await.unwrap();
        let created = create(&db.pool, named("Earings", 0)).await.unwrap();
        let updated = update(
            &db.pool,
            created.id,
            CategoryUpdate {
                name: Some("Earrings".into()),
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.name, "Earrings");
        assert!(!updated.is_active);
    }

    #[tokio::test]
    async fn test_delete_in_use_category() {
        let db = DbService::in_memory().await.unwrap();
        let rings = create(&db.pool, named("Rings", 0)).await.unwrap();
        let ring = product::create(
            &db.pool,
            ProductCreate {
                name: "Band".into(),
                code: "B-1".into(),
                description: None,
                category_id: Some(rings.id),
                price: 50.0,
                stock: 2,
                status: None,
                is_featured: None,
                is_digital: None,
                show_in_store: None,
                show_in_catalog: None,
            },
        )
        .await
        .unwrap();

        let err = delete(&db.pool, rings.id).await.unwrap_err();
        assert!(matches!(err, RepoError::Business(ErrorCode::CategoryHasProducts, _)));

        product::delete(&db.pool, ring.id).await.unwrap();
        assert!(delete(&db.pool, rings.id).await.unwrap());
    }
}
