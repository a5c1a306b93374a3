//! Newsletter Subscriber Repository

use super::{RepoError, RepoResult};
use shared::ErrorCode;
use shared::models::Subscriber;
use shared::util::now_millis;
use sqlx::SqlitePool;

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Subscriber>> {
    let subscribers = sqlx::query_as::<_, Subscriber>(
        "SELECT id, email, is_active, subscribed_at FROM newsletter_subscriber ORDER BY subscribed_at DESC, id DESC",
    )
    .fetch_all(pool)
    .await?;
    Ok(subscribers)
}

/// Register an email address (stored lower-cased)
pub async fn subscribe(pool: &SqlitePool, email: &str) -> RepoResult<Subscriber> {
    let email = email.trim().to_lowercase();

    sqlx::query_as::<_, Subscriber>(
        "INSERT INTO newsletter_subscriber (email, subscribed_at) VALUES (?, ?) RETURNING id, email, is_active, subscribed_at",
    )
    .bind(&email)
    .bind(now_millis())
    .fetch_one(pool)
    .await
    .map_err(|e| match RepoError::from(e) {
        RepoError::Duplicate(_) => RepoError::Business(
            ErrorCode::SubscriberExists,
            format!("{email} is already subscribed"),
        ),
        other => other,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;

    #[tokio::test]
    async fn test_subscribe_normalises_and_rejects_duplicates() {
        let db = DbService::in_memory().await.unwrap();

        let sub = subscribe(&db.pool, "  Buyer@Example.com ").await.unwrap();
        assert_eq!(sub.email, "buyer@example.com");
        assert!(sub.is_active);

        let err = subscribe(&db.pool, "BUYER@example.com").await.unwrap_err();
        assert!(matches!(err, RepoError::Business(ErrorCode::SubscriberExists, _)));

        assert_eq!(find_all(&db.pool).await.unwrap().len(), 1);
    }
}
