//! User Repository

use shared::models::{Role, User};
use sqlx::SqlitePool;

use super::{RepoError, RepoResult};

pub async fn find_by_email(pool: &SqlitePool, email: &str) -> RepoResult<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM user WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM user WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

/// Insert a user; a taken email surfaces as `RepoError::Duplicate`
pub async fn create(
    pool: &SqlitePool,
    email: &str,
    name: &str,
    password_hash: &str,
    role: Role,
    now: i64,
) -> RepoResult<User> {
    let user = sqlx::query_as::<_, User>(
        "INSERT INTO user (email, name, password_hash, role, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?) RETURNING *",
    )
    .bind(email)
    .bind(name)
    .bind(password_hash)
    .bind(role)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await
    .map_err(|e| match RepoError::from(e) {
        RepoError::Duplicate(_) => RepoError::Duplicate(format!("User {email} already exists")),
        other => other,
    })?;
    Ok(user)
}

pub async fn exists(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let found: Option<i64> = sqlx::query_scalar("SELECT id FROM user WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(found.is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::memory_pool;

    #[tokio::test]
    async fn test_create_and_find() {
        let pool = memory_pool().await;
        let user = create(&pool, "ann@example.com", "Ann", "hash", Role::User, 1_000)
            .await
            .unwrap();
        assert_eq!(user.role, Role::User);
        assert_eq!(user.created_at, 1_000);

        let by_email = find_by_email(&pool, "ann@example.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, user.id);
        assert!(find_by_id(&pool, user.id).await.unwrap().is_some());
        assert!(exists(&pool, user.id).await.unwrap());
        assert!(!exists(&pool, user.id + 1).await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_email() {
        let pool = memory_pool().await;
        create(&pool, "ann@example.com", "Ann", "hash", Role::User, 0)
            .await
            .unwrap();
        let err = create(&pool, "ann@example.com", "Other", "hash", Role::Admin, 0)
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));
    }
}
