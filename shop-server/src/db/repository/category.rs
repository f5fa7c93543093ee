//! Category Repository

use shared::PageQuery;
use shared::models::{Category, CategoryCreate, CategoryUpdate, Product};
use sqlx::SqlitePool;

use super::{RepoError, RepoResult, to_total};

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Category>> {
    let category = sqlx::query_as::<_, Category>("SELECT * FROM category WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(category)
}

/// Categories matching `search` (name or description), sorted by name
pub async fn list(
    pool: &SqlitePool,
    search: Option<&str>,
    page: &PageQuery,
) -> RepoResult<(Vec<Category>, u64)> {
    let pattern = search.map(|s| format!("%{s}%"));

    let total: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM category
         WHERE (?1 IS NULL OR name LIKE ?1 OR description LIKE ?1)",
    )
    .bind(&pattern)
    .fetch_one(pool)
    .await?;

    let categories = sqlx::query_as::<_, Category>(
        "SELECT * FROM category
         WHERE (?1 IS NULL OR name LIKE ?1 OR description LIKE ?1)
         ORDER BY name ASC, id ASC
         LIMIT ?2 OFFSET ?3",
    )
    .bind(&pattern)
    .bind(i64::from(page.limit()))
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    Ok((categories, to_total(total)))
}

pub async fn create(pool: &SqlitePool, data: &CategoryCreate, now: i64) -> RepoResult<Category> {
    let category = sqlx::query_as::<_, Category>(
        "INSERT INTO category (name, slug, description, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?) RETURNING *",
    )
    .bind(&data.name)
    .bind(&data.slug)
    .bind(&data.description)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await
    .map_err(|e| slug_conflict(e, &data.slug))?;
    Ok(category)
}

/// Partial update; absent fields keep their value
pub async fn update(
    pool: &SqlitePool,
    id: i64,
    data: &CategoryUpdate,
    now: i64,
) -> RepoResult<Category> {
    let category = sqlx::query_as::<_, Category>(
        "UPDATE category SET
             name = COALESCE(?, name),
             slug = COALESCE(?, slug),
             description = COALESCE(?, description),
             updated_at = ?
         WHERE id = ? RETURNING *",
    )
    .bind(&data.name)
    .bind(&data.slug)
    .bind(&data.description)
    .bind(now)
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(|e| slug_conflict(e, data.slug.as_deref().unwrap_or_default()))?;

    category.ok_or_else(|| RepoError::NotFound(format!("Category {id} not found")))
}

/// Products of a category, newest first (without relations)
pub async fn products(pool: &SqlitePool, category_id: i64) -> RepoResult<Vec<Product>> {
    let products = sqlx::query_as::<_, Product>(
        "SELECT * FROM product WHERE category_id = ? ORDER BY created_at DESC, id DESC",
    )
    .bind(category_id)
    .fetch_all(pool)
    .await?;
    Ok(products)
}

fn slug_conflict(err: sqlx::Error, slug: &str) -> RepoError {
    match RepoError::from(err) {
        RepoError::Duplicate(_) => {
            RepoError::Duplicate(format!("Category slug '{slug}' already exists"))
        }
        other => other,
    }
}
