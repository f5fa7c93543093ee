//! Product Repository

use shared::PageQuery;
use shared::models::{Product, ProductCreate, ProductSort, ProductUpdate, VariantInput};
use sqlx::SqlitePool;

use super::variant::sku_conflict;
use super::{RepoError, RepoResult, category, to_total, variant};

/// Product list filters, already validated
#[derive(Debug, Default)]
pub struct ProductFilter<'a> {
    pub search: Option<&'a str>,
    pub category_id: Option<i64>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub sort: ProductSort,
}

/// Product with its category and variants
pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Product>> {
    let product = sqlx::query_as::<_, Product>("SELECT * FROM product WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    match product {
        Some(product) => Ok(Some(with_relations(pool, product).await?)),
        None => Ok(None),
    }
}

/// Products filtered by text, category and variant price range
///
/// A product matches the price range when any of its variants does.
pub async fn list(
    pool: &SqlitePool,
    filter: &ProductFilter<'_>,
    page: &PageQuery,
) -> RepoResult<(Vec<Product>, u64)> {
    const FILTER: &str = "WHERE (?1 IS NULL OR p.name LIKE ?1 OR p.description LIKE ?1)
          AND (?2 IS NULL OR p.category_id = ?2)
          AND ((?3 IS NULL AND ?4 IS NULL) OR EXISTS (
                SELECT 1 FROM variant v WHERE v.product_id = p.id
                  AND (?3 IS NULL OR v.price >= ?3)
                  AND (?4 IS NULL OR v.price <= ?4)))";

    let order_by = match filter.sort {
        ProductSort::Newest => "p.created_at DESC, p.id DESC",
        ProductSort::PriceAsc => {
            "(SELECT MIN(v.price) FROM variant v WHERE v.product_id = p.id) ASC, p.id ASC"
        }
        ProductSort::PriceDesc => {
            "(SELECT MAX(v.price) FROM variant v WHERE v.product_id = p.id) DESC, p.id DESC"
        }
    };
    let pattern = filter.search.map(|s| format!("%{s}%"));

    let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM product p {FILTER}"))
        .bind(&pattern)
        .bind(filter.category_id)
        .bind(filter.min_price)
        .bind(filter.max_price)
        .fetch_one(pool)
        .await?;

    let rows = sqlx::query_as::<_, Product>(&format!(
        "SELECT p.* FROM product p {FILTER} ORDER BY {order_by} LIMIT ?5 OFFSET ?6"
    ))
    .bind(&pattern)
    .bind(filter.category_id)
    .bind(filter.min_price)
    .bind(filter.max_price)
    .bind(i64::from(page.limit()))
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    let mut products = Vec::with_capacity(rows.len());
    for product in rows {
        products.push(with_relations(pool, product).await?);
    }
    Ok((products, to_total(total)))
}

/// Create a product and its variants in one transaction
pub async fn create(pool: &SqlitePool, data: &ProductCreate, now: i64) -> RepoResult<Product> {
    ensure_category(pool, data.category_id).await?;

    let mut tx = pool.begin().await?;
    let product_id: i64 = sqlx::query_scalar(
        "INSERT INTO product (name, description, category_id, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(&data.name)
    .bind(&data.description)
    .bind(data.category_id)
    .bind(now)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    for input in &data.variants {
        upsert_variant(&mut tx, product_id, input, now).await?;
    }
    tx.commit().await?;

    find_by_id(pool, product_id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create product".to_string()))
}

/// Partial update; a present variant list replaces the variant set by SKU
pub async fn update(
    pool: &SqlitePool,
    id: i64,
    data: &ProductUpdate,
    now: i64,
) -> RepoResult<Product> {
    if let Some(category_id) = data.category_id {
        ensure_category(pool, category_id).await?;
    }

    let mut tx = pool.begin().await?;
    let result = sqlx::query(
        "UPDATE product SET
             name = COALESCE(?, name),
             description = COALESCE(?, description),
             category_id = COALESCE(?, category_id),
             updated_at = ?
         WHERE id = ?",
    )
    .bind(&data.name)
    .bind(&data.description)
    .bind(data.category_id)
    .bind(now)
    .bind(id)
    .execute(&mut *tx)
    .await?;
    if result.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Product {id} not found")));
    }

    if let Some(variants) = &data.variants {
        for input in variants {
            upsert_variant(&mut tx, id, input, now).await?;
        }

        let existing: Vec<(i64, String)> =
            sqlx::query_as("SELECT id, sku FROM variant WHERE product_id = ?")
                .bind(id)
                .fetch_all(&mut *tx)
                .await?;
        for (variant_id, sku) in existing {
            if variants.iter().any(|v| v.sku == sku) {
                continue;
            }
            sqlx::query("DELETE FROM variant WHERE id = ?")
                .bind(variant_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| match RepoError::from(e) {
                    RepoError::Conflict(_) => RepoError::Conflict(format!(
                        "Variant {sku} is referenced by orders, carts or stock movements"
                    )),
                    other => other,
                })?;
        }
    }
    tx.commit().await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Product {id} not found")))
}

/// Insert a variant of `product_id`, or update the one with the same SKU
///
/// A SKU owned by another product is a duplicate.
async fn upsert_variant(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    product_id: i64,
    input: &VariantInput,
    now: i64,
) -> RepoResult<i64> {
    let id: Option<i64> = sqlx::query_scalar(
        "INSERT INTO variant (product_id, name, sku, price, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?5)
         ON CONFLICT(sku) DO UPDATE SET
             name = excluded.name,
             price = excluded.price,
             updated_at = excluded.updated_at
         WHERE variant.product_id = excluded.product_id
         RETURNING id",
    )
    .bind(product_id)
    .bind(&input.name)
    .bind(&input.sku)
    .bind(input.price)
    .bind(now)
    .fetch_optional(&mut **tx)
    .await
    .map_err(|e| sku_conflict(e, &input.sku))?;

    id.ok_or_else(|| RepoError::Duplicate(format!("SKU '{}' already exists", input.sku)))
}

async fn ensure_category(pool: &SqlitePool, category_id: i64) -> RepoResult<()> {
    match category::find_by_id(pool, category_id).await? {
        Some(_) => Ok(()),
        None => Err(RepoError::NotFound(format!(
            "Category {category_id} not found"
        ))),
    }
}

async fn with_relations(pool: &SqlitePool, mut product: Product) -> RepoResult<Product> {
    product.category = category::find_by_id(pool, product.category_id).await?;
    product.variants = variant::find_by_product(pool, product.id).await?;
    Ok(product)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{memory_pool, seed_cart_item, seed_user};
    use shared::models::CategoryCreate;

    async fn seed_category(pool: &SqlitePool) -> i64 {
        let data = CategoryCreate {
            name: "Kitchen".into(),
            slug: "kitchen".into(),
            description: None,
        };
        category::create(pool, &data, 0).await.unwrap().id
    }

    fn input(sku: &str, price: f64) -> VariantInput {
        VariantInput {
            name: sku.to_lowercase(),
            sku: sku.into(),
            price,
        }
    }

    fn new_product(name: &str, category_id: i64, variants: Vec<VariantInput>) -> ProductCreate {
        ProductCreate {
            name: name.into(),
            description: None,
            category_id,
            variants,
        }
    }

    #[tokio::test]
    async fn test_create_with_variants() {
        let pool = memory_pool().await;
        let category_id = seed_category(&pool).await;
        let product = create(
            &pool,
            &new_product("Kettle", category_id, vec![input("KET-1", 30.0), input("KET-2", 35.0)]),
            0,
        )
        .await
        .unwrap();

        assert_eq!(product.variants.len(), 2);
        assert_eq!(product.category.as_ref().map(|c| c.id), Some(category_id));
    }

    #[tokio::test]
    async fn test_create_unknown_category() {
        let pool = memory_pool().await;
        let err = create(&pool, &new_product("Kettle", 42, vec![]), 0)
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::NotFound(msg) if msg == "Category 42 not found"));
    }

    #[tokio::test]
    async fn test_create_rolls_back_on_foreign_sku() {
        let pool = memory_pool().await;
        let category_id = seed_category(&pool).await;
        create(&pool, &new_product("Pan", category_id, vec![input("PAN-1", 20.0)]), 0)
            .await
            .unwrap();
        let err = create(
            &pool,
            &new_product("Pot", category_id, vec![input("POT-1", 10.0), input("PAN-1", 10.0)]),
            0,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));

        let pots: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM product WHERE name = 'Pot'")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(pots, 0);
    }

    #[tokio::test]
    async fn test_list_filters_and_sort() {
        let pool = memory_pool().await;
        let category_id = seed_category(&pool).await;
        create(&pool, &new_product("Cheap mug", category_id, vec![input("M-1", 5.0)]), 1)
            .await
            .unwrap();
        create(&pool, &new_product("Fancy mug", category_id, vec![input("M-2", 50.0)]), 2)
            .await
            .unwrap();
        create(&pool, &new_product("Spoon", category_id, vec![input("S-1", 2.0)]), 3)
            .await
            .unwrap();

        let page = PageQuery::default();
        let newest = list(&pool, &ProductFilter::default(), &page).await.unwrap();
        assert_eq!(newest.1, 3);
        assert_eq!(newest.0[0].name, "Spoon");

        let by_price = ProductFilter {
            sort: ProductSort::PriceDesc,
            ..Default::default()
        };
        let (rows, _) = list(&pool, &by_price, &page).await.unwrap();
        assert_eq!(rows[0].name, "Fancy mug");

        let mugs_under_10 = ProductFilter {
            search: Some("mug"),
            max_price: Some(10.0),
            ..Default::default()
        };
        let (rows, total) = list(&pool, &mugs_under_10, &page).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(rows[0].name, "Cheap mug");
    }

    #[tokio::test]
    async fn test_update_replaces_variants_by_sku() {
        let pool = memory_pool().await;
        let category_id = seed_category(&pool).await;
        let product = create(
            &pool,
            &new_product("Kettle", category_id, vec![input("KET-1", 30.0), input("KET-2", 35.0)]),
            0,
        )
        .await
        .unwrap();
        let kept_id = product.variants.iter().find(|v| v.sku == "KET-1").unwrap().id;

        let data = ProductUpdate {
            variants: Some(vec![input("KET-1", 32.5), input("KET-3", 40.0)]),
            ..Default::default()
        };
        let updated = update(&pool, product.id, &data, 1).await.unwrap();

        let skus: Vec<&str> = updated.variants.iter().map(|v| v.sku.as_str()).collect();
        assert_eq!(skus, vec!["KET-1", "KET-3"]);
        let kept = &updated.variants[0];
        assert_eq!(kept.id, kept_id);
        assert_eq!(kept.price, 32.5);
        assert_eq!(updated.name, "Kettle");
    }

    #[tokio::test]
    async fn test_update_refuses_to_drop_referenced_variant() {
        let pool = memory_pool().await;
        let category_id = seed_category(&pool).await;
        let product = create(
            &pool,
            &new_product("Kettle", category_id, vec![input("KET-1", 30.0), input("KET-2", 35.0)]),
            0,
        )
        .await
        .unwrap();
        let user_id = seed_user(&pool, "cook@example.com", "USER").await;
        let ket2 = product.variants.iter().find(|v| v.sku == "KET-2").unwrap().id;
        seed_cart_item(&pool, user_id, ket2, 1).await;

        let data = ProductUpdate {
            name: Some("Renamed".into()),
            variants: Some(vec![input("KET-1", 30.0)]),
            ..Default::default()
        };
        let err = update(&pool, product.id, &data, 1).await.unwrap_err();
        assert!(matches!(err, RepoError::Conflict(_)));

        let unchanged = find_by_id(&pool, product.id).await.unwrap().unwrap();
        assert_eq!(unchanged.name, "Kettle");
        assert_eq!(unchanged.variants.len(), 2);
    }
}
