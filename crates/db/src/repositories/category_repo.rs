//! Repository for the `categories` table.
//!
//! Category deletion is the one transactionally-cascading operation in
//! the system: referencing projects are rewired in the same transaction
//! that removes the category row.

use atelier_core::catalog::UNCATEGORIZED_CATEGORY;
use atelier_core::types::DbId;
use sqlx::PgPool;

use crate::models::category::Category;

/// Column list for `categories` queries.
const CATEGORY_COLUMNS: &str = "id, name, slug, created_at, updated_at";

/// Provides CRUD operations for categories.
pub struct CategoryRepo;

impl CategoryRepo {
    /// List all categories ordered by display name.
    pub async fn list_by_name(pool: &PgPool) -> Result<Vec<Category>, sqlx::Error> {
        let query = format!("SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY name ASC");
        sqlx::query_as::<_, Category>(&query).fetch_all(pool).await
    }

    /// Find a category by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Category>, sqlx::Error> {
        let query = format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = $1");
        sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Insert a new category. The unique slug constraint (`uq_categories_slug`)
    /// surfaces duplicates as a 409 at the API boundary.
    pub async fn create(pool: &PgPool, name: &str, slug: &str) -> Result<Category, sqlx::Error> {
        let query = format!(
            "INSERT INTO categories (name, slug) VALUES ($1, $2) \
             RETURNING {CATEGORY_COLUMNS}"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(name)
            .bind(slug)
            .fetch_one(pool)
            .await
    }

    /// Rename a category. Returns `None` if no row matched.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        name: &str,
        slug: &str,
    ) -> Result<Option<Category>, sqlx::Error> {
        let query = format!(
            "UPDATE categories SET name = $2, slug = $3, updated_at = now() \
             WHERE id = $1 \
             RETURNING {CATEGORY_COLUMNS}"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .bind(name)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// Delete a category and rewire referencing projects, atomically.
    ///
    /// One transaction:
    ///   1. strip the id from every project's category array;
    ///   2. projects left with no categories get the uncategorized sentinel;
    ///   3. delete the category row.
    ///
    /// Returns `true` if the category existed.
    pub async fn delete_cascade(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query(
            "UPDATE projects \
             SET categories = array_remove(categories, $1), updated_at = now() \
             WHERE $1 = ANY(categories)",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE projects \
             SET categories = ARRAY[$1]::BIGINT[], updated_at = now() \
             WHERE cardinality(categories) = 0",
        )
        .bind(UNCATEGORIZED_CATEGORY)
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}
