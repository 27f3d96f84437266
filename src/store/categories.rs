use chrono::Utc;
use sqlx::{QueryBuilder, Result, Sqlite};

use crate::database::Pool;
use crate::model::category::{Category, CategoryUpdate, CategoryWithCount, NewCategory};
use crate::model::normalize;

/// Return all the categories ordered by name, along side their number of published articles
#[tracing::instrument(skip(db))]
pub async fn list_with_counts(db: &Pool) -> Result<Vec<CategoryWithCount>> {
    sqlx::query_as::<_, CategoryWithCount>(
        r#"
        SELECT      categories.id,
                    categories.name,
                    categories.description,
                    categories.color,
                    categories.created_at,
                    categories.updated_at,
                    COUNT(articles.id) AS article_count
        FROM        categories
                    LEFT JOIN articles ON articles.category_id = categories.id
                                      AND articles.published = TRUE
        GROUP BY    categories.id
        ORDER BY    categories.name COLLATE NOCASE
        "#,
    )
    .fetch_all(db)
    .await
}

#[tracing::instrument(skip(db))]
pub async fn select_by_id(db: &Pool, id: i64) -> Result<Option<Category>> {
    sqlx::query_as::<_, Category>(
        r#"
        SELECT id, name, description, color, created_at, updated_at FROM categories WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

#[tracing::instrument(skip(db))]
pub async fn exists(db: &Pool, id: i64) -> Result<bool> {
    let found: Option<i64> = sqlx::query_scalar("SELECT id FROM categories WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await?;

    Ok(found.is_some())
}

/// Insert a new category, returning it
#[tracing::instrument(skip(db))]
pub async fn create(db: &Pool, category: &NewCategory) -> Result<Category> {
    let now = Utc::now();
    sqlx::query_as::<_, Category>(
        r#"
        INSERT INTO categories (name, description, color, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?)
        RETURNING id, name, description, color, created_at, updated_at
        "#,
    )
    .bind(category.name.trim())
    .bind(normalize(category.description.as_deref()))
    .bind(category.color())
    .bind(now)
    .bind(now)
    .fetch_one(db)
    .await
}

/// Apply a partial update. Returns `None` when the category does not exist.
#[tracing::instrument(skip(db))]
pub async fn update(db: &Pool, id: i64, update: &CategoryUpdate) -> Result<Option<Category>> {
    let mut query: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE categories SET ");
    let mut assignments = query.separated(", ");

    if let Some(name) = &update.name {
        assignments.push("name = ");
        assignments.push_bind_unseparated(name.trim().to_owned());
    }
    if let Some(description) = &update.description {
        assignments.push("description = ");
        assignments.push_bind_unseparated(normalize(Some(description.as_str())));
    }
    if let Some(color) = &update.color {
        assignments.push("color = ");
        assignments.push_bind_unseparated(color.trim().to_owned());
    }
    assignments.push("updated_at = ");
    assignments.push_bind_unseparated(Utc::now());

    query.push(" WHERE id = ");
    query.push_bind(id);
    query.push(" RETURNING id, name, description, color, created_at, updated_at");

    query.build_query_as::<Category>().fetch_optional(db).await
}

/// Delete a category, returning whether it existed.
/// Fails with a foreign key violation while articles reference it.
#[tracing::instrument(skip(db))]
pub async fn delete(db: &Pool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM categories WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;

    Ok(result.rows_affected() > 0)
}
