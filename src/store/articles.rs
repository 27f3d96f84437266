use chrono::Utc;
use sqlx::{QueryBuilder, Result, Sqlite};

use crate::database::Pool;
use crate::model::article::{Article, ArticleFilter, ArticleUpdate, NewArticle};
use crate::model::{normalize, PageParameters, PagedResult};

const SELECT_ARTICLES: &str = r#"
    SELECT  articles.id,
            articles.title,
            articles.description,
            articles.content,
            articles.image_url,
            articles.link,
            articles.download_link,
            articles.category_id,
            categories.name  AS category_name,
            categories.color AS category_color,
            articles.published,
            articles.created_at,
            articles.updated_at
    FROM    articles
            LEFT JOIN categories ON articles.category_id = categories.id
    WHERE   1 = 1
"#;

/// Return a page of articles matching the filter, newest first.
#[tracing::instrument(skip(db))]
pub async fn list(
    db: &Pool,
    filter: &ArticleFilter,
    page: &PageParameters,
) -> Result<PagedResult<Article>> {
    let mut page_query: QueryBuilder<Sqlite> = QueryBuilder::new(SELECT_ARTICLES);
    add_filters(&mut page_query, filter);
    page_query.push(" ORDER BY articles.created_at DESC, articles.id DESC ");
    page_query.push(" LIMIT ");
    page_query.push_bind(i64::try_from(page.get_size()).unwrap_or(i64::MAX));
    page_query.push(" OFFSET ");
    page_query.push_bind(page.offset());

    let mut count_query: QueryBuilder<Sqlite> =
        QueryBuilder::new("SELECT COUNT(*) FROM articles WHERE 1 = 1");
    add_filters(&mut count_query, filter);

    let content = page_query
        .build_query_as::<Article>()
        .fetch_all(db)
        .await?;
    let total_items = count_query
        .build_query_scalar::<i64>()
        .fetch_one(db)
        .await? as u64;

    Ok(PagedResult::new(
        content,
        total_items,
        page.get_size(),
        page.get_page(),
    ))
}

/// Return an article by id. With `published_only`, drafts are treated as missing.
#[tracing::instrument(skip(db))]
pub async fn select_by_id(db: &Pool, id: i64, published_only: bool) -> Result<Option<Article>> {
    let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(SELECT_ARTICLES);
    query.push(" AND articles.id = ");
    query.push_bind(id);
    if published_only {
        query.push(" AND articles.published = TRUE");
    }

    query.build_query_as::<Article>().fetch_optional(db).await
}

/// Insert a new article, returning it
#[tracing::instrument(skip(db, article), fields(title = %article.title))]
pub async fn create(db: &Pool, article: &NewArticle) -> Result<Article> {
    let now = Utc::now();
    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO articles (title, description, content, image_url, link, download_link,
                              category_id, published, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(article.title.trim())
    .bind(normalize(article.description.as_deref()))
    .bind(&article.content)
    .bind(normalize(article.image_url.as_deref()))
    .bind(normalize(article.link.as_deref()))
    .bind(normalize(article.download_link.as_deref()))
    .bind(article.category_id)
    .bind(article.published)
    .bind(now)
    .bind(now)
    .fetch_one(db)
    .await?;

    select_by_id(db, id, false)
        .await?
        .ok_or(sqlx::Error::RowNotFound)
}

/// Apply a partial update, only the given fields are written.
/// Returns `None` when the article does not exist.
#[tracing::instrument(skip(db, update))]
pub async fn update(db: &Pool, id: i64, update: &ArticleUpdate) -> Result<Option<Article>> {
    let mut query: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE articles SET ");
    let mut assignments = query.separated(", ");

    if let Some(title) = &update.title {
        assignments.push("title = ");
        assignments.push_bind_unseparated(title.trim().to_owned());
    }
    if let Some(description) = &update.description {
        assignments.push("description = ");
        assignments.push_bind_unseparated(normalize(Some(description.as_str())));
    }
    if let Some(content) = &update.content {
        assignments.push("content = ");
        assignments.push_bind_unseparated(content.clone());
    }
    if let Some(image_url) = &update.image_url {
        assignments.push("image_url = ");
        assignments.push_bind_unseparated(normalize(Some(image_url.as_str())));
    }
    if let Some(link) = &update.link {
        assignments.push("link = ");
        assignments.push_bind_unseparated(normalize(Some(link.as_str())));
    }
    if let Some(download_link) = &update.download_link {
        assignments.push("download_link = ");
        assignments.push_bind_unseparated(normalize(Some(download_link.as_str())));
    }
    if let Some(category_id) = update.category_id {
        // 0 detaches the article from its category
        assignments.push("category_id = ");
        assignments.push_bind_unseparated(Some(category_id).filter(|id| *id != 0));
    }
    if let Some(published) = update.published {
        assignments.push("published = ");
        assignments.push_bind_unseparated(published);
    }
    assignments.push("updated_at = ");
    assignments.push_bind_unseparated(Utc::now());

    query.push(" WHERE id = ");
    query.push_bind(id);

    let result = query.build().execute(db).await?;
    if result.rows_affected() == 0 {
        return Ok(None);
    }

    select_by_id(db, id, false).await
}

/// Delete an article, returning whether it existed
#[tracing::instrument(skip(db))]
pub async fn delete(db: &Pool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM articles WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Number of articles, drafts included, attached to the category
#[tracing::instrument(skip(db))]
pub async fn count_by_category(db: &Pool, category_id: i64) -> Result<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM articles WHERE category_id = ?")
        .bind(category_id)
        .fetch_one(db)
        .await
}

/// Escape the LIKE wildcards of a user given term, `\` being the escape character
pub fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn add_filters(query: &mut QueryBuilder<Sqlite>, filter: &ArticleFilter) {
    if let Some(category_id) = filter.category_id {
        query.push(" AND articles.category_id = ");
        query.push_bind(category_id);
    }

    if let Some(published) = filter.published {
        query.push(" AND articles.published = ");
        query.push_bind(published);
    }

    if let Some(search) = &filter.search {
        let pattern = like_pattern(search);
        query.push(" AND (articles.title LIKE ");
        query.push_bind(pattern.clone());
        query.push(r" ESCAPE '\' OR articles.description LIKE ");
        query.push_bind(pattern.clone());
        query.push(r" ESCAPE '\' OR articles.content LIKE ");
        query.push_bind(pattern);
        query.push(r" ESCAPE '\')");
    }
}

#[cfg(test)]
mod tests {
    use speculoos::prelude::*;

    use super::*;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("rust"), "%rust%");
        assert_eq!(like_pattern("100%"), r"%100\%%");
        assert_eq!(like_pattern("a_b"), r"%a\_b%");
        assert_eq!(like_pattern(r"c:\"), r"%c:\\%");
    }

    #[sqlx::test(fixtures("categories", "articles"))]
    async fn list_published_articles(pool: Pool) -> Result<()> {
        let filter = ArticleFilter {
            published: Some(true),
            ..Default::default()
        };
        let page = list(&pool, &filter, &PageParameters::new(Some(1), Some(2))).await?;

        assert_eq!(*page.total_items(), 3);
        assert_eq!(*page.total_pages(), 2);
        assert_eq!(*page.elements_number(), 2);
        // Newest first
        assert_eq!(page.content()[0].id, 4);
        assert_eq!(page.content()[1].id, 2);
        assert_eq!(page.content()[0].category_name.as_deref(), Some("Life"));

        let second = list(&pool, &filter, &PageParameters::new(Some(2), Some(2))).await?;
        assert_eq!(second.content().len(), 1);
        assert_eq!(second.content()[0].id, 1);

        Ok(())
    }

    #[sqlx::test(fixtures("categories", "articles"))]
    async fn list_with_all_filters(pool: Pool) -> Result<()> {
        let all = list(&pool, &ArticleFilter::default(), &PageParameters::default()).await?;
        assert_eq!(*all.total_items(), 4);

        let filter = ArticleFilter {
            category_id: Some(1),
            published: None,
            search: Some("tokio".into()),
        };
        let page = list(&pool, &filter, &PageParameters::default()).await?;
        let ids: Vec<i64> = page.content().iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![3, 2]);

        Ok(())
    }

    #[sqlx::test(fixtures("categories", "articles"))]
    async fn search_is_case_insensitive_and_literal(pool: Pool) -> Result<()> {
        let filter = ArticleFilter {
            published: Some(true),
            search: Some("BORROW".into()),
            ..Default::default()
        };
        let page = list(&pool, &filter, &PageParameters::default()).await?;
        assert_eq!(*page.total_items(), 1);
        assert_eq!(page.content()[0].id, 1);

        let filter = ArticleFilter {
            search: Some("%".into()),
            ..Default::default()
        };
        let page = list(&pool, &filter, &PageParameters::default()).await?;
        assert_eq!(*page.total_items(), 1);
        assert_eq!(page.content()[0].id, 4);

        Ok(())
    }

    #[sqlx::test(fixtures("categories", "articles"))]
    async fn drafts_are_hidden_when_published_only(pool: Pool) -> Result<()> {
        assert_that!(select_by_id(&pool, 3, true).await?).is_none();
        assert_that!(select_by_id(&pool, 3, false).await?).is_some();
        assert_that!(select_by_id(&pool, 42, false).await?).is_none();

        Ok(())
    }

    #[sqlx::test(fixtures("categories"))]
    async fn create_and_partially_update(pool: Pool) -> Result<()> {
        let created = create(
            &pool,
            &NewArticle {
                title: "  Hello  ".into(),
                description: Some("".into()),
                content: "Some content".into(),
                image_url: None,
                link: Some("https://example.com".into()),
                download_link: None,
                category_id: Some(2),
                published: false,
            },
        )
        .await?;

        assert_eq!(created.title, "Hello");
        assert_eq!(created.description, None);
        assert_eq!(created.category_name.as_deref(), Some("Life"));
        assert!(!created.published);

        let updated = update(
            &pool,
            created.id,
            &ArticleUpdate {
                published: Some(true),
                link: Some("".into()),
                category_id: Some(0),
                ..Default::default()
            },
        )
        .await?
        .unwrap();

        assert!(updated.published);
        assert_eq!(updated.link, None);
        assert_eq!(updated.category_id, None);
        assert_eq!(updated.title, "Hello");
        assert_eq!(updated.content, "Some content");
        assert!(updated.updated_at >= created.updated_at);

        let missing = update(
            &pool,
            9999,
            &ArticleUpdate {
                published: Some(true),
                ..Default::default()
            },
        )
        .await?;
        assert_that!(missing).is_none();

        Ok(())
    }

    #[sqlx::test(fixtures("categories", "articles"))]
    async fn delete_article(pool: Pool) -> Result<()> {
        assert!(delete(&pool, 1).await?);
        assert!(!delete(&pool, 1).await?);
        assert_eq!(count_by_category(&pool, 1).await?, 2);

        Ok(())
    }
}
