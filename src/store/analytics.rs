use chrono::Utc;
use sqlx::Result;

use crate::database::Pool;
use crate::model::analytics::{AnalyticsSummary, ArticleViews, PopularArticle};

/// Increment the view counter of an article, creating it on first view
#[tracing::instrument(skip(db))]
pub async fn record_view(db: &Pool, article_id: i64) -> Result<ArticleViews> {
    sqlx::query_as::<_, ArticleViews>(
        r#"
        INSERT INTO article_views (article_id, views, last_viewed_at) VALUES (?, 1, ?)
        ON CONFLICT (article_id) DO UPDATE SET views          = views + 1,
                                               last_viewed_at = excluded.last_viewed_at
        RETURNING article_id, views
        "#,
    )
    .bind(article_id)
    .bind(Utc::now())
    .fetch_one(db)
    .await
}

/// Current view counter of an article, 0 if it was never viewed
#[tracing::instrument(skip(db))]
pub async fn views_of(db: &Pool, article_id: i64) -> Result<ArticleViews> {
    let views: Option<i64> =
        sqlx::query_scalar("SELECT views FROM article_views WHERE article_id = ?")
            .bind(article_id)
            .fetch_optional(db)
            .await?;

    Ok(ArticleViews {
        article_id,
        views: views.unwrap_or(0),
    })
}

/// Most viewed published articles
#[tracing::instrument(skip(db))]
pub async fn popular(db: &Pool, limit: i64) -> Result<Vec<PopularArticle>> {
    sqlx::query_as::<_, PopularArticle>(
        r#"
        SELECT      articles.id,
                    articles.title,
                    categories.name     AS category_name,
                    article_views.views AS views
        FROM        article_views
                    JOIN articles ON articles.id = article_views.article_id
                    LEFT JOIN categories ON categories.id = articles.category_id
        WHERE       articles.published = TRUE
        ORDER BY    article_views.views DESC, articles.id DESC
        LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(db)
    .await
}

#[tracing::instrument(skip(db))]
pub async fn summary(db: &Pool, top: i64) -> Result<AnalyticsSummary> {
    let (total_views, total_articles, published_articles, total_categories): (
        i64,
        i64,
        i64,
        i64,
    ) = sqlx::query_as(
        r#"
        SELECT  (SELECT COALESCE(SUM(views), 0) FROM article_views),
                (SELECT COUNT(*) FROM articles),
                (SELECT COUNT(*) FROM articles WHERE published = TRUE),
                (SELECT COUNT(*) FROM categories)
        "#,
    )
    .fetch_one(db)
    .await?;

    Ok(AnalyticsSummary {
        total_views,
        total_articles,
        published_articles,
        total_categories,
        top_articles: popular(db, top).await?,
    })
}
