use serde::Serialize;
use sqlx::FromRow;

/// View counter of an article
#[derive(Debug, Clone, Serialize, FromRow, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ArticleViews {
    pub article_id: i64,
    pub views: i64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PopularArticle {
    pub id: i64,
    pub title: String,
    pub category_name: Option<String>,
    pub views: i64,
}

/// Dashboard figures of the admin panel
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub total_views: i64,
    pub total_articles: i64,
    pub published_articles: i64,
    pub total_categories: i64,
    pub top_articles: Vec<PopularArticle>,
}

/// `?limit=` query parameter of the popular articles
#[derive(Debug, Default, serde::Deserialize)]
pub struct PopularQuery {
    limit: Option<i64>,
}

impl PopularQuery {
    pub fn new(limit: Option<i64>) -> Self {
        PopularQuery { limit }
    }

    pub fn get_limit(&self) -> i64 {
        self.limit.unwrap_or(5).clamp(1, 50)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn popular_limit_bounds() {
        assert_eq!(PopularQuery::default().get_limit(), 5);
        assert_eq!(PopularQuery::new(Some(0)).get_limit(), 1);
        assert_eq!(PopularQuery::new(Some(500)).get_limit(), 50);
    }
}
