use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::errors::ApiError;
use crate::model::{require_text, validate_link};

/// A blog post, along with the name and color of its category
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub content: String,
    pub image_url: Option<String>,
    pub link: Option<String>,
    pub download_link: Option<String>,
    pub category_id: Option<i64>,
    pub category_name: Option<String>,
    pub category_color: Option<String>,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Article to be inserted in the database
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewArticle {
    pub title: String,
    pub description: Option<String>,
    pub content: String,
    pub image_url: Option<String>,
    pub link: Option<String>,
    pub download_link: Option<String>,
    pub category_id: Option<i64>,
    #[serde(default)]
    pub published: bool,
}

impl NewArticle {
    pub fn validate(&self) -> Result<(), ApiError> {
        require_text("title", &self.title)?;
        require_text("content", &self.content)?;
        validate_link("imageUrl", self.image_url.as_deref())?;
        validate_link("link", self.link.as_deref())?;
        validate_link("downloadLink", self.download_link.as_deref())
    }
}

/// Partial update of an article. Absent fields are left untouched, an empty
/// string clears an optional field.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub image_url: Option<String>,
    pub link: Option<String>,
    pub download_link: Option<String>,
    pub category_id: Option<i64>,
    pub published: Option<bool>,
}

impl ArticleUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.content.is_none()
            && self.image_url.is_none()
            && self.link.is_none()
            && self.download_link.is_none()
            && self.category_id.is_none()
            && self.published.is_none()
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        if self.is_empty() {
            return Err(ApiError::invalid("Nothing to update"));
        }
        if let Some(title) = &self.title {
            require_text("title", title)?;
        }
        if let Some(content) = &self.content {
            require_text("content", content)?;
        }
        if matches!(self.category_id, Some(id) if id < 0) {
            return Err(ApiError::invalid("categoryId must be 0 or a category id"));
        }
        validate_link("imageUrl", self.image_url.as_deref())?;
        validate_link("link", self.link.as_deref())?;
        validate_link("downloadLink", self.download_link.as_deref())
    }
}

/// Criteria used to select articles
#[derive(Debug, Clone, Default)]
pub struct ArticleFilter {
    pub category_id: Option<i64>,
    pub published: Option<bool>,
    pub search: Option<String>,
}

/// `?categoryId=&search=&published=` query parameters
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleQuery {
    pub category_id: Option<i64>,
    pub search: Option<String>,
    pub published: Option<bool>,
}

impl ArticleQuery {
    /// Filter for the public site, drafts are never visible
    pub fn public_filter(&self) -> ArticleFilter {
        ArticleFilter {
            category_id: self.category_id,
            published: Some(true),
            search: crate::model::normalize(self.search.as_deref()),
        }
    }

    pub fn admin_filter(&self) -> ArticleFilter {
        ArticleFilter {
            category_id: self.category_id,
            published: self.published,
            search: crate::model::normalize(self.search.as_deref()),
        }
    }
}
