use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::errors::ApiError;
use crate::model::{is_hex_color, require_text};

pub const DEFAULT_COLOR: &str = "#6b7280";

/// A labeled, colored grouping of articles
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub color: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A category with the number of published articles it holds
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CategoryWithCount {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub category: Category,
    pub article_count: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
}

impl NewCategory {
    pub fn validate(&self) -> Result<(), ApiError> {
        require_text("name", &self.name)?;
        validate_color(self.color.as_deref())
    }

    pub fn color(&self) -> String {
        self.color
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_COLOR)
            .to_owned()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
}

impl CategoryUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.color.is_none()
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        if self.is_empty() {
            return Err(ApiError::invalid("Nothing to update"));
        }
        if let Some(name) = &self.name {
            require_text("name", name)?;
        }
        if let Some(color) = &self.color {
            require_text("color", color)?;
        }
        validate_color(self.color.as_deref())
    }
}

fn validate_color(color: Option<&str>) -> Result<(), ApiError> {
    match color.map(str::trim) {
        None | Some("") => Ok(()),
        Some(c) if is_hex_color(c) => Ok(()),
        Some(c) => Err(ApiError::invalid(format!(
            "color must be formatted as #rgb or #rrggbb, got {}",
            c
        ))),
    }
}
