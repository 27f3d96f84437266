use std::collections::BTreeMap;

use chrono::Utc;
use sqlx::{QueryBuilder, Result, Sqlite};

use crate::database::Pool;
use crate::model::normalize;
use crate::model::setting::{NewSetting, Setting, SettingUpdate};

const SETTING_COLUMNS: &str = r#"id, key, value, description, "type", created_at, updated_at"#;

/// Return every setting, ordered by key
#[tracing::instrument(skip(db))]
pub async fn list(db: &Pool) -> Result<Vec<Setting>> {
    sqlx::query_as::<_, Setting>(&format!(
        "SELECT {} FROM settings ORDER BY key",
        SETTING_COLUMNS
    ))
    .fetch_all(db)
    .await
}

/// Return the settings as a `key -> value` map, as consumed by the public site
#[tracing::instrument(skip(db))]
pub async fn values(db: &Pool) -> Result<BTreeMap<String, String>> {
    let rows: Vec<(String, String)> = sqlx::query_as("SELECT key, value FROM settings")
        .fetch_all(db)
        .await?;

    Ok(rows.into_iter().collect())
}

#[tracing::instrument(skip(db))]
pub async fn select_by_key(db: &Pool, key: &str) -> Result<Option<Setting>> {
    sqlx::query_as::<_, Setting>(&format!(
        "SELECT {} FROM settings WHERE key = ?",
        SETTING_COLUMNS
    ))
    .bind(key)
    .fetch_optional(db)
    .await
}

/// Insert a new setting, returning it
#[tracing::instrument(skip(db))]
pub async fn create(db: &Pool, setting: &NewSetting) -> Result<Setting> {
    let now = Utc::now();
    sqlx::query_as::<_, Setting>(&format!(
        r#"
        INSERT INTO settings (key, value, description, "type", created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING {}
        "#,
        SETTING_COLUMNS
    ))
    .bind(&setting.key)
    .bind(&setting.value)
    .bind(normalize(setting.description.as_deref()))
    .bind(setting.setting_type)
    .bind(now)
    .bind(now)
    .fetch_one(db)
    .await
}

/// Apply a partial update. Returns `None` when the key is unknown.
#[tracing::instrument(skip(db))]
pub async fn update(db: &Pool, key: &str, update: &SettingUpdate) -> Result<Option<Setting>> {
    let mut query: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE settings SET ");
    let mut assignments = query.separated(", ");

    if let Some(value) = &update.value {
        assignments.push("value = ");
        assignments.push_bind_unseparated(value.clone());
    }
    if let Some(description) = &update.description {
        assignments.push("description = ");
        assignments.push_bind_unseparated(normalize(Some(description.as_str())));
    }
    if let Some(setting_type) = update.setting_type {
        assignments.push(r#""type" = "#);
        assignments.push_bind_unseparated(setting_type);
    }
    assignments.push("updated_at = ");
    assignments.push_bind_unseparated(Utc::now());

    query.push(" WHERE key = ");
    query.push_bind(key.to_owned());
    query.push(" RETURNING ");
    query.push(SETTING_COLUMNS);

    query.build_query_as::<Setting>().fetch_optional(db).await
}

/// Update the values of several settings at once, all or nothing.
/// An unknown key aborts the whole update with `RowNotFound`.
#[tracing::instrument(skip(db, values))]
pub async fn update_values(db: &Pool, values: &BTreeMap<String, String>) -> Result<()> {
    let mut transaction = db.begin().await?;
    let now = Utc::now();

    for (key, value) in values {
        let result = sqlx::query("UPDATE settings SET value = ?, updated_at = ? WHERE key = ?")
            .bind(value)
            .bind(now)
            .bind(key)
            .execute(&mut *transaction)
            .await?;

        if result.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }
    }

    transaction.commit().await?;
    tracing::debug!("Updated {} settings", values.len());

    Ok(())
}

/// Delete a setting, returning whether it existed
#[tracing::instrument(skip(db))]
pub async fn delete(db: &Pool, key: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM settings WHERE key = ?")
        .bind(key)
        .execute(db)
        .await?;

    Ok(result.rows_affected() > 0)
}
