use std::collections::BTreeMap;

use actix_web::{delete, get, post, put, web, HttpResponse};

use crate::auth::AdminUser;
use crate::errors::ApiError;
use crate::model::setting::{NewSetting, SettingUpdate};
use crate::startup::AppState;
use crate::store;

/// Public `key -> value` map used by the site front-end
#[get("/settings")]
#[tracing::instrument(skip(app_state))]
pub async fn get_settings(app_state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let values = store::settings::values(&app_state.db).await?;

    Ok(HttpResponse::Ok().json(values))
}

#[get("/settings/{key}")]
#[tracing::instrument(skip(app_state))]
pub async fn get_setting(
    key: web::Path<String>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let setting = store::settings::select_by_key(&app_state.db, &key)
        .await?
        .ok_or_else(|| ApiError::not_found("Setting", &key))?;

    Ok(HttpResponse::Ok().json(setting))
}

#[get("/admin/settings")]
#[tracing::instrument(skip(app_state))]
pub async fn get_all_settings(
    app_state: web::Data<AppState>,
    _admin: AdminUser,
) -> Result<HttpResponse, ApiError> {
    let settings = store::settings::list(&app_state.db).await?;

    Ok(HttpResponse::Ok().json(settings))
}

#[post("/admin/settings")]
#[tracing::instrument(skip(app_state))]
pub async fn new_setting(
    new_setting: web::Json<NewSetting>,
    app_state: web::Data<AppState>,
    _admin: AdminUser,
) -> Result<HttpResponse, ApiError> {
    new_setting.validate()?;
    let setting = store::settings::create(&app_state.db, &new_setting).await?;
    tracing::info!("Created setting {}", setting.key);

    Ok(HttpResponse::Created().json(setting))
}

#[put("/admin/settings/{key}")]
#[tracing::instrument(skip(app_state))]
pub async fn update_setting(
    key: web::Path<String>,
    update: web::Json<SettingUpdate>,
    app_state: web::Data<AppState>,
    _admin: AdminUser,
) -> Result<HttpResponse, ApiError> {
    let current = store::settings::select_by_key(&app_state.db, &key)
        .await?
        .ok_or_else(|| ApiError::not_found("Setting", &key))?;
    update.validate(&current)?;

    let setting = store::settings::update(&app_state.db, &key, &update)
        .await?
        .ok_or_else(|| ApiError::not_found("Setting", &key))?;

    Ok(HttpResponse::Ok().json(setting))
}

/// Bulk update of values, `{"site_title": "...", "posts_per_page": "20"}`.
/// Every value is checked against the type of its setting before anything is written.
#[put("/admin/settings")]
#[tracing::instrument(skip(app_state))]
pub async fn update_settings(
    values: web::Json<BTreeMap<String, String>>,
    app_state: web::Data<AppState>,
    _admin: AdminUser,
) -> Result<HttpResponse, ApiError> {
    if values.is_empty() {
        return Err(ApiError::invalid("Nothing to update"));
    }

    let types: BTreeMap<String, _> = store::settings::list(&app_state.db)
        .await?
        .into_iter()
        .map(|setting| (setting.key, setting.setting_type))
        .collect();

    for (key, value) in values.iter() {
        let setting_type = types
            .get(key)
            .ok_or_else(|| ApiError::not_found("Setting", key))?;
        setting_type
            .validate(value)
            .map_err(|e| ApiError::invalid(format!("{}: {}", key, e)))?;
    }

    store::settings::update_values(&app_state.db, &values).await?;
    tracing::info!("Updated {} setting(s)", values.len());

    let values = store::settings::values(&app_state.db).await?;
    Ok(HttpResponse::Ok().json(values))
}

#[delete("/admin/settings/{key}")]
#[tracing::instrument(skip(app_state))]
pub async fn delete_setting(
    key: web::Path<String>,
    app_state: web::Data<AppState>,
    _admin: AdminUser,
) -> Result<HttpResponse, ApiError> {
    if !store::settings::delete(&app_state.db, &key).await? {
        return Err(ApiError::not_found("Setting", &key));
    }
    tracing::info!("Deleted setting {}", key);

    Ok(HttpResponse::NoContent().finish())
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(get_settings)
        .service(get_setting)
        .service(get_all_settings)
        .service(new_setting)
        .service(update_settings)
        .service(update_setting)
        .service(delete_setting);
}
