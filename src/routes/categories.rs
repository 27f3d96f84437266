use actix_web::{delete, get, post, put, web, HttpResponse};

use crate::auth::AdminUser;
use crate::errors::ApiError;
use crate::model::category::{CategoryUpdate, NewCategory};
use crate::startup::AppState;
use crate::store;

#[get("/categories")]
#[tracing::instrument(skip(app_state))]
pub async fn get_categories(app_state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let categories = store::categories::list_with_counts(&app_state.db).await?;

    Ok(HttpResponse::Ok().json(categories))
}

#[get("/categories/{id}")]
#[tracing::instrument(skip(app_state))]
pub async fn get_category(
    id: web::Path<i64>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let id = id.into_inner();
    let category = store::categories::select_by_id(&app_state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Category", id))?;

    Ok(HttpResponse::Ok().json(category))
}

#[post("/admin/categories")]
#[tracing::instrument(skip(app_state))]
pub async fn new_category(
    new_category: web::Json<NewCategory>,
    app_state: web::Data<AppState>,
    _admin: AdminUser,
) -> Result<HttpResponse, ApiError> {
    new_category.validate()?;
    let category = store::categories::create(&app_state.db, &new_category).await?;
    tracing::info!("Created category {} ({})", category.name, category.id);

    Ok(HttpResponse::Created().json(category))
}

#[put("/admin/categories/{id}")]
#[tracing::instrument(skip(app_state))]
pub async fn update_category(
    id: web::Path<i64>,
    update: web::Json<CategoryUpdate>,
    app_state: web::Data<AppState>,
    _admin: AdminUser,
) -> Result<HttpResponse, ApiError> {
    let id = id.into_inner();
    update.validate()?;
    let category = store::categories::update(&app_state.db, id, &update)
        .await?
        .ok_or_else(|| ApiError::not_found("Category", id))?;

    Ok(HttpResponse::Ok().json(category))
}

#[delete("/admin/categories/{id}")]
#[tracing::instrument(skip(app_state))]
pub async fn delete_category(
    id: web::Path<i64>,
    app_state: web::Data<AppState>,
    _admin: AdminUser,
) -> Result<HttpResponse, ApiError> {
    let id = id.into_inner();

    let articles = store::articles::count_by_category(&app_state.db, id).await?;
    if articles > 0 {
        return Err(ApiError::Conflict(format!(
            "Category {} still has {} article(s)",
            id, articles
        )));
    }

    if !store::categories::delete(&app_state.db, id).await? {
        return Err(ApiError::not_found("Category", id));
    }
    tracing::info!("Deleted category {}", id);

    Ok(HttpResponse::NoContent().finish())
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(get_categories)
        .service(get_category)
        .service(new_category)
        .service(update_category)
        .service(delete_category);
}
