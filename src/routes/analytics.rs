use actix_web::{get, post, web, HttpResponse};

use crate::auth::AdminUser;
use crate::errors::ApiError;
use crate::model::analytics::PopularQuery;
use crate::startup::AppState;
use crate::store;

/// Number of articles listed in the admin summary
const SUMMARY_TOP_ARTICLES: i64 = 5;

#[post("/analytics/articles/{id}/view")]
#[tracing::instrument(skip(app_state))]
pub async fn record_view(
    id: web::Path<i64>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let id = id.into_inner();
    if store::articles::select_by_id(&app_state.db, id, true)
        .await?
        .is_none()
    {
        return Err(ApiError::not_found("Article", id));
    }

    let views = store::analytics::record_view(&app_state.db, id).await?;

    Ok(HttpResponse::Ok().json(views))
}

#[get("/analytics/articles/{id}")]
#[tracing::instrument(skip(app_state))]
pub async fn get_article_views(
    id: web::Path<i64>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let id = id.into_inner();
    if store::articles::select_by_id(&app_state.db, id, true)
        .await?
        .is_none()
    {
        return Err(ApiError::not_found("Article", id));
    }

    let views = store::analytics::views_of(&app_state.db, id).await?;

    Ok(HttpResponse::Ok().json(views))
}

#[get("/analytics/popular")]
#[tracing::instrument(skip(app_state))]
pub async fn get_popular_articles(
    query: web::Query<PopularQuery>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let articles = store::analytics::popular(&app_state.db, query.get_limit()).await?;

    Ok(HttpResponse::Ok().json(articles))
}

#[get("/admin/analytics/summary")]
#[tracing::instrument(skip(app_state))]
pub async fn get_summary(
    app_state: web::Data<AppState>,
    _admin: AdminUser,
) -> Result<HttpResponse, ApiError> {
    let summary = store::analytics::summary(&app_state.db, SUMMARY_TOP_ARTICLES).await?;

    Ok(HttpResponse::Ok().json(summary))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(record_view)
        .service(get_article_views)
        .service(get_popular_articles)
        .service(get_summary);
}
