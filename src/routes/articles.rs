use actix_web::{delete, get, post, put, web, HttpResponse};
use serde::Deserialize;

use crate::auth::AdminUser;
use crate::errors::ApiError;
use crate::model::article::{ArticleFilter, ArticleQuery, ArticleUpdate, NewArticle};
use crate::model::{normalize, PageParameters};
use crate::startup::AppState;
use crate::store;

#[get("/articles")]
#[tracing::instrument(skip(app_state))]
pub async fn get_articles(
    page: web::Query<PageParameters>,
    query: web::Query<ArticleQuery>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let articles = store::articles::list(&app_state.db, &query.public_filter(), &page).await?;

    Ok(HttpResponse::Ok().json(articles))
}

#[get("/articles/{id}")]
#[tracing::instrument(skip(app_state))]
pub async fn get_article(
    id: web::Path<i64>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let id = id.into_inner();
    let article = store::articles::select_by_id(&app_state.db, id, true)
        .await?
        .ok_or_else(|| ApiError::not_found("Article", id))?;

    Ok(HttpResponse::Ok().json(article))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    q: Option<String>,
}

#[get("/search")]
#[tracing::instrument(skip(app_state))]
pub async fn search_articles(
    search: web::Query<SearchQuery>,
    page: web::Query<PageParameters>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let term = normalize(search.q.as_deref())
        .ok_or_else(|| ApiError::invalid("The search term must not be empty"))?;

    let filter = ArticleFilter {
        category_id: None,
        published: Some(true),
        search: Some(term),
    };
    let articles = store::articles::list(&app_state.db, &filter, &page).await?;

    Ok(HttpResponse::Ok().json(articles))
}

#[get("/admin/articles")]
#[tracing::instrument(skip(app_state))]
pub async fn get_all_articles(
    page: web::Query<PageParameters>,
    query: web::Query<ArticleQuery>,
    app_state: web::Data<AppState>,
    _admin: AdminUser,
) -> Result<HttpResponse, ApiError> {
    let articles = store::articles::list(&app_state.db, &query.admin_filter(), &page).await?;

    Ok(HttpResponse::Ok().json(articles))
}

#[get("/admin/articles/{id}")]
#[tracing::instrument(skip(app_state))]
pub async fn get_any_article(
    id: web::Path<i64>,
    app_state: web::Data<AppState>,
    _admin: AdminUser,
) -> Result<HttpResponse, ApiError> {
    let id = id.into_inner();
    let article = store::articles::select_by_id(&app_state.db, id, false)
        .await?
        .ok_or_else(|| ApiError::not_found("Article", id))?;

    Ok(HttpResponse::Ok().json(article))
}

#[post("/admin/articles")]
#[tracing::instrument(skip(app_state, new_article))]
pub async fn new_article(
    new_article: web::Json<NewArticle>,
    app_state: web::Data<AppState>,
    _admin: AdminUser,
) -> Result<HttpResponse, ApiError> {
    let new_article = new_article.into_inner();
    new_article.validate()?;
    check_category(&app_state, new_article.category_id).await?;

    let article = store::articles::create(&app_state.db, &new_article).await?;
    tracing::info!("Created article {}", article.id);

    Ok(HttpResponse::Created().json(article))
}

#[put("/admin/articles/{id}")]
#[tracing::instrument(skip(app_state, update))]
pub async fn update_article(
    id: web::Path<i64>,
    update: web::Json<ArticleUpdate>,
    app_state: web::Data<AppState>,
    _admin: AdminUser,
) -> Result<HttpResponse, ApiError> {
    let id = id.into_inner();
    let update = update.into_inner();
    update.validate()?;
    check_category(&app_state, update.category_id.filter(|c| *c != 0)).await?;

    let article = store::articles::update(&app_state.db, id, &update)
        .await?
        .ok_or_else(|| ApiError::not_found("Article", id))?;

    Ok(HttpResponse::Ok().json(article))
}

#[delete("/admin/articles/{id}")]
#[tracing::instrument(skip(app_state))]
pub async fn delete_article(
    id: web::Path<i64>,
    app_state: web::Data<AppState>,
    _admin: AdminUser,
) -> Result<HttpResponse, ApiError> {
    let id = id.into_inner();
    if !store::articles::delete(&app_state.db, id).await? {
        return Err(ApiError::not_found("Article", id));
    }
    tracing::info!("Deleted article {}", id);

    Ok(HttpResponse::NoContent().finish())
}

/// An article can only reference an existing category
async fn check_category(app_state: &AppState, category_id: Option<i64>) -> Result<(), ApiError> {
    match category_id {
        Some(category_id) if !store::categories::exists(&app_state.db, category_id).await? => Err(
            ApiError::invalid(format!("Category {} does not exist", category_id)),
        ),
        _ => Ok(()),
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(get_articles)
        .service(get_article)
        .service(search_articles)
        .service(get_all_articles)
        .service(get_any_article)
        .service(new_article)
        .service(update_article)
        .service(delete_article);
}
