use actix_files::NamedFile;
use actix_web::http::header;
use actix_web::{delete, get, post, web, CustomizeResponder, HttpRequest, HttpResponse, Responder};

use crate::auth::AdminUser;
use crate::errors::ApiError;
use crate::images::content_type_of;
use crate::startup::AppState;

/// Upload of a raw image body, typed by its `Content-Type` header.
/// Extractors resolve in order: the token is checked before the body is read.
#[post("/admin/images")]
#[tracing::instrument(skip(req, body, app_state), fields(size = body.len()))]
pub async fn upload_image(
    _admin: AdminUser,
    req: HttpRequest,
    body: web::Bytes,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    let image = app_state.images.put(&body, content_type).await?;

    Ok(HttpResponse::Created().json(image))
}

#[delete("/admin/images/{key}")]
#[tracing::instrument(skip(app_state))]
pub async fn delete_image(
    key: web::Path<String>,
    app_state: web::Data<AppState>,
    _admin: AdminUser,
) -> Result<HttpResponse, ApiError> {
    app_state.images.delete(&key).await?;

    Ok(HttpResponse::NoContent().finish())
}

/// Serve a stored object. Keys never change content, clients may cache them forever.
/// Objects are sandboxed so that scripts embedded in SVG files never run.
#[get("/images/{key}")]
#[tracing::instrument(skip(app_state))]
pub async fn serve_image(
    key: web::Path<String>,
    app_state: web::Data<AppState>,
) -> Result<CustomizeResponder<NamedFile>, ApiError> {
    let path = app_state.images.path_of(&key).await?;
    let content_type = content_type_of(&key).unwrap_or("application/octet-stream");

    Ok(NamedFile::open_async(path)
        .await?
        .customize()
        .insert_header((header::CONTENT_TYPE, content_type))
        .insert_header((header::CACHE_CONTROL, "public, max-age=31536000, immutable"))
        .insert_header((
            header::CONTENT_SECURITY_POLICY,
            "sandbox; default-src 'none'; style-src 'unsafe-inline'",
        ))
        .insert_header((header::X_CONTENT_TYPE_OPTIONS, "nosniff")))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(upload_image).service(delete_image);
}
