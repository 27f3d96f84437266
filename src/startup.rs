use std::io::{Error, ErrorKind};
use std::net::TcpListener;
use std::path::Path;

use actix_governor::Governor;
use actix_web::web::Data;
use actix_web::{web, App, HttpServer};
use secrecy::Secret;

use crate::configuration::Settings;
use crate::database::Pool;
use crate::errors::ApiError;
use crate::images::ImageStore;
use crate::rate_limiting::{build_rate_limiting_conf, RateLimitingConfig};
use crate::routes;

/// Largest accepted JSON body
const JSON_LIMIT: usize = 1024 * 1024;

pub struct AppState {
    pub db: Pool,
    pub images: ImageStore,
    pub admin_token: Secret<String>,
}

/// Extractor configuration: body limits, and malformed JSON, query strings or
/// paths answered with a problem document.
fn configure_extractors(cfg: &mut web::ServiceConfig, max_upload_size: usize) {
    cfg.app_data(web::PayloadConfig::new(max_upload_size))
        .app_data(
            web::JsonConfig::default()
                .limit(JSON_LIMIT)
                .error_handler(|err, _| ApiError::invalid(err.to_string()).into()),
        )
        .app_data(
            web::QueryConfig::default()
                .error_handler(|err, _| ApiError::invalid(err.to_string()).into()),
        )
        .app_data(
            web::PathConfig::default()
                .error_handler(|err, _| ApiError::invalid(err.to_string()).into()),
        );
}

/// Routes of the application: ping and images at the root, the API behind the
/// rate limiter, then the front-end files when a static directory is given.
pub fn configure_app(
    cfg: &mut web::ServiceConfig,
    governor_conf: &RateLimitingConfig,
    static_dir: Option<&Path>,
    max_upload_size: usize,
) {
    configure_extractors(cfg, max_upload_size);
    cfg.service(routes::ping)
        .service(routes::images::serve_image)
        .service(
            web::scope("/api/v1")
                .wrap(Governor::new(governor_conf))
                .configure(routes::configure),
        );

    if let Some(static_dir) = static_dir {
        cfg.service(actix_files::Files::new("/", static_dir).index_file("index.html"));
    }
}

pub async fn startup(settings: Settings, db: Pool, listener: TcpListener) -> std::io::Result<()> {
    let governor_conf = build_rate_limiting_conf(&settings)
        .ok_or_else(|| Error::new(ErrorKind::InvalidInput, "Invalid rate limiting configuration"))?;

    let images = ImageStore::new(
        &settings.image_storage_path,
        &settings.image_public_prefix,
        settings.image_max_size,
    );
    images.init().await?;

    let max_upload_size = settings.image_max_size;
    let static_dir = Some(settings.static_dir.clone()).filter(|dir| dir.is_dir());
    if static_dir.is_none() {
        tracing::info!(
            "No static directory at {:?}, only serving the API",
            settings.static_dir
        );
    }

    let app_state = Data::new(AppState {
        db,
        images,
        admin_token: settings.admin_token,
    });

    HttpServer::new(move || {
        App::new()
            .wrap(tracing_actix_web::TracingLogger::default())
            .app_data(app_state.clone())
            .configure(|cfg| {
                configure_app(cfg, &governor_conf, static_dir.as_deref(), max_upload_size)
            })
    })
    .listen(listener)?
    .run()
    .await
}
