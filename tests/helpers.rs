use std::path::Path;

use actix_web::body::BoxBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::header::{HeaderName, AUTHORIZATION};
use actix_web::web::Data;
use actix_web::App;
use secrecy::Secret;
use uuid::Uuid;

use blog_api::configuration::Settings;
use blog_api::database::Pool;
use blog_api::images::ImageStore;
use blog_api::rate_limiting::{build_rate_limiting_conf, RateLimitingConfig};
use blog_api::startup::{configure_app, AppState};

pub const ADMIN_TOKEN: &str = "test-token";
pub const MAX_UPLOAD_SIZE: usize = 1024;

/// Application state over a test database, with images stored in a fresh temporary directory
pub async fn app_state(db: Pool) -> Data<AppState> {
    let root = std::env::temp_dir().join(format!("blog-api-tests-{}", Uuid::new_v4()));
    let images = ImageStore::new(root, "/images", MAX_UPLOAD_SIZE);
    images.init().await.unwrap();

    Data::new(AppState {
        db,
        images,
        admin_token: Secret::new(ADMIN_TOKEN.to_owned()),
    })
}

/// Rate limiting configuration as read from the environment
pub fn rate_limiting(bucket_size: u32, fill_rate: u64) -> RateLimitingConfig {
    let bucket_size = bucket_size.to_string();
    let fill_rate = fill_rate.to_string();
    let settings = Settings::from_lookup(|name| match name {
        "ADMIN_TOKEN" => Some(ADMIN_TOKEN.to_owned()),
        "RATE_LIMITING_BUCKET_SIZE" => Some(bucket_size.clone()),
        "RATE_LIMITING_FILL_RATE" => Some(fill_rate.clone()),
        _ => None,
    })
    .unwrap();

    build_rate_limiting_conf(&settings).unwrap()
}

/// The server application, with a rate limit no test reaches
pub fn app(
    state: Data<AppState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<BoxBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    app_with(state, &rate_limiting(10_000, 1_000), None)
}

pub fn app_with(
    state: Data<AppState>,
    governor_conf: &RateLimitingConfig,
    static_dir: Option<&Path>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<BoxBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(state)
        .configure(|cfg| configure_app(cfg, governor_conf, static_dir, MAX_UPLOAD_SIZE))
}

pub fn admin() -> (HeaderName, String) {
    (AUTHORIZATION, format!("Bearer {}", ADMIN_TOKEN))
}

pub async fn cleanup(state: &AppState) {
    tokio::fs::remove_dir_all(state.images.root()).await.unwrap();
}
