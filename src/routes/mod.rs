use actix_web::{get, web, HttpResponse};

pub mod analytics;
pub mod articles;
pub mod auth;
pub mod categories;
pub mod images;
pub mod settings;

#[get("/api/v1/ping")]
#[tracing::instrument]
pub async fn ping() -> HttpResponse {
    HttpResponse::Ok().content_type("text/plain").body("pong")
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.configure(auth::configure)
        .configure(articles::configure)
        .configure(categories::configure)
        .configure(settings::configure)
        .configure(analytics::configure)
        .configure(images::configure);
}
