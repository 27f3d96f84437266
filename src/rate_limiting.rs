use actix_governor::governor::middleware::StateInformationMiddleware;
use actix_governor::{
    GovernorConfig, GovernorConfigBuilder, KeyExtractor, SimpleKeyExtractionError,
};
use actix_web::dev::ServiceRequest;
use actix_web::web::Data;

use crate::auth::{check_token, extract_bearer_token};
use crate::configuration::Settings;
use crate::startup::AppState;

/// Bucket shared by every request carrying the admin token
const ADMIN_KEY: &str = "admin";
/// Bucket of the clients without a peer address
const UNKNOWN_KEY: &str = "unknown";

pub type RateLimitingConfig = GovernorConfig<ClientKey, StateInformationMiddleware>;

/// Rate limiting key: the admin bucket when the request carries the admin
/// token, the peer address otherwise. Other `Authorization` values are ignored,
/// so a client can't get fresh buckets by changing them.
#[derive(Clone)]
pub struct ClientKey;

impl KeyExtractor for ClientKey {
    type Key = String;
    type KeyExtractionError = SimpleKeyExtractionError<&'static str>;

    fn extract(&self, req: &ServiceRequest) -> Result<Self::Key, Self::KeyExtractionError> {
        let is_admin = req
            .app_data::<Data<AppState>>()
            .zip(extract_bearer_token(req.headers()).ok())
            .map_or(false, |(app_state, token)| {
                check_token(&app_state.admin_token, token)
            });

        if is_admin {
            return Ok(ADMIN_KEY.to_owned());
        }

        Ok(req
            .peer_addr()
            .map(|x| x.ip().to_string())
            .unwrap_or_else(|| UNKNOWN_KEY.to_owned()))
    }
}

/// Token bucket of `RATE_LIMITING_BUCKET_SIZE` requests, refilled with
/// `RATE_LIMITING_FILL_RATE` requests per second
pub fn build_rate_limiting_conf(settings: &Settings) -> Option<RateLimitingConfig> {
    GovernorConfigBuilder::default()
        .per_millisecond((1000 / settings.rate_limiting_fill_rate.max(1)).max(1))
        .burst_size(settings.rate_limiting_bucket_size)
        .key_extractor(ClientKey)
        .use_headers()
        .finish()
}
