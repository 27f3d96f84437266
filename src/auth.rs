use std::future::{ready, Ready};

use actix_web::http::header::HeaderMap;
use actix_web::web::Data;
use actix_web::{dev, FromRequest, HttpRequest};
use anyhow::anyhow;
use secrecy::{ExposeSecret, Secret};

use crate::errors::AuthenticationError;
use crate::startup::AppState;

/// # Proof that the request carries the admin bearer token
#[derive(Debug)]
pub struct AdminUser;

impl FromRequest for AdminUser {
    type Error = AuthenticationError;
    type Future = Ready<Result<Self, Self::Error>>;

    #[tracing::instrument(skip_all)]
    fn from_request(req: &HttpRequest, _: &mut dev::Payload) -> Self::Future {
        ready(extract_admin_user(req))
    }
}

fn extract_admin_user(req: &HttpRequest) -> Result<AdminUser, AuthenticationError> {
    let app_state = req
        .app_data::<Data<AppState>>()
        .ok_or_else(|| anyhow!("Application state is not configured"))?;

    let token = extract_bearer_token(req.headers())?;
    if check_token(&app_state.admin_token, token) {
        Ok(AdminUser)
    } else {
        tracing::warn!("Rejected admin request with an invalid token");
        Err(AuthenticationError::InvalidToken)
    }
}

/// # Extract the token of a `Authorization: Bearer <token>` header
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, AuthenticationError> {
    let header_value = headers
        .get("Authorization")
        .ok_or(AuthenticationError::MissingHeader)?
        .to_str()
        .map_err(|_| AuthenticationError::InvalidHeader)?;

    let mut split_header = header_value.split_whitespace();
    let scheme = split_header
        .next()
        .ok_or(AuthenticationError::InvalidHeader)?;
    let token = split_header
        .next()
        .ok_or(AuthenticationError::InvalidHeader)?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthenticationError::UnknownAuthScheme);
    }
    if split_header.next().is_some() {
        return Err(AuthenticationError::InvalidHeader);
    }

    Ok(token)
}

/// # Compare a candidate with the configured admin token
pub fn check_token(admin_token: &Secret<String>, candidate: &str) -> bool {
    let expected = admin_token.expose_secret().as_bytes();
    let candidate = candidate.as_bytes();

    // Compare every byte so the duration does not depend on the matching prefix
    expected.len() == candidate.len()
        && expected
            .iter()
            .zip(candidate)
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}
