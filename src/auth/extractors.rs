use actix_web::dev::Payload;
use actix_web::http::header::HeaderMap;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::error::AppError;

/// Name of the header carrying the refresh token on `/refresh` and `/logout`.
pub const REFRESH_HEADER: &str = "Refresh";

/// The identity resolved by `AuthMiddleware`.
///
/// Handlers on protected routes take this as an argument. `token` is the raw access
/// token the request was authenticated with, kept so it can be revoked.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub email: String,
    pub token: String,
}

impl FromRequest for AuthenticatedUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthenticatedUser>().cloned() {
            Some(user) => ready(Ok(user)),
            None => {
                let err = AppError::Unauthorized("Unauthorized".to_string());
                ready(Err(err.into()))
            }
        }
    }
}

/// Reads a token from `name`, dropping an optional `Bearer ` prefix.
///
/// Returns `None` for a missing, non-ASCII or blank header.
pub fn bearer_token(headers: &HeaderMap, name: &str) -> Option<String> {
    let value = headers.get(name)?.to_str().ok()?.trim();
    let token = match value.strip_prefix("Bearer") {
        Some(rest) if rest.is_empty() || rest.starts_with(' ') => rest.trim_start(),
        _ => value,
    };
    if token.is_empty() {
        None
    } else {
        Some(token.to_owned())
    }
}
