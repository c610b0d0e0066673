pub mod extractors;
pub mod middleware;
pub mod password;
pub mod revocation;
pub mod token;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use validator::Validate;

pub use extractors::{bearer_token, AuthenticatedUser, REFRESH_HEADER};
pub use middleware::AuthMiddleware;
pub use password::{hash_password, password_matches};
pub use token::{Claims, TokenError, TokenIssuer, TokenSettings};

lazy_static! {
    static ref EMAIL_REGEX: regex::Regex =
        regex::Regex::new(r"^[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}$").unwrap();
}

/// Payload of `POST /user`.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Display name; must not be empty.
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(regex(path = "EMAIL_REGEX", message = "email is invalid"))]
    pub email: String,
    /// At least 6 characters.
    #[validate(length(
        min = 6,
        message = "password is required and must be at least 6 characters long"
    ))]
    pub password: String,
    /// Must repeat `password` exactly.
    #[serde(rename = "confirmPassword")]
    #[validate(must_match(other = "password", message = "passwords do not match"))]
    pub confirm_password: String,
}

/// Payload of `POST /login`.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

/// Payload of `PUT /user`. Only the display name can change.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
}

/// Returned by login and refresh.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenPair {
    pub token: String,
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
}
