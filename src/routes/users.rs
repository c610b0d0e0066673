use super::current_user;
use crate::{
    auth::{
        bearer_token, hash_password, password_matches, AuthenticatedUser, LoginRequest,
        RegisterRequest, TokenIssuer, TokenPair, UpdateUserRequest, REFRESH_HEADER,
    },
    error::AppError,
    models::{User, UserResponse},
    store::UserStore,
};
use actix_web::{
    delete, get, http::header::AUTHORIZATION, post, put, web, HttpRequest, HttpResponse,
    Responder,
};
use chrono::Utc;
use serde_json::json;
use validator::Validate;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Register a new user
///
/// Validates the payload, hashes the password and stores the account.
///
/// ## Responses:
/// - `201 Created`: `{ id, name, email }`.
/// - `400 Bad Request`: malformed body, failed validation, or email already registered.
#[post("/user")]
pub async fn register(
    users: web::Data<dyn UserStore>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    register_data.validate()?;
    let RegisterRequest {
        name,
        email,
        password,
        ..
    } = register_data.into_inner();

    let password_hash = web::block(move || hash_password(&password))
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))??;

    let user = users.create(&User::new(name, email, password_hash)).await?;
    log::info!("Registered user {}", user.id);

    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

/// Login user
///
/// Exchanges email and password for an access/refresh token pair.
///
/// ## Responses:
/// - `200 OK`: `{ token, refreshToken }`.
/// - `400 Bad Request`: unknown email, removed account or wrong password.
#[post("/login")]
pub async fn login(
    users: web::Data<dyn UserStore>,
    issuer: web::Data<TokenIssuer>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    login_data.validate()?;
    let LoginRequest { email, password } = login_data.into_inner();

    let user = match users.get_by_email(&email).await {
        Ok(user) => user,
        Err(AppError::NotFound(_)) => {
            return Err(AppError::BadRequest(INVALID_CREDENTIALS.into()));
        }
        Err(e) => return Err(e),
    };

    let password_hash = user.password_hash.clone();
    let matches = web::block(move || password_matches(&password, &password_hash))
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;
    if !matches {
        log::info!("Failed login for user {}", user.id);
        return Err(AppError::BadRequest(INVALID_CREDENTIALS.into()));
    }

    let pair = TokenPair {
        token: issuer.issue_access_token(&user.email)?,
        refresh_token: issuer.issue_refresh_token(&user.email)?,
    };
    log::info!("User {} logged in", user.id);

    Ok(HttpResponse::Ok().json(pair))
}

/// Returns the caller's own account.
#[get("/user")]
pub async fn get_self(
    users: web::Data<dyn UserStore>,
    auth: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let user = current_user(users.get_ref(), &auth).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

/// Renames the caller's own account.
#[put("/user")]
pub async fn update_self(
    users: web::Data<dyn UserStore>,
    auth: AuthenticatedUser,
    update_data: web::Json<UpdateUserRequest>,
) -> Result<impl Responder, AppError> {
    update_data.validate()?;

    let mut user = current_user(users.get_ref(), &auth).await?;
    user.name = update_data.into_inner().name;
    user.updated_at = Utc::now();

    let user = users.update(&user).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

/// Soft-deletes the caller's own account and revokes the token used for the request.
#[delete("/user")]
pub async fn delete_self(
    users: web::Data<dyn UserStore>,
    issuer: web::Data<TokenIssuer>,
    auth: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let user = current_user(users.get_ref(), &auth).await?;
    let user = users.delete(&user.email).await?;
    issuer.revoke(&auth.token);
    log::info!("Removed user {}", user.id);

    Ok(HttpResponse::Ok().json(json!({
        "message": "User deleted",
        "success": true
    })))
}

/// Issues a fresh access token.
///
/// Expects the current access token in `Authorization` (it may already be expired)
/// and the refresh token in `Refresh`. Both must belong to the same user. The
/// superseded access token is revoked.
///
/// ## Responses:
/// - `200 OK`: `{ token, refreshToken }` with the new access token and the presented
///   refresh token.
/// - `401 Unauthorized`: a header is missing, either token is invalid, the tokens
///   belong to different users, or the account no longer exists.
#[post("/refresh")]
pub async fn refresh(
    req: HttpRequest,
    users: web::Data<dyn UserStore>,
    issuer: web::Data<TokenIssuer>,
) -> Result<impl Responder, AppError> {
    let access_token = bearer_token(req.headers(), AUTHORIZATION.as_str())
        .ok_or_else(|| AppError::Unauthorized("Authorization header missing".into()))?;
    let refresh_token = bearer_token(req.headers(), REFRESH_HEADER)
        .ok_or_else(|| AppError::Unauthorized("Refresh header missing".into()))?;

    let email = issuer.validate_refresh_token(&refresh_token).map_err(|e| {
        log::warn!("Rejected refresh token: {}", e);
        AppError::Unauthorized("Invalid refresh token".into())
    })?;

    let owner = issuer.access_token_owner(&access_token).map_err(|e| {
        log::warn!("Rejected access token on refresh: {}", e);
        AppError::Unauthorized("Invalid access token".into())
    })?;
    if owner != email {
        log::warn!("Refresh token and access token belong to different users");
        return Err(AppError::Unauthorized("Token mismatch".into()));
    }

    let user = match users.get_by_email(&email).await {
        Ok(user) => user,
        Err(AppError::NotFound(_)) => return Err(AppError::Unauthorized("Invalid user".into())),
        Err(e) => return Err(e),
    };

    issuer.revoke(&access_token);
    let pair = TokenPair {
        token: issuer.issue_access_token(&user.email)?,
        refresh_token,
    };

    Ok(HttpResponse::Ok().json(pair))
}

/// Logs the caller out.
///
/// Revokes the bearer token and, when the `Refresh` header is present, the refresh
/// token as well.
#[post("/logout")]
pub async fn logout(
    req: HttpRequest,
    issuer: web::Data<TokenIssuer>,
    auth: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    issuer.revoke(&auth.token);
    if let Some(refresh_token) = bearer_token(req.headers(), REFRESH_HEADER) {
        issuer.revoke(&refresh_token);
    }
    log::info!("User {} logged out", auth.email);

    Ok(HttpResponse::Ok().json(json!({
        "message": "Logged out successfully",
        "success": true
    })))
}
