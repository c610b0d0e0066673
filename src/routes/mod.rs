pub mod health;
pub mod todos;
pub mod users;

use actix_web::{web, HttpRequest};

use crate::auth::{AuthMiddleware, AuthenticatedUser, TokenIssuer};
use crate::error::AppError;
use crate::models::User;
use crate::store::UserStore;

/// Registers every endpoint.
///
/// Public routes come first; everything else sits in an empty-path scope behind
/// `AuthMiddleware`, so unknown paths answer 401 rather than 404. The stores and the
/// issuer must already be registered as app data.
pub fn config(cfg: &mut web::ServiceConfig, issuer: web::Data<TokenIssuer>) {
    cfg.app_data(json_config())
        .app_data(path_config())
        .app_data(query_config())
        .service(health::health)
        .service(health::index)
        .service(users::register)
        .service(users::login)
        .service(users::refresh)
        .service(
            web::scope("")
                .wrap(AuthMiddleware::new(issuer))
                .service(users::get_self)
                .service(users::update_self)
                .service(users::delete_self)
                .service(users::logout)
                .service(todos::list_todos)
                .service(todos::create_todo)
                .service(todos::get_todo)
                .service(todos::update_todo)
                .service(todos::delete_todo),
        );
}

/// Loads the account behind the session. A token that outlived its account is
/// treated as unauthenticated.
pub(crate) async fn current_user(
    users: &dyn UserStore,
    auth: &AuthenticatedUser,
) -> Result<User, AppError> {
    match users.get_by_email(&auth.email).await {
        Ok(user) => Ok(user),
        Err(AppError::NotFound(_)) => Err(AppError::Unauthorized("User not found".into())),
        Err(e) => Err(e),
    }
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req: &HttpRequest| {
        AppError::BadRequest(format!("Invalid request body: {}", err)).into()
    })
}

fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, _req: &HttpRequest| {
        log::debug!("Rejected path parameter: {}", err);
        AppError::BadRequest("Invalid id".into()).into()
    })
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req: &HttpRequest| {
        log::debug!("Rejected query string: {}", err);
        AppError::BadRequest("Invalid query string".into()).into()
    })
}
