use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    web, Error, HttpMessage, ResponseError,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::auth::extractors::{bearer_token, AuthenticatedUser};
use crate::auth::token::TokenIssuer;
use crate::error::AppError;

/// Rejects requests without a valid access token.
///
/// Wrap the scope holding the protected routes with it. On success the request
/// carries an [`AuthenticatedUser`] in its extensions.
pub struct AuthMiddleware {
    issuer: web::Data<TokenIssuer>,
}

impl AuthMiddleware {
    pub fn new(issuer: web::Data<TokenIssuer>) -> Self {
        Self { issuer }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            issuer: self.issuer.clone(),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    issuer: web::Data<TokenIssuer>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let token = match bearer_token(req.headers(), AUTHORIZATION.as_str()) {
            Some(token) => token,
            None => {
                let app_err = AppError::Unauthorized("Authorization header missing".into());
                return Box::pin(async move { Ok(reject(req, app_err)) });
            }
        };

        match self.issuer.validate_access_token(&token) {
            Ok(email) => {
                req.extensions_mut().insert(AuthenticatedUser { email, token });
                let fut = self.service.call(req);
                Box::pin(async move { fut.await.map(|res| res.map_into_left_body()) })
            }
            Err(token_err) => {
                log::warn!("Rejected token on {}: {}", req.path(), token_err);
                let app_err = AppError::from(token_err);
                Box::pin(async move { Ok(reject(req, app_err)) })
            }
        }
    }
}

/// Short-circuits the request with the error envelope instead of calling the route.
fn reject<B>(req: ServiceRequest, err: AppError) -> ServiceResponse<EitherBody<B>> {
    req.into_response(err.error_response()).map_into_right_body()
}
