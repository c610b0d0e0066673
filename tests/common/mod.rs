#![allow(dead_code)]

use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::header::AUTHORIZATION;
use actix_web::middleware::Logger;
use actix_web::{test, web, App};
use async_trait::async_trait;
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

use todo_api::auth::{TokenIssuer, TokenPair, TokenSettings};
use todo_api::error::AppError;
use todo_api::models::{Todo, TodoQuery, User};
use todo_api::routes;
use todo_api::store::{TodoStore, UserStore};

/// In-memory `UserStore` with the same uniqueness and soft-delete rules as the
/// PostgreSQL one.
#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<Vec<User>>,
}

impl MemoryUserStore {
    /// Every stored record, removed ones included.
    pub fn all(&self) -> Vec<User> {
        self.users.lock().unwrap().clone()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, user: &User) -> Result<User, AppError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| !u.removed && u.email == user.email) {
            return Err(AppError::BadRequest("Email already registered".into()));
        }
        users.push(user.clone());
        Ok(user.clone())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<User, AppError> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| !u.removed && u.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("User not found".into()))
    }

    async fn get_by_email(&self, email: &str) -> Result<User, AppError> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| !u.removed && u.email == email)
            .cloned()
            .ok_or_else(|| AppError::NotFound("User not found".into()))
    }

    async fn update(&self, user: &User) -> Result<User, AppError> {
        let mut users = self.users.lock().unwrap();
        let stored = users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;
        *stored = user.clone();
        Ok(user.clone())
    }
}

#[derive(Default)]
pub struct MemoryTodoStore {
    todos: Mutex<Vec<Todo>>,
}

#[async_trait]
impl TodoStore for MemoryTodoStore {
    async fn create(&self, todo: &Todo) -> Result<Todo, AppError> {
        self.todos.lock().unwrap().push(todo.clone());
        Ok(todo.clone())
    }

    async fn get(&self, id: Uuid, owner: Uuid) -> Result<Todo, AppError> {
        self.todos
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.id == id && t.user_id == owner)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Todo not found".into()))
    }

    async fn list(&self, owner: Uuid, query: &TodoQuery) -> Result<(Vec<Todo>, i64), AppError> {
        let needle = query.search.as_ref().map(|s| s.to_lowercase());
        let mut matching: Vec<Todo> = self
            .todos
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.user_id == owner)
            .filter(|t| match &needle {
                Some(n) => {
                    t.title.to_lowercase().contains(n) || t.description.to_lowercase().contains(n)
                }
                None => true,
            })
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matching.len() as i64;
        let page = matching
            .into_iter()
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .collect();
        Ok((page, total))
    }

    async fn update(&self, todo: &Todo) -> Result<Todo, AppError> {
        let mut todos = self.todos.lock().unwrap();
        let stored = todos
            .iter_mut()
            .find(|t| t.id == todo.id && t.user_id == todo.user_id)
            .ok_or_else(|| AppError::NotFound("Todo not found".into()))?;
        *stored = todo.clone();
        Ok(todo.clone())
    }

    async fn delete(&self, id: Uuid, owner: Uuid) -> Result<(), AppError> {
        let mut todos = self.todos.lock().unwrap();
        let before = todos.len();
        todos.retain(|t| !(t.id == id && t.user_id == owner));
        if todos.len() == before {
            return Err(AppError::NotFound("Todo not found".into()));
        }
        Ok(())
    }
}

pub fn token_settings() -> TokenSettings {
    TokenSettings {
        access_secret: "integration-access-secret".into(),
        refresh_secret: "integration-refresh-secret".into(),
        access_ttl: Duration::from_secs(15 * 60),
        refresh_ttl: Duration::from_secs(60 * 60),
        revocation_retention: Duration::from_secs(60),
    }
}

/// Shared state for one test; cheap to clone.
#[derive(Clone)]
pub struct TestContext {
    pub users: Arc<MemoryUserStore>,
    pub todos: Arc<MemoryTodoStore>,
    pub issuer: web::Data<TokenIssuer>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_settings(token_settings())
    }

    pub fn with_settings(settings: TokenSettings) -> Self {
        Self {
            users: Arc::new(MemoryUserStore::default()),
            todos: Arc::new(MemoryTodoStore::default()),
            issuer: web::Data::new(TokenIssuer::new(settings).expect("valid token settings")),
        }
    }

    /// The application as `main` builds it, minus CORS and the database.
    pub fn app(
        &self,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = ServiceResponse<impl MessageBody>,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        let users: Arc<dyn UserStore> = self.users.clone();
        let todos: Arc<dyn TodoStore> = self.todos.clone();
        let issuer = self.issuer.clone();

        App::new()
            .app_data(web::Data::from(users))
            .app_data(web::Data::from(todos))
            .app_data(issuer.clone())
            .wrap(Logger::default())
            .configure(|cfg| routes::config(cfg, issuer))
    }
}

pub async fn init_app(
    ctx: &TestContext,
) -> impl Service<actix_http::Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error>
{
    test::init_service(ctx.app()).await
}

pub fn bearer(token: &str) -> (actix_web::http::header::HeaderName, String) {
    (AUTHORIZATION, format!("Bearer {}", token))
}

pub async fn register_user<S, B>(app: &S, name: &str, email: &str, password: &str) -> Uuid
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/user")
        .set_json(json!({
            "name": name,
            "email": email,
            "password": password,
            "confirmPassword": password
        }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert!(
        resp.status().is_success(),
        "registration of {} failed with {}",
        email,
        resp.status()
    );
    let body: serde_json::Value = test::read_body_json(resp).await;
    body["id"].as_str().unwrap().parse().unwrap()
}

pub async fn login_user<S, B>(app: &S, email: &str, password: &str) -> TokenPair
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/login")
        .set_json(json!({ "email": email, "password": password }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert!(
        resp.status().is_success(),
        "login of {} failed with {}",
        email,
        resp.status()
    );
    test::read_body_json(resp).await
}

/// Registers and logs in a user, returning its access token.
pub async fn signed_in_user<S, B>(app: &S, email: &str) -> String
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    register_user(app, "Test User", email, "secret123").await;
    login_user(app, email, "secret123").await.token
}
