//! Data access for users and todos.
//!
//! Handlers only see the [`UserStore`] and [`TodoStore`] traits, registered as
//! `web::Data<dyn UserStore>` / `web::Data<dyn TodoStore>`. The PostgreSQL
//! implementations live in [`postgres`].

pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Todo, TodoQuery, User};

pub use postgres::{PgTodoStore, PgUserStore};

/// Persistence of user accounts.
///
/// Lookups never return soft-deleted users; they fail with `AppError::NotFound`.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a new user. Fails with `AppError::BadRequest` when another active user
    /// already has the same email.
    async fn create(&self, user: &User) -> Result<User, AppError>;

    async fn get_by_id(&self, id: Uuid) -> Result<User, AppError>;

    async fn get_by_email(&self, email: &str) -> Result<User, AppError>;

    /// Persists every mutable field of `user`, matched by id.
    async fn update(&self, user: &User) -> Result<User, AppError>;

    /// Soft-deletes the active user with `email` and returns the updated record.
    async fn delete(&self, email: &str) -> Result<User, AppError> {
        let mut user = self.get_by_email(email).await?;
        user.mark_removed();
        self.update(&user).await
    }
}

/// Persistence of todos. Every read and write is scoped to an owner.
#[async_trait]
pub trait TodoStore: Send + Sync {
    async fn create(&self, todo: &Todo) -> Result<Todo, AppError>;

    async fn get(&self, id: Uuid, owner: Uuid) -> Result<Todo, AppError>;

    /// Returns one page of the owner's todos, newest first, together with the number
    /// of todos matching the query across all pages.
    async fn list(&self, owner: Uuid, query: &TodoQuery) -> Result<(Vec<Todo>, i64), AppError>;

    /// Persists the editable fields of `todo`, matched by id and owner.
    async fn update(&self, todo: &Todo) -> Result<Todo, AppError>;

    async fn delete(&self, id: Uuid, owner: Uuid) -> Result<(), AppError>;
}
