use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::future::Future;
use std::time::Duration;
use uuid::Uuid;

use super::{TodoStore, UserStore};
use crate::config::Config;
use crate::error::AppError;
use crate::models::{Todo, TodoQuery, User};

const USER_COLUMNS: &str =
    "id, name, email, password_hash, created_at, updated_at, removed, removed_at";
const TODO_COLUMNS: &str =
    "id, title, description, scheduled, scheduled_to, completed, completed_at, created_at, user_id";

/// Opens the pool and applies pending migrations.
pub async fn connect(config: &Config) -> Result<PgPool, AppError> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(config.db_timeout)
        .connect(&config.database_url)
        .await?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Migration failed: {}", e)))?;

    Ok(pool)
}

/// Runs a query under the per-operation deadline.
async fn bounded<T, F>(timeout: Duration, query: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(timeout, query).await {
        Ok(result) => result.map_err(AppError::from),
        Err(_) => Err(AppError::DatabaseError(format!(
            "Database operation exceeded {:?}",
            timeout
        ))),
    }
}

/// Escapes LIKE metacharacters so the term is matched literally.
fn like_pattern(search: &str) -> String {
    let escaped = search
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
    timeout: Duration,
}

impl PgUserStore {
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, user: &User) -> Result<User, AppError> {
        let sql = format!(
            "INSERT INTO users ({cols}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {cols}",
            cols = USER_COLUMNS
        );
        bounded(
            self.timeout,
            sqlx::query_as::<_, User>(&sql)
                .bind(user.id)
                .bind(&user.name)
                .bind(&user.email)
                .bind(&user.password_hash)
                .bind(user.created_at)
                .bind(user.updated_at)
                .bind(user.removed)
                .bind(user.removed_at)
                .fetch_one(&self.pool),
        )
        .await
    }

    async fn get_by_id(&self, id: Uuid) -> Result<User, AppError> {
        let sql = format!(
            "SELECT {} FROM users WHERE id = $1 AND NOT removed",
            USER_COLUMNS
        );
        bounded(
            self.timeout,
            sqlx::query_as::<_, User>(&sql).bind(id).fetch_optional(&self.pool),
        )
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
    }

    async fn get_by_email(&self, email: &str) -> Result<User, AppError> {
        let sql = format!(
            "SELECT {} FROM users WHERE email = $1 AND NOT removed",
            USER_COLUMNS
        );
        bounded(
            self.timeout,
            sqlx::query_as::<_, User>(&sql)
                .bind(email)
                .fetch_optional(&self.pool),
        )
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
    }

    async fn update(&self, user: &User) -> Result<User, AppError> {
        let sql = format!(
            "UPDATE users SET name = $2, email = $3, password_hash = $4, updated_at = $5, \
             removed = $6, removed_at = $7 WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        );
        bounded(
            self.timeout,
            sqlx::query_as::<_, User>(&sql)
                .bind(user.id)
                .bind(&user.name)
                .bind(&user.email)
                .bind(&user.password_hash)
                .bind(user.updated_at)
                .bind(user.removed)
                .bind(user.removed_at)
                .fetch_optional(&self.pool),
        )
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
    }
}

#[derive(Debug, Clone)]
pub struct PgTodoStore {
    pool: PgPool,
    timeout: Duration,
}

impl PgTodoStore {
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }
}

#[async_trait]
impl TodoStore for PgTodoStore {
    async fn create(&self, todo: &Todo) -> Result<Todo, AppError> {
        let sql = format!(
            "INSERT INTO todos ({cols}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {cols}",
            cols = TODO_COLUMNS
        );
        bounded(
            self.timeout,
            sqlx::query_as::<_, Todo>(&sql)
                .bind(todo.id)
                .bind(&todo.title)
                .bind(&todo.description)
                .bind(todo.scheduled)
                .bind(todo.scheduled_to)
                .bind(todo.completed)
                .bind(todo.completed_at)
                .bind(todo.created_at)
                .bind(todo.user_id)
                .fetch_one(&self.pool),
        )
        .await
    }

    async fn get(&self, id: Uuid, owner: Uuid) -> Result<Todo, AppError> {
        let sql = format!(
            "SELECT {} FROM todos WHERE id = $1 AND user_id = $2",
            TODO_COLUMNS
        );
        bounded(
            self.timeout,
            sqlx::query_as::<_, Todo>(&sql)
                .bind(id)
                .bind(owner)
                .fetch_optional(&self.pool),
        )
        .await?
        .ok_or_else(|| AppError::NotFound("Todo not found".into()))
    }

    async fn list(&self, owner: Uuid, query: &TodoQuery) -> Result<(Vec<Todo>, i64), AppError> {
        // $2 is NULL when no search term was given.
        const FILTER: &str =
            "user_id = $1 AND ($2::text IS NULL OR title ILIKE $2 OR description ILIKE $2)";
        let pattern = query.search.as_deref().map(like_pattern);

        let page_sql = format!(
            "SELECT {} FROM todos WHERE {} ORDER BY created_at DESC, id LIMIT $3 OFFSET $4",
            TODO_COLUMNS, FILTER
        );
        let todos = bounded(
            self.timeout,
            sqlx::query_as::<_, Todo>(&page_sql)
                .bind(owner)
                .bind(&pattern)
                .bind(query.limit)
                .bind(query.offset)
                .fetch_all(&self.pool),
        )
        .await?;

        let count_sql = format!("SELECT COUNT(*) FROM todos WHERE {}", FILTER);
        let total = bounded(
            self.timeout,
            sqlx::query_scalar::<_, i64>(&count_sql)
                .bind(owner)
                .bind(&pattern)
                .fetch_one(&self.pool),
        )
        .await?;

        Ok((todos, total))
    }

    async fn update(&self, todo: &Todo) -> Result<Todo, AppError> {
        let sql = format!(
            "UPDATE todos SET title = $3, description = $4, scheduled = $5, scheduled_to = $6, \
             completed = $7, completed_at = $8 WHERE id = $1 AND user_id = $2 RETURNING {}",
            TODO_COLUMNS
        );
        bounded(
            self.timeout,
            sqlx::query_as::<_, Todo>(&sql)
                .bind(todo.id)
                .bind(todo.user_id)
                .bind(&todo.title)
                .bind(&todo.description)
                .bind(todo.scheduled)
                .bind(todo.scheduled_to)
                .bind(todo.completed)
                .bind(todo.completed_at)
                .fetch_optional(&self.pool),
        )
        .await?
        .ok_or_else(|| AppError::NotFound("Todo not found".into()))
    }

    async fn delete(&self, id: Uuid, owner: Uuid) -> Result<(), AppError> {
        let result = bounded(
            self.timeout,
            sqlx::query("DELETE FROM todos WHERE id = $1 AND user_id = $2")
                .bind(id)
                .bind(owner)
                .execute(&self.pool),
        )
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Todo not found".into()));
        }
        Ok(())
    }
}
