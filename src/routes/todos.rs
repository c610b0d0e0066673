use super::current_user;
use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{ListParams, Page, Todo, TodoInput, TodoQuery},
    store::{TodoStore, UserStore},
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use uuid::Uuid;
use validator::Validate;

/// Retrieves one page of the authenticated user's todos.
///
/// ## Query Parameters:
/// - `limit` (optional, default 10): page size.
/// - `offset` (optional, default 0): number of todos to skip.
/// - `search` (optional): case-insensitive substring of the title or description.
///
/// Unparsable `limit`/`offset` values fall back to their defaults.
///
/// ## Responses:
/// - `200 OK`: `{ data, limit, offset, count, total, totalPages }`, newest first.
/// - `401 Unauthorized`: if the request lacks a valid authentication token.
#[get("/todos")]
pub async fn list_todos(
    users: web::Data<dyn UserStore>,
    todos: web::Data<dyn TodoStore>,
    auth: AuthenticatedUser,
    params: web::Query<ListParams>,
) -> Result<impl Responder, AppError> {
    let user = current_user(users.get_ref(), &auth).await?;
    let query = TodoQuery::from(params.into_inner());

    let (items, total) = todos.list(user.id, &query).await?;
    Ok(HttpResponse::Ok().json(Page::new(items, &query, total)))
}

/// Creates a new todo owned by the authenticated user.
///
/// ## Request Body:
/// - `title`: required, 1–200 characters.
/// - `description`: required, 1–1000 characters.
/// - `scheduled`, `scheduled_to`, `completed` (optional).
///
/// ## Responses:
/// - `201 Created`: the stored todo.
/// - `400 Bad Request`: malformed body or failed validation.
/// - `401 Unauthorized`: if the request lacks a valid authentication token.
#[post("/todo")]
pub async fn create_todo(
    users: web::Data<dyn UserStore>,
    todos: web::Data<dyn TodoStore>,
    auth: AuthenticatedUser,
    todo_data: web::Json<TodoInput>,
) -> Result<impl Responder, AppError> {
    todo_data.validate()?;
    let user = current_user(users.get_ref(), &auth).await?;

    let todo = todos
        .create(&Todo::new(todo_data.into_inner(), user.id))
        .await?;
    Ok(HttpResponse::Created().json(todo))
}

/// Retrieves one of the authenticated user's todos.
///
/// ## Responses:
/// - `200 OK`: the todo.
/// - `404 Not Found`: no such todo, or it belongs to another user.
#[get("/todo/{id}")]
pub async fn get_todo(
    users: web::Data<dyn UserStore>,
    todos: web::Data<dyn TodoStore>,
    auth: AuthenticatedUser,
    todo_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let user = current_user(users.get_ref(), &auth).await?;
    let todo = todos.get(todo_id.into_inner(), user.id).await?;
    Ok(HttpResponse::Ok().json(todo))
}

/// Replaces the editable fields of one of the authenticated user's todos.
///
/// ## Responses:
/// - `200 OK`: the updated todo.
/// - `400 Bad Request`: malformed body or failed validation.
/// - `404 Not Found`: no such todo, or it belongs to another user.
#[put("/todo/{id}")]
pub async fn update_todo(
    users: web::Data<dyn UserStore>,
    todos: web::Data<dyn TodoStore>,
    auth: AuthenticatedUser,
    todo_id: web::Path<Uuid>,
    todo_data: web::Json<TodoInput>,
) -> Result<impl Responder, AppError> {
    todo_data.validate()?;
    let user = current_user(users.get_ref(), &auth).await?;

    let mut todo = todos.get(todo_id.into_inner(), user.id).await?;
    todo.apply(todo_data.into_inner());

    let todo = todos.update(&todo).await?;
    Ok(HttpResponse::Ok().json(todo))
}

/// Deletes one of the authenticated user's todos.
///
/// ## Responses:
/// - `204 No Content`: on successful deletion.
/// - `404 Not Found`: no such todo, or it belongs to another user.
#[delete("/todo/{id}")]
pub async fn delete_todo(
    users: web::Data<dyn UserStore>,
    todos: web::Data<dyn TodoStore>,
    auth: AuthenticatedUser,
    todo_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let user = current_user(users.get_ref(), &auth).await?;
    todos.delete(todo_id.into_inner(), user.id).await?;
    Ok(HttpResponse::NoContent().finish())
}
