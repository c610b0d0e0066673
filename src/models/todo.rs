use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

pub const DEFAULT_LIMIT: i64 = 10;
pub const DEFAULT_OFFSET: i64 = 0;

/// Input structure for creating or updating a todo.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TodoInput {
    /// Must be between 1 and 200 characters.
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    /// Must be between 1 and 1000 characters.
    #[validate(length(min = 1, max = 1000))]
    pub description: String,

    #[serde(default)]
    pub scheduled: bool,

    pub scheduled_to: Option<DateTime<Utc>>,

    #[serde(default)]
    pub completed: bool,
}

/// A todo item as stored in the `todos` table and returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Todo {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub scheduled: bool,
    pub scheduled_to: Option<DateTime<Utc>>,
    pub completed: bool,
    /// Set when `completed` last switched to true.
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    /// Owner of the todo.
    pub user_id: Uuid,
}

impl Todo {
    /// Creates a new todo owned by `user_id`.
    pub fn new(input: TodoInput, user_id: Uuid) -> Self {
        let now = Utc::now();
        let mut todo = Self {
            id: Uuid::new_v4(),
            title: String::new(),
            description: String::new(),
            scheduled: false,
            scheduled_to: None,
            completed: false,
            completed_at: None,
            created_at: now,
            user_id,
        };
        todo.apply(input);
        todo
    }

    /// Overwrites the editable fields with `input`.
    ///
    /// `completed_at` is stamped when the todo becomes completed and cleared when it
    /// is reopened; re-sending `completed: true` keeps the original stamp.
    pub fn apply(&mut self, input: TodoInput) {
        self.title = input.title;
        self.description = input.description;
        self.scheduled = input.scheduled;
        self.scheduled_to = input.scheduled_to;

        match (self.completed, input.completed) {
            (false, true) => self.completed_at = Some(Utc::now()),
            (_, false) => self.completed_at = None,
            (true, true) => {}
        }
        self.completed = input.completed;
    }
}

/// Raw query string of `GET /todos`.
///
/// Kept as strings so that a bad value falls back to its default instead of failing
/// the request.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub limit: Option<String>,
    pub offset: Option<String>,
    pub search: Option<String>,
}

/// A parsed listing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoQuery {
    pub limit: i64,
    pub offset: i64,
    pub search: Option<String>,
}

impl From<ListParams> for TodoQuery {
    fn from(params: ListParams) -> Self {
        let limit = params
            .limit
            .and_then(|l| l.trim().parse::<i64>().ok())
            .filter(|l| *l >= 1)
            .unwrap_or(DEFAULT_LIMIT);
        let offset = params
            .offset
            .and_then(|o| o.trim().parse::<i64>().ok())
            .filter(|o| *o >= 0)
            .unwrap_or(DEFAULT_OFFSET);
        let search = params
            .search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Self {
            limit,
            offset,
            search,
        }
    }
}

/// One page of a listing.
#[derive(Debug, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub limit: i64,
    pub offset: i64,
    /// Number of items in `data`.
    pub count: i64,
    /// Number of items matching the query across all pages.
    pub total: i64,
    #[serde(rename = "totalPages")]
    pub total_pages: i64,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, query: &TodoQuery, total: i64) -> Self {
        Self {
            count: data.len() as i64,
            data,
            limit: query.limit,
            offset: query.offset,
            total,
            total_pages: total / query.limit + i64::from(total % query.limit != 0),
        }
    }
}
