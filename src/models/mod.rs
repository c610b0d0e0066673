pub mod todo;
pub mod user;

pub use todo::{ListParams, Page, Todo, TodoInput, TodoQuery};
pub use user::{User, UserResponse};
