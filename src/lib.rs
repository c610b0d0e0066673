#![doc = "The `todo_api` library crate."]
#![doc = ""]
#![doc = "Per-user todo lists behind JWT sessions: domain models, stores, token issuance"]
#![doc = "and revocation, the authentication middleware, routing and error handling."]
#![doc = "The binary (`main.rs`) wires these into an actix-web server."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod store;

pub use crate::error::AppError;
