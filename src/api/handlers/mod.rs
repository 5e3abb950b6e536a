//! Request handlers, one module per resource.

pub mod admin;
pub mod auth;
pub mod comments;
pub mod ideas;
pub mod messages;
pub mod upload;
pub mod users;
