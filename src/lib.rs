//! A community board for sharing ideas: accounts, ideas with comments, likes
//! and favorites, private messages, and administrator moderation, served as
//! a JSON API over SQLite.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod filters;
pub mod media;
pub mod migrations;
pub mod models;
pub mod policy;
pub mod server;
pub mod services;
pub mod storage;

pub use api::{AppState, build_router};
pub use error::BoardError;
