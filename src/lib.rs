//! Derive Notes Server Library
//!
//! Session-authenticated note storage: users register and log in, then
//! create, list, read and update their own notes, each reachable by a
//! random short url.

pub mod app;
pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod extract;
pub mod models;
pub mod routes;
pub mod security;
pub mod shortcode;

pub use app::router;
pub use config::Config;
pub use db::{open_database, Db};
pub use error::{AppError, ErrorKind, Result};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub config: Config,
}

impl AppState {
    /// Create a new AppState with the given database and configuration
    pub fn new(db: Db, config: Config) -> Self {
        Self { db, config }
    }
}
