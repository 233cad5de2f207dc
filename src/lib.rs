//! Library catalog server
//!
//! Authors, books, book copies and genres behind a form-driven web interface:
//! declarative validation of submitted forms, a typed repository over a
//! document store, and deletes guarded by referential checks.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;
pub mod validation;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

use repository::Repository;
use services::Services;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<Services>,
}

impl AppState {
    pub fn new(config: AppConfig, repository: Repository) -> Self {
        Self {
            config: Arc::new(config),
            services: Arc::new(Services::new(repository)),
        }
    }
}
