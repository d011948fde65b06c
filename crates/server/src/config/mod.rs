//! Configuration loading from environment variables.

mod app;
mod database;

pub use app::{AppConfig, StoreBackend};
pub use database::DatabaseConfig;
