pub mod api;
pub mod common;
pub mod config;
pub mod db;
pub mod media;

pub use common::AppState;
pub use config::Config;
