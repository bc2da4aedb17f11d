use std::sync::Arc;

use anyhow::Result;
use axum::http::HeaderValue;

use crate::{config::Config, db::Repository};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub repo: Arc<Repository>,
    pub allowed_origins: Arc<[HeaderValue]>,
}

impl AppState {
    pub fn new(config: Config, repo: Repository) -> Result<Self> {
        let allowed_origins = config.allowed_origin_headers()?;
        Ok(Self {
            config: Arc::new(config),
            repo: Arc::new(repo),
            allowed_origins: allowed_origins.into(),
        })
    }

    /// `*` on the allow-list admits every origin.
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }

    pub fn is_origin_allowed(&self, origin: &HeaderValue) -> bool {
        self.allows_any_origin() || self.allowed_origins.iter().any(|allowed| allowed == origin)
    }
}
