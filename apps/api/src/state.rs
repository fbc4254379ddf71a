//! Shared application state.

use std::sync::Arc;

use adega_db::Database;

use crate::auth::JwtManager;
use crate::config::ApiConfig;
use crate::storage::{ImageStore, LocalImageStore};

/// Handed to every handler through `State<AppState>`. Clones share everything.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub jwt: Arc<JwtManager>,
    pub images: Arc<dyn ImageStore>,
    pub config: Arc<ApiConfig>,
}

impl AppState {
    /// State with the local image directory from `config`.
    pub fn new(db: Database, config: ApiConfig) -> Self {
        let images = LocalImageStore::new(&config.upload_dir, config.public_upload_path.clone());
        Self::with_image_store(db, config, Arc::new(images))
    }

    pub fn with_image_store(db: Database, config: ApiConfig, images: Arc<dyn ImageStore>) -> Self {
        AppState {
            jwt: Arc::new(JwtManager::new(&config.jwt_secret, config.jwt_lifetime_secs)),
            db,
            images,
            config: Arc::new(config),
        }
    }
}
