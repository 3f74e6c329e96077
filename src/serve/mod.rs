use crate::config::AppConfig;
use crate::progress::{AnimationSource, PayloadSource};
use crate::transaction::refs::{RefStore, StaticRefStore};
use std::sync::Arc;

/// Process-wide collaborators shared by every request handler. Nothing in
/// here is mutated after startup.
#[derive(Clone)]
pub struct AppCore {
    pub config: Arc<AppConfig>,
    pub ref_store: Arc<dyn RefStore>,
    pub payload: Arc<dyn PayloadSource>,
}

impl AppCore {
    pub fn new(
        config: AppConfig,
        ref_store: Arc<dyn RefStore>,
        payload: Arc<dyn PayloadSource>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            ref_store,
            payload,
        }
    }

    /// Refs and progress animation both taken from `config`.
    pub fn from_config(config: AppConfig) -> Self {
        let ref_store = Arc::new(StaticRefStore::new(config.upload.refs.clone()));
        let payload = Arc::new(AnimationSource::new(config.upload.progress.clone()));
        Self::new(config, ref_store, payload)
    }
}
