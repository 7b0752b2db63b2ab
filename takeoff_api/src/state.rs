use std::sync::Arc;

use takeoff_core::store::{FileReportStore, MemoryReportStore, ReportStore};

use crate::config::ServerConfig;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn ReportStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn ReportStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryReportStore::new()))
    }

    /// File store when `store_path` is configured, memory otherwise.
    pub fn from_config(config: &ServerConfig) -> Self {
        match &config.store_path {
            Some(path) => Self::new(Arc::new(FileReportStore::new(path.clone()))),
            None => Self::in_memory(),
        }
    }

    pub fn store(&self) -> Arc<dyn ReportStore> {
        Arc::clone(&self.store)
    }
}
