//! Spaces文件服务工厂

use std::sync::Arc;

use serde_json::Value;

use crate::error::Result;
use crate::storage::{FileService, FileServiceFactory};
use super::config::SpacesConfig;
use super::driver::SpacesFileService;

/// Spaces文件服务工厂
pub struct SpacesFileServiceFactory;

impl FileServiceFactory for SpacesFileServiceFactory {
    fn service_type(&self) -> &'static str {
        "spaces"
    }

    fn create_service(&self, options: Value) -> Result<Arc<dyn FileService>> {
        let config = SpacesConfig::from_value(options)?;
        tracing::info!(
            "Spaces file service initialized: bucket={}, region={}, directory={:?}",
            config.bucket,
            config.region,
            config.directory
        );
        Ok(Arc::new(SpacesFileService::new(config)))
    }
}
