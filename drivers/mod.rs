// Driver package / 驱动包
pub mod spaces;

use std::sync::Arc;

use crate::error::{FileServiceError, Result};
use crate::storage::{FileService, FileServiceFactory};

/// All built-in file service factories / 内置文件服务工厂
pub fn factories() -> Vec<Box<dyn FileServiceFactory>> {
    vec![Box::new(spaces::SpacesFileServiceFactory)]
}

/// Create a file service by type name / 按类型创建文件服务
pub fn create_service(
    service_type: &str,
    options: serde_json::Value,
) -> Result<Arc<dyn FileService>> {
    let factory = factories()
        .into_iter()
        .find(|f| f.service_type() == service_type)
        .ok_or_else(|| {
            FileServiceError::Config(format!("unknown file service type: {}", service_type))
        })?;
    factory.create_service(options)
}
