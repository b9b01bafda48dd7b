//! DigitalOcean Spaces / S3兼容文件服务

pub mod bucket;
pub mod config;
pub mod driver;
pub mod factory;
pub mod naming;
pub mod observer;

#[cfg(test)]
pub(crate) mod testing;

pub use bucket::{BucketClient, BucketClientFactory};
pub use config::SpacesConfig;
pub use driver::{SpacesFileService, ACL_PRIVATE, ACL_PUBLIC_READ};
pub use factory::SpacesFileServiceFactory;
pub use naming::{Clock, KeyNamingPolicy, SystemClock, UrlResolver};
pub use observer::{FileServiceObserver, ServiceEvent, TracingObserver};
