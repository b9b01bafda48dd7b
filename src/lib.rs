pub mod error;
pub mod utils;
pub mod storage;

// Driver modules (point to project root drivers via path attribute) / 驱动模块
#[path = "../drivers/mod.rs"]
pub mod drivers;

pub use drivers::create_service;
pub use error::FileServiceError;
pub use storage::{FileService, FileServiceFactory};
