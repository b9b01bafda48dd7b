//! File service errors / 文件服务错误

use crate::storage::client::ClientError;

/// Error taxonomy of the file-service contract.
///
/// Every client failure is carried unchanged, tagged only with the operation
/// that failed. Nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum FileServiceError {
    #[error("upload failed: {0}")]
    Upload(#[source] ClientError),
    #[error("delete failed: {0}")]
    Delete(#[source] ClientError),
    #[error("presign failed: {0}")]
    Signing(#[source] ClientError),
    #[error("stream failed: {0}")]
    Stream(#[source] ClientError),
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl FileServiceError {
    /// Convert into an I/O error for stream consumers / 转换为流错误
    pub fn into_io(self) -> std::io::Error {
        std::io::Error::new(std::io::ErrorKind::Other, self)
    }
}

pub type Result<T, E = FileServiceError> = std::result::Result<T, E>;
