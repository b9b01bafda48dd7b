use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::oneshot;

use crate::error::{FileServiceError, Result};

/// Local file handed over by the host for upload / 待上传的本地文件
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadRequest {
    /// Readable local path / 本地路径
    pub path: String,
    /// Name supplied by the uploader / 原始文件名
    #[serde(alias = "originalname")]
    pub original_name: String,
    #[serde(default, alias = "isProtected")]
    pub protected: bool,
    /// Explicit canned ACL, wins over `protected` / 显式ACL
    #[serde(default)]
    pub acl: Option<String>,
}

impl UploadRequest {
    pub fn new(path: impl Into<String>, original_name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            original_name: original_name.into(),
            ..Default::default()
        }
    }

    pub fn protected(mut self) -> Self {
        self.protected = true;
        self
    }

    pub fn with_acl(mut self, acl: impl Into<String>) -> Self {
        self.acl = Some(acl.into());
        self
    }
}

/// Stored object reference / 上传结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResult {
    pub url: String,
    pub key: String,
}

/// Name of an object to be written through a stream / 流式上传描述
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadStreamDescriptor {
    pub name: String,
    pub ext: String,
    #[serde(default)]
    pub acl: Option<String>,
}

/// Reference to a stored object / 已存储对象引用
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadDescriptor {
    #[serde(alias = "fileKey", alias = "key")]
    pub file_key: String,
}

impl DownloadDescriptor {
    pub fn new(file_key: impl Into<String>) -> Self {
        Self { file_key: file_key.into() }
    }
}

/// Readable object body / 对象读取流
pub type DownloadStream = Box<dyn AsyncRead + Unpin + Send>;

/// Writable upload sink / 上传写入端
pub type UploadSink = Box<dyn AsyncWrite + Unpin + Send>;

/// Resolves once a streamed upload has finished / 流式上传完成信号
pub struct UploadCompletion {
    result_rx: oneshot::Receiver<Result<UploadResult>>,
}

impl UploadCompletion {
    pub fn new(result_rx: oneshot::Receiver<Result<UploadResult>>) -> Self {
        Self { result_rx }
    }
}

impl Future for UploadCompletion {
    type Output = Result<UploadResult>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.result_rx).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(_)) => {
                let error =
                    std::io::Error::new(std::io::ErrorKind::BrokenPipe, "upload task terminated");
                Poll::Ready(Err(FileServiceError::Upload(error.into())))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Streamed upload handle / 流式上传句柄
///
/// Bytes written to `writer` are forwarded to the store; shut the writer down
/// to finish the object, then await `completion`.
pub struct UploadStream {
    pub writer: UploadSink,
    pub completion: UploadCompletion,
    /// Predicted URL, may 404 until `completion` resolves / 预测的访问地址
    pub url: String,
    pub file_key: String,
}

/// File service interface used by the host / 文件服务接口
#[async_trait]
pub trait FileService: Send + Sync {
    /// Service name / 服务名称
    fn name(&self) -> &str;

    /// Service version / 服务版本
    fn version(&self) -> &str;

    /// Upload a local file / 上传本地文件
    async fn upload(&self, file: UploadRequest) -> Result<UploadResult>;

    /// Upload through the "protected" entry point / 受保护上传入口
    async fn upload_protected(&self, file: UploadRequest) -> Result<UploadResult>;

    /// Delete a stored object / 删除对象
    async fn delete(&self, file_key: &str) -> Result<()>;

    /// Open a streamed upload / 打开流式上传
    async fn get_upload_stream_descriptor(
        &self,
        descriptor: UploadStreamDescriptor,
    ) -> Result<UploadStream>;

    /// Open a lazily fetched download stream / 打开下载流
    async fn get_download_stream(&self, descriptor: DownloadDescriptor) -> Result<DownloadStream>;

    /// Signed, time-limited download URL / 预签名下载URL
    async fn get_presigned_download_url(&self, descriptor: DownloadDescriptor) -> Result<String>;
}

/// Builds a file service from host options / 文件服务工厂
pub trait FileServiceFactory: Send + Sync {
    /// Service type name / 服务类型名称
    fn service_type(&self) -> &'static str;

    /// 根据宿主传入的选项创建服务实例
    fn create_service(&self, options: serde_json::Value) -> Result<Arc<dyn FileService>>;
}

pub mod client;

pub use client::{ClientError, ClientFactory, ClientSettings, ObjectClient, SignatureVersion};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_request_accepts_host_field_names() {
        let request: UploadRequest = serde_json::from_value(serde_json::json!({
            "path": "/tmp/upload_123",
            "originalname": "photo.png",
        }))
        .unwrap();
        assert_eq!(request.original_name, "photo.png");
        assert!(!request.protected);
        assert!(request.acl.is_none());

        let descriptor: DownloadDescriptor =
            serde_json::from_value(serde_json::json!({ "fileKey": "avatars/a.png" })).unwrap();
        assert_eq!(descriptor.file_key, "avatars/a.png");
    }

    #[tokio::test]
    async fn test_completion_reports_dropped_task() {
        let (tx, rx) = oneshot::channel();
        drop(tx);
        let err = UploadCompletion::new(rx).await.unwrap_err();
        assert!(matches!(err, FileServiceError::Upload(_)));
    }
}
