//! Object-store client seam / 对象存储客户端接口
//!
//! Services never keep a long-lived client: a [`ClientFactory`] builds a fresh
//! [`ObjectClient`] from [`ClientSettings`] for every operation.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use tokio::io::AsyncRead;

/// Byte stream returned by a GET / 下载字节流
pub type ByteStream = BoxStream<'static, Result<Bytes, ClientError>>;

/// Readable upload body / 上传数据源
pub type UploadBody = Box<dyn AsyncRead + Unpin + Send>;

/// Errors reported by the object-store client / 客户端错误
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("S3 request failed: {0}")]
    S3(#[from] s3::error::S3Error),
    #[error("object store returned status {code} for {key}")]
    Status { code: u16, key: String },
    #[error("invalid credentials: {0}")]
    Credentials(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// Status code carried by the error, if any / 错误中携带的状态码
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ClientError::Status { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(404)
    }
}

/// Request signature scheme / 签名版本
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureVersion {
    V4,
}

impl SignatureVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignatureVersion::V4 => "v4",
        }
    }
}

/// Per-call client configuration / 单次调用的客户端配置
#[derive(Clone)]
pub struct ClientSettings {
    pub bucket: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub region: String,
    pub endpoint: Option<String>,
    pub force_path_style: bool,
    /// Override of the client's default signature scheme / 覆盖默认签名版本
    pub signature_version: Option<SignatureVersion>,
}

impl ClientSettings {
    pub fn with_signature_version(mut self, version: SignatureVersion) -> Self {
        self.signature_version = Some(version);
        self
    }
}

impl std::fmt::Debug for ClientSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientSettings")
            .field("bucket", &self.bucket)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"***")
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field("force_path_style", &self.force_path_style)
            .field("signature_version", &self.signature_version)
            .finish()
    }
}

/// Outcome of a successful put / 上传成功结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutOutcome {
    pub key: String,
    /// Location reported by the client / 客户端返回的对象地址
    pub location: String,
}

/// S3-compatible operations used by file services / 文件服务使用的S3兼容操作
#[async_trait]
pub trait ObjectClient: Send + Sync {
    /// Stream `body` into `key` with the given canned ACL / 流式上传
    async fn put_object_stream(
        &self,
        key: &str,
        acl: &str,
        content_type: &str,
        body: UploadBody,
    ) -> Result<PutOutcome, ClientError>;

    async fn delete_object(&self, key: &str) -> Result<(), ClientError>;

    /// Start a GET and return the body as it arrives / 流式下载
    async fn get_object_stream(&self, key: &str) -> Result<ByteStream, ClientError>;

    /// Signed GET URL valid for `expires_secs` / 预签名下载URL
    async fn presign_get(&self, key: &str, expires_secs: u32) -> Result<String, ClientError>;

    /// Where the client would place `key` / 对象地址
    fn object_url(&self, key: &str) -> String;
}

/// Builds clients from settings / 客户端工厂
pub trait ClientFactory: Send + Sync {
    fn build(&self, settings: &ClientSettings) -> Result<Arc<dyn ObjectClient>, ClientError>;
}
