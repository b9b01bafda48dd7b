//! Spaces文件服务核心实现
//!
//! 设计原则：
//! - 每次操作都从配置重新创建客户端，不共享可变的客户端状态
//! - 上传/删除失败原样返回底层错误，不做重试
//! - 下载流在首次读取时才发起请求

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};
use tokio::sync::oneshot;
use tokio_util::io::StreamReader;

use crate::error::{FileServiceError, Result};
use crate::storage::{
    ClientError, ClientFactory, DownloadDescriptor, DownloadStream, FileService, ObjectClient,
    SignatureVersion, UploadCompletion, UploadRequest, UploadResult, UploadStream,
    UploadStreamDescriptor,
};
use super::bucket::BucketClientFactory;
use super::config::SpacesConfig;
use super::naming::{Clock, KeyNamingPolicy, UrlResolver};
use super::observer::{FileServiceObserver, ServiceEvent, TracingObserver};

pub const ACL_PUBLIC_READ: &str = "public-read";
pub const ACL_PRIVATE: &str = "private";

/// 流式上传管道缓冲区大小
const STREAM_BUFFER_SIZE: usize = 64 * 1024;

/// ACL for a regular upload: explicit ACL, then `protected`, then public / 普通上传的ACL
fn upload_acl(file: &UploadRequest) -> String {
    match &file.acl {
        Some(acl) => acl.clone(),
        None if file.protected => ACL_PRIVATE.to_string(),
        None => ACL_PUBLIC_READ.to_string(),
    }
}

fn content_type_for(key: &str) -> String {
    mime_guess::from_path(key).first_or_octet_stream().to_string()
}

/// DigitalOcean Spaces (S3兼容) 文件服务
pub struct SpacesFileService {
    config: SpacesConfig,
    clients: Arc<dyn ClientFactory>,
    naming: KeyNamingPolicy,
    urls: UrlResolver,
    observer: Arc<dyn FileServiceObserver>,
}

impl SpacesFileService {
    /// 使用rust-s3客户端创建服务
    pub fn new(config: SpacesConfig) -> Self {
        Self::with_client_factory(config, Arc::new(BucketClientFactory))
    }

    pub fn with_client_factory(config: SpacesConfig, clients: Arc<dyn ClientFactory>) -> Self {
        let naming = KeyNamingPolicy::new(config.directory.clone());
        let urls = UrlResolver::new(config.base_url.clone());
        Self {
            config,
            clients,
            naming,
            urls,
            observer: Arc::new(TracingObserver),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn FileServiceObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.naming = KeyNamingPolicy::with_clock(self.config.directory.clone(), clock);
        self
    }

    /// Build a client scoped to one operation / 为单次操作创建客户端
    fn client(
        &self,
        operation: &'static str,
        signature_version: Option<SignatureVersion>,
    ) -> std::result::Result<Arc<dyn ObjectClient>, ClientError> {
        let mut settings = self.config.client_settings();
        if let Some(version) = signature_version {
            settings = settings.with_signature_version(version);
        }
        self.observer
            .on_event(&ServiceEvent::ClientConfigured { operation, signature_version });
        self.clients.build(&settings)
    }

    fn report_failure(&self, operation: &'static str, key: &str, error: &ClientError) {
        self.observer.on_event(&ServiceEvent::Failed {
            operation,
            key: key.to_string(),
            error: error.to_string(),
        });
    }

    /// 上传本地文件，ACL由调用方决定
    async fn upload_file(
        &self,
        operation: &'static str,
        file: UploadRequest,
        acl: String,
    ) -> Result<UploadResult> {
        let key = self.naming.upload_key(&file.original_name);
        self.observer.on_event(&ServiceEvent::KeyResolved { operation, key: key.clone() });

        let client = self.client(operation, None).map_err(FileServiceError::Upload)?;
        let body = match tokio::fs::File::open(&file.path).await {
            Ok(body) => body,
            Err(e) => {
                let error = ClientError::from(e);
                self.report_failure(operation, &key, &error);
                return Err(FileServiceError::Upload(error));
            }
        };

        match client
            .put_object_stream(&key, &acl, &content_type_for(&key), Box::new(body))
            .await
        {
            Ok(outcome) => {
                let url = self.urls.resolve(&outcome.key, &outcome.location);
                self.observer.on_event(&ServiceEvent::Uploaded {
                    key: outcome.key.clone(),
                    url: url.clone(),
                });
                Ok(UploadResult { url, key: outcome.key })
            }
            Err(e) => {
                self.report_failure(operation, &key, &e);
                Err(FileServiceError::Upload(e))
            }
        }
    }
}

#[async_trait]
impl FileService for SpacesFileService {
    fn name(&self) -> &str {
        "Spaces"
    }

    fn version(&self) -> &str {
        "1.0.0"
    }

    async fn upload(&self, file: UploadRequest) -> Result<UploadResult> {
        let acl = upload_acl(&file);
        self.upload_file("upload", file, acl).await
    }

    async fn upload_protected(&self, file: UploadRequest) -> Result<UploadResult> {
        // 受保护入口固定使用 public-read，不读取请求中的 protected/acl
        self.upload_file("upload_protected", file, ACL_PUBLIC_READ.to_string()).await
    }

    async fn delete(&self, file_key: &str) -> Result<()> {
        let client = self.client("delete", None).map_err(FileServiceError::Delete)?;
        match client.delete_object(file_key).await {
            Ok(()) => {
                self.observer.on_event(&ServiceEvent::Deleted { key: file_key.to_string() });
                Ok(())
            }
            Err(e) => {
                self.report_failure("delete", file_key, &e);
                Err(FileServiceError::Delete(e))
            }
        }
    }

    async fn get_upload_stream_descriptor(
        &self,
        descriptor: UploadStreamDescriptor,
    ) -> Result<UploadStream> {
        let file_key = KeyNamingPolicy::stream_key(&descriptor.name, &descriptor.ext);
        self.observer.on_event(&ServiceEvent::KeyResolved {
            operation: "stream_upload",
            key: file_key.clone(),
        });

        let client = self.client("stream_upload", None).map_err(FileServiceError::Upload)?;
        let acl = descriptor.acl.unwrap_or_else(|| ACL_PRIVATE.to_string());
        let url = self.urls.resolve(&file_key, &client.object_url(&file_key));

        let (writer, reader) = tokio::io::duplex(STREAM_BUFFER_SIZE);
        let (result_tx, result_rx) = oneshot::channel();

        // 后台任务：把管道另一端的数据写入对象存储
        let task_key = file_key.clone();
        let urls = self.urls.clone();
        let observer = self.observer.clone();
        tokio::spawn(async move {
            let content_type = content_type_for(&task_key);
            let result = match client
                .put_object_stream(&task_key, &acl, &content_type, Box::new(reader))
                .await
            {
                Ok(outcome) => {
                    let url = urls.resolve(&outcome.key, &outcome.location);
                    observer.on_event(&ServiceEvent::Uploaded {
                        key: outcome.key.clone(),
                        url: url.clone(),
                    });
                    Ok(UploadResult { url, key: outcome.key })
                }
                Err(e) => {
                    observer.on_event(&ServiceEvent::Failed {
                        operation: "stream_upload",
                        key: task_key.clone(),
                        error: e.to_string(),
                    });
                    Err(FileServiceError::Upload(e))
                }
            };
            let _ = result_tx.send(result);
        });

        Ok(UploadStream {
            writer: Box::new(writer),
            completion: UploadCompletion::new(result_rx),
            url,
            file_key,
        })
    }

    async fn get_download_stream(&self, descriptor: DownloadDescriptor) -> Result<DownloadStream> {
        let file_key = descriptor.file_key;
        self.observer.on_event(&ServiceEvent::KeyResolved {
            operation: "download",
            key: file_key.clone(),
        });

        let client = self.client("download", None).map_err(FileServiceError::Stream)?;
        let observer = self.observer.clone();

        // 请求推迟到第一次读取
        let body = stream::once(async move {
            let response = client.get_object_stream(&file_key).await;
            if let Err(e) = &response {
                observer.on_event(&ServiceEvent::Failed {
                    operation: "download",
                    key: file_key.clone(),
                    error: e.to_string(),
                });
            }
            response
        })
        .try_flatten()
        .map_err(|e| FileServiceError::Stream(e).into_io())
        .boxed();

        Ok(Box::new(StreamReader::new(body)))
    }

    async fn get_presigned_download_url(&self, descriptor: DownloadDescriptor) -> Result<String> {
        let file_key = descriptor.file_key;
        self.observer.on_event(&ServiceEvent::KeyResolved {
            operation: "presign",
            key: file_key.clone(),
        });

        let client = self
            .client("presign", Some(SignatureVersion::V4))
            .map_err(FileServiceError::Signing)?;
        client
            .presign_get(&file_key, self.config.download_url_duration)
            .await
            .map_err(|e| {
                self.report_failure("presign", &file_key, &e);
                FileServiceError::Signing(e)
            })
    }
}
