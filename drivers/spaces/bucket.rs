//! rust-s3 backed client / 基于rust-s3的客户端

use std::sync::Arc;

use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use s3::bucket::Bucket;
use s3::creds::Credentials;
use s3::Region;

use crate::storage::client::{
    ByteStream, ClientError, ClientFactory, ClientSettings, ObjectClient, PutOutcome, UploadBody,
};

/// Canned ACL request header / ACL请求头
const ACL_HEADER: &str = "x-amz-acl";

/// S3 Bucket客户端
pub struct BucketClient {
    bucket: Box<Bucket>,
}

impl BucketClient {
    /// 根据配置创建客户端
    pub fn new(settings: &ClientSettings) -> Result<Self, ClientError> {
        let credentials = Credentials::new(
            Some(&settings.access_key_id),
            Some(&settings.secret_access_key),
            None,
            None,
            None,
        )
        .map_err(|e| ClientError::Credentials(e.to_string()))?;

        let region = match &settings.endpoint {
            Some(endpoint) => Region::Custom {
                region: settings.region.clone(),
                endpoint: endpoint.clone(),
            },
            None => Region::Custom {
                region: settings.region.clone(),
                endpoint: format!("https://s3.{}.amazonaws.com", settings.region),
            },
        };

        let bucket = Bucket::new(&settings.bucket, region, credentials)?;
        let bucket = if settings.force_path_style {
            bucket.with_path_style()
        } else {
            bucket
        };

        Ok(Self { bucket })
    }
}

fn check_status(code: u16, key: &str) -> Result<(), ClientError> {
    if (200..300).contains(&code) {
        Ok(())
    } else {
        Err(ClientError::Status { code, key: key.to_string() })
    }
}

#[async_trait]
impl ObjectClient for BucketClient {
    async fn put_object_stream(
        &self,
        key: &str,
        acl: &str,
        content_type: &str,
        mut body: UploadBody,
    ) -> Result<PutOutcome, ClientError> {
        // ACL只作用于本次请求的Bucket副本
        let mut bucket = self.bucket.clone();
        bucket.add_header(ACL_HEADER, acl);

        let response = bucket
            .put_object_stream_with_content_type(&mut body, key, content_type)
            .await?;
        check_status(response.status_code(), key)?;

        Ok(PutOutcome {
            key: key.to_string(),
            location: self.object_url(key),
        })
    }

    async fn delete_object(&self, key: &str) -> Result<(), ClientError> {
        let response = self.bucket.delete_object(key).await?;
        check_status(response.status_code(), key)
    }

    async fn get_object_stream(&self, key: &str) -> Result<ByteStream, ClientError> {
        let response = self.bucket.get_object_stream(key).await?;
        check_status(response.status_code, key)?;
        Ok(response.bytes.map_err(ClientError::from).boxed())
    }

    async fn presign_get(&self, key: &str, expires_secs: u32) -> Result<String, ClientError> {
        Ok(self.bucket.presign_get(key, expires_secs, None).await?)
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/{}", self.bucket.url(), key.trim_start_matches('/'))
    }
}

/// Builds a [`BucketClient`] per call / 每次调用创建新客户端
#[derive(Debug, Clone, Copy, Default)]
pub struct BucketClientFactory;

impl ClientFactory for BucketClientFactory {
    fn build(&self, settings: &ClientSettings) -> Result<Arc<dyn ObjectClient>, ClientError> {
        Ok(Arc::new(BucketClient::new(settings)?))
    }
}
