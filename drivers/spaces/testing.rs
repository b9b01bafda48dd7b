//! In-memory object store used by tests / 测试用内存对象存储

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU16, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, StreamExt};
use parking_lot::Mutex;
use tokio::io::AsyncReadExt;

use crate::storage::client::{
    ByteStream, ClientError, ClientFactory, ClientSettings, ObjectClient, PutOutcome, UploadBody,
};
use super::observer::{FileServiceObserver, ServiceEvent};

/// 分块返回下载数据，模拟网络流
const CHUNK: usize = 64 * 1024;

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub data: Vec<u8>,
    pub acl: String,
    pub content_type: String,
}

#[derive(Default)]
pub struct MemoryStore {
    objects: Mutex<HashMap<String, StoredObject>>,
    settings_seen: Mutex<Vec<ClientSettings>>,
    /// Non-zero: every put answers with this status
    put_failure: AtomicU16,
    /// Answer 404 when deleting a missing key
    strict_deletes: AtomicBool,
    /// Downloads break with a reset after the first chunk
    broken_reads: AtomicBool,
    gets: AtomicUsize,
}

impl MemoryStore {
    pub fn location(bucket: &str, key: &str) -> String {
        format!("https://{}.objects.test/{}", bucket, key)
    }

    pub fn object(&self, key: &str) -> Option<StoredObject> {
        self.objects.lock().get(key).cloned()
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().len()
    }

    pub fn insert(&self, key: &str, data: Vec<u8>, acl: &str) {
        self.objects.lock().insert(
            key.to_string(),
            StoredObject {
                data,
                acl: acl.to_string(),
                content_type: "application/octet-stream".to_string(),
            },
        );
    }

    pub fn fail_puts_with(&self, code: u16) {
        self.put_failure.store(code, Ordering::SeqCst);
    }

    pub fn reject_missing_deletes(&self) {
        self.strict_deletes.store(true, Ordering::SeqCst);
    }

    pub fn break_reads_after_first_chunk(&self) {
        self.broken_reads.store(true, Ordering::SeqCst);
    }

    pub fn get_count(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn settings_seen(&self) -> Vec<ClientSettings> {
        self.settings_seen.lock().clone()
    }

    pub fn last_settings(&self) -> Option<ClientSettings> {
        self.settings_seen.lock().last().cloned()
    }
}

pub struct MemoryClient {
    store: Arc<MemoryStore>,
    settings: ClientSettings,
}

#[async_trait]
impl ObjectClient for MemoryClient {
    async fn put_object_stream(
        &self,
        key: &str,
        acl: &str,
        content_type: &str,
        mut body: UploadBody,
    ) -> Result<PutOutcome, ClientError> {
        let failure = self.store.put_failure.load(Ordering::SeqCst);
        if failure != 0 {
            return Err(ClientError::Status { code: failure, key: key.to_string() });
        }

        let mut data = Vec::new();
        body.read_to_end(&mut data).await?;
        self.store.objects.lock().insert(
            key.to_string(),
            StoredObject { data, acl: acl.to_string(), content_type: content_type.to_string() },
        );

        Ok(PutOutcome { key: key.to_string(), location: self.object_url(key) })
    }

    async fn delete_object(&self, key: &str) -> Result<(), ClientError> {
        let removed = self.store.objects.lock().remove(key);
        if removed.is_none() && self.store.strict_deletes.load(Ordering::SeqCst) {
            return Err(ClientError::Status { code: 404, key: key.to_string() });
        }
        Ok(())
    }

    async fn get_object_stream(&self, key: &str) -> Result<ByteStream, ClientError> {
        self.store.gets.fetch_add(1, Ordering::SeqCst);
        let object = self
            .store
            .object(key)
            .ok_or_else(|| ClientError::Status { code: 404, key: key.to_string() })?;

        let mut chunks: Vec<Result<Bytes, ClientError>> = object
            .data
            .chunks(CHUNK)
            .map(|c| Ok(Bytes::copy_from_slice(c)))
            .collect();
        if self.store.broken_reads.load(Ordering::SeqCst) {
            chunks.truncate(1);
            chunks.push(Err(ClientError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "connection reset by peer",
            ))));
        }
        Ok(stream::iter(chunks).boxed())
    }

    async fn presign_get(&self, key: &str, expires_secs: u32) -> Result<String, ClientError> {
        Ok(format!(
            "{}?X-Amz-Algorithm=AWS4-HMAC-SHA256&X-Amz-Credential={}&X-Amz-Expires={}\
             &X-Amz-Signature=deadbeef",
            self.object_url(key),
            self.settings.access_key_id,
            expires_secs
        ))
    }

    fn object_url(&self, key: &str) -> String {
        MemoryStore::location(&self.settings.bucket, key)
    }
}

/// Hands out [`MemoryClient`]s and records the settings used / 记录每次构建的配置
pub struct MemoryClientFactory {
    store: Arc<MemoryStore>,
}

impl MemoryClientFactory {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

impl ClientFactory for MemoryClientFactory {
    fn build(&self, settings: &ClientSettings) -> Result<Arc<dyn ObjectClient>, ClientError> {
        self.store.settings_seen.lock().push(settings.clone());
        Ok(Arc::new(MemoryClient { store: self.store.clone(), settings: settings.clone() }))
    }
}

#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<ServiceEvent>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<ServiceEvent> {
        self.events.lock().clone()
    }
}

impl FileServiceObserver for RecordingObserver {
    fn on_event(&self, event: &ServiceEvent) {
        self.events.lock().push(event.clone());
    }
}
