//! Object key naming and public URL resolution / 对象键命名与URL解析

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use crate::utils::{join_url, split_file_name};

/// Millisecond wall clock / 毫秒时钟
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Derives storage keys as `{directory}/{stem}-{millis}{ext}`.
///
/// Keys are not collision-proof: two uploads of the same name within one
/// millisecond receive the same key.
pub struct KeyNamingPolicy {
    directory: Option<String>,
    clock: Arc<dyn Clock>,
    /// Last timestamp handed out, keeps keys non-decreasing if the clock steps back
    last_millis: AtomicI64,
}

impl KeyNamingPolicy {
    pub fn new(directory: Option<String>) -> Self {
        Self::with_clock(directory, Arc::new(SystemClock))
    }

    pub fn with_clock(directory: Option<String>, clock: Arc<dyn Clock>) -> Self {
        Self {
            directory,
            clock,
            last_millis: AtomicI64::new(i64::MIN),
        }
    }

    fn next_millis(&self) -> i64 {
        let now = self.clock.now_millis();
        let previous = self.last_millis.fetch_max(now, Ordering::SeqCst);
        now.max(previous)
    }

    /// Key for an uploaded file / 上传文件的对象键
    pub fn upload_key(&self, original_name: &str) -> String {
        let (stem, ext) = split_file_name(original_name);
        let file_name = format!("{}-{}{}", stem, self.next_millis(), ext);
        match &self.directory {
            Some(dir) => format!("{}/{}", dir, file_name),
            None => file_name,
        }
    }

    /// Key for a streamed upload, no directory prefix / 流式上传的对象键（不加目录前缀）
    pub fn stream_key(name: &str, ext: &str) -> String {
        format!("{}.{}", name, ext)
    }
}

/// Builds the URL handed back to callers / 生成返回给调用方的URL
#[derive(Debug, Clone, Default)]
pub struct UrlResolver {
    base_url: Option<String>,
}

impl UrlResolver {
    pub fn new(base_url: Option<String>) -> Self {
        Self { base_url }
    }

    /// `{base_url}/{key}` when configured, otherwise the client location
    pub fn resolve(&self, key: &str, client_location: &str) -> String {
        match &self.base_url {
            Some(base) => join_url(base, key),
            None => client_location.to_string(),
        }
    }
}
