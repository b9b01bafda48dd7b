//! Observability hook / 观测钩子

use crate::storage::SignatureVersion;

/// Something worth reporting during an operation / 操作事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceEvent {
    /// A fresh client was configured for `operation`
    ClientConfigured {
        operation: &'static str,
        signature_version: Option<SignatureVersion>,
    },
    /// `operation` is about to touch `key`
    KeyResolved { operation: &'static str, key: String },
    Uploaded { key: String, url: String },
    Deleted { key: String },
    Failed { operation: &'static str, key: String, error: String },
}

/// Receives service events / 事件接收者
pub trait FileServiceObserver: Send + Sync {
    fn on_event(&self, event: &ServiceEvent);
}

/// Forwards events to `tracing` / 输出到 tracing
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl FileServiceObserver for TracingObserver {
    fn on_event(&self, event: &ServiceEvent) {
        match event {
            ServiceEvent::ClientConfigured { operation, signature_version } => {
                tracing::debug!(
                    "Spaces client configured: op={}, signature={}",
                    operation,
                    signature_version.map(|v| v.as_str()).unwrap_or("default")
                );
            }
            ServiceEvent::KeyResolved { operation, key } => {
                tracing::debug!("Spaces {}: file_key={}", operation, key);
            }
            ServiceEvent::Uploaded { key, url } => {
                tracing::info!("Spaces file uploaded: key={}, url={}", key, url);
            }
            ServiceEvent::Deleted { key } => {
                tracing::info!("Spaces file deleted: key={}", key);
            }
            ServiceEvent::Failed { operation, key, error } => {
                tracing::warn!("Spaces {} failed: key={} - {}", operation, key, error);
            }
        }
    }
}
