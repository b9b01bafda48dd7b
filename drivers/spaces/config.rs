//! Spaces驱动配置

use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{FileServiceError, Result};
use crate::storage::ClientSettings;
use crate::utils::{normalize_directory, trim_trailing_slash};

/// Spaces配置
#[derive(Clone, Serialize, Deserialize)]
pub struct SpacesConfig {
    /// 存储桶名称
    pub bucket: String,
    /// 公开访问地址（CDN或Spaces域名），末尾斜杠会被去除
    #[serde(default, alias = "spaces_url", deserialize_with = "deserialize_base_url")]
    pub base_url: Option<String>,
    /// Access Key ID
    pub access_key_id: String,
    /// Secret Access Key
    pub secret_access_key: String,
    /// 区域
    #[serde(default = "default_region")]
    pub region: String,
    /// S3兼容端点地址
    /// DigitalOcean: https://{region}.digitaloceanspaces.com
    /// MinIO: http://localhost:9000
    #[serde(default)]
    pub endpoint: Option<String>,
    /// 预签名URL过期时间（秒）
    #[serde(default = "default_download_url_duration")]
    pub download_url_duration: u32,
    /// 对象键目录前缀
    #[serde(default, deserialize_with = "deserialize_directory")]
    pub directory: Option<String>,
    /// 强制使用路径风格（MinIO等需要）
    #[serde(default)]
    pub force_path_style: bool,
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_download_url_duration() -> u32 {
    60
}

fn deserialize_base_url<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.map(|v| trim_trailing_slash(&v)).filter(|v| !v.is_empty()))
}

fn deserialize_directory<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(normalize_directory(value.as_deref()))
}

fn config_error(message: String) -> FileServiceError {
    FileServiceError::Config(message)
}

impl SpacesConfig {
    /// Parse host options / 解析宿主传入的选项
    pub fn from_value(options: serde_json::Value) -> Result<Self> {
        let config: SpacesConfig = serde_json::from_value(options)
            .map_err(|e| config_error(format!("配置解析失败: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load options from a JSON file / 从JSON文件加载配置
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| config_error(format!("读取配置文件失败 {:?}: {}", path, e)))?;
        let options: serde_json::Value = serde_json::from_str(&content)
            .map_err(|e| config_error(format!("配置文件格式错误 {:?}: {}", path, e)))?;
        Self::from_value(options)
    }

    /// 校验必填项与URL格式
    pub fn validate(&self) -> Result<()> {
        if self.bucket.trim().is_empty() {
            return Err(config_error("bucket 不能为空".to_string()));
        }
        if self.access_key_id.is_empty() || self.secret_access_key.is_empty() {
            return Err(config_error(
                "access_key_id 和 secret_access_key 不能为空".to_string(),
            ));
        }
        if let Some(endpoint) = self.endpoint.as_deref().filter(|e| !e.is_empty()) {
            url::Url::parse(endpoint)
                .map_err(|e| config_error(format!("endpoint 格式错误: {}", e)))?;
        }
        if let Some(base_url) = &self.base_url {
            url::Url::parse(base_url)
                .map_err(|e| config_error(format!("spaces_url 格式错误: {}", e)))?;
        }
        Ok(())
    }

    /// Settings for a fresh client / 构建客户端所需配置
    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            bucket: self.bucket.clone(),
            access_key_id: self.access_key_id.clone(),
            secret_access_key: self.secret_access_key.clone(),
            region: self.region.clone(),
            endpoint: self.endpoint.clone().filter(|e| !e.is_empty()),
            force_path_style: self.force_path_style,
            signature_version: None,
        }
    }
}

impl std::fmt::Debug for SpacesConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpacesConfig")
            .field("bucket", &self.bucket)
            .field("base_url", &self.base_url)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"***")
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field("download_url_duration", &self.download_url_duration)
            .field("directory", &self.directory)
            .field("force_path_style", &self.force_path_style)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn options() -> serde_json::Value {
        serde_json::json!({
            "bucket": "media",
            "spaces_url": "https://media.nyc3.cdn.digitaloceanspaces.com/",
            "access_key_id": "AKID",
            "secret_access_key": "secret",
            "region": "nyc3",
            "endpoint": "https://nyc3.digitaloceanspaces.com",
            "directory": "/avatars/",
        })
    }

    #[test]
    fn test_parse_host_option_names() {
        let config = SpacesConfig::from_value(options()).unwrap();
        assert_eq!(
            config.base_url.as_deref(),
            Some("https://media.nyc3.cdn.digitaloceanspaces.com")
        );
        assert_eq!(config.directory.as_deref(), Some("avatars"));
        assert_eq!(config.download_url_duration, 60);
        assert!(!config.force_path_style);
    }

    #[test]
    fn test_defaults_and_empty_values() {
        let config = SpacesConfig::from_value(serde_json::json!({
            "bucket": "media",
            "access_key_id": "AKID",
            "secret_access_key": "secret",
            "directory": "",
            "download_url_duration": 300,
        }))
        .unwrap();
        assert_eq!(config.region, "us-east-1");
        assert!(config.base_url.is_none());
        assert!(config.endpoint.is_none());
        assert!(config.directory.is_none());
        assert_eq!(config.download_url_duration, 300);
    }

    #[test]
    fn test_validation_errors() {
        let mut opts = options();
        opts["bucket"] = serde_json::json!(" ");
        let err = SpacesConfig::from_value(opts).unwrap_err();
        assert!(matches!(err, FileServiceError::Config(_)));

        let mut opts = options();
        opts["endpoint"] = serde_json::json!("not a url");
        assert!(SpacesConfig::from_value(opts).is_err());

        let err = SpacesConfig::from_value(serde_json::json!({ "bucket": "media" })).unwrap_err();
        assert!(matches!(err, FileServiceError::Config(_)));

        let err = SpacesConfig::from_file("/nonexistent/spaces.json").unwrap_err();
        assert!(matches!(err, FileServiceError::Config(_)));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = SpacesConfig::from_value(options()).unwrap();
        let rendered = format!("{:?}", config);
        assert!(rendered.contains("AKID"));
        assert!(!rendered.contains("\"secret\""));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", options()).unwrap();
        let config = SpacesConfig::from_file(file.path()).unwrap();
        assert_eq!(config.bucket, "media");
        assert_eq!(
            config.client_settings().endpoint.as_deref(),
            Some("https://nyc3.digitaloceanspaces.com")
        );
    }
}
