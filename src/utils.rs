/// Name processing utility functions / 名称处理工具函数

/// Split a file name into stem and extension (POSIX rules) / 拆分文件名与扩展名
/// 1. Only `/` separates directories, a backslash is an ordinary character / 仅 `/` 为目录分隔符
/// 2. Extension keeps its leading dot / 扩展名保留前导点
/// 3. A leading dot alone is not an extension (".env", "..") / 仅有前导点不视为扩展名
pub fn split_file_name(name: &str) -> (String, String) {
    let base = name.trim_end_matches('/').rsplit('/').next().unwrap_or("");

    if base == ".." {
        return (base.to_string(), String::new());
    }

    match base.rfind('.') {
        Some(pos) if pos > 0 => (base[..pos].to_string(), base[pos..].to_string()),
        _ => (base.to_string(), String::new()),
    }
}

/// Remove trailing slashes from a base URL / 去除URL末尾斜杠
pub fn trim_trailing_slash(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

/// Normalize an optional key prefix, empty means none / 规范化目录前缀
pub fn normalize_directory(directory: Option<&str>) -> Option<String> {
    directory
        .map(|d| d.trim_matches('/'))
        .filter(|d| !d.is_empty())
        .map(|d| d.to_string())
}

/// Join a base URL and an object key / 拼接URL与对象键
pub fn join_url(base: &str, key: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), key.trim_start_matches('/'))
}
