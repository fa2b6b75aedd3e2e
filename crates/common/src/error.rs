use thiserror::Error;

#[derive(Error, Debug)]
pub enum DiskReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// 文档结构不符合预期（根缺少 children、子节点缺少必需字段等）
    #[error("Format error: {0}")]
    Format(String),

    /// 客户端拉取失败（网络错误或非 2xx 状态）
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// 路径解析未命中，只影响当前这一次展开
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for DiskReportError {
    fn from(e: serde_json::Error) -> Self {
        if e.is_io() {
            DiskReportError::Io(e.into())
        } else {
            DiskReportError::Format(e.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, DiskReportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_syntax_error_is_format() {
        let err: DiskReportError = serde_json::from_str::<serde_json::Value>("{not json")
            .unwrap_err()
            .into();
        assert!(matches!(err, DiskReportError::Format(_)));
    }

    #[test]
    fn test_display_carries_detail() {
        let err = DiskReportError::NotFound("usr/lib".into());
        assert_eq!(err.to_string(), "Not found: usr/lib");
    }
}
