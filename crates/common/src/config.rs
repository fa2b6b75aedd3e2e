use std::path::PathBuf;
use std::time::Duration;

use crate::DiskReportError;

pub const DEFAULT_DATA_DIR: &str = "docs/data";
pub const DEFAULT_RUNNER: &str = "unknown";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const METADATA_SUFFIX: &str = "-metadata.json";

const ENV_DATA_DIR: &str = "DISK_REPORT_DATA_DIR";
const ENV_RUNNER: &str = "DISK_REPORT_RUNNER";
const ENV_BASE_URL: &str = "DISK_REPORT_BASE_URL";
const ENV_TIMEOUT_SECS: &str = "DISK_REPORT_TIMEOUT_SECS";

/// 应用配置
#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// 批量模式下查找 `<architecture>.json` 的目录
    pub data_dir: PathBuf,
    /// 显式指定的 runner；为 None 时回退到文档注解或默认值
    pub runner: Option<String>,
    /// 发布站点根地址，客户端从这里拉取两个文档
    pub base_url: Option<String>,
    pub request_timeout: Duration,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            runner: None,
            base_url: None,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ReportConfig {
    /// 从环境变量读取配置，未设置的项使用默认值
    pub fn from_env() -> Result<Self, DiskReportError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, DiskReportError> {
        let mut config = Self::default();
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(dir) = non_empty(ENV_DATA_DIR) {
            config.data_dir = PathBuf::from(dir);
        }
        config.runner = non_empty(ENV_RUNNER);
        config.base_url = non_empty(ENV_BASE_URL);
        if let Some(secs) = non_empty(ENV_TIMEOUT_SECS) {
            let secs: u64 = secs.parse().map_err(|_| {
                DiskReportError::Config(format!("{} must be a whole number of seconds, got {:?}", ENV_TIMEOUT_SECS, secs))
            })?;
            config.request_timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }

    /// runner 的最终取值：显式配置优先，其次是调用方给出的回退值
    pub fn runner_or(&self, fallback: Option<&str>) -> String {
        self.runner
            .as_deref()
            .or(fallback)
            .unwrap_or(DEFAULT_RUNNER)
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_env_empty() {
        let config = ReportConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.data_dir, PathBuf::from(DEFAULT_DATA_DIR));
        assert!(config.runner.is_none());
        assert_eq!(config.request_timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(config.runner_or(None), DEFAULT_RUNNER);
    }

    #[test]
    fn test_env_overrides() {
        let config = ReportConfig::from_lookup(lookup(&[
            (ENV_DATA_DIR, "/srv/report"),
            (ENV_RUNNER, "ubuntu-24.04"),
            (ENV_TIMEOUT_SECS, "5"),
            (ENV_BASE_URL, "  "),
        ]))
        .unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/srv/report"));
        assert_eq!(config.runner_or(Some("from-doc")), "ubuntu-24.04");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert!(config.base_url.is_none());
    }

    #[test]
    fn test_bad_timeout_is_config_error() {
        let err = ReportConfig::from_lookup(lookup(&[(ENV_TIMEOUT_SECS, "soon")])).unwrap_err();
        assert!(matches!(err, DiskReportError::Config(_)));
    }
}
