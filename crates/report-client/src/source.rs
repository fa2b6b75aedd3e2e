use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use disk_report_common::{DiskReportError, METADATA_SUFFIX};
use disk_report_domain::{DiskNode, SnapshotMetadata};

/// 一个架构的数据来源：摘要文档与完整树文档可以分别获取
#[async_trait]
pub trait TreeSource: Send + Sync {
    fn architecture(&self) -> &str;

    async fn fetch_summary(&self) -> Result<SnapshotMetadata, DiskReportError>;

    async fn fetch_full(&self) -> Result<DiskNode, DiskReportError>;
}

pub fn summary_document_name(architecture: &str) -> String {
    format!("{}{}", architecture, METADATA_SUFFIX)
}

pub fn full_document_name(architecture: &str) -> String {
    format!("{}.json", architecture)
}

/// 完整树可能有几十 MB，放到阻塞线程池里解析
async fn parse_full(bytes: Vec<u8>) -> Result<DiskNode, DiskReportError> {
    tokio::task::spawn_blocking(move || DiskNode::from_document_slice(&bytes))
        .await
        .map_err(|e| DiskReportError::Io(std::io::Error::other(e)))?
}

/// 通过发布站点的两个固定 URL 获取文档
pub struct HttpSource {
    client: reqwest::Client,
    architecture: String,
    summary_url: String,
    full_url: String,
}

impl HttpSource {
    pub fn new(client: reqwest::Client, base_url: &str, architecture: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            client,
            architecture: architecture.to_string(),
            summary_url: format!("{}/{}", base, summary_document_name(architecture)),
            full_url: format!("{}/{}", base, full_document_name(architecture)),
        }
    }

    pub fn build_client(timeout: Duration) -> Result<reqwest::Client, DiskReportError> {
        reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DiskReportError::Config(format!("failed to build HTTP client: {}", e)))
    }

    pub fn summary_url(&self) -> &str {
        &self.summary_url
    }

    pub fn full_url(&self) -> &str {
        &self.full_url
    }

    async fn get(&self, url: &str) -> Result<Vec<u8>, DiskReportError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DiskReportError::Fetch(format!("GET {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DiskReportError::Fetch(format!("GET {} returned {}", url, status)));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| DiskReportError::Fetch(format!("reading body of {} failed: {}", url, e)))?;
        Ok(body.to_vec())
    }
}

#[async_trait]
impl TreeSource for HttpSource {
    fn architecture(&self) -> &str {
        &self.architecture
    }

    async fn fetch_summary(&self) -> Result<SnapshotMetadata, DiskReportError> {
        let bytes = self.get(&self.summary_url).await?;
        SnapshotMetadata::from_slice(&bytes)
    }

    async fn fetch_full(&self) -> Result<DiskNode, DiskReportError> {
        let bytes = self.get(&self.full_url).await?;
        parse_full(bytes).await
    }
}

/// 从本地发布目录读取同样的两个文档
pub struct DirSource {
    dir: PathBuf,
    architecture: String,
}

impl DirSource {
    pub fn new(dir: impl Into<PathBuf>, architecture: &str) -> Self {
        Self {
            dir: dir.into(),
            architecture: architecture.to_string(),
        }
    }

    async fn read(&self, name: &str) -> Result<Vec<u8>, DiskReportError> {
        let path = self.dir.join(name);
        tokio::fs::read(&path)
            .await
            .map_err(|e| DiskReportError::Fetch(format!("reading {} failed: {}", path.display(), e)))
    }
}

#[async_trait]
impl TreeSource for DirSource {
    fn architecture(&self) -> &str {
        &self.architecture
    }

    async fn fetch_summary(&self) -> Result<SnapshotMetadata, DiskReportError> {
        let bytes = self.read(&summary_document_name(&self.architecture)).await?;
        SnapshotMetadata::from_slice(&bytes)
    }

    async fn fetch_full(&self) -> Result<DiskNode, DiskReportError> {
        let bytes = self.read(&full_document_name(&self.architecture)).await?;
        parse_full(bytes).await
    }
}
