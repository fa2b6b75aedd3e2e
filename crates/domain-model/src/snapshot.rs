use chrono::{DateTime, Utc};
use disk_report_common::DiskReportError;
use serde::{Deserialize, Serialize};

use crate::TopEntry;

/// 一次扫描的来源信息，由运行上下文传入，原样写入摘要
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provenance {
    pub architecture: String,
    pub runner: String,
    pub timestamp: DateTime<Utc>,
}

/// 摘要文档 `<architecture>-metadata.json`，每次由完整树重新生成，不保留历史
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    pub architecture: String,
    pub timestamp: DateTime<Utc>,
    pub runner: String,
    /// 等于根节点自身的 size_bytes
    pub total_size: u64,
    /// 根的全部直接子节点（不是前 N 个），按大小降序
    pub top_entries: Vec<TopEntry>,
    pub total_entries: usize,
}

impl SnapshotMetadata {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, DiskReportError> {
        let metadata: SnapshotMetadata = serde_json::from_slice(bytes)?;
        if metadata.total_entries != metadata.top_entries.len() {
            return Err(DiskReportError::Format(format!(
                "total_entries is {} but top_entries has {} elements",
                metadata.total_entries,
                metadata.top_entries.len()
            )));
        }
        Ok(metadata)
    }

    pub fn to_vec(&self) -> Result<Vec<u8>, DiskReportError> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn entry(&self, name: &str) -> Option<&TopEntry> {
        self.top_entries.iter().find(|e| e.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> SnapshotMetadata {
        SnapshotMetadata {
            architecture: "x86_64".into(),
            timestamp: Utc.with_ymd_and_hms(2026, 10, 18, 3, 0, 0).unwrap(),
            runner: "ubuntu-24.04".into(),
            total_size: 400,
            top_entries: vec![
                TopEntry { size_bytes: 300, name: "usr".into(), has_children: true },
                TopEntry { size_bytes: 100, name: "etc".into(), has_children: false },
            ],
            total_entries: 2,
        }
    }

    #[test]
    fn test_document_field_layout() {
        let json = String::from_utf8(sample().to_vec().unwrap()).unwrap();
        assert_eq!(
            json,
            r#"{"architecture":"x86_64","timestamp":"2026-10-18T03:00:00Z","runner":"ubuntu-24.04","total_size":400,"top_entries":[[300,"usr",true],[100,"etc",false]],"total_entries":2}"#
        );
        assert_eq!(SnapshotMetadata::from_slice(json.as_bytes()).unwrap(), sample());
    }

    #[test]
    fn test_inconsistent_count_is_format_error() {
        let mut metadata = sample();
        metadata.total_entries = 5;
        let bytes = serde_json::to_vec(&metadata).unwrap();
        let err = SnapshotMetadata::from_slice(&bytes).unwrap_err();
        assert!(matches!(err, DiskReportError::Format(_)));
    }

    #[test]
    fn test_entry_lookup() {
        let metadata = sample();
        assert!(metadata.entry("usr").unwrap().has_children);
        assert!(metadata.entry("var").is_none());
    }
}
