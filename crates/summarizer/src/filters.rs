use std::path::Path;

use disk_report_common::METADATA_SUFFIX;

/// 批量模式下挑选完整树文档的过滤器：`*.json`，但不包括摘要文档本身
pub struct DocumentFilter {
    pub extension: String,
    pub metadata_suffix: String,
}

impl Default for DocumentFilter {
    fn default() -> Self {
        Self {
            extension: ".json".to_string(),
            metadata_suffix: METADATA_SUFFIX.to_string(),
        }
    }
}

impl DocumentFilter {
    pub fn is_eligible(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        name.ends_with(&self.extension)
            && name.len() > self.extension.len()
            && !name.ends_with(&self.metadata_suffix)
    }
}
