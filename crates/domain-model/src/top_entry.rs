use serde::{Deserialize, Serialize};

/// 某一层级下的一个条目：摘要的 top_entries 与客户端展开的每一层都用它表示。
///
/// 线上格式是三元数组 `[size_bytes, name, has_children]`，已有的页面按位置读取，
/// 内部则使用具名字段。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(u64, String, bool)", into = "(u64, String, bool)")]
pub struct TopEntry {
    pub size_bytes: u64,
    pub name: String,
    pub has_children: bool,
}

impl From<(u64, String, bool)> for TopEntry {
    fn from((size_bytes, name, has_children): (u64, String, bool)) -> Self {
        Self {
            size_bytes,
            name,
            has_children,
        }
    }
}

impl From<TopEntry> for (u64, String, bool) {
    fn from(entry: TopEntry) -> Self {
        (entry.size_bytes, entry.name, entry.has_children)
    }
}

/// 按 size_bytes 降序排列；大小相同的条目保持原有顺序（稳定排序）
pub fn sort_by_size_desc(entries: &mut [TopEntry]) {
    entries.sort_by(|a, b| b.size_bytes.cmp(&a.size_bytes));
}
