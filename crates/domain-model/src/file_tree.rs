use disk_report_common::DiskReportError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{parse_unbounded, sort_by_size_desc, TopEntry};

/// 逐层转换时保留的最小剩余栈，不足时 stacker 换到新栈
const STACK_RED_ZONE: usize = 64 * 1024;
const STACK_GROWTH: usize = 1024 * 1024;

/// 文件树节点（外部扫描器输出的完整树中的一个节点）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiskNode {
    /// 路径片段；根节点为扫描的绝对路径
    pub name: String,
    /// 本节点及全部后代的累计大小，以此字段为准，不从子节点重新求和
    pub size_bytes: u64,
    /// 叶子文件没有该字段或为空数组；扫描器输出的顺序不保证有序
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<DiskNode>>,
    /// excluded 等扫描器注解，原样透传
    #[serde(flatten)]
    pub annotations: Map<String, Value>,
}

impl DiskNode {
    pub fn leaf(name: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            name: name.into(),
            size_bytes,
            children: None,
            annotations: Map::new(),
        }
    }

    pub fn dir(name: impl Into<String>, size_bytes: u64, children: Vec<DiskNode>) -> Self {
        Self {
            name: name.into(),
            size_bytes,
            children: Some(children),
            annotations: Map::new(),
        }
    }

    /// 解析完整树文档。根节点必须带 children 数组，否则不是一棵有效的树。
    /// 目录深度不设上限。
    pub fn from_document_slice(bytes: &[u8]) -> Result<Self, DiskReportError> {
        let root = DiskNode::from_value(parse_unbounded(bytes)?)?;
        if root.children.is_none() {
            return Err(DiskReportError::Format(format!(
                "root node {:?} has no children sequence",
                root.name
            )));
        }
        Ok(root)
    }

    /// 从已解析的 JSON 值构建节点；name、size_bytes 之外的字段都作为注解保留
    pub fn from_value(value: Value) -> Result<Self, DiskReportError> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROWTH, || {
            let mut fields = match value {
                Value::Object(fields) => fields,
                _ => return Err(DiskReportError::Format("tree node is not an object".into())),
            };
            let name = match fields.remove("name") {
                Some(Value::String(name)) => name,
                _ => return Err(DiskReportError::Format("tree node without a string name".into())),
            };
            let size_bytes = fields
                .remove("size_bytes")
                .and_then(|size| size.as_u64())
                .ok_or_else(|| DiskReportError::Format(format!("node {:?} has no unsigned size_bytes", name)))?;
            let children = match fields.remove("children") {
                None | Some(Value::Null) => None,
                Some(Value::Array(items)) => Some(
                    items
                        .into_iter()
                        .map(DiskNode::from_value)
                        .collect::<Result<Vec<_>, _>>()?,
                ),
                Some(_) => {
                    return Err(DiskReportError::Format(format!(
                        "node {:?} has a non-array children field",
                        name
                    )))
                }
            };
            Ok(DiskNode {
                name,
                size_bytes,
                children,
                annotations: fields,
            })
        })
    }

    pub fn children(&self) -> &[DiskNode] {
        self.children.as_deref().unwrap_or(&[])
    }

    pub fn has_children(&self) -> bool {
        !self.children().is_empty()
    }

    pub fn entry(&self) -> TopEntry {
        TopEntry {
            size_bytes: self.size_bytes,
            name: self.name.clone(),
            has_children: self.has_children(),
        }
    }

    /// 直接子节点的条目，按大小降序（与摘要相同的稳定排序）
    pub fn sorted_entries(&self) -> Vec<TopEntry> {
        let mut entries: Vec<TopEntry> = self.children().iter().map(DiskNode::entry).collect();
        sort_by_size_desc(&mut entries);
        entries
    }

    /// 从本节点出发，按名称逐层匹配路径。空路径返回自身。
    pub fn resolve<S: AsRef<str>>(&self, path: &[S]) -> Result<&DiskNode, DiskReportError> {
        let mut node = self;
        for (depth, segment) in path.iter().enumerate() {
            let segment = segment.as_ref();
            if !node.has_children() {
                return Err(DiskReportError::NotFound(format!(
                    "{} is a leaf, cannot descend into {:?}",
                    join_path(&path[..depth]),
                    segment
                )));
            }
            node = node
                .children()
                .iter()
                .find(|child| child.name == segment)
                .ok_or_else(|| DiskReportError::NotFound(join_path(&path[..=depth])))?;
        }
        Ok(node)
    }
}

/// 路径的展示形式，如 `usr/lib`；空路径为 `/`
pub fn join_path<S: AsRef<str>>(path: &[S]) -> String {
    if path.is_empty() {
        return "/".to_string();
    }
    path.iter().map(|s| s.as_ref()).collect::<Vec<_>>().join("/")
}
