use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, Utc};
use disk_report_common::{DiskReportError, DEFAULT_RUNNER, METADATA_SUFFIX};
use disk_report_domain::{parse_unbounded, sort_by_size_desc, DiskNode, Provenance, SnapshotMetadata, TopEntry};
use serde::de::{IgnoredAny, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// 子节点的 children 只计数、不展开，保证摘要只看根的下一层
#[derive(Default)]
struct ChildCount(usize);

impl<'de> Deserialize<'de> for ChildCount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CountVisitor;

        impl<'de> Visitor<'de> for CountVisitor {
            type Value = ChildCount;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a sequence of child nodes")
            }

            fn visit_unit<E>(self) -> Result<ChildCount, E> {
                Ok(ChildCount(0))
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<ChildCount, A::Error> {
                let mut count = 0;
                while seq.next_element::<IgnoredAny>()?.is_some() {
                    count += 1;
                }
                Ok(ChildCount(count))
            }
        }

        deserializer.deserialize_any(CountVisitor)
    }
}

#[derive(Deserialize)]
struct ShallowChild {
    name: String,
    size_bytes: u64,
    #[serde(default)]
    children: ChildCount,
}

#[derive(Deserialize)]
struct ShallowRoot {
    #[serde(default)]
    name: String,
    size_bytes: u64,
    #[serde(default)]
    children: Option<Vec<ShallowChild>>,
    #[serde(default)]
    runner: Option<Value>,
    #[serde(default)]
    timestamp: Option<Value>,
}

/// 完整树文档中摘要需要的部分：根大小、直接子节点（保持原始顺序）以及根上的来源注解
#[derive(Debug, Clone, PartialEq)]
pub struct TreeDocument {
    pub root_name: String,
    pub total_size: u64,
    pub children: Vec<TopEntry>,
    pub annotated_runner: Option<String>,
    pub annotated_timestamp: Option<DateTime<Utc>>,
}

impl TreeDocument {
    pub fn parse(bytes: &[u8]) -> Result<Self, DiskReportError> {
        let root: ShallowRoot = parse_unbounded(bytes)?;
        let children = root.children.ok_or_else(|| {
            DiskReportError::Format(format!("root node {:?} has no children sequence", root.name))
        })?;
        let annotated_timestamp = match root.timestamp.as_ref().and_then(Value::as_str) {
            Some(raw) => match DateTime::parse_from_rfc3339(raw) {
                Ok(ts) => Some(ts.with_timezone(&Utc)),
                Err(e) => {
                    log::warn!("ignoring unparsable timestamp annotation {:?}: {}", raw, e);
                    None
                }
            },
            None => None,
        };

        Ok(Self {
            root_name: root.name,
            total_size: root.size_bytes,
            children: children
                .into_iter()
                .map(|child| TopEntry {
                    size_bytes: child.size_bytes,
                    name: child.name,
                    has_children: child.children.0 > 0,
                })
                .collect(),
            annotated_runner: root.runner.as_ref().and_then(Value::as_str).map(str::to_string),
            annotated_timestamp,
        })
    }

    pub fn from_node(root: &DiskNode) -> Result<Self, DiskReportError> {
        if root.children.is_none() {
            return Err(DiskReportError::Format(format!(
                "root node {:?} has no children sequence",
                root.name
            )));
        }
        Ok(Self {
            root_name: root.name.clone(),
            total_size: root.size_bytes,
            children: root.children().iter().map(DiskNode::entry).collect(),
            annotated_runner: None,
            annotated_timestamp: None,
        })
    }

    pub fn summarize(self, provenance: Provenance) -> SnapshotMetadata {
        let total_entries = self.children.len();
        let mut top_entries = self.children;
        sort_by_size_desc(&mut top_entries);

        SnapshotMetadata {
            architecture: provenance.architecture,
            timestamp: provenance.timestamp,
            runner: provenance.runner,
            total_size: self.total_size,
            top_entries,
            total_entries,
        }
    }
}

/// 由根节点与来源信息生成摘要，只读取根的直接子节点
pub fn summarize(root: &DiskNode, provenance: Provenance) -> Result<SnapshotMetadata, DiskReportError> {
    Ok(TreeDocument::from_node(root)?.summarize(provenance))
}

/// 调用方显式指定的来源信息；未指定的项按「文档注解 → 默认值」回退
#[derive(Debug, Clone, Default)]
pub struct ProvenanceOptions {
    pub architecture: Option<String>,
    pub runner: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl ProvenanceOptions {
    fn resolve(&self, input: &Path, doc: &TreeDocument) -> Result<Provenance, DiskReportError> {
        let architecture = match &self.architecture {
            Some(arch) => arch.clone(),
            None => architecture_from_path(input)?,
        };
        let runner = self
            .runner
            .clone()
            .or_else(|| doc.annotated_runner.clone())
            .unwrap_or_else(|| DEFAULT_RUNNER.to_string());
        let timestamp = match self.timestamp.or(doc.annotated_timestamp) {
            Some(ts) => ts,
            // 回退到源文件的修改时间，而不是当前时间，保证重复运行输出一致
            None => DateTime::<Utc>::from(std::fs::metadata(input)?.modified()?),
        };
        Ok(Provenance {
            architecture,
            runner,
            timestamp,
        })
    }
}

fn architecture_from_path(input: &Path) -> Result<String, DiskReportError> {
    input
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| DiskReportError::Config(format!("cannot derive architecture from {}", input.display())))
}

/// `<dir>/<stem>.json` 对应的摘要路径 `<dir>/<stem>-metadata.json`。
/// 始终按文件名配对，与摘要里记录的 architecture 无关，客户端才能用同一个名字找到两份文档。
pub fn metadata_path_for(input: &Path) -> Result<PathBuf, DiskReportError> {
    let stem = architecture_from_path(input)?;
    Ok(input.with_file_name(format!("{}{}", stem, METADATA_SUFFIX)))
}

/// 单个文档的处理结果
#[derive(Debug, Clone)]
pub struct SummaryOutcome {
    pub input: PathBuf,
    pub output: PathBuf,
    pub architecture: String,
    pub input_bytes: u64,
    pub output_bytes: u64,
    pub total_entries: usize,
}

impl SummaryOutcome {
    pub fn reduction_percent(&self) -> f64 {
        if self.input_bytes == 0 {
            return 0.0;
        }
        (1.0 - self.output_bytes as f64 / self.input_bytes as f64) * 100.0
    }
}

/// 读取完整树文档并在旁边写出摘要。任何错误都发生在写出之前，不会留下半成品。
pub fn summarize_file(input: &Path, options: &ProvenanceOptions) -> Result<SummaryOutcome, DiskReportError> {
    let start = Instant::now();
    let bytes = std::fs::read(input)?;
    let doc = TreeDocument::parse(&bytes)?;
    let provenance = options.resolve(input, &doc)?;
    let architecture = provenance.architecture.clone();

    let metadata = doc.summarize(provenance);
    let encoded = metadata.to_vec()?;
    let output = metadata_path_for(input)?;
    write_document(&output, &encoded)?;

    log::info!(
        "summarized {} -> {} in {} ms, entries: {}",
        input.display(),
        output.display(),
        start.elapsed().as_millis(),
        metadata.total_entries
    );

    Ok(SummaryOutcome {
        input: input.to_path_buf(),
        output,
        architecture,
        input_bytes: bytes.len() as u64,
        output_bytes: encoded.len() as u64,
        total_entries: metadata.total_entries,
    })
}

/// 先写同目录临时文件再原子替换：只保留最新快照，失败时旧文件保持不变
pub(crate) fn write_document(path: &Path, bytes: &[u8]) -> Result<(), DiskReportError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| DiskReportError::Io(e.error))?;
    Ok(())
}
