//! ncdu JSON 导出 → 完整树文档。
//!
//! ncdu 格式为 `[major, minor, {meta}, root]`：目录是 `[{info}, child...]`，文件是 `{info}`。
//! 也接受外层信封 `{architecture, timestamp, runner, ..., data: [...]}`。

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use disk_report_common::DiskReportError;
use disk_report_domain::{parse_unbounded, DiskNode};
use serde_json::{Map, Value};

use crate::summarizer::write_document;

/// 导入结果：转换后的根节点，以及信封中声明的架构（若有）
#[derive(Debug, Clone)]
pub struct NcduImport {
    pub root: DiskNode,
    pub architecture: Option<String>,
}

pub fn import_ncdu(bytes: &[u8]) -> Result<NcduImport, DiskReportError> {
    let value: Value = parse_unbounded(bytes)?;
    let (data, envelope) = match value {
        Value::Array(data) => (data, Map::new()),
        Value::Object(mut envelope) => match envelope.remove("data") {
            Some(Value::Array(data)) => (data, envelope),
            _ => return Err(DiskReportError::Format("envelope has no ncdu data array".into())),
        },
        _ => return Err(DiskReportError::Format("not an ncdu export".into())),
    };

    let root_value = data
        .get(3)
        .ok_or_else(|| DiskReportError::Format(format!("ncdu export has {} elements, expected a root entry", data.len())))?;
    if !root_value.is_array() {
        return Err(DiskReportError::Format("ncdu root entry is not a directory".into()));
    }

    // 硬链接只计一次，整棵树共用一个 inode 集合
    let mut seen_inodes = HashSet::new();
    let mut root = convert_entry(root_value, &mut seen_inodes)?;
    for key in ["runner", "timestamp"] {
        if let Some(v) = envelope.get(key).filter(|v| !v.is_null()) {
            root.annotations.insert(key.to_string(), v.clone());
        }
    }

    Ok(NcduImport {
        root,
        architecture: envelope.get("architecture").and_then(Value::as_str).map(str::to_string),
    })
}

fn convert_entry(value: &Value, seen_inodes: &mut HashSet<u64>) -> Result<DiskNode, DiskReportError> {
    match value {
        Value::Object(info) => {
            let mut node = node_from_info(info);
            let counted = match info.get("ino").and_then(Value::as_u64) {
                Some(ino) => seen_inodes.insert(ino),
                None => true,
            };
            node.size_bytes = if counted {
                info.get("dsize").and_then(Value::as_u64).unwrap_or(0)
            } else {
                0
            };
            Ok(node)
        }
        Value::Array(items) => {
            let info = items
                .first()
                .and_then(Value::as_object)
                .ok_or_else(|| DiskReportError::Format("directory entry without info object".into()))?;
            let mut node = node_from_info(info);
            let children = items[1..]
                .iter()
                .map(|child| convert_entry(child, seen_inodes))
                .collect::<Result<Vec<_>, _>>()?;
            // 目录大小只是子项之和，不含目录 inode 本身的 dsize
            node.size_bytes = children.iter().fold(0u64, |acc, c| acc.saturating_add(c.size_bytes));
            node.children = Some(children);
            Ok(node)
        }
        other => Err(DiskReportError::Format(format!("unexpected ncdu entry: {}", other))),
    }
}

fn node_from_info(info: &Map<String, Value>) -> DiskNode {
    let name = info.get("name").and_then(Value::as_str).unwrap_or("unknown");
    let mut node = DiskNode::leaf(name, 0);
    node.annotations = info
        .iter()
        .filter(|(k, _)| k.as_str() != "name" && k.as_str() != "dsize")
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    node
}

/// 转换 ncdu 导出并写出 `<architecture>.json`（默认与输入同目录）
pub fn import_ncdu_file(
    input: &Path,
    output: Option<&Path>,
    architecture: Option<&str>,
) -> Result<PathBuf, DiskReportError> {
    let bytes = std::fs::read(input)?;
    let imported = import_ncdu(&bytes)?;

    let output = match output {
        Some(path) => path.to_path_buf(),
        None => {
            let arch = architecture
                .map(str::to_string)
                .or(imported.architecture)
                .ok_or_else(|| {
                    DiskReportError::Config(format!(
                        "{} declares no architecture; pass one explicitly",
                        input.display()
                    ))
                })?;
            input.with_file_name(format!("{}.json", arch))
        }
    };

    let encoded = serde_json::to_vec(&imported.root)?;
    write_document(&output, &encoded)?;
    log::info!(
        "imported ncdu export {} -> {} ({} bytes, root size {})",
        input.display(),
        output.display(),
        encoded.len(),
        imported.root.size_bytes
    );
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn size_of(entry: Value) -> u64 {
        convert_entry(&entry, &mut HashSet::new()).unwrap().size_bytes
    }

    #[test]
    fn test_file_size_uses_dsize() {
        assert_eq!(size_of(json!({"name": "file.txt", "asize": 1000, "dsize": 4096, "ino": 123})), 4096);
    }

    #[test]
    fn test_directory_excludes_own_inode() {
        let dir = json!([
            {"name": "testdir", "asize": 4096, "dsize": 4096},
            {"name": "file1.txt", "asize": 1000, "dsize": 4096, "ino": 1},
            {"name": "file2.txt", "asize": 2000, "dsize": 4096, "ino": 2}
        ]);
        assert_eq!(size_of(dir), 8192);
    }

    #[test]
    fn test_nested_directories() {
        let root = json!([
            {"name": "root", "asize": 4096, "dsize": 4096},
            [
                {"name": "subdir", "asize": 4096, "dsize": 4096},
                {"name": "file1.txt", "asize": 1000, "dsize": 4096, "ino": 1}
            ],
            {"name": "file2.txt", "asize": 2000, "dsize": 4096, "ino": 2}
        ]);
        let node = convert_entry(&root, &mut HashSet::new()).unwrap();
        assert_eq!(node.size_bytes, 8192);
        assert_eq!(node.children()[0].size_bytes, 4096);
        assert!(node.children()[0].has_children());
    }

    #[test]
    fn test_hardlinks_counted_once() {
        let dir = json!([
            {"name": "dir", "asize": 4096, "dsize": 4096},
            {"name": "file1.txt", "asize": 1000, "dsize": 4096, "ino": 123},
            {"name": "file1_link.txt", "asize": 1000, "dsize": 4096, "ino": 123}
        ]);
        assert_eq!(size_of(dir), 4096);
    }

    #[test]
    fn test_empty_directory() {
        let node = convert_entry(&json!([{"name": "emptydir", "asize": 4096, "dsize": 4096}]), &mut HashSet::new()).unwrap();
        assert_eq!(node.size_bytes, 0);
        assert_eq!(node.children, Some(vec![]));
    }

    #[test]
    fn test_flags_become_annotations() {
        let node = convert_entry(&json!({"name": "proc", "excluded": "pattern", "asize": 1}), &mut HashSet::new()).unwrap();
        assert_eq!(node.size_bytes, 0);
        assert_eq!(node.annotations.get("excluded"), Some(&json!("pattern")));
        assert_eq!(node.annotations.get("asize"), Some(&json!(1)));
        assert!(node.annotations.get("name").is_none());
    }

    #[test]
    fn test_envelope_import() {
        let doc = json!({
            "architecture": "x86_64",
            "timestamp": "2026-10-18T03:00:00Z",
            "runner": "ubuntu-24.04",
            "total_disk_size": 100,
            "data": [1, 2, {"progname": "ncdu"}, [
                {"name": "/"},
                {"name": "a", "dsize": 10},
                [{"name": "b"}, {"name": "c", "dsize": 20}]
            ]]
        });
        let imported = import_ncdu(&serde_json::to_vec(&doc).unwrap()).unwrap();
        assert_eq!(imported.architecture.as_deref(), Some("x86_64"));
        assert_eq!(imported.root.name, "/");
        assert_eq!(imported.root.size_bytes, 30);
        assert_eq!(imported.root.annotations.get("runner"), Some(&json!("ubuntu-24.04")));
        assert!(imported.root.annotations.get("total_disk_size").is_none());
    }

    #[test]
    fn test_missing_root_is_format_error() {
        let err = import_ncdu(br#"[1, 2, {}]"#).unwrap_err();
        assert!(matches!(err, DiskReportError::Format(_)));
        let err = import_ncdu(br#"{"architecture": "x86_64"}"#).unwrap_err();
        assert!(matches!(err, DiskReportError::Format(_)));
    }

    #[test]
    fn test_import_file_then_summarize() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let input = dir.path().join("ncdu-export.json");
        std::fs::write(
            &input,
            r#"{"architecture":"arm64","runner":"r","timestamp":"2026-10-18T03:00:00Z","data":[1,2,{},[{"name":"/"},{"name":"a","dsize":5}]]}"#,
        )
        .unwrap();

        let output = import_ncdu_file(&input, None, None).unwrap();
        assert_eq!(output, dir.path().join("arm64.json"));

        let outcome = crate::summarize_file(&output, &Default::default()).unwrap();
        let metadata =
            disk_report_domain::SnapshotMetadata::from_slice(&std::fs::read(outcome.output).unwrap()).unwrap();
        assert_eq!(metadata.runner, "r");
        assert_eq!(metadata.total_size, 5);
    }
}
