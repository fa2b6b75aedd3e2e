use disk_report_common::DiskReportError;
use disk_report_domain::{SnapshotMetadata, TopEntry};

const UNITS: [&str; 5] = ["KiB", "MiB", "GiB", "TiB", "PiB"];

/// 人类可读的大小（二进制单位）
pub fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

/// 摘要的标题行
pub fn render_header(summary: &SnapshotMetadata) -> String {
    format!(
        "{} ({}, {}): {} in {} entries",
        summary.architecture,
        summary.runner,
        summary.timestamp.format("%Y-%m-%d %H:%M UTC"),
        format_size(summary.total_size),
        summary.total_entries
    )
}

/// 每个条目一行，`+` 表示可以继续展开
pub fn render_entries(entries: &[TopEntry], depth: usize) -> String {
    let indent = "  ".repeat(depth);
    entries
        .iter()
        .map(|e| {
            let marker = if e.has_children { '+' } else { ' ' };
            format!("{}{} {:>10}  {}\n", indent, marker, format_size(e.size_bytes), e.name)
        })
        .collect()
}

/// 展开失败时只在该子树位置显示错误，其余内容不受影响
pub fn render_error(path: &str, err: &DiskReportError, depth: usize) -> String {
    format!("{}! {}: {}\n", "  ".repeat(depth), path, err)
}
