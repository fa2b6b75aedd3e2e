use std::path::{Path, PathBuf};

use disk_report_common::DiskReportError;
use rayon::prelude::*;

use crate::filters::DocumentFilter;
use crate::summarizer::{summarize_file, ProvenanceOptions, SummaryOutcome};

/// 单个文档在批量运行中的结果
#[derive(Debug)]
pub struct DocumentReport {
    pub input: PathBuf,
    pub result: Result<SummaryOutcome, DiskReportError>,
}

/// 批量运行的汇总：逐个文档报告成功或失败，而不是整体失败
#[derive(Debug, Default)]
pub struct BatchReport {
    pub documents: Vec<DocumentReport>,
}

impl BatchReport {
    pub fn succeeded(&self) -> impl Iterator<Item = &SummaryOutcome> {
        self.documents.iter().filter_map(|d| d.result.as_ref().ok())
    }

    pub fn failed(&self) -> impl Iterator<Item = (&Path, &DiskReportError)> {
        self.documents
            .iter()
            .filter_map(|d| d.result.as_ref().err().map(|e| (d.input.as_path(), e)))
    }

    pub fn is_success(&self) -> bool {
        self.documents.iter().all(|d| d.result.is_ok())
    }
}

/// 列出目录下所有待处理的完整树文档，按路径排序
pub fn discover_documents(dir: &Path, filter: &DocumentFilter) -> Result<Vec<PathBuf>, DiskReportError> {
    if !dir.is_dir() {
        return Err(DiskReportError::Config(format!("data directory not found: {}", dir.display())));
    }
    let mut documents: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && filter.is_eligible(p))
        .collect();
    documents.sort();
    Ok(documents)
}

/// 并行处理每个文档，彼此独立：一个文档失败不影响其他文档
pub fn summarize_paths(paths: &[PathBuf], options: &ProvenanceOptions) -> BatchReport {
    let documents: Vec<DocumentReport> = paths
        .par_iter()
        .map(|input| {
            let result = summarize_file(input, options);
            if let Err(ref e) = result {
                log::error!("failed to summarize {}: {}", input.display(), e);
            }
            DocumentReport {
                input: input.clone(),
                result,
            }
        })
        .collect();
    BatchReport { documents }
}

/// 批量模式：发现目录下的全部文档并逐个生成摘要
pub fn summarize_dir(dir: &Path, options: &ProvenanceOptions) -> Result<BatchReport, DiskReportError> {
    let documents = discover_documents(dir, &DocumentFilter::default())?;
    if documents.is_empty() {
        log::warn!("no full-tree documents found in {}", dir.display());
    }
    Ok(summarize_paths(&documents, options))
}
