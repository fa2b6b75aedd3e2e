//! 单个架构的懒加载状态机。
//!
//! 先只拉取小的摘要文档；第一次需要第二层及以下的数据时才拉取完整树，
//! 之后整个会话都复用内存中的这一份解析结果。状态放在异步互斥锁里，并且在拉取期间一直持有，
//! 所以同一架构的并发展开会等待正在进行的那次拉取，而不会重复请求。

use std::sync::Arc;

use disk_report_common::DiskReportError;
use disk_report_domain::{join_path, DiskNode, SnapshotMetadata, TopEntry};
use tokio::sync::Mutex;

use crate::source::TreeSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStage {
    Summary,
    Full,
}

/// 失败的拉取：哪一步失败，以及可以直接展示给用户的信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadFailure {
    pub stage: FetchStage,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Unloaded,
    SummaryLoaded,
    FullLoaded,
    Error(LoadFailure),
}

#[derive(Default)]
struct ViewState {
    summary: Option<Arc<SnapshotMetadata>>,
    full: Option<Arc<DiskNode>>,
    // 出错不清空已加载的内容，重试成功后清除
    failure: Option<LoadFailure>,
}

impl ViewState {
    async fn ensure_summary(&mut self, source: &dyn TreeSource) -> Result<Arc<SnapshotMetadata>, DiskReportError> {
        if let Some(summary) = &self.summary {
            return Ok(summary.clone());
        }
        match source.fetch_summary().await {
            Ok(summary) => {
                log::info!(
                    "[{}] summary loaded: {} top-level entries, total {} bytes",
                    source.architecture(),
                    summary.total_entries,
                    summary.total_size
                );
                let summary = Arc::new(summary);
                self.summary = Some(summary.clone());
                self.failure = None;
                Ok(summary)
            }
            Err(e) => Err(self.record_failure(source, FetchStage::Summary, e)),
        }
    }

    async fn ensure_full(&mut self, source: &dyn TreeSource) -> Result<Arc<DiskNode>, DiskReportError> {
        if let Some(full) = &self.full {
            log::debug!("[{}] full tree served from cache", source.architecture());
            return Ok(full.clone());
        }
        match source.fetch_full().await {
            Ok(root) => {
                log::info!("[{}] full tree loaded, root size {} bytes", source.architecture(), root.size_bytes);
                let root = Arc::new(root);
                self.full = Some(root.clone());
                self.failure = None;
                Ok(root)
            }
            Err(e) => Err(self.record_failure(source, FetchStage::Full, e)),
        }
    }

    fn record_failure(&mut self, source: &dyn TreeSource, stage: FetchStage, e: DiskReportError) -> DiskReportError {
        log::warn!("[{}] {:?} fetch failed: {}", source.architecture(), stage, e);
        self.failure = Some(LoadFailure {
            stage,
            message: e.to_string(),
        });
        e
    }
}

pub struct ArchitectureView {
    source: Arc<dyn TreeSource>,
    state: Mutex<ViewState>,
}

impl ArchitectureView {
    pub fn new(source: Arc<dyn TreeSource>) -> Self {
        Self {
            source,
            state: Mutex::new(ViewState::default()),
        }
    }

    pub fn architecture(&self) -> &str {
        self.source.architecture()
    }

    pub async fn state(&self) -> LoadState {
        let state = self.state.lock().await;
        if let Some(failure) = &state.failure {
            LoadState::Error(failure.clone())
        } else if state.full.is_some() {
            LoadState::FullLoaded
        } else if state.summary.is_some() {
            LoadState::SummaryLoaded
        } else {
            LoadState::Unloaded
        }
    }

    /// 摘要；尚未加载时拉取一次，失败后再次调用即为重试
    pub async fn summary(&self) -> Result<Arc<SnapshotMetadata>, DiskReportError> {
        let mut state = self.state.lock().await;
        state.ensure_summary(self.source.as_ref()).await
    }

    /// 完整树；整个会话最多成功拉取一次
    pub async fn full_tree(&self) -> Result<Arc<DiskNode>, DiskReportError> {
        let mut state = self.state.lock().await;
        state.ensure_full(self.source.as_ref()).await
    }

    /// 展开 `path` 指向的节点，返回其子条目（按大小降序）。
    ///
    /// 空路径返回顶层条目，只需要摘要。摘要标记为没有子项的顶层条目直接返回空列表，
    /// 不会触发完整树的拉取。路径未命中返回 `NotFound`，只影响这一次展开。
    pub async fn expand<S: AsRef<str> + Sync>(&self, path: &[S]) -> Result<Vec<TopEntry>, DiskReportError> {
        let mut state = self.state.lock().await;
        let summary = state.ensure_summary(self.source.as_ref()).await?;

        let Some(first) = path.first() else {
            return Ok(summary.top_entries.clone());
        };
        let top = summary
            .entry(first.as_ref())
            .ok_or_else(|| DiskReportError::NotFound(join_path(&path[..1])))?;
        if !top.has_children {
            if path.len() == 1 {
                return Ok(Vec::new());
            }
            return Err(DiskReportError::NotFound(format!(
                "{} is a leaf, cannot descend into {:?}",
                top.name,
                path[1].as_ref()
            )));
        }

        let full = state.ensure_full(self.source.as_ref()).await?;
        drop(state);
        Ok(full.resolve(path)?.sorted_entries())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};

    struct StaticSource;

    #[async_trait]
    impl TreeSource for StaticSource {
        fn architecture(&self) -> &str {
            "x86_64"
        }

        async fn fetch_summary(&self) -> Result<SnapshotMetadata, DiskReportError> {
            Ok(SnapshotMetadata {
                architecture: "x86_64".into(),
                timestamp: Utc.with_ymd_and_hms(2026, 10, 18, 3, 0, 0).unwrap(),
                runner: "ubuntu-24.04".into(),
                total_size: 10,
                top_entries: vec![TopEntry { size_bytes: 10, name: "etc".into(), has_children: false }],
                total_entries: 1,
            })
        }

        async fn fetch_full(&self) -> Result<DiskNode, DiskReportError> {
            Err(DiskReportError::Fetch("no full document".into()))
        }
    }

    #[tokio::test]
    async fn test_initial_state_is_unloaded() {
        let view = ArchitectureView::new(Arc::new(StaticSource));
        assert_eq!(view.state().await, LoadState::Unloaded);
        assert_eq!(view.architecture(), "x86_64");
    }

    #[tokio::test]
    async fn test_empty_path_lists_top_level() {
        let view = ArchitectureView::new(Arc::new(StaticSource));
        let entries = view.expand::<&str>(&[]).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(view.state().await, LoadState::SummaryLoaded);
    }

    #[tokio::test]
    async fn test_full_failure_reports_stage() {
        let view = ArchitectureView::new(Arc::new(StaticSource));
        view.summary().await.unwrap();
        assert!(view.full_tree().await.is_err());
        match view.state().await {
            LoadState::Error(failure) => {
                assert_eq!(failure.stage, FetchStage::Full);
                assert!(failure.message.contains("no full document"));
            }
            other => panic!("unexpected state: {other:?}"),
        }
    }
}
