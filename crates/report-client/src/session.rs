use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use disk_report_common::DiskReportError;

use crate::source::{DirSource, HttpSource, TreeSource};
use crate::view::ArchitectureView;

/// 一次浏览会话：每个架构一个互相独立的视图，创建时都处于 Unloaded，不会提前拉取
pub struct ReportSession {
    views: BTreeMap<String, Arc<ArchitectureView>>,
}

impl ReportSession {
    pub fn new(sources: impl IntoIterator<Item = Arc<dyn TreeSource>>) -> Self {
        let views = sources
            .into_iter()
            .map(|source| (source.architecture().to_string(), Arc::new(ArchitectureView::new(source))))
            .collect();
        Self { views }
    }

    pub fn over_http(client: &reqwest::Client, base_url: &str, architectures: &[String]) -> Self {
        Self::new(architectures.iter().map(|arch| {
            Arc::new(HttpSource::new(client.clone(), base_url, arch)) as Arc<dyn TreeSource>
        }))
    }

    pub fn over_dir(dir: &Path, architectures: &[String]) -> Self {
        Self::new(
            architectures
                .iter()
                .map(|arch| Arc::new(DirSource::new(dir, arch)) as Arc<dyn TreeSource>),
        )
    }

    pub fn architectures(&self) -> impl Iterator<Item = &str> {
        self.views.keys().map(String::as_str)
    }

    pub fn view(&self, architecture: &str) -> Result<Arc<ArchitectureView>, DiskReportError> {
        self.views
            .get(architecture)
            .cloned()
            .ok_or_else(|| DiskReportError::NotFound(format!("unknown architecture {:?}", architecture)))
    }
}
