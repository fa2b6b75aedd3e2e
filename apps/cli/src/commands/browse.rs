//! 浏览命令：各架构先只加载摘要（彼此并发），`--expand` 的路径才会触发完整树的拉取。

use std::path::PathBuf;

use clap::ArgMatches;
use disk_report_client::{render_entries, render_error, render_header, HttpSource, ReportSession};
use disk_report_common::{DiskReportError, ReportConfig};
use disk_report_domain::join_path;

pub async fn run(args: &ArgMatches, config: &ReportConfig) -> Result<bool, DiskReportError> {
    let architectures: Vec<String> = args
        .get_many::<String>("arch")
        .map(|v| v.cloned().collect())
        .unwrap_or_default();
    let expansions: Vec<Vec<String>> = args
        .get_many::<String>("expand")
        .map(|v| v.map(|raw| split_path(raw)).collect())
        .unwrap_or_default();

    let session = match args.get_one::<PathBuf>("dir") {
        Some(dir) => ReportSession::over_dir(dir, &architectures),
        None => {
            let base_url = args
                .get_one::<String>("base-url")
                .cloned()
                .or_else(|| config.base_url.clone())
                .ok_or_else(|| {
                    DiskReportError::Config("pass --base-url or --dir, or set DISK_REPORT_BASE_URL".into())
                })?;
            let client = HttpSource::build_client(config.request_timeout)?;
            ReportSession::over_http(&client, &base_url, &architectures)
        }
    };

    let rendered = futures::future::join_all(
        architectures
            .iter()
            .map(|arch| render_architecture(&session, arch, &expansions)),
    )
    .await;

    let mut all_ok = true;
    for (text, ok) in rendered {
        print!("{}", text);
        all_ok &= ok;
    }
    Ok(all_ok)
}

fn split_path(raw: &str) -> Vec<String> {
    raw.split('/').filter(|s| !s.is_empty()).map(str::to_string).collect()
}

/// 渲染一个架构；展开失败只在对应位置输出错误行，已渲染的摘要保留
async fn render_architecture(session: &ReportSession, arch: &str, expansions: &[Vec<String>]) -> (String, bool) {
    let view = match session.view(arch) {
        Ok(view) => view,
        Err(e) => return (render_error(arch, &e, 0), false),
    };
    let summary = match view.summary().await {
        Ok(summary) => summary,
        Err(e) => return (render_error(arch, &e, 0), false),
    };

    let mut out = format!("{}\n", render_header(&summary));
    out.push_str(&render_entries(&summary.top_entries, 1));

    let mut ok = true;
    for path in expansions {
        let label = join_path(path.as_slice());
        match view.expand(path.as_slice()).await {
            Ok(entries) => {
                out.push_str(&format!("  {}:\n", label));
                out.push_str(&render_entries(&entries, 2));
            }
            Err(e) => {
                out.push_str(&render_error(&label, &e, 1));
                ok = false;
            }
        }
    }
    log::debug!("[{}] final state {:?}", arch, view.state().await);
    (out, ok)
}
