//! 摘要命令：给定文件时逐个处理，否则扫描数据目录。每个文档单独报告结果，全部尝试完才决定退出码。

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::ArgMatches;
use disk_report_common::{DiskReportError, ReportConfig};
use disk_report_summarizer::{summarize_dir, summarize_paths, BatchReport, ProvenanceOptions};

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, DiskReportError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| DiskReportError::Config(format!("invalid --timestamp {:?}: {}", raw, e)))
}

pub async fn run(args: &ArgMatches, config: &ReportConfig) -> Result<bool, DiskReportError> {
    let files: Vec<PathBuf> = args
        .get_many::<PathBuf>("files")
        .map(|v| v.cloned().collect())
        .unwrap_or_default();
    let architecture = args.get_one::<String>("architecture").cloned();
    if architecture.is_some() && files.len() != 1 {
        return Err(DiskReportError::Config("--architecture applies to exactly one input file".into()));
    }

    let options = ProvenanceOptions {
        architecture,
        runner: args.get_one::<String>("runner").cloned().or_else(|| config.runner.clone()),
        timestamp: args.get_one::<String>("timestamp").map(|raw| parse_timestamp(raw)).transpose()?,
    };
    let data_dir = args
        .get_one::<PathBuf>("data-dir")
        .cloned()
        .unwrap_or_else(|| config.data_dir.clone());

    execute(files, data_dir, options).await
}

pub async fn run_batch(config: &ReportConfig) -> Result<bool, DiskReportError> {
    let options = ProvenanceOptions {
        runner: config.runner.clone(),
        ..Default::default()
    };
    execute(Vec::new(), config.data_dir.clone(), options).await
}

async fn execute(files: Vec<PathBuf>, data_dir: PathBuf, options: ProvenanceOptions) -> Result<bool, DiskReportError> {
    let report = tokio::task::spawn_blocking(move || {
        if files.is_empty() {
            log::info!("summarizing every document in {}", data_dir.display());
            summarize_dir(&data_dir, &options)
        } else {
            Ok(summarize_paths(&files, &options))
        }
    })
    .await
    .map_err(|e| DiskReportError::Io(std::io::Error::other(e)))??;

    print_report(&report);
    Ok(!report.documents.is_empty() && report.is_success())
}

fn print_report(report: &BatchReport) {
    for doc in &report.documents {
        match &doc.result {
            Ok(outcome) => {
                println!("Generated {}", outcome.output.display());
                println!(
                    "  Size: {} -> {} bytes ({:.1}% reduction)",
                    outcome.input_bytes,
                    outcome.output_bytes,
                    outcome.reduction_percent()
                );
            }
            Err(e) => println!("Failed {}: {}", doc.input.display(), e),
        }
    }

    let ok = report.succeeded().count();
    if report.documents.is_empty() {
        println!("No full-tree documents found to process");
    } else if ok == report.documents.len() {
        println!("\nSuccessfully generated {} metadata files", ok);
    } else {
        println!("\nGenerated {} of {} metadata files", ok, report.documents.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp() {
        let ts = parse_timestamp("2026-10-18T05:00:00+02:00").unwrap();
        assert_eq!(ts.to_rfc3339(), "2026-10-18T03:00:00+00:00");
        assert!(matches!(parse_timestamp("yesterday"), Err(DiskReportError::Config(_))));
    }
}
