use std::path::PathBuf;

use clap::ArgMatches;
use disk_report_common::DiskReportError;
use disk_report_summarizer::import_ncdu_file;

pub async fn run(args: &ArgMatches) -> Result<bool, DiskReportError> {
    let input = args
        .get_one::<PathBuf>("input")
        .cloned()
        .ok_or_else(|| DiskReportError::Config("missing input path".into()))?;
    let output = args.get_one::<PathBuf>("output").cloned();
    let architecture = args.get_one::<String>("architecture").cloned();

    let written = tokio::task::spawn_blocking(move || {
        import_ncdu_file(&input, output.as_deref(), architecture.as_deref())
    })
    .await
    .map_err(|e| DiskReportError::Io(std::io::Error::other(e)))??;

    println!("Imported {}", written.display());
    Ok(true)
}
