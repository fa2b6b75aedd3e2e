mod commands;

use std::process::ExitCode;

use disk_report_common::{init_logging, ReportConfig};

#[tokio::main]
async fn main() -> ExitCode {
    // .env 可选
    let _ = dotenvy::dotenv();
    init_logging();

    let config = match ReportConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}", e);
            return ExitCode::from(2);
        }
    };

    let matches = commands::cli().get_matches();
    let result = match matches.subcommand() {
        Some(("summarize", args)) => commands::summarize::run(args, &config).await,
        Some(("import-ncdu", args)) => commands::import::run(args).await,
        Some(("browse", args)) => commands::browse::run(args, &config).await,
        // 不带参数时：批量处理数据目录
        _ => commands::summarize::run_batch(&config).await,
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            log::error!("{}", e);
            ExitCode::from(2)
        }
    }
}
