pub mod browse;
pub mod import;
pub mod summarize;

use std::path::PathBuf;

use clap::{value_parser, Arg, ArgAction, Command};

pub fn cli() -> Command {
    Command::new("disk-report")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Summarize disk-usage snapshots and browse them level by level")
        .after_help("Without a subcommand, every full-tree document in the data directory is summarized.")
        .subcommand(
            Command::new("summarize")
                .about("Write <name>-metadata.json next to each <name>.json full-tree document")
                .arg(
                    Arg::new("files")
                        .num_args(0..)
                        .value_parser(value_parser!(PathBuf))
                        .help("Full-tree documents; defaults to every eligible document in the data directory"),
                )
                .arg(
                    Arg::new("data-dir")
                        .long("data-dir")
                        .value_parser(value_parser!(PathBuf))
                        .help("Directory searched when no files are given [env: DISK_REPORT_DATA_DIR]"),
                )
                .arg(
                    Arg::new("architecture")
                        .long("architecture")
                        .help("Architecture recorded in the summary (single input only); defaults to the file stem. The output file is always named after the input"),
                )
                .arg(
                    Arg::new("runner")
                        .long("runner")
                        .help("Execution environment that produced the scan [env: DISK_REPORT_RUNNER]"),
                )
                .arg(
                    Arg::new("timestamp")
                        .long("timestamp")
                        .help("Capture time as RFC 3339; defaults to the document's annotation or modification time"),
                ),
        )
        .subcommand(
            Command::new("import-ncdu")
                .about("Convert an ncdu JSON export into a full-tree document")
                .arg(
                    Arg::new("input")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("ncdu export, bare or wrapped in an envelope with a data field"),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .value_parser(value_parser!(PathBuf))
                        .help("Output path; defaults to <architecture>.json next to the input"),
                )
                .arg(
                    Arg::new("architecture")
                        .long("architecture")
                        .help("Architecture used for the default output name"),
                ),
        )
        .subcommand(
            Command::new("browse")
                .about("Load summaries and expand subtrees on demand")
                .arg(
                    Arg::new("arch")
                        .long("arch")
                        .required(true)
                        .action(ArgAction::Append)
                        .help("Architecture to load; repeat for several"),
                )
                .arg(
                    Arg::new("base-url")
                        .long("base-url")
                        .conflicts_with("dir")
                        .help("Published data URL [env: DISK_REPORT_BASE_URL]"),
                )
                .arg(
                    Arg::new("dir")
                        .long("dir")
                        .value_parser(value_parser!(PathBuf))
                        .help("Read the published documents from a local directory instead"),
                )
                .arg(
                    Arg::new("expand")
                        .long("expand")
                        .action(ArgAction::Append)
                        .help("Slash-separated path below the root to expand, e.g. usr/lib"),
                ),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        cli().debug_assert();
    }

    #[test]
    fn test_browse_collects_repeated_args() {
        let matches = cli()
            .try_get_matches_from(["disk-report", "browse", "--arch", "x86_64", "--arch", "arm64", "--expand", "usr/lib"])
            .unwrap();
        let (_, args) = matches.subcommand().unwrap();
        let archs: Vec<_> = args.get_many::<String>("arch").unwrap().cloned().collect();
        assert_eq!(archs, vec!["x86_64", "arm64"]);
    }

    #[test]
    fn test_base_url_conflicts_with_dir() {
        let res = cli().try_get_matches_from([
            "disk-report", "browse", "--arch", "x86_64", "--dir", "out", "--base-url", "http://x",
        ]);
        assert!(res.is_err());
    }
}
