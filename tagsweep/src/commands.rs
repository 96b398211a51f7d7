use crate::CLAP_STYLING;
use clap::{arg, command};

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("tagsweep")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("tagsweep")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .subcommand_required(false)
        .subcommand(
            command!("scan")
                .about(
                    "Crawl one or more hostnames and audit every reachable page for Google \
                Tag Manager containers. The crawl never leaves the listed hosts.",
                )
                .arg(
                    arg!([HOSTNAMES])
                        .num_args(1..)
                        .required(false)
                        .help("Hostnames to audit, e.g. example.com www.example.com")
                        .conflicts_with("hosts-file"),
                )
                .arg(
                    arg!(-H --"hosts-file" <PATH>)
                        .required(false)
                        .help("Path to a newline-delimited file of hostnames to audit")
                        .value_parser(clap::value_parser!(std::path::PathBuf))
                        .conflicts_with("HOSTNAMES"),
                )
                .arg(
                    arg!(-t --"threads" <NUM_WORKERS>)
                        .required(false)
                        .help("The number of async worker 'threads' in the worker pool.")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("10"),
                )
                .arg(
                    arg!(--"delay" <MILLISECONDS>)
                        .required(false)
                        .help(
                            "Upper bound of the random pause before each request, to stay \
                        under rate limits (default: no pause)",
                        )
                        .value_parser(clap::value_parser!(u64))
                        .default_value("0"),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Save the report to this path (default: named after the first hostname)")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Report format: csv, json")
                        .value_parser(["csv", "json"])
                        .default_value("csv"),
                )
                .arg(
                    arg!(--"no-progress")
                        .required(false)
                        .help("Disable the progress spinner")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
}
