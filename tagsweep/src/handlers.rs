use clap::ArgMatches;
use colored::Colorize;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use url::Url;

use tagsweep_core::report::{ReportFormat, default_report_path, write_report};

// Re-export scan types and functions from tagsweep-core
pub use tagsweep_core::crawl::{
    CrawlOptions, CrawlProgressCallback, CrawlRun, execute_crawl, extract_url_path,
    generate_crawl_summary,
};

// Helper functions for the scan handler

/// Collect the scope hostnames from either the positional arguments or a
/// hosts file
pub fn load_hostnames_from_source(
    hostnames: Vec<String>,
    hosts_file: Option<&PathBuf>,
) -> Result<Vec<String>, String> {
    if let Some(hosts_file_path) = hosts_file {
        load_hostnames_from_file(hosts_file_path)
    } else if !hostnames.is_empty() {
        let parsed: Vec<String> = hostnames
            .iter()
            .filter_map(|line| parse_hostname_line(line.trim()))
            .collect();

        if parsed.is_empty() {
            return Err("No valid hostnames were given".to_string());
        }
        Ok(parsed)
    } else {
        Err("Either HOSTNAMES or --hosts-file must be provided".to_string())
    }
}

/// Load and parse hostnames from a newline-delimited file
pub fn load_hostnames_from_file(path: &PathBuf) -> Result<Vec<String>, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read hosts file {}: {}", path.display(), e))?;

    let hostnames: Vec<String> = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| parse_hostname_line(line.trim()))
        .collect();

    if hostnames.is_empty() {
        return Err(format!("No valid hostnames found in {}", path.display()));
    }

    Ok(hostnames)
}

/// Parse a single line as a hostname, tolerating full URLs by keeping just
/// their host
pub fn parse_hostname_line(line: &str) -> Option<String> {
    let probe = if line.contains("://") {
        line.to_string()
    } else {
        format!("https://{}/", line)
    };

    match Url::parse(&probe)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
    {
        Some(host) => Some(host),
        None => {
            eprintln!("⚠️  Skipping invalid hostname '{}'", line);
            None
        }
    }
}

pub async fn handle_scan(sub_matches: &ArgMatches) {
    // Initialize tracing for logging
    tracing_subscriber::fmt::init();

    let positional: Vec<String> = sub_matches
        .get_many::<String>("HOSTNAMES")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();
    let hosts_file = sub_matches.get_one::<PathBuf>("hosts-file");
    let threads = *sub_matches.get_one::<usize>("threads").unwrap_or(&10);
    let max_delay_ms = *sub_matches.get_one::<u64>("delay").unwrap_or(&0);
    let no_progress = sub_matches.get_flag("no-progress");
    let format_name = sub_matches
        .get_one::<String>("format")
        .map(String::as_str)
        .unwrap_or("csv");
    let output = sub_matches.get_one::<PathBuf>("output");

    // Resolve the scope
    let hostnames = match load_hostnames_from_source(positional, hosts_file) {
        Ok(hostnames) => hostnames,
        Err(e) => {
            eprintln!("✗ {}", e);
            std::process::exit(1);
        }
    };

    let format = ReportFormat::from_str(format_name).unwrap_or(ReportFormat::Csv);

    // Print scan configuration
    println!("\n🏷️  Auditing {} host(s)", hostnames.len());
    println!("Workers: {}", threads);
    if max_delay_ms > 0 {
        println!("Request jitter: up to {} ms", max_delay_ms);
    }
    println!("Scope: {}\n", hostnames.join(", "));

    let options = CrawlOptions {
        hostnames: hostnames.clone(),
        threads,
        max_delay_ms,
        show_progress_bars: !no_progress,
    };

    let progress_callback: CrawlProgressCallback = Arc::new(|msg: String| {
        println!("{}", msg);
    });

    let run = match execute_crawl(options, Some(progress_callback)).await {
        Ok(run) => run,
        Err(e) => {
            eprintln!("✗ {}", e);
            std::process::exit(1);
        }
    };

    println!("\n{} Scan complete!\n", "✓".green().bold());
    print!("{}", generate_crawl_summary(&run));

    // Write the tabular report, named after the first hostname unless
    // overridden
    let report_path = output
        .cloned()
        .unwrap_or_else(|| default_report_path(&hostnames[0], &format));

    match write_report(&run.audits, &format, &report_path) {
        Ok(()) => {
            println!(
                "{} Report written to {}",
                "✓".green().bold(),
                report_path.display().to_string().bright_white()
            );
        }
        Err(e) => {
            eprintln!("✗ Failed to write report: {}", e);
            std::process::exit(1);
        }
    }
}
