use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tagsweep_scanner::result::PageAudit;
use tagsweep_scanner::{Crawler, ProgressCallback};
use url::Url;

/// Options for configuring a scan run
pub struct CrawlOptions {
    pub hostnames: Vec<String>,
    pub threads: usize,
    /// Upper bound of the random pause before each request, in milliseconds.
    /// Zero disables the pause.
    pub max_delay_ms: u64,
    pub show_progress_bars: bool,
}

/// Callback for reporting scan progress messages
pub type CrawlProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Everything a finished scan produced
pub struct CrawlRun {
    pub audits: Vec<PageAudit>,
    pub checked: usize,
    pub errored: usize,
    pub errored_urls: Vec<String>,
}

/// Extract the path component from a URL
pub fn extract_url_path(url: &str) -> String {
    Url::parse(url)
        .ok()
        .map(|u| {
            let path = u.path().to_string();
            if path.is_empty() || path == "/" {
                "/".to_string()
            } else {
                path
            }
        })
        .unwrap_or_else(|| url.to_string())
}

/// Execute a scan with the given options.
/// Returns the audits plus the frontier's final accounting.
pub async fn execute_crawl(
    options: CrawlOptions,
    progress_callback: Option<CrawlProgressCallback>,
) -> Result<CrawlRun, String> {
    let CrawlOptions {
        hostnames,
        threads,
        max_delay_ms,
        show_progress_bars,
    } = options;

    if let Some(ref callback) = progress_callback {
        callback(format!("Scanning {} hostname(s)", hostnames.len()));
    }

    // Single spinner for overall progress (only if enabled)
    let progress_bar = if show_progress_bars {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap(),
        );
        pb.set_message("Starting scan...");
        Some(Arc::new(pb))
    } else {
        None
    };

    let processed_count = Arc::new(AtomicUsize::new(0));

    let internal_progress_callback: ProgressCallback = if show_progress_bars {
        let pb_clone = progress_bar.clone().unwrap();
        let count_clone = processed_count.clone();
        Arc::new(move |_worker_id: usize, url: String| {
            let count = count_clone.fetch_add(1, Ordering::Relaxed) + 1;
            pb_clone.set_message(format!(
                "Checking {} ({} URLs processed)",
                extract_url_path(&url),
                count
            ));
            pb_clone.tick();
        })
    } else {
        Arc::new(|_worker_id: usize, _url: String| {})
    };

    let crawler = Crawler::new(hostnames)
        .with_request_jitter(max_delay_ms)
        .with_progress_callback(internal_progress_callback);

    let audits = crawler
        .crawl(threads)
        .await
        .map_err(|e| format!("Scan failed: {}", e))?;

    let checked = crawler.get_checked_count().await;
    let errored = crawler.get_errored_count().await;
    let errored_urls = crawler.get_errored_urls().await;

    if let Some(ref pb) = progress_bar {
        let total = processed_count.load(Ordering::Relaxed);
        pb.finish_with_message(format!("Scan complete! {} URLs processed", total));
    }

    Ok(CrawlRun {
        audits,
        checked,
        errored,
        errored_urls,
    })
}

fn placement_label(in_head: bool, in_body: bool) -> &'static str {
    match (in_head, in_body) {
        (true, true) => "head+noscript",
        (true, false) => "head only",
        (false, true) => "noscript only",
        (false, false) => "unplaced",
    }
}

/// Generate a terminal summary from a finished run
pub fn generate_crawl_summary(run: &CrawlRun) -> String {
    let mut report = String::new();
    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");
    report.push_str("# Summary:\n");
    report.push_str(&format!("  Pages checked: {}\n", run.checked));
    report.push_str(&format!("  Pages errored: {}\n", run.errored));

    let tagged = run
        .audits
        .iter()
        .filter(|a| !a.containers.is_empty())
        .count();
    report.push_str(&format!("  Pages with containers: {}\n", tagged));

    let mut distinct_ids: Vec<&str> = Vec::new();
    for audit in &run.audits {
        for container in &audit.containers {
            if !distinct_ids.contains(&container.id.as_str()) {
                distinct_ids.push(&container.id);
            }
        }
    }
    report.push_str(&format!("  Distinct containers: {}\n", distinct_ids.len()));

    report.push_str("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");

    // Group audits by host
    let mut by_host: HashMap<String, Vec<&PageAudit>> = HashMap::new();
    for audit in &run.audits {
        if let Ok(url) = Url::parse(&audit.url)
            && let Some(host) = url.host_str()
        {
            by_host.entry(host.to_string()).or_default().push(audit);
        }
    }

    let mut hosts: Vec<&String> = by_host.keys().collect();
    hosts.sort();

    for host in hosts {
        let host_audits = &by_host[host];
        report.push_str(&format!("## {}\n", host));
        report.push_str(&format!("  {} page(s) checked\n\n", host_audits.len()));

        for audit in host_audits {
            let path = extract_url_path(&audit.url);
            if audit.containers.is_empty() {
                report.push_str(&format!("  {} \x1b[90mnone\x1b[0m\n", path));
            } else {
                for container in &audit.containers {
                    report.push_str(&format!(
                        "  {} \x1b[32m{}\x1b[0m ({})\n",
                        path,
                        container.id,
                        placement_label(container.in_head, container.in_body)
                    ));
                }
            }
        }
        report.push('\n');
    }

    if !run.errored_urls.is_empty() {
        report.push_str("## Unreachable or non-HTML\n");
        for url in &run.errored_urls {
            report.push_str(&format!("  \x1b[33m{}\x1b[0m\n", url));
        }
        report.push('\n');
    }

    report
}
