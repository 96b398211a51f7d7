// Report generation from a finished scan

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use tagsweep_scanner::result::PageAudit;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ReportFormat {
    Csv,
    Json,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "csv" => Some(ReportFormat::Csv),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Csv => "csv",
            ReportFormat::Json => "json",
        }
    }
}

/// One row of the tabular report. Placement flags are strings because a page
/// without containers reports `na` rather than a boolean.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    pub url: String,
    pub container_id: String,
    pub in_head: String,
    pub in_body: String,
}

/// Flatten the audits into report rows: one row per container record, and a
/// single `none,na,na` row for a page that was checked but had no container.
pub fn build_rows(audits: &[PageAudit]) -> Vec<ReportRow> {
    let mut rows = Vec::new();

    for audit in audits {
        if audit.containers.is_empty() {
            rows.push(ReportRow {
                url: audit.url.clone(),
                container_id: "none".to_string(),
                in_head: "na".to_string(),
                in_body: "na".to_string(),
            });
        } else {
            for container in &audit.containers {
                rows.push(ReportRow {
                    url: audit.url.clone(),
                    container_id: container.id.clone(),
                    in_head: container.in_head.to_string(),
                    in_body: container.in_body.to_string(),
                });
            }
        }
    }

    rows
}

/// Default report file name: the first input hostname with dots flattened,
/// e.g. `example_com-gtm-audit.csv`.
pub fn default_report_path(first_hostname: &str, format: &ReportFormat) -> PathBuf {
    let name_root = first_hostname.replace('.', "_");
    PathBuf::from(format!("{}-gtm-audit.{}", name_root, format.extension()))
}

pub fn write_csv_report(audits: &[PageAudit], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);

    writer.write_record(["url", "container_id", "in_head", "in_body"])?;
    for row in build_rows(audits) {
        writer.write_record([row.url, row.container_id, row.in_head, row.in_body])?;
    }

    writer.flush()?;
    Ok(())
}

pub fn generate_json_report(audits: &[PageAudit]) -> Result<String, serde_json::Error> {
    let rows = build_rows(audits);

    let json_report = serde_json::json!({
        "report": {
            "metadata": {
                "generator": "Tagsweep",
                "version": env!("CARGO_PKG_VERSION"),
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "format": "json"
            },
            "summary": {
                "total_pages": audits.len(),
                "pages_with_containers": audits.iter().filter(|a| !a.containers.is_empty()).count()
            },
            "pages": audits,
            "rows": rows
        }
    });

    serde_json::to_string_pretty(&json_report)
}

pub fn save_report(content: &str, path: &Path) -> io::Result<()> {
    std::fs::write(path, content)
}

pub fn write_report(
    audits: &[PageAudit],
    format: &ReportFormat,
    path: &Path,
) -> io::Result<()> {
    match format {
        ReportFormat::Csv => write_csv_report(audits, path),
        ReportFormat::Json => {
            let content = generate_json_report(audits)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            save_report(&content, path)
        }
    }
}
