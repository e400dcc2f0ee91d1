use crate::error::{ReportError, Result};
use crate::types::{NationalPreviewRow, Report};
use crate::util::{format_int, format_number};
use chrono::NaiveDate;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tabled::{settings::Style, Table};
use tracing::info;

const PROMPT_PREAMBLE: &str = "\
Based on the institutional statistics below, write a formal, technical and strategic analytical report.

Highlight:
- National trends
- Growth or decline
- Standout regions
- Structural alerts
- Strategic recommendations
";

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| ReportError::Io {
            path: parent.display().to_string(),
            source,
        })?;
    }
    fs::write(path, contents).map_err(|source| ReportError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Pretty-printed JSON. serde_json writes UTF-8 and leaves non-ASCII
/// characters unescaped.
pub fn render_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let s = render_json(value)?;
    write_file(path, &s)?;
    info!(path = %path.display(), bytes = s.len(), "wrote report");
    Ok(())
}

/// Narrative prompt: fixed preamble, generation date, then the report JSON
/// verbatim.
pub fn render_prompt(report: &Report, generated_on: NaiveDate) -> Result<String> {
    let data = render_json(report)?;
    Ok(format!(
        "{}\nGenerated on: {}\n\nData:\n{}\n",
        PROMPT_PREAMBLE,
        generated_on.format("%Y-%m-%d"),
        data
    ))
}

pub fn write_prompt(path: &Path, report: &Report, generated_on: NaiveDate) -> Result<()> {
    let prompt = render_prompt(report, generated_on)?;
    write_file(path, &prompt)?;
    info!(path = %path.display(), "wrote narrative prompt");
    Ok(())
}

pub fn national_preview(report: &Report) -> Vec<NationalPreviewRow> {
    report
        .iter()
        .map(|(year, entry)| NationalPreviewRow {
            year: *year,
            members: entry
                .national
                .as_ref()
                .map(|n| format_int(n.total_members))
                .unwrap_or_else(|| "-".to_string()),
            contribution: entry
                .national
                .as_ref()
                .map(|n| format_number(n.total_contribution, 2))
                .unwrap_or_else(|| "-".to_string()),
            member_growth: entry
                .national_growth
                .members_pct
                .map(|g| format!("{}%", format_number(g, 2)))
                .unwrap_or_else(|| "-".to_string()),
            classification: entry
                .national_classification
                .map(|c| c.label().to_string())
                .unwrap_or_else(|| "-".to_string()),
            regions: entry.regions.len(),
            alerts: entry.national_alerts.len(),
        })
        .collect()
}

/// Markdown table of the national series, capped at `max_rows` years.
pub fn render_national_preview(report: &Report, max_rows: usize) -> String {
    let mut rows = national_preview(report);
    rows.truncate(max_rows);
    if rows.is_empty() {
        return "(no reference years)".to_string();
    }
    Table::new(rows).with(Style::markdown()).to_string()
}
