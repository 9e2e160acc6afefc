//! Table and JSON output formatting

use colored::Colorize;
use guestlog_core::{LogDetails, LogStatus};
use serde::Serialize;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

/// Global flag for JSON output mode
static JSON_MODE: AtomicBool = AtomicBool::new(false);

pub fn set_json_mode(enabled: bool) {
    JSON_MODE.store(enabled, Ordering::SeqCst);
}

pub fn is_json_mode() -> bool {
    JSON_MODE.load(Ordering::SeqCst)
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing to JSON: {}", e),
    }
}

#[derive(Tabled)]
pub struct LogRow {
    #[tabled(rename = "name")]
    pub name: String,
    #[tabled(rename = "type")]
    pub log_type: String,
    #[tabled(rename = "status")]
    pub status: String,
    #[tabled(rename = "published")]
    pub published: String,
    #[tabled(rename = "pending")]
    pub pending: String,
    #[tabled(rename = "container")]
    pub container: String,
}

impl From<&LogDetails> for LogRow {
    fn from(details: &LogDetails) -> Self {
        LogRow {
            name: details.name.clone(),
            log_type: details.log_type.to_string(),
            status: format_status(details.status),
            published: format_bytes(details.published),
            pending: format_bytes(details.pending),
            container: details.container.clone(),
        }
    }
}

pub fn print_log_table(logs: &[LogDetails]) {
    if is_json_mode() {
        print_json(logs);
        return;
    }

    if logs.is_empty() {
        println!("No guest logs");
        return;
    }

    let rows: Vec<LogRow> = logs.iter().map(LogRow::from).collect();

    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(3..5)).with(Alignment::right()))
        .to_string();

    println!("{}", table);
}

pub fn print_log_detail(details: &LogDetails) {
    if is_json_mode() {
        print_json(details);
        return;
    }

    println!("{}", "─".repeat(50));
    println!("  {} │ {}", "Name".bold(), details.name);
    println!("  {} │ {}", "Type".bold(), details.log_type);
    println!("  {} │ {}", "Status".bold(), format_status(details.status));
    println!("  {} │ {}", "Published".bold(), format_bytes(details.published));
    println!("  {} │ {}", "Pending".bold(), format_bytes(details.pending));
    println!("{}", "─".repeat(50));
    println!("  {} │ {}", "Container".bold(), details.container);
    println!("  {} │ {}", "Prefix".bold(), details.prefix);
    println!("  {} │ {}", "Metafile".bold(), details.metafile);
    println!("{}", "─".repeat(50));
}

#[derive(Serialize)]
struct PathJson<'a> {
    path: &'a Path,
}

pub fn print_path(path: &Path) {
    if is_json_mode() {
        print_json(&PathJson { path });
        return;
    }
    println!("{}", path.display());
}

fn format_status(status: LogStatus) -> String {
    match status {
        LogStatus::Enabled => status.as_str().green().to_string(),
        LogStatus::Disabled => status.as_str().dimmed().to_string(),
        LogStatus::Published => status.as_str().cyan().to_string(),
        LogStatus::Partial => status.as_str().yellow().to_string(),
        LogStatus::RestartRequired => status.as_str().red().bold().to_string(),
        LogStatus::RestartCompleted => status.as_str().green().bold().to_string(),
    }
}

pub fn format_bytes(bytes: u64) -> String {
    if bytes >= 1_073_741_824 {
        format!("{:.1}G", bytes as f64 / 1_073_741_824.0)
    } else if bytes >= 1_048_576 {
        format!("{:.1}M", bytes as f64 / 1_048_576.0)
    } else if bytes >= 1024 {
        format!("{:.0}K", bytes as f64 / 1024.0)
    } else {
        format!("{}B", bytes)
    }
}

pub fn print_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red(), message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use guestlog_core::LogType;

    fn details() -> LogDetails {
        LogDetails {
            name: "general".to_string(),
            log_type: LogType::User,
            status: LogStatus::RestartRequired,
            prefix: "inst/mysql-general".to_string(),
            container: "n/a".to_string(),
            published: 2048,
            pending: 512,
            metafile: "inst/mysql-general_metafile".to_string(),
        }
    }

    #[test]
    fn test_json_mode_toggle() {
        set_json_mode(true);
        assert!(is_json_mode());
        set_json_mode(false);
        assert!(!is_json_mode());
    }

    #[test]
    fn test_log_row_from_details() {
        colored::control::set_override(false);
        let row = LogRow::from(&details());

        assert_eq!(row.name, "general");
        assert_eq!(row.log_type, "USER");
        assert_eq!(row.status, "Restart_Required");
        assert_eq!(row.published, "2K");
        assert_eq!(row.pending, "512B");
        assert_eq!(row.container, "n/a");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0B");
        assert_eq!(format_bytes(512), "512B");
        assert_eq!(format_bytes(1024), "1K");
        assert_eq!(format_bytes(64 * 1024 * 1024), "64.0M");
        assert_eq!(format_bytes(1024 * 1024 * 1024), "1.0G");
    }
}
