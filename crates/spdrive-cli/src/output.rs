//! Output formatting for the CLI

use spdrive_core::domain::report::BatchReport;
use spdrive_core::ports::{IProgressObserver, NullProgressObserver, ProgressEvent};

/// Output format selector
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Human,
    Json,
}

/// Trait for formatting CLI output
pub trait OutputFormatter {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
    fn info(&self, message: &str);
    fn print_json(&self, value: &serde_json::Value);
}

/// Human-readable output formatter with checkmarks and indentation
pub struct HumanFormatter;

impl OutputFormatter for HumanFormatter {
    fn success(&self, message: &str) {
        println!("\u{2713} {}", message);
    }
    fn error(&self, message: &str) {
        eprintln!("\u{2717} Error: {}", message);
    }
    fn info(&self, message: &str) {
        println!("  {}", message);
    }
    fn print_json(&self, _value: &serde_json::Value) {
        // Human formatter doesn't print JSON
    }
}

/// JSON output formatter
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn success(&self, message: &str) {
        println!(
            "{}",
            serde_json::json!({"success": true, "message": message})
        );
    }
    fn error(&self, message: &str) {
        eprintln!(
            "{}",
            serde_json::json!({"success": false, "error": message})
        );
    }
    fn info(&self, _message: &str) {}
    fn print_json(&self, value: &serde_json::Value) {
        println!(
            "{}",
            serde_json::to_string_pretty(value).unwrap_or_default()
        );
    }
}

pub fn get_formatter(json: bool) -> Box<dyn OutputFormatter> {
    if json {
        Box::new(JsonFormatter)
    } else {
        Box::new(HumanFormatter)
    }
}

/// Formats a byte count with a binary unit, one decimal place
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

/// Progress observer that prints a line per completed segment
pub struct PrintProgress;

impl IProgressObserver for PrintProgress {
    fn on_progress(&self, event: ProgressEvent) {
        match event.bytes_total {
            Some(total) => println!(
                "  {} {} / {}",
                event.path,
                format_size(event.bytes_done),
                format_size(total)
            ),
            None => println!("  {} {}", event.path, format_size(event.bytes_done)),
        }
    }
}

/// Progress observer for the selected verbosity
pub fn progress_observer(quiet: bool, json: bool) -> std::sync::Arc<dyn IProgressObserver> {
    if quiet || json {
        std::sync::Arc::new(NullProgressObserver)
    } else {
        std::sync::Arc::new(PrintProgress)
    }
}

/// Prints a batch report in the selected format
pub fn print_report(report: &BatchReport, format: OutputFormat, formatter: &dyn OutputFormatter) {
    if format == OutputFormat::Json {
        let items: Vec<serde_json::Value> = report
            .outcomes()
            .iter()
            .map(|o| {
                serde_json::json!({
                    "remote_path": o.remote_path.as_str(),
                    "local_path": o.local_path.display().to_string(),
                    "size": o.size,
                    "succeeded": o.succeeded(),
                    "error": o.error,
                })
            })
            .collect();
        formatter.print_json(&serde_json::json!({
            "total": report.len(),
            "succeeded": report.succeeded(),
            "failed": report.failed(),
            "items": items,
        }));
        return;
    }

    for failure in report.failures() {
        formatter.error(&format!(
            "{}: {}",
            failure.remote_path,
            failure.error.as_deref().unwrap_or("unknown error")
        ));
    }
    if report.all_succeeded() {
        formatter.success(&format!("{} item(s) transferred", report.succeeded()));
    } else {
        formatter.error(&format!(
            "{} of {} item(s) failed",
            report.failed(),
            report.len()
        ));
    }
}
