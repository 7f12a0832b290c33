//! Panic Handler
//!
//! Logs every panic through `tracing` and, when a crash log path is
//! configured, appends the report there before the process unwinds.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::panic::{self, PanicInfo};
use std::path::{Path, PathBuf};

/// Install the panic hook
pub fn init_panic_handler(crash_log: Option<PathBuf>) {
    panic::set_hook(Box::new(move |info| {
        handle_panic(info, crash_log.as_deref());
    }));
}

fn handle_panic(info: &PanicInfo<'_>, crash_log: Option<&Path>) {
    let message = format_panic_info(info);
    tracing::error!(report = %message, "fatal: panic");
    eprintln!("\n{}\n{}", "=".repeat(80), message);

    if let Some(path) = crash_log {
        match write_crash_log(path, &message) {
            Ok(()) => tracing::error!(path = %path.display(), "crash log written"),
            Err(e) => tracing::error!(path = %path.display(), error = %e, "failed to write crash log"),
        }
    }
}

fn format_panic_info(info: &PanicInfo<'_>) -> String {
    let location = info
        .location()
        .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
        .unwrap_or_else(|| "<unknown>".to_string());

    format_report(&location, panic_message(info.payload()))
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "<unknown panic payload>"
    }
}

fn format_report(location: &str, message: &str) -> String {
    let mut report = format!(
        "Timestamp: {}\nLocation: {}\nMessage: {}\n",
        chrono::Utc::now().to_rfc3339(),
        location,
        message
    );

    let backtrace = std::backtrace::Backtrace::capture();
    match backtrace.status() {
        std::backtrace::BacktraceStatus::Captured => {
            report.push_str(&format!("\nBacktrace:\n{}", backtrace));
        }
        _ => report.push_str("\nBacktrace: <not captured, set RUST_BACKTRACE=1>\n"),
    }
    report
}

fn write_crash_log(path: &Path, message: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "\n{}", "=".repeat(80))?;
    writeln!(file, "{}", message)?;
    file.sync_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_panic_message_payloads() {
        let text: Box<dyn std::any::Any + Send> = Box::new("static text");
        assert_eq!(panic_message(text.as_ref()), "static text");

        let owned: Box<dyn std::any::Any + Send> = Box::new(String::from("owned text"));
        assert_eq!(panic_message(owned.as_ref()), "owned text");

        let other: Box<dyn std::any::Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(other.as_ref()), "<unknown panic payload>");
    }

    #[test]
    fn test_report_contains_location_and_message() {
        let report = format_report("src/main.rs:1:1", "boom");
        assert!(report.contains("Location: src/main.rs:1:1"));
        assert!(report.contains("Message: boom"));
        assert!(report.contains("Backtrace"));
    }

    #[test]
    fn test_crash_log_appends() {
        let temp = TempDir::new().unwrap();
        let crash_log = temp.path().join("logs").join("crash.log");

        write_crash_log(&crash_log, "First crash").unwrap();
        write_crash_log(&crash_log, "Second crash").unwrap();

        let content = fs::read_to_string(&crash_log).unwrap();
        assert!(content.contains("First crash"));
        assert!(content.contains("Second crash"));
    }
}
