use chrono::{DateTime, Utc};
use serde::Serialize;
use wedvite_core::{
    compress, payload_len, AppError, ErrorMetadata, InvitationRecord, LogLevel, StorageReport,
    TierReport,
};

/// Truncate a string to max_len characters, appending "..." if truncated.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Human-readable byte count (B, KB, MB).
pub fn format_bytes(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    let b = bytes as f64;
    if b < KB {
        format!("{} B", bytes)
    } else if b < KB * KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{:.2} MB", b / (KB * KB))
    }
}

/// Size of one media field as stored and as decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaFieldReport {
    pub field: String,
    /// Characters kept at rest (prefix stripped).
    pub stored_bytes: usize,
    /// Decoded media size, `None` when the payload is not valid base64.
    pub decoded_bytes: Option<usize>,
}

pub fn media_report(record: &InvitationRecord) -> Vec<MediaFieldReport> {
    record
        .media_payloads()
        .into_iter()
        .map(|(field, payload)| MediaFieldReport {
            field,
            stored_bytes: compress(payload).len(),
            decoded_bytes: payload_len(payload),
        })
        .collect()
}

pub fn print_records_table(records: &[InvitationRecord]) {
    if records.is_empty() {
        println!("\nNo invitations found.");
        return;
    }

    println!(
        "\n{:<36} {:<30} {:<12} {:<20} {:>6}",
        "ID", "Couple", "Date", "Updated At", "Media"
    );
    println!("{}", "-".repeat(108));

    for record in records {
        println!(
            "{:<36} {:<30} {:<12} {:<20} {:>6}",
            truncate_string(&record.id, 36),
            truncate_string(&record.title(), 30),
            truncate_string(record.date.as_deref().unwrap_or("-"), 12),
            record
                .updated_at
                .map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| "-".to_string()),
            record.media_payloads().len()
        );
    }

    println!("\nTotal: {} invitation(s)\n", records.len());
}

pub fn print_storage_report(report: &StorageReport) {
    println!("\n=== Storage Usage ===\n");
    println!(
        "{:<10} {:<8} {:>8} {:>12} {:>12} {:>8}  {}",
        "Tier", "Backend", "Records", "Used", "Ceiling", "Usage", "Status"
    );
    println!("{}", "-".repeat(76));
    for tier in [&report.durable, &report.transient] {
        print_tier_row(tier);
    }
    println!();
}

fn print_tier_row(tier: &TierReport) {
    println!(
        "{:<10} {:<8} {:>8} {:>12} {:>12} {:>7.1}%  {}",
        tier.tier.to_string(),
        tier.backend.to_string(),
        tier.records,
        format_bytes(tier.usage.used_bytes),
        format_bytes(tier.usage.total_bytes),
        tier.usage.percentage,
        if tier.critical { "CRITICAL" } else { "ok" }
    );
}

/// Parse an invitation from user-supplied JSON, ready to save.
///
/// A missing or blank `id` gets a fresh UUID. `updatedAt` is stamped with `now`, and
/// `createdAt` too when it is absent.
pub fn parse_record(raw: &str, now: DateTime<Utc>) -> Result<InvitationRecord, AppError> {
    let mut record: InvitationRecord = serde_json::from_str(raw)
        .map_err(|e| AppError::InvalidInput(format!("Not a valid invitation: {}", e)))?;
    if record.id.trim().is_empty() {
        record.id = uuid::Uuid::new_v4().to_string();
    }
    record.touch(now);
    Ok(record)
}

/// Log a failed command at the level its error asks for, and print the
/// user-facing hint to stderr.
pub fn report_error(err: &AppError) {
    match err.log_level() {
        LogLevel::Debug => tracing::debug!(
            error_code = err.error_code(),
            recoverable = err.is_recoverable(),
            error = %err,
            "Command failed"
        ),
        LogLevel::Warn => tracing::warn!(
            error_code = err.error_code(),
            recoverable = err.is_recoverable(),
            error = %err,
            "Command failed"
        ),
        LogLevel::Error => tracing::error!(
            error_code = err.error_code(),
            recoverable = err.is_recoverable(),
            error = %err.detailed_message(),
            "Command failed"
        ),
    }
    eprintln!("{}", error_line(err));
}

/// The user-facing line for a failed command, with the suggested action when there is one.
fn error_line(err: &AppError) -> String {
    match err.suggested_action() {
        Some(action) => format!("{}: {}", err.client_message(), action),
        None => err.client_message(),
    }
}

/// Initialize tracing for CLI binaries.
///
/// Logs go to stderr so command output on stdout stays parseable. Set
/// `LOG_FORMAT=json` for JSON lines.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
