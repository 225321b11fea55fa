use chrono::DateTime;

/// Format a bar time (seconds since epoch) as a UTC `HH:MM` axis label. Seconds are never shown.
pub fn format_time_label(timestamp_secs: u64) -> String {
    i64::try_from(timestamp_secs)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|time| time.format("%H:%M").to_string())
        .unwrap_or_else(|| "--:--".to_string())
}
