use kline_chart_wasm::domain::logging::{LogComponent, LogEntry, LogLevel};

#[test]
fn log_line_carries_level_component_and_message() {
    let entry = LogEntry::new(LogLevel::Warn, LogComponent::Application("ChartFeedBinding"), "closed");
    assert_eq!(entry.format_line("12:00:00.000"), "[12:00:00.000]  WARN APP:ChartFeedBinding | closed");
}

#[test]
fn levels_are_ordered_for_filtering() {
    assert!(LogLevel::Debug < LogLevel::Info);
    assert!(LogLevel::Warn < LogLevel::Error);
}
