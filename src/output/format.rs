//! Number formatting utilities for analysis output.

/// Format a rate (requests/second) with SI suffixes.
/// - < 1K: raw number (e.g., "999")
/// - 1K - 999.9K: "XXX.XK" (e.g., "234.5K")
/// - >= 1M: "X.XXM" (e.g., "10.23M")
pub fn format_rate(value: f64) -> String {
    if value < 1_000.0 {
        format!("{:.0}", value)
    } else if value < 1_000_000.0 {
        format!("{:.1}K", value / 1_000.0)
    } else {
        format!("{:.2}M", value / 1_000_000.0)
    }
}

/// Format a latency value in nanoseconds with autoscaling.
/// - < 1us: "XXXns"
/// - 1us - 999us: "X.Xus"
/// - 1ms - 999ms: "X.Xms"
/// - >= 1s: "X.XXs"
pub fn format_latency_ns(ns: f64) -> String {
    if ns < 1_000.0 {
        format!("{:.0}ns", ns)
    } else if ns < 1_000_000.0 {
        format!("{:.1}us", ns / 1_000.0)
    } else if ns < 1_000_000_000.0 {
        format!("{:.1}ms", ns / 1_000_000.0)
    } else {
        format!("{:.2}s", ns / 1_000_000_000.0)
    }
}

/// Format a ratio with adaptive precision.
/// - >= 10: 1 decimal
/// - < 10: 3 decimals
pub fn format_ratio(value: f64) -> String {
    if value >= 10.0 {
        format!("{:.1}", value)
    } else {
        format!("{:.3}", value)
    }
}

/// Right-align a formatted value for table output.
pub fn pad(s: &str, width: usize) -> String {
    format!("{:>width$}", s, width = width)
}
