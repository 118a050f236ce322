//! Small pure helpers that turn raw provider numbers into display values.

use chrono::{DateTime, FixedOffset, Offset, Utc};

pub const SUN_TIME_FORMAT: &str = "%I:%M %p";
pub const HOUR_FORMAT: &str = "%H:%M";
pub const DAY_FORMAT: &str = "%a, %d %b";

/// Floor a temperature-like reading to a whole number.
pub fn floor_temp(value: f64) -> i64 {
    value.floor() as i64
}

/// Metres to kilometres, rounded to one decimal.
pub fn visibility_km(metres: u32) -> f64 {
    (f64::from(metres) / 100.0).round() / 10.0
}

/// Provider UTC shift in seconds to a fixed offset; out-of-range shifts fall back to UTC.
pub fn offset_from_seconds(seconds: i32) -> FixedOffset {
    FixedOffset::east_opt(seconds).unwrap_or_else(|| Utc.fix())
}

/// Epoch seconds to the location's local wall-clock time.
pub fn local_time(epoch: i64, offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
    DateTime::<Utc>::from_timestamp(epoch, 0).map(|utc| utc.with_timezone(&offset))
}

/// Format epoch seconds in the location's local time; unrepresentable stamps render as "--".
pub fn format_local(epoch: i64, offset: FixedOffset, fmt: &str) -> String {
    local_time(epoch, offset)
        .map(|t| t.format(fmt).to_string())
        .unwrap_or_else(|| "--".to_string())
}
