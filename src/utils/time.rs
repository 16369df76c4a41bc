/// Converts seconds to milliseconds
pub const fn seconds_ms(seconds: u64) -> u64 {
    seconds * 1000
}

/// Converts minutes to milliseconds
pub const fn minutes_ms(minutes: u64) -> u64 {
    minutes * 60 * 1000
}

/// Converts hours to milliseconds
pub const fn hours_ms(hours: u64) -> u64 {
    hours * 60 * 60 * 1000
}
