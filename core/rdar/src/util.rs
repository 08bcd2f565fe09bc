/// 100ns ticks per second in a Windows FILETIME.
const WIN_TICK: u64 = 10_000_000;
/// Seconds between 1601-01-01 and 1970-01-01.
const EPOCH_DIFF: i64 = 11_644_473_600;

/// Convert a Windows FILETIME to Unix seconds.
pub fn filetime_to_unix(filetime: u64) -> i64 {
    (filetime / WIN_TICK) as i64 - EPOCH_DIFF
}

/// `512B`, `3K`, `12M`... truncating, in powers of 1024.
pub fn human_readable_size(size: u64) -> String {
    const UNITS: [&str; 4] = ["K", "M", "G", "T"];

    if size < 1024 {
        return format!("{}B", size);
    }

    let mut value = size / 1024;
    for unit in &UNITS[..UNITS.len() - 1] {
        if value < 1024 {
            return format!("{}{}", value, unit);
        }
        value /= 1024;
    }
    format!("{}{}", value, UNITS[UNITS.len() - 1])
}

/// `YYYY-MM-DD HH:MM` in UTC.
pub fn format_time(unix: i64) -> String {
    chrono::DateTime::from_timestamp(unix, 0)
        .unwrap_or_default()
        .format("%Y-%m-%d %H:%M")
        .to_string()
}
