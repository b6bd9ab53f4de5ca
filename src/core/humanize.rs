//! Human-readable byte counts for operational messages

const UNIT_PREFIXES: [char; 6] = ['K', 'M', 'G', 'T', 'P', 'E'];

/// Format a byte count with binary units (KiB .. EiB)
///
/// ```
/// assert_eq!(logtic::format_bytes_binary(10_485_760), "10.0 MiB");
/// assert_eq!(logtic::format_bytes_binary(512), "512 B");
/// ```
pub fn format_bytes_binary(bytes: u64) -> String {
    format_with_unit(bytes, 1024, "iB")
}

/// Format a byte count with decimal units (KB .. EB)
///
/// ```
/// assert_eq!(logtic::format_bytes_decimal(10_000_000), "10.0 MB");
/// ```
pub fn format_bytes_decimal(bytes: u64) -> String {
    format_with_unit(bytes, 1000, "B")
}

fn format_with_unit(bytes: u64, unit: u64, suffix: &str) -> String {
    if bytes < unit {
        return format!("{} B", bytes);
    }

    let mut div = unit;
    let mut exp = 0;
    let mut n = bytes / unit;
    while n >= unit {
        div *= unit;
        exp += 1;
        n /= unit;
    }

    format!(
        "{:.1} {}{}",
        bytes as f64 / div as f64,
        UNIT_PREFIXES[exp],
        suffix
    )
}
