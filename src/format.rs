//! Size and duration formatting for human-readable output

/// Format a byte count into a human-readable string using binary units.
///
/// # Arguments
/// * `bytes` - Size in bytes
///
/// # Returns
/// * Formatted string like "4.5 G" or "512 B"
pub fn human_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "K", "M", "G", "T", "P"];
    const BASE: f64 = 1024.0;

    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= BASE && unit_index < UNITS.len() - 1 {
        size /= BASE;
        unit_index += 1;
    }

    format!("{:.1} {}", size, UNITS[unit_index])
}

/// Format elapsed milliseconds, switching to seconds above one second.
pub fn human_elapsed(ms: u64) -> String {
    if ms < 1000 {
        format!("{} ms", ms)
    } else {
        format!("{:.2} s", ms as f64 / 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_human_size_bytes() {
        assert_eq!(human_size(0), "0 B");
        assert_eq!(human_size(500), "500 B");
        assert_eq!(human_size(1023), "1023 B");
    }

    #[test]
    fn test_human_size_scaled() {
        assert_eq!(human_size(1024), "1.0 K");
        assert_eq!(human_size(1536), "1.5 K");
        assert_eq!(human_size(1048576), "1.0 M");
        assert_eq!(human_size(1073741824), "1.0 G");
    }

    #[test]
    fn test_human_elapsed() {
        assert_eq!(human_elapsed(0), "0 ms");
        assert_eq!(human_elapsed(999), "999 ms");
        assert_eq!(human_elapsed(1250), "1.25 s");
    }
}
