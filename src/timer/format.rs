//! Elapsed-time display formatting

/// Render elapsed seconds as zero-padded `HH:MM:SS`.
///
/// Hours have no upper bound, so 100 hours and beyond render with more than
/// two digits.
pub fn format_hms(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, secs)
}

#[cfg(test)]
mod tests {
    use super::format_hms;

    #[test]
    fn formats_zero() {
        assert_eq!(format_hms(0), "00:00:00");
    }

    #[test]
    fn formats_seconds_only() {
        assert_eq!(format_hms(59), "00:00:59");
    }

    #[test]
    fn formats_every_field() {
        assert_eq!(format_hms(3661), "01:01:01");
    }

    #[test]
    fn hours_grow_past_two_digits() {
        assert_eq!(format_hms(360_000), "100:00:00");
    }

    #[test]
    fn rolls_minutes_into_hours() {
        assert_eq!(format_hms(3599), "00:59:59");
        assert_eq!(format_hms(3600), "01:00:00");
    }
}
