/// Format a duration in seconds as `{h}h {m}m {s}s`.
///
/// Each unit is floor-divided and the remainder carried down to the next, so
/// fractional seconds are dropped. Negative or non-finite input formats as
/// zero.
pub fn format_hms(total_secs: f64) -> String {
    let mut remaining = if total_secs.is_finite() && total_secs > 0.0 {
        total_secs
    } else {
        0.0
    };

    let hours = (remaining / 3600.0).floor();
    remaining -= hours * 3600.0;
    let minutes = (remaining / 60.0).floor();
    remaining -= minutes * 60.0;
    let seconds = remaining.floor();

    format!("{}h {}m {}s", hours as i64, minutes as i64, seconds as i64)
}

/// Format an elapsed time in milliseconds as `{m}m {s}s`.
/// Minutes are not rolled over into hours.
pub fn format_elapsed(millis: i64) -> String {
    let millis = millis.max(0);
    let minutes = millis / 60_000;
    let seconds = (millis - minutes * 60_000) / 1000;
    format!("{}m {}s", minutes, seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_hms() {
        assert_eq!(format_hms(0.0), "0h 0m 0s");
        assert_eq!(format_hms(14_400.0), "4h 0m 0s");
        assert_eq!(format_hms(3_725.9), "1h 2m 5s");
        assert_eq!(format_hms(59.99), "0h 0m 59s");
        assert_eq!(format_hms(90_000.0), "25h 0m 0s");
    }

    #[test]
    fn test_format_hms_degenerate_input() {
        assert_eq!(format_hms(-5.0), "0h 0m 0s");
        assert_eq!(format_hms(f64::INFINITY), "0h 0m 0s");
        assert_eq!(format_hms(f64::NAN), "0h 0m 0s");
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(0), "0m 0s");
        assert_eq!(format_elapsed(61_999), "1m 1s");
        assert_eq!(format_elapsed(7_200_000), "120m 0s");
        assert_eq!(format_elapsed(-3), "0m 0s");
    }
}
