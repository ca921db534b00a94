//! Formatting helpers shared across views.

/// Format a media position as `m:ss.cc` (minutes, seconds, centiseconds).
///
/// Negative and non-finite inputs render as `0:00.00`.
pub fn format_time(seconds: f64) -> String {
    let t = if seconds.is_finite() && seconds > 0.0 {
        seconds
    } else {
        0.0
    };
    let minutes = (t / 60.0).floor() as u64;
    let secs = (t % 60.0).floor() as u64;
    let centis = ((t % 1.0) * 100.0).floor() as u64;
    format!("{}:{:02}.{:02}", minutes, secs, centis.min(99))
}

/// Format a segment interval as `start → end`.
pub fn format_range(start: f64, end: f64) -> String {
    format!("{} → {}", format_time(start), format_time(end))
}

/// Format an optional 0-1 score with two decimals, or a dash if missing.
pub fn format_score(score: Option<f64>) -> String {
    match score {
        Some(score) => format!("{:.2}", score),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0.0), "0:00.00");
        assert_eq!(format_time(5.25), "0:05.25");
        assert_eq!(format_time(75.5), "1:15.50");
        assert_eq!(format_time(600.0), "10:00.00");
    }

    #[test]
    fn test_format_time_degenerate_inputs() {
        assert_eq!(format_time(-3.0), "0:00.00");
        assert_eq!(format_time(f64::NAN), "0:00.00");
    }

    #[test]
    fn test_format_score() {
        assert_eq!(format_score(Some(0.8)), "0.80");
        assert_eq!(format_score(None), "-");
    }
}
