//! Human-readable elapsed time for status reports.

use chrono::{DateTime, Utc};

fn unit(value: i64, name: &str) -> String {
    if value == 1 {
        format!("1 {}", name)
    } else {
        format!("{} {}s", value, name)
    }
}

/// Render a duration in seconds as "2 hours 5 minutes 3 seconds".
///
/// Zero-valued units are omitted; a zero duration renders as "0 seconds".
pub fn seconds_to_text(secs: i64) -> String {
    let secs = secs.max(0);
    let days = secs / 86_400;
    let hours = (secs % 86_400) / 3_600;
    let minutes = (secs % 3_600) / 60;
    let seconds = secs % 60;

    let parts: Vec<String> = [
        (days, "day"),
        (hours, "hour"),
        (minutes, "minute"),
        (seconds, "second"),
    ]
    .into_iter()
    .filter(|(value, _)| *value > 0)
    .map(|(value, name)| unit(value, name))
    .collect();

    if parts.is_empty() {
        unit(0, "second")
    } else {
        parts.join(" ")
    }
}

/// "3 minutes 12 seconds ago", or "never" for a state that was never polled.
pub fn last_updated_text(last_updated: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    match last_updated {
        Some(at) => format!("{} ago", seconds_to_text((now - at).num_seconds())),
        None => "never".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seconds_to_text() {
        assert_eq!(seconds_to_text(0), "0 seconds");
        assert_eq!(seconds_to_text(1), "1 second");
        assert_eq!(seconds_to_text(59), "59 seconds");
        assert_eq!(seconds_to_text(60), "1 minute");
        assert_eq!(seconds_to_text(192), "3 minutes 12 seconds");
        assert_eq!(seconds_to_text(3_600 + 5), "1 hour 5 seconds");
        assert_eq!(seconds_to_text(2 * 86_400 + 7_200), "2 days 2 hours");
    }

    #[test]
    fn test_negative_is_clamped() {
        assert_eq!(seconds_to_text(-5), "0 seconds");
    }

    #[test]
    fn test_last_updated_text() {
        let now = Utc::now();
        assert_eq!(last_updated_text(None, now), "never");
        let at = now - chrono::Duration::seconds(75);
        assert_eq!(last_updated_text(Some(at), now), "1 minute 15 seconds ago");
    }
}
