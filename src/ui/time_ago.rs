use chrono::{DateTime, Utc};

/// Human-readable distance between `then` and `now`, e.g. "3 days ago".
///
/// Rounds to the nearest unit and switches unit at 45 seconds, 45 minutes,
/// 22 hours, 26 days and 320 days. Instants in the future read as
/// "a few seconds ago".
pub fn format_relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - then).num_seconds().max(0);
    let round = |value: i64, unit: i64| (value + unit / 2) / unit;

    const MINUTE: i64 = 60;
    const HOUR: i64 = 60 * MINUTE;
    const DAY: i64 = 24 * HOUR;

    if secs < 45 {
        return "a few seconds ago".to_string();
    }
    if secs < 90 {
        return "a minute ago".to_string();
    }
    if secs < 45 * MINUTE {
        return format!("{} minutes ago", round(secs, MINUTE).max(2));
    }
    if secs < 90 * MINUTE {
        return "an hour ago".to_string();
    }
    if secs < 22 * HOUR {
        return format!("{} hours ago", round(secs, HOUR).max(2));
    }
    if secs < 36 * HOUR {
        return "a day ago".to_string();
    }

    let days = round(secs, DAY);
    if days < 26 {
        return format!("{days} days ago");
    }
    if days < 45 {
        return "a month ago".to_string();
    }
    if days < 320 {
        let months = ((days as f64) / 30.4).round() as i64;
        return format!("{} months ago", months.max(2));
    }
    if days < 548 {
        return "a year ago".to_string();
    }
    let years = ((days as f64) / 365.25).round() as i64;
    format!("{} years ago", years.max(2))
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn ago(delta: Duration) -> String {
        let now = Utc.with_ymd_and_hms(2019, 1, 15, 12, 0, 0).unwrap();
        format_relative_time(now - delta, now)
    }

    #[test]
    fn should_describe_recent_instants() {
        assert_eq!(ago(Duration::seconds(0)), "a few seconds ago");
        assert_eq!(ago(Duration::seconds(44)), "a few seconds ago");
        assert_eq!(ago(Duration::seconds(60)), "a minute ago");
        assert_eq!(ago(Duration::minutes(5)), "5 minutes ago");
        assert_eq!(ago(Duration::minutes(50)), "an hour ago");
        assert_eq!(ago(Duration::hours(3)), "3 hours ago");
    }

    #[test]
    fn should_describe_older_instants() {
        assert_eq!(ago(Duration::hours(30)), "a day ago");
        assert_eq!(ago(Duration::days(3)), "3 days ago");
        assert_eq!(ago(Duration::days(30)), "a month ago");
        assert_eq!(ago(Duration::days(92)), "3 months ago");
        assert_eq!(ago(Duration::days(400)), "a year ago");
        assert_eq!(ago(Duration::days(365 * 3)), "3 years ago");
    }

    #[test]
    fn should_clamp_future_instants() {
        assert_eq!(ago(Duration::minutes(-10)), "a few seconds ago");
    }
}
