use chrono::{DateTime, Utc};

const NOT_AVAILABLE: &str = "N/A";

/// Remaining auction time, e.g. `1d 4h 0m 9s`.
///
/// Leading zero units are dropped (`4m 2s`, not `0d 0h 4m 2s`). Returns
/// `N/A` when the auction has no end time or has already ended.
pub fn countdown_text(end_time: Option<u64>, now: DateTime<Utc>) -> String {
    let end = match end_time {
        Some(end) => end as i64,
        None => return NOT_AVAILABLE.to_string(),
    };

    let remaining = end - now.timestamp();
    if remaining <= 0 {
        return NOT_AVAILABLE.to_string();
    }

    let days = remaining / 86_400;
    let hours = (remaining % 86_400) / 3_600;
    let minutes = (remaining % 3_600) / 60;
    let seconds = remaining % 60;

    let units = [(days, "d"), (hours, "h"), (minutes, "m"), (seconds, "s")];
    let first = units.iter().position(|(value, _)| *value > 0).unwrap_or(units.len() - 1);

    units[first..]
        .iter()
        .map(|(value, suffix)| format!("{}{}", value, suffix))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_countdown_text() {
        assert_eq!(countdown_text(None, at(0)), "N/A");
        assert_eq!(countdown_text(Some(100), at(100)), "N/A");
        assert_eq!(countdown_text(Some(100), at(200)), "N/A");
        assert_eq!(countdown_text(Some(242), at(0)), "4m 2s");
        assert_eq!(countdown_text(Some(86_400 + 4 * 3_600 + 9), at(0)), "1d 4h 0m 9s");
        assert_eq!(countdown_text(Some(1), at(0)), "1s");
    }
}
