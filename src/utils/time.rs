use chrono::{DateTime, Local, Utc};

pub fn relative_time_from(dt: &DateTime<Utc>, now: DateTime<Utc>) -> String {
    let duration = now.signed_duration_since(*dt);

    let seconds = duration.num_seconds();
    if seconds < 0 {
        return "now".to_string();
    }

    if seconds < 60 {
        return format!("{}s", seconds);
    }

    let minutes = duration.num_minutes();
    if minutes < 60 {
        return format!("{}m", minutes);
    }

    let hours = duration.num_hours();
    if hours < 24 {
        return format!("{}h", hours);
    }

    let days = duration.num_days();
    if days < 30 {
        return format!("{}d", days);
    }

    if days < 365 {
        return format!("{}mo", days / 30);
    }

    format!("{}y", days / 365)
}

/// Absolute timestamp in the machine's timezone, for the detail view.
pub fn local_timestamp(dt: &DateTime<Utc>) -> String {
    dt.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn buckets() {
        let now = Utc::now();
        assert_eq!(relative_time_from(&(now - Duration::seconds(5)), now), "5s");
        assert_eq!(relative_time_from(&(now - Duration::minutes(3)), now), "3m");
        assert_eq!(relative_time_from(&(now - Duration::hours(2)), now), "2h");
        assert_eq!(relative_time_from(&(now - Duration::days(4)), now), "4d");
        assert_eq!(relative_time_from(&(now - Duration::days(65)), now), "2mo");
        assert_eq!(relative_time_from(&(now - Duration::days(800)), now), "2y");
    }

    #[test]
    fn future_timestamps_read_now() {
        let now = Utc::now();
        assert_eq!(relative_time_from(&(now + Duration::seconds(30)), now), "now");
    }
}
