use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M"];
const TIME_FORMATS: &[&str] = &["%H:%M:%S", "%H:%M"];

/// Parse an LLM-produced timestamp string via a fallback chain: RFC3339,
/// relative words (`today`/`tomorrow`/`yesterday`), full datetime formats,
/// a bare date, then a bare time (prepended with `now`'s date). Returns
/// `None` — the caller's cue to skip and log — if nothing matches.
pub fn parse_event_timestamp(raw: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    match raw.to_lowercase().as_str() {
        "today" => return Some(now),
        "tomorrow" => return Some(now + Duration::days(1)),
        "yesterday" => return Some(now - Duration::days(1)),
        _ => {}
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        let naive = date.and_hms_opt(0, 0, 0)?;
        return Some(Utc.from_utc_datetime(&naive));
    }

    for fmt in TIME_FORMATS {
        if let Ok(time) = NaiveTime::parse_from_str(raw, fmt) {
            let naive = NaiveDateTime::new(now.date_naive(), time);
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 11, 12, 30, 0).unwrap()
    }

    #[test]
    fn parses_rfc3339() {
        let parsed = parse_event_timestamp("2025-09-13T17:00:00Z", now()).unwrap();
        assert_eq!(parsed.to_rfc3339(), "2025-09-13T17:00:00+00:00");
    }

    #[test]
    fn parses_space_separated_datetime() {
        let parsed = parse_event_timestamp("2025-09-13 17:00", now()).unwrap();
        assert_eq!(parsed.date_naive().to_string(), "2025-09-13");
    }

    #[test]
    fn parses_date_only() {
        let parsed = parse_event_timestamp("2025-09-10", now()).unwrap();
        assert_eq!(parsed.date_naive().to_string(), "2025-09-10");
    }

    #[test]
    fn parses_relative_words() {
        assert_eq!(parse_event_timestamp("tomorrow", now()).unwrap().date_naive(), (now() + Duration::days(1)).date_naive());
        assert_eq!(parse_event_timestamp("yesterday", now()).unwrap().date_naive(), (now() - Duration::days(1)).date_naive());
        assert_eq!(parse_event_timestamp("today", now()).unwrap(), now());
    }

    #[test]
    fn time_only_prepends_todays_date() {
        let parsed = parse_event_timestamp("18:00", now()).unwrap();
        assert_eq!(parsed.date_naive(), now().date_naive());
        assert_eq!(parsed.format("%H:%M").to_string(), "18:00");
    }

    #[test]
    fn unparseable_input_returns_none() {
        assert!(parse_event_timestamp("sometime next week", now()).is_none());
    }
}
