//! Counting successful requests to a site section inside a weekly time window.

use std::ops::Range;
use std::sync::OnceLock;

use chrono::{Datelike, NaiveDateTime, NaiveTime, Timelike, Weekday};
use regex::Regex;

use super::source::LogSource;
use crate::error::LogError;

/// Layout of the date token between the brackets, before the UTC offset.
const BRACKET_DATE_FORMAT: &str = "%d/%b/%Y:%H:%M:%S";

fn status_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r#"HTTP/\d\.\d"\s+(\d{3})"#).expect("status pattern is valid"))
}

/// Filter for [`count_requests_in_window`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowQuery {
    /// Site section; matched as `/<section>/` anywhere in the line.
    pub section: String,
    /// Window start. Only the hour is compared.
    pub start: NaiveTime,
    /// Window end, exclusive. Only the hour is compared.
    pub end: NaiveTime,
    pub weekday: Weekday,
    /// Accepted status codes, half-open.
    pub status: Range<u16>,
}

impl WindowQuery {
    /// Creates a query accepting 2xx responses.
    pub fn new(section: impl Into<String>, start: NaiveTime, end: NaiveTime, weekday: Weekday) -> Self {
        Self {
            section: section.into(),
            start,
            end,
            weekday,
            status: 200..300,
        }
    }

    /// Builder method to override the accepted status range `[low, high)`.
    pub fn with_status_range(mut self, low: u16, high: u16) -> Self {
        self.status = low..high;
        self
    }

    /// The substring a request line must contain.
    pub fn section_marker(&self) -> String {
        format!("/{}/", self.section)
    }

    fn hour_in_window(&self, hour: u32) -> bool {
        self.start.hour() <= hour && hour < self.end.hour()
    }
}

/// Counts GET requests to a section that succeeded inside the hour window on
/// the given weekday.
///
/// Every line must carry an `HTTP/x.y" NNN` status; a line without one stops
/// the scan with `LogError::MalformedLine`.
pub fn count_requests_in_window(source: LogSource, query: &WindowQuery) -> Result<u64, LogError> {
    if query.status.start >= query.status.end {
        return Err(LogError::InvalidStatusRange {
            low: query.status.start,
            high: query.status.end,
        });
    }

    let marker = query.section_marker();
    let mut scanned = 0usize;
    let mut candidates = 0usize;
    let mut count = 0u64;

    for (line_number, line) in source.lines() {
        let line = line?;
        scanned += 1;

        let status = status_code(&line, line_number)?;
        if !(line.contains("GET") && line.contains(&marker) && query.status.contains(&status)) {
            continue;
        }
        candidates += 1;

        let requested_at = bracket_datetime(&line, line_number)?;
        if requested_at.weekday() == query.weekday && query.hour_in_window(requested_at.hour()) {
            count += 1;
        }
    }

    tracing::info!(
        section = %query.section,
        weekday = %query.weekday,
        scanned,
        candidates,
        count,
        "Window scan complete"
    );
    Ok(count)
}

fn status_code(line: &str, line_number: usize) -> Result<u16, LogError> {
    status_pattern()
        .captures(line)
        .and_then(|caps| caps[1].parse().ok())
        .ok_or_else(|| LogError::MalformedLine {
            line_number,
            reason: "no HTTP status code after the request line".to_string(),
        })
}

fn bracket_datetime(line: &str, line_number: usize) -> Result<NaiveDateTime, LogError> {
    let malformed = |reason: &str| LogError::MalformedLine {
        line_number,
        reason: reason.to_string(),
    };

    let open = line.find('[').ok_or_else(|| malformed("missing '['"))?;
    let close = line.find(']').ok_or_else(|| malformed("missing ']'"))?;
    if close <= open {
        return Err(malformed("']' precedes '['"));
    }

    let token = line[open + 1..close].split(' ').next().unwrap_or_default();
    NaiveDateTime::parse_from_str(token, BRACKET_DATE_FORMAT)
        .map_err(|_| malformed(&format!("unparsable timestamp '{token}'")))
}

/// Parses an `HH:MM` 24-hour clock value.
pub fn parse_clock(value: &str) -> Result<NaiveTime, LogError> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map_err(|_| LogError::InvalidClock(value.to_string()))
}

/// Parses a full English weekday name, ignoring case.
pub fn parse_weekday(value: &str) -> Result<Weekday, LogError> {
    let name = value.trim().to_ascii_lowercase();
    let weekday = match name.as_str() {
        "monday" => Weekday::Mon,
        "tuesday" => Weekday::Tue,
        "wednesday" => Weekday::Wed,
        "thursday" => Weekday::Thu,
        "friday" => Weekday::Fri,
        "saturday" => Weekday::Sat,
        "sunday" => Weekday::Sun,
        _ => return Err(LogError::InvalidWeekday(value.to_string())),
    };
    Ok(weekday)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn source(lines: &[&str]) -> LogSource {
        LogSource::from_reader(Cursor::new(lines.join("\n").into_bytes())).unwrap()
    }

    fn query(section: &str, weekday: Weekday) -> WindowQuery {
        WindowQuery::new(
            section,
            parse_clock("05:00").unwrap(),
            parse_clock("10:00").unwrap(),
            weekday,
        )
    }

    fn line(timestamp: &str, request: &str, status: u16) -> String {
        format!(
            r#"10.0.0.1 - - [{timestamp} -0500] "{request} HTTP/1.1" {status} 100 "-" "agent" host 1.1.1.1"#
        )
    }

    #[test]
    fn test_single_monday_morning_request() {
        // 13 May 2024 was a Monday.
        let l = line("13/May/2024:06:00:00", "GET /telugu/x", 200);
        assert_eq!(
            count_requests_in_window(source(&[l.as_str()]), &query("telugu", Weekday::Mon)).unwrap(),
            1
        );
        assert_eq!(
            count_requests_in_window(source(&[l.as_str()]), &query("telugu", Weekday::Tue)).unwrap(),
            0
        );
    }

    #[test]
    fn test_end_hour_is_exclusive_and_minutes_ignored() {
        let inside = line("13/May/2024:09:59:59", "GET /telugu/a", 200);
        let at_end = line("13/May/2024:10:00:00", "GET /telugu/b", 200);
        let before = line("13/May/2024:04:59:59", "GET /telugu/c", 200);
        let q = WindowQuery::new(
            "telugu",
            parse_clock("05:45").unwrap(),
            parse_clock("10:30").unwrap(),
            Weekday::Mon,
        );
        assert_eq!(
            count_requests_in_window(source(&[inside.as_str(), at_end.as_str(), before.as_str()]), &q).unwrap(),
            1
        );
    }

    #[test]
    fn test_filters_method_section_and_status() {
        let lines = [
            line("13/May/2024:06:00:00", "GET /telugu/ok", 200),
            line("13/May/2024:06:00:00", "POST /telugu/post", 200),
            line("13/May/2024:06:00:00", "GET /teluguxyz/other", 200),
            line("13/May/2024:06:00:00", "GET /telugu/missing", 404),
            line("13/May/2024:06:00:00", "GET /telugu/redirect", 301),
            line("13/May/2024:06:00:00", "GET /music/telugu/nested", 206),
        ];
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        assert_eq!(
            count_requests_in_window(source(&refs), &query("telugu", Weekday::Mon)).unwrap(),
            2
        );
    }

    #[test]
    fn test_custom_status_range() {
        let l = line("13/May/2024:06:00:00", "GET /telugu/x", 404);
        let q = query("telugu", Weekday::Mon).with_status_range(400, 500);
        assert_eq!(count_requests_in_window(source(&[l.as_str()]), &q).unwrap(), 1);
    }

    #[test]
    fn test_line_without_status_is_fatal() {
        let good = line("13/May/2024:06:00:00", "GET /telugu/x", 200);
        let err = count_requests_in_window(
            source(&[good.as_str(), "not a log line"]),
            &query("telugu", Weekday::Mon),
        )
        .unwrap_err();
        assert!(matches!(err, LogError::MalformedLine { line_number: 2, .. }));
    }

    #[test]
    fn test_unparsable_date_on_candidate_is_fatal() {
        let bad = line("13-05-2024 06:00:00", "GET /telugu/x", 200);
        let err = count_requests_in_window(source(&[bad.as_str()]), &query("telugu", Weekday::Mon))
            .unwrap_err();
        assert!(matches!(err, LogError::MalformedLine { line_number: 1, .. }));
    }

    #[test]
    fn test_empty_status_range_rejected() {
        let q = query("telugu", Weekday::Mon).with_status_range(300, 200);
        assert!(matches!(
            count_requests_in_window(source(&[]), &q),
            Err(LogError::InvalidStatusRange { .. })
        ));
    }

    #[test]
    fn test_parse_clock() {
        assert_eq!(parse_clock("05:30").unwrap().hour(), 5);
        assert!(matches!(parse_clock("25:00"), Err(LogError::InvalidClock(_))));
        assert!(parse_clock("5").is_err());
    }

    #[test]
    fn test_parse_weekday() {
        assert_eq!(parse_weekday("Monday").unwrap(), Weekday::Mon);
        assert_eq!(parse_weekday("sunday").unwrap(), Weekday::Sun);
        assert!(matches!(parse_weekday("Mon"), Err(LogError::InvalidWeekday(_))));
    }
}
