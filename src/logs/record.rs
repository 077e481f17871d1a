//! Combined-format access-log records.

use std::sync::OnceLock;

use chrono::{DateTime, FixedOffset, NaiveDate};
use regex::Regex;
use serde::Serialize;

use crate::error::LogError;

/// Timestamp layout between the square brackets, e.g. `13/May/2024:06:00:00 -0500`.
pub const TIMESTAMP_FORMAT: &str = "%d/%b/%Y:%H:%M:%S %z";

/// Layout of the date part before the first `:` of the timestamp.
pub const DATE_FORMAT: &str = "%d/%b/%Y";

/// Combined log format followed by the virtual host and server address.
const COMBINED_PATTERN: &str = concat!(
    r#"^(?P<ip>[\d.]+) - - \[(?P<timestamp>[^\]]+)\] "(?P<method>\S+) (?P<url>\S+) (?P<protocol>[^"]+)" "#,
    r#"(?P<status>\d+) (?P<size>\d+|-) "(?P<referer>[^"]*)" "(?P<user_agent>[^"]*)" (?P<vhost>\S+) (?P<server>[\d.]+)"#,
);

fn combined_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(COMBINED_PATTERN).expect("combined log pattern is valid"))
}

/// One parsed access-log line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogRecord {
    pub client_address: String,
    /// Calendar date as written in the log.
    pub date: NaiveDate,
    pub timestamp: DateTime<FixedOffset>,
    pub method: String,
    pub url_path: String,
    pub protocol: String,
    pub status_code: u16,
    /// Response bytes; `-` in the log is recorded as 0.
    pub response_size: u64,
    pub referer: String,
    pub user_agent: String,
    pub virtual_host: String,
    pub server_address: String,
}

impl LogRecord {
    /// Parses a single line.
    ///
    /// Returns `Ok(None)` when the line does not follow the combined grammar,
    /// or when the time of day or UTC offset after the date cannot be read.
    ///
    /// # Errors
    ///
    /// Returns `LogError::InvalidTimestamp` when the grammar matches but the
    /// date part of the timestamp is not a valid calendar date.
    pub fn parse(line: &str, line_number: usize) -> Result<Option<Self>, LogError> {
        let Some(caps) = combined_pattern().captures(line) else {
            return Ok(None);
        };

        let Ok(status_code) = caps["status"].parse::<u16>() else {
            return Ok(None);
        };
        let response_size = match &caps["size"] {
            "-" => 0,
            digits => match digits.parse::<u64>() {
                Ok(size) => size,
                Err(_) => return Ok(None),
            },
        };

        let raw_timestamp = &caps["timestamp"];
        let date_part = raw_timestamp.split(':').next().unwrap_or_default();
        let date = NaiveDate::parse_from_str(date_part, DATE_FORMAT).map_err(|_| {
            LogError::InvalidTimestamp {
                line_number,
                value: raw_timestamp.to_string(),
            }
        })?;
        let Ok(timestamp) = DateTime::parse_from_str(raw_timestamp, TIMESTAMP_FORMAT) else {
            return Ok(None);
        };

        Ok(Some(Self {
            client_address: caps["ip"].to_string(),
            date,
            timestamp,
            method: caps["method"].to_string(),
            url_path: caps["url"].to_string(),
            protocol: caps["protocol"].to_string(),
            status_code,
            response_size,
            referer: caps["referer"].to_string(),
            user_agent: caps["user_agent"].to_string(),
            virtual_host: caps["vhost"].to_string(),
            server_address: caps["server"].to_string(),
        }))
    }

    /// Calendar date as written in the log, without converting the offset.
    pub fn local_date(&self) -> NaiveDate {
        self.date
    }

    /// Whether the status code is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    const LINE: &str = r#"66.249.66.1 - - [13/May/2024:06:12:44 -0500] "GET /telugump3/song.mp3 HTTP/1.1" 200 52431 "-" "Mozilla/5.0 (compatible)" s-anand.net 191.101.30.24"#;

    #[test]
    fn test_parse_full_line() {
        let record = LogRecord::parse(LINE, 1).unwrap().expect("line matches");
        assert_eq!(record.client_address, "66.249.66.1");
        assert_eq!(record.method, "GET");
        assert_eq!(record.url_path, "/telugump3/song.mp3");
        assert_eq!(record.protocol, "HTTP/1.1");
        assert_eq!(record.status_code, 200);
        assert_eq!(record.response_size, 52431);
        assert_eq!(record.referer, "-");
        assert_eq!(record.user_agent, "Mozilla/5.0 (compatible)");
        assert_eq!(record.virtual_host, "s-anand.net");
        assert_eq!(record.server_address, "191.101.30.24");
        assert_eq!(record.timestamp.hour(), 6);
        assert_eq!(
            record.local_date(),
            NaiveDate::from_ymd_opt(2024, 5, 13).unwrap()
        );
        assert!(record.is_success());
    }

    #[test]
    fn test_dash_size_is_zero() {
        let line = LINE.replace("200 52431", "304 -");
        let record = LogRecord::parse(&line, 1).unwrap().unwrap();
        assert_eq!(record.response_size, 0);
        assert!(!record.is_success());
    }

    #[test]
    fn test_local_date_keeps_log_offset() {
        let line = LINE.replace("06:12:44 -0500", "23:30:00 -0500");
        let record = LogRecord::parse(&line, 1).unwrap().unwrap();
        // 23:30 at -0500 is already the 14th in UTC; the log date is what counts.
        assert_eq!(
            record.local_date(),
            NaiveDate::from_ymd_opt(2024, 5, 13).unwrap()
        );
    }

    #[test]
    fn test_non_matching_lines() {
        assert!(LogRecord::parse("", 1).unwrap().is_none());
        assert!(LogRecord::parse("garbage line", 1).unwrap().is_none());
        // Missing vhost and server columns.
        let short = r#"1.2.3.4 - - [13/May/2024:06:12:44 -0500] "GET / HTTP/1.1" 200 10 "-" "ua""#;
        assert!(LogRecord::parse(short, 1).unwrap().is_none());
    }

    #[test]
    fn test_invalid_timestamp_is_error() {
        let line = LINE.replace("13/May/2024", "31/Feb/2024");
        let err = LogRecord::parse(&line, 7).unwrap_err();
        assert!(matches!(
            err,
            LogError::InvalidTimestamp { line_number: 7, .. }
        ));
    }

    #[test]
    fn test_bad_time_or_offset_is_skipped() {
        let no_offset = LINE.replace("06:12:44 -0500", "06:12:44");
        assert!(LogRecord::parse(&no_offset, 2).unwrap().is_none());

        let bad_hour = LINE.replace("06:12:44", "29:12:44");
        assert!(LogRecord::parse(&bad_hour, 2).unwrap().is_none());
    }
}
