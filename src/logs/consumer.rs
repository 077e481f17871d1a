//! Finding the client that downloaded the most bytes from a path prefix on a day.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use super::record::LogRecord;
use super::source::LogSource;
use crate::error::LogError;

/// Filter for [`top_consumer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumerQuery {
    /// Literal prefix of the request URL, e.g. `/telugump3/`.
    pub path_prefix: String,
    /// Calendar date as written in the log.
    pub date: NaiveDate,
}

impl ConsumerQuery {
    pub fn new(path_prefix: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            path_prefix: path_prefix.into(),
            date,
        }
    }

    fn matches(&self, record: &LogRecord) -> bool {
        record.local_date() == self.date
            && record.url_path.starts_with(&self.path_prefix)
            && record.is_success()
    }
}

/// The heaviest client for a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopConsumer {
    pub client_address: String,
    pub bytes: u128,
}

/// Sums successful response bytes per client and returns the largest total.
///
/// Lines that do not follow the combined grammar are skipped. Equal totals
/// resolve to the lexicographically smallest client address.
pub fn top_consumer(source: LogSource, query: &ConsumerQuery) -> Result<Option<TopConsumer>, LogError> {
    let mut totals: BTreeMap<String, u128> = BTreeMap::new();
    let mut scanned = 0usize;
    let mut skipped = 0usize;
    let mut matched = 0usize;

    for (line_number, line) in source.lines() {
        let line = line?;
        scanned += 1;

        let Some(record) = LogRecord::parse(&line, line_number)? else {
            skipped += 1;
            tracing::trace!(line_number, "Skipping line outside combined grammar");
            continue;
        };

        if query.matches(&record) {
            matched += 1;
            *totals.entry(record.client_address).or_insert(0) += u128::from(record.response_size);
        }
    }

    // BTreeMap iterates in address order, so the first maximum is the smallest address.
    let top = totals
        .into_iter()
        .fold(None::<TopConsumer>, |best, (client_address, bytes)| match best {
            Some(current) if current.bytes >= bytes => Some(current),
            _ => Some(TopConsumer {
                client_address,
                bytes,
            }),
        });

    tracing::info!(
        prefix = %query.path_prefix,
        date = %query.date,
        scanned,
        skipped,
        matched,
        top = top.as_ref().map(|t| t.client_address.as_str()).unwrap_or("-"),
        "Consumer scan complete"
    );
    Ok(top)
}

/// Bytes downloaded by the top client, or 0 when nothing matched.
pub fn top_consumer_bytes(source: LogSource, query: &ConsumerQuery) -> Result<u128, LogError> {
    Ok(top_consumer(source, query)?.map_or(0, |top| top.bytes))
}

/// Parses a `YYYY-MM-DD` date.
pub fn parse_date(value: &str) -> Result<NaiveDate, LogError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| LogError::InvalidDate(value.to_string()))
}
