//! Access-log analytics.
//!
//! Streams a gzip-compressed (or plain) combined-format access log line by
//! line and answers two questions without holding the log in memory:
//!
//! - **Window counts**: how many successful GET requests hit a site section
//!   inside an hour window on a given weekday ([`count_requests_in_window`]).
//! - **Top consumer**: which client downloaded the most bytes under a URL
//!   prefix on a given date ([`top_consumer`], [`top_consumer_bytes`]).
//!
//! The two scans treat unparsable lines differently. The window count
//! requires every line to carry an HTTP status and fails on the first one
//! that does not; the consumer scan skips lines outside the combined grammar.
//!
//! # Example
//!
//! ```rust,ignore
//! use answer_forge::logs::{count_requests_in_window, parse_clock, parse_weekday, LogSource, WindowQuery};
//!
//! let query = WindowQuery::new(
//!     "telugu",
//!     parse_clock("05:00")?,
//!     parse_clock("10:00")?,
//!     parse_weekday("Monday")?,
//! );
//! let count = count_requests_in_window(LogSource::open("s-anand.net-May-2024.gz")?, &query)?;
//! ```

pub mod consumer;
pub mod record;
pub mod source;
pub mod window;

pub use consumer::{parse_date, top_consumer, top_consumer_bytes, ConsumerQuery, TopConsumer};
pub use record::LogRecord;
pub use source::LogSource;
pub use window::{count_requests_in_window, parse_clock, parse_weekday, WindowQuery};
