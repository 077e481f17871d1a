//! Phonetic city-name resolution.
//!
//! Sales data often spells the same city several ways ("Tokyo", "Tokio").
//! This module groups such variants without a reference list of cities:
//!
//! 1. **Encoding**: each city is reduced to its Double Metaphone primary code
//!    ([`metaphone`]).
//! 2. **Clustering**: codes are compared with a 0-100 Indel similarity
//!    ([`similarity`]); a record joins the first cluster whose
//!    representative scores at least the threshold ([`cluster`]).
//! 3. **Aggregation**: a query city is resolved to its cluster's canonical
//!    name and matching sales are summed ([`sales`]).
//!
//! Clustering is a sequential fold; record order affects the outcome.

pub mod cluster;
pub mod metaphone;
pub mod sales;
pub mod similarity;

pub use cluster::{CityCluster, CityClusters};
pub use metaphone::{DoubleMetaphone, PhoneticCodes};
pub use sales::{
    aggregate, annotate, load_sales, parse_sales, total_units, total_units_from_file,
    AnnotatedSale, SalesQuery, SalesRecord, SalesTotal,
};
pub use similarity::ratio;
