//! Build pipeline for the stadium occupancy dashboard: reconciles scraped
//! match CSVs with the stadium roster and population tables, folds them into
//! occupancy aggregates and emits the JSON documents the frontend reads.

pub mod aggregate;
pub mod buckets;
pub mod csv_read;
pub mod export;
pub mod localtime;
pub mod names;
pub mod rankings;
pub mod records;
pub mod reference;
pub mod resolve;
