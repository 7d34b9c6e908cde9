//! Core domain types
//!
//! These types describe what the remote ETL system reports back: jobs and their
//! statuses, and the data read back from a model. They are shared between the
//! client library (which decodes them) and the CLI (which displays them).

pub mod export;
pub mod job;
