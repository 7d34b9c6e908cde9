//! Data Transfer Objects for the public ETL API
//!
//! Request bodies sent by the client and the small response envelopes it
//! decodes before handing domain types to callers.

pub mod export;
pub mod job;
