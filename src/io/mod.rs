//! CSV reading and writing.

pub mod export;
pub mod ingest;
