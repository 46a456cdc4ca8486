//! Shared domain types.

mod types;

pub use types::{
    DatasetStats, EnrichedRecord, Metric, RawRecord, SnapshotConfig, DEFAULT_FRAME_DELAY_MS,
};
