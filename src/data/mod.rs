//! Dataset and population sources: the file-backed fetch cache and the
//! synthetic sample generator.

pub mod sample;
pub mod source;

pub use sample::generate_sample;
pub use source::DataCache;
