//! Command implementations.
//!
//! - [`analyze`] - reconstruct admission decisions from a proxy log and write them as JSON

pub mod analyze;
