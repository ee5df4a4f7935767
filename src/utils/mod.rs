//! Utility functions and helpers.
//!
//! - [`processor`] - runs the whole pipeline with progress and statistics
//! - [`reader`] - file reader with automatic decompression
//! - [`progress`] - progress bar wrapper
//! - [`format`] - number formatting for summaries
//! - [`time`] - zap timestamp decoding and display

pub mod format;
pub mod processor;
pub mod progress;
pub mod reader;
pub mod time;
