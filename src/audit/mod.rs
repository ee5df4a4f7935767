//! Admission proxy log decoding and analysis.
//!
//! The pipeline runs strictly left to right:
//!
//! - [`parser`] - raw text to [`types::LogRecord`]s, dropping malformed lines
//! - [`correlator`] - pairs incoming and outgoing records by `requestId`
//! - [`selector`] - keeps admission-review exchanges in chronological order
//! - [`analyzer`] - projects and filters them into [`types::AnalyzedEntry`]s
//!
//! ## Example
//!
//! ```
//! use admission_log_tools::audit::{analyzer::LogAnalyzer, correlator, parser, selector};
//!
//! let content = r#"{"requestId":"r1","requestDirection":"incoming","msg":"{\"IsSkipped\":false}"}"#;
//! let correlation = correlator::correlate(parser::decode(content));
//! let transactions = selector::select(correlation.transactions);
//! let entries = LogAnalyzer::new().analyze(&transactions).unwrap();
//! assert!(entries.is_empty());
//! ```

pub mod analyzer;
pub mod correlator;
pub mod parser;
pub mod selector;
pub mod types;
