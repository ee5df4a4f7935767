//! # Admission Log Tools
//!
//! Command-line tools for reconstructing Kubernetes admission webhook
//! decisions from the logs of an admission-control proxy.
//!
//! ## Overview
//!
//! The proxy logs every admission review twice: once when the request
//! arrives (`requestDirection: incoming`, payload is the `AdmissionReview`
//! request) and once when the verdict is sent back (`requestDirection:
//! outgoing`, payload carries the `AdmissionReview` response and whether the
//! webhook skipped evaluation). Both lines share a `requestId`, and both
//! carry their payload as JSON text inside the zap `msg` field.
//!
//! This crate decodes such a log, pairs the two halves of each exchange,
//! restores the order requests arrived in, and reduces every exchange to a
//! flat record describing who asked for what and whether it was allowed.
//!
//! ## Architecture
//!
//! - [`audit`] - record types and the decode → correlate → select → analyze pipeline
//! - [`commands`] - command implementations (file I/O around the pipeline)
//! - [`utils`] - pipeline driver, compressed-file reading, progress, formatting, time
//!
//! ## Example Usage
//!
//! ```bash
//! # Decisions made for system actors, as a JSON array
//! admission-log webhook.log decisions.json
//!
//! # Gzip/Zstandard input is decompressed transparently
//! admission-log webhook.log.gz decisions.json
//!
//! # Keep the merged request/response records too
//! admission-log webhook.log decisions.json --raw-output transactions.json
//!
//! # Fail loudly on lines that are not valid records
//! admission-log webhook.log decisions.json --strict
//! ```

pub mod audit;
pub mod commands;
pub mod utils;
