//! File reading with automatic decompression.
//!
//! Proxy logs are often rotated and compressed before anyone gets to look
//! at them, so `.gz` and `.zst` inputs are decompressed transparently.
//!
//! # Examples
//!
//! ```no_run
//! use admission_log_tools::utils::reader::read_to_string;
//!
//! let content = read_to_string("webhook.log.gz").unwrap();
//! println!("{} bytes of log text", content.len());
//! ```

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Opens a file, wrapping it in a decoder chosen by extension.
///
/// - `.gz` → Gzip
/// - `.zst` → Zstandard
/// - anything else → read as is
pub fn open_file(path: impl AsRef<Path>) -> Result<Box<dyn Read + Send>> {
    let path = path.as_ref();
    let file =
        File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;

    match path.extension().and_then(|e| e.to_str()) {
        Some("gz") => Ok(Box::new(GzDecoder::new(file))),
        Some("zst") => {
            let decoder = zstd::Decoder::new(file).with_context(|| {
                format!("Failed to create zstd decoder for: {}", path.display())
            })?;
            Ok(Box::new(decoder))
        }
        _ => Ok(Box::new(file)),
    }
}

/// Reads a whole (possibly compressed) file as UTF-8 text.
pub fn read_to_string(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let mut content = String::new();
    open_file(path)?
        .read_to_string(&mut content)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    Ok(content)
}
