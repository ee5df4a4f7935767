//! Admission decision analysis command.
//!
//! Reads an admission proxy log, reconstructs each admission-review
//! exchange from its incoming and outgoing records, and writes the
//! decisions made for system actors as a pretty-printed JSON array.
//!
//! # Usage
//!
//! ```bash
//! # Analyze a log, writing the filtered decisions
//! admission-log webhook.log decisions.json
//!
//! # Compressed input, plus the merged transactions before analysis
//! admission-log webhook.log.zst decisions.json --raw-output transactions.json
//!
//! # Every decision, no system-actor filter
//! admission-log webhook.log all.json --no-filter
//! ```
//!
//! # Output
//!
//! One object per kept decision with `isSkipped`, `isAllowed`, `kind`,
//! `name`, `ownerReferences`, `managedFields`, `namespace`, `userInfo`,
//! `operation` and `dryRun`. Fields missing from the log are omitted.
//! Existing output files are overwritten.

use crate::audit::analyzer::{LogAnalyzer, MissingUserInfo};
use crate::utils::processor::AdmissionLogProcessor;
use crate::utils::reader::read_to_string;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;

pub fn run(
    input: &str,
    output: &str,
    raw_output: Option<&str>,
    strict: bool,
    missing_user_info: MissingUserInfo,
    apply_filter: bool,
) -> Result<()> {
    eprintln!("Reading: {}", input);
    let content = read_to_string(input)?;

    let analyzer = if apply_filter {
        LogAnalyzer::new()
    } else {
        LogAnalyzer::unfiltered()
    };
    let analyzer = analyzer.missing_user_info(missing_user_info);

    let result = AdmissionLogProcessor::new("Decoding")
        .strict_parsing(strict)
        .analyzer(analyzer)
        .process(&content)
        .with_context(|| format!("Failed to process {}", input))?;

    result.stats.report();

    write_json(output, &result.entries)?;
    eprintln!("\nOutput written to: {}", output);

    if let Some(raw_path) = raw_output {
        write_json(raw_path, &result.transactions)?;
        eprintln!("Raw transactions written to: {}", raw_path);
    }

    println!("File parsing and writing completed successfully.");
    Ok(())
}

fn write_json<T: Serialize + ?Sized>(path: &str, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize JSON output")?;
    fs::write(path, json).with_context(|| format!("Failed to write output file: {}", path))
}
