//! Pipeline driver for admission proxy logs.
//!
//! [`AdmissionLogProcessor`] runs the full decode → correlate → select →
//! analyze pipeline over in-memory log text, tracking progress and
//! collecting the statistics reported to the operator.

use crate::audit::analyzer::LogAnalyzer;
use crate::audit::correlator::{correlate, CorrelationStats};
use crate::audit::parser::{decode_line, numbered_lines};
use crate::audit::selector::select;
use crate::audit::types::{AdmissionTransaction, AnalyzedEntry, LogRecord};
use crate::utils::format::{format_number, format_percentage};
use crate::utils::progress::ProgressBar;
use crate::utils::time::{duration_human, format_timestamp};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::{debug, trace};

/// Statistics collected during one pipeline run
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ProcessStats {
    /// Lines in the input, counting the empty one after a trailing newline
    pub total_lines: usize,
    pub blank_lines: usize,
    /// Lines decoded into log records
    pub parsed_entries: usize,
    /// Non-blank lines that failed to decode
    pub skipped_lines: usize,
    pub correlation: CorrelationStats,
    pub admission_transactions: usize,
    /// Entries that survived the filter and will be written
    pub analyzed_entries: usize,
    pub first_seen: Option<DateTime<Utc>>,
    pub last_seen: Option<DateTime<Utc>>,
}

impl ProcessStats {
    fn observe(&mut self, record: &LogRecord) {
        self.parsed_entries += 1;
        if let Some(ts) = record.logged_at() {
            self.first_seen = Some(self.first_seen.map_or(ts, |seen| seen.min(ts)));
            self.last_seen = Some(self.last_seen.map_or(ts, |seen| seen.max(ts)));
        }
    }

    /// Print a summary of processing statistics to stderr
    pub fn report(&self) {
        let non_blank = self.total_lines - self.blank_lines;
        let c = &self.correlation;

        eprintln!("\nProcessing Summary:");
        eprintln!("  Total lines: {}", format_number(self.total_lines));
        eprintln!("  Parsed entries: {}", format_number(self.parsed_entries));
        if self.skipped_lines > 0 {
            eprintln!(
                "  Skipped lines: {} ({})",
                format_number(self.skipped_lines),
                format_percentage(self.skipped_lines, non_blank)
            );
        }
        eprintln!("  Records with requestId: {}", format_number(c.keyed_records));
        eprintln!("    Incoming: {}", format_number(c.incoming));
        eprintln!("    Outgoing merged: {}", format_number(c.merged_outgoing));
        if c.unmatched_outgoing > 0 {
            eprintln!("    Outgoing unmatched: {}", format_number(c.unmatched_outgoing));
        }
        if c.overwritten_incoming > 0 {
            eprintln!(
                "    Incoming overwritten: {}",
                format_number(c.overwritten_incoming)
            );
        }
        if c.ignored_direction > 0 {
            eprintln!("    Other direction: {}", format_number(c.ignored_direction));
        }
        eprintln!(
            "  Admission transactions: {}",
            format_number(self.admission_transactions)
        );
        eprintln!("  Entries written: {}", format_number(self.analyzed_entries));
        if let (Some(first), Some(last)) = (self.first_seen, self.last_seen) {
            eprintln!(
                "  Time range: {} to {} ({})",
                format_timestamp(&first),
                format_timestamp(&last),
                duration_human(&first, &last)
            );
        }
    }
}

/// Everything one pipeline run produces.
#[derive(Debug)]
pub struct ProcessOutput {
    /// Admission transactions in chronological order, before analysis
    pub transactions: Vec<AdmissionTransaction>,
    /// Analyzed entries that passed the filter, in the same order
    pub entries: Vec<AnalyzedEntry>,
    pub stats: ProcessStats,
}

/// Runs the admission log pipeline over log text.
///
/// # Examples
///
/// ```
/// use admission_log_tools::utils::processor::AdmissionLogProcessor;
///
/// let output = AdmissionLogProcessor::new("Decoding").process("").unwrap();
/// assert!(output.entries.is_empty());
/// assert_eq!(output.stats.total_lines, 1);
/// ```
pub struct AdmissionLogProcessor {
    progress_label: String,
    strict_parsing: bool,
    analyzer: LogAnalyzer,
}

impl AdmissionLogProcessor {
    pub fn new(progress_label: &str) -> Self {
        Self {
            progress_label: progress_label.to_string(),
            strict_parsing: false,
            analyzer: LogAnalyzer::new(),
        }
    }

    /// Enable strict parsing mode (fail on the first undecodable non-blank line)
    #[must_use]
    pub fn strict_parsing(mut self, strict: bool) -> Self {
        self.strict_parsing = strict;
        self
    }

    #[must_use]
    pub fn analyzer(mut self, analyzer: LogAnalyzer) -> Self {
        self.analyzer = analyzer;
        self
    }

    pub fn process(&self, content: &str) -> Result<ProcessOutput> {
        let mut stats = ProcessStats::default();
        let records = self.decode_all(content, &mut stats)?;

        let correlation = correlate(records);
        stats.correlation = correlation.stats;
        debug!(
            correlated = correlation.transactions.len(),
            "correlated records by requestId"
        );

        let transactions = select(correlation.transactions);
        stats.admission_transactions = transactions.len();

        let entries = self
            .analyzer
            .analyze(&transactions)
            .context("Failed to analyze admission transactions")?;
        stats.analyzed_entries = entries.len();
        debug!(
            transactions = transactions.len(),
            entries = entries.len(),
            "analysis complete"
        );

        Ok(ProcessOutput {
            transactions,
            entries,
            stats,
        })
    }

    fn decode_all(&self, content: &str, stats: &mut ProcessStats) -> Result<Vec<LogRecord>> {
        let progress = ProgressBar::new(content.len(), &self.progress_label);
        let mut records = Vec::new();
        let mut bytes_read = 0;

        for (line_number, line) in numbered_lines(content) {
            stats.total_lines += 1;
            bytes_read += line.len() + 1;

            if line_number % 10_000 == 0 {
                progress.update(bytes_read.min(content.len()));
            }

            if line.trim().is_empty() {
                stats.blank_lines += 1;
                continue;
            }

            match decode_line(line_number, line) {
                Ok(record) => {
                    stats.observe(&record);
                    records.push(record);
                }
                Err(err) if self.strict_parsing => {
                    progress.abandon();
                    return Err(err).context("Strict parsing rejected the input");
                }
                Err(err) => {
                    stats.skipped_lines += 1;
                    trace!(line = line_number, error = %err.source, "skipping undecodable line");
                }
            }
        }

        progress.finish();
        Ok(records)
    }
}
