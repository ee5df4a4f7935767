//! Request correlation.
//!
//! Incoming and outgoing records for the same admission request are logged
//! separately. This module pairs them by `requestId`, merging the outgoing
//! payload into the incoming one.
//!
//! Rules, applied in line order:
//!
//! - records without a `requestId` are dropped before numbering
//! - an `incoming` record replaces whatever was stored for its id (last write wins)
//! - an `outgoing` record is merged into the stored entry, or dropped if none
//!   exists or the stored payload is falsy (`null`, `""`, ...)
//! - any other direction is ignored

use super::types::{Direction, LogRecord, MergedTransaction};
use std::collections::HashMap;
use tracing::debug;

/// Counters describing what correlation did with each keyed record.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CorrelationStats {
    /// Records that carried a non-empty `requestId`
    pub keyed_records: usize,
    pub incoming: usize,
    /// Outgoing records merged into a stored incoming entry
    pub merged_outgoing: usize,
    /// Outgoing records with no incoming entry, or no payload, to merge into
    pub unmatched_outgoing: usize,
    /// Incoming records that replaced an earlier one with the same id
    pub overwritten_incoming: usize,
    /// Records whose direction was neither `incoming` nor `outgoing`
    pub ignored_direction: usize,
}

/// Result of one correlation pass.
#[derive(Debug, Default)]
pub struct Correlation {
    pub transactions: HashMap<String, MergedTransaction>,
    pub stats: CorrelationStats,
}

/// Correlate decoded records by request id.
///
/// Each keyed record is numbered by its position among keyed records; an
/// entry keeps the number of the incoming record that created it.
pub fn correlate<I>(records: I) -> Correlation
where
    I: IntoIterator<Item = LogRecord>,
{
    let mut correlation = Correlation::default();
    let keyed = records
        .into_iter()
        .filter_map(|record| Some((record.request_id()?.to_owned(), record)))
        .enumerate();

    for (order_number, (request_id, record)) in keyed {
        correlation.stats.keyed_records += 1;

        match record.direction() {
            Direction::Incoming => {
                correlation.stats.incoming += 1;
                let replaced = correlation
                    .transactions
                    .insert(request_id, MergedTransaction::new(order_number, record));
                if let Some(previous) = replaced {
                    correlation.stats.overwritten_incoming += 1;
                    debug!(
                        request_id = previous.record.request_id().unwrap_or_default(),
                        "incoming record replaced an earlier one with the same id"
                    );
                }
            }
            Direction::Outgoing => {
                let merged = correlation
                    .transactions
                    .get_mut(&request_id)
                    .map(|entry| entry.merge_outgoing(record.msg));
                match merged {
                    Some(true) => correlation.stats.merged_outgoing += 1,
                    Some(false) => {
                        correlation.stats.unmatched_outgoing += 1;
                        debug!(%request_id, "dropping outgoing record for an entry without payload");
                    }
                    None => {
                        correlation.stats.unmatched_outgoing += 1;
                        debug!(%request_id, "dropping outgoing record with no incoming counterpart");
                    }
                }
            }
            Direction::Other => correlation.stats.ignored_direction += 1,
        }
    }

    correlation
}
