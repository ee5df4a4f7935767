//! Admission transaction selection.
//!
//! Keeps the correlated entries whose merged payload carries an
//! `AdmissionReview`, puts them back in the order their incoming records
//! were logged, and drops the ordering bookkeeping.

use super::types::{AdmissionTransaction, MergedTransaction};
use std::collections::HashMap;

/// Select completed admission-review exchanges in chronological order.
pub fn select(transactions: HashMap<String, MergedTransaction>) -> Vec<AdmissionTransaction> {
    let mut kept: Vec<MergedTransaction> = transactions
        .into_values()
        .filter(MergedTransaction::is_admission_review)
        .collect();

    kept.sort_by_key(|merged| merged.order_number);
    kept.into_iter().map(AdmissionTransaction::from).collect()
}
