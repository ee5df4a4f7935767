//! Admission decision analysis.
//!
//! Projects each [`AdmissionTransaction`] into a flat [`AnalyzedEntry`] and
//! keeps only the decisions made for human-driven or control-plane system
//! actors outside OpenShift's own namespaces.
//!
//! # Projection
//!
//! | Output field | Source in merged payload |
//! |---|---|
//! | `isSkipped` | `IsSkipped` |
//! | `isAllowed` | `AdmissionReview.response.allowed` |
//! | `kind` | `request.object.kind` |
//! | `name` | `request.object.metadata.name` |
//! | `ownerReferences` | `request.object.metadata.ownerReferences` |
//! | `managedFields` | `request.object.metadata.managedFields` |
//! | `namespace` | `request.namespace` |
//! | `userInfo` | `request.userInfo` |
//! | `operation` | `request.operation` |
//! | `dryRun` | `request.dryRun` |
//!
//! Values are copied verbatim, whatever their type, and an explicit `null`
//! stays `null`. Missing paths project to absent fields; projection never
//! fails. The filter only compares string values: a non-string `kind` or
//! `namespace` never excludes an entry, and a non-string username counts
//! as missing.
//!
//! # Filter
//!
//! With the default [`FilterRules`], an entry is kept when all of these hold,
//! checked in order:
//!
//! 1. `kind` is not `Lease`, `Event` or `SubjectAccessReview`
//! 2. `namespace` does not start with `openshift` (no namespace passes)
//! 3. the username starts with `system:`
//! 4. the username does not start with `system:serviceaccount`
//! 5. the username does not start with `system:node`
//!
//! An entry that reaches step 3 without a username is handled according to
//! [`MissingUserInfo`].

use super::types::{AdmissionTransaction, AnalyzedEntry};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("admission transaction #{position} (requestId {request_id:?}) has no userInfo.username")]
    MissingUsername {
        position: usize,
        request_id: Option<String>,
    },
}

/// What to do with a transaction whose `userInfo.username` is absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissingUserInfo {
    /// The entry fails the filter and is left out of the output
    #[default]
    Exclude,
    /// Analysis stops with [`AnalyzeError::MissingUsername`]
    Error,
}

/// Business rules deciding which analyzed entries are reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterRules {
    pub excluded_kinds: Vec<String>,
    pub excluded_namespace_prefix: String,
    pub required_user_prefix: String,
    pub excluded_user_prefixes: Vec<String>,
}

impl Default for FilterRules {
    fn default() -> Self {
        Self {
            excluded_kinds: ["Lease", "Event", "SubjectAccessReview"]
                .map(String::from)
                .to_vec(),
            excluded_namespace_prefix: "openshift".to_string(),
            required_user_prefix: "system:".to_string(),
            excluded_user_prefixes: ["system:serviceaccount", "system:node"]
                .map(String::from)
                .to_vec(),
        }
    }
}

/// Outcome of checking the kind and namespace rules.
enum Scope {
    Excluded,
    NeedsUser,
}

impl FilterRules {
    fn scope(&self, entry: &AnalyzedEntry) -> Scope {
        let kind_excluded = entry
            .kind()
            .is_some_and(|kind| self.excluded_kinds.iter().any(|k| k == kind));
        let namespace_excluded = entry
            .namespace()
            .is_some_and(|ns| ns.starts_with(&self.excluded_namespace_prefix));

        if kind_excluded || namespace_excluded {
            Scope::Excluded
        } else {
            Scope::NeedsUser
        }
    }

    /// Whether a username identifies an actor worth reporting.
    pub fn accepts_user(&self, username: &str) -> bool {
        username.starts_with(&self.required_user_prefix)
            && !self
                .excluded_user_prefixes
                .iter()
                .any(|prefix| username.starts_with(prefix.as_str()))
    }
}

/// Projects one transaction into its analysis shape.
pub fn project(transaction: &AdmissionTransaction) -> AnalyzedEntry {
    let at = |pointer: &str| transaction.payload_at(pointer).cloned();

    AnalyzedEntry {
        is_skipped: at("/IsSkipped"),
        is_allowed: at("/AdmissionReview/response/allowed"),
        kind: at("/request/object/kind"),
        name: at("/request/object/metadata/name"),
        owner_references: at("/request/object/metadata/ownerReferences"),
        managed_fields: at("/request/object/metadata/managedFields"),
        namespace: at("/request/namespace"),
        user_info: at("/request/userInfo"),
        operation: at("/request/operation"),
        dry_run: at("/request/dryRun"),
    }
}

/// Runs projection and filtering over a transaction sequence.
#[derive(Debug, Clone)]
pub struct LogAnalyzer {
    rules: Option<FilterRules>,
    missing_user_info: MissingUserInfo,
}

impl Default for LogAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl LogAnalyzer {
    /// Analyzer applying the default filter rules.
    pub fn new() -> Self {
        Self {
            rules: Some(FilterRules::default()),
            missing_user_info: MissingUserInfo::default(),
        }
    }

    /// Analyzer that reports every projected entry.
    pub fn unfiltered() -> Self {
        Self {
            rules: None,
            missing_user_info: MissingUserInfo::default(),
        }
    }

    #[must_use]
    pub fn rules(mut self, rules: FilterRules) -> Self {
        self.rules = Some(rules);
        self
    }

    #[must_use]
    pub fn missing_user_info(mut self, policy: MissingUserInfo) -> Self {
        self.missing_user_info = policy;
        self
    }

    /// Decide whether `entry` belongs in the output.
    ///
    /// `position` and `request_id` only feed the error message.
    pub fn keep(
        &self,
        entry: &AnalyzedEntry,
        position: usize,
        request_id: Option<&str>,
    ) -> Result<bool, AnalyzeError> {
        let Some(rules) = &self.rules else {
            return Ok(true);
        };
        if let Scope::Excluded = rules.scope(entry) {
            return Ok(false);
        }

        match (entry.username(), self.missing_user_info) {
            (Some(username), _) => Ok(rules.accepts_user(username)),
            (None, MissingUserInfo::Exclude) => {
                debug!(position, ?request_id, "excluding transaction without userInfo.username");
                Ok(false)
            }
            (None, MissingUserInfo::Error) => Err(AnalyzeError::MissingUsername {
                position,
                request_id: request_id.map(str::to_owned),
            }),
        }
    }

    /// Project every transaction and keep the ones passing the filter, in order.
    pub fn analyze(
        &self,
        transactions: &[AdmissionTransaction],
    ) -> Result<Vec<AnalyzedEntry>, AnalyzeError> {
        let mut entries = Vec::with_capacity(transactions.len());
        for (position, transaction) in transactions.iter().enumerate() {
            let entry = project(transaction);
            if self.keep(&entry, position, transaction.request_id())? {
                entries.push(entry);
            }
        }
        Ok(entries)
    }
}
