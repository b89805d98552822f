//! Document lifecycle vocabulary and transition rules.
//!
//! A document moves through a fixed set of statuses driven by named actions.
//! [`DocumentStatus::apply`] is the single authority on which transitions are
//! legal; the persistence layer executes whatever it returns and never
//! mutates `status` on its own. Statuses and actions are stored as their
//! SCREAMING_SNAKE_CASE string forms in the database.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Lifecycle status of a document.
///
/// `Deleted` is reserved: it is representable (and stored values round-trip)
/// but no transition produces it. Removal from listings is the `is_delete`
/// flag, which is orthogonal to the status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentStatus {
    PendingApproval,
    Active,
    Inactive,
    Rejected,
    PendingDelete,
    Deleted,
}

impl DocumentStatus {
    /// Status assigned to a freshly created document.
    pub fn initial() -> Self {
        DocumentStatus::PendingApproval
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DocumentStatus::PendingApproval => "PENDING_APPROVAL",
            DocumentStatus::Active => "ACTIVE",
            DocumentStatus::Inactive => "INACTIVE",
            DocumentStatus::Rejected => "REJECTED",
            DocumentStatus::PendingDelete => "PENDING_DELETE",
            DocumentStatus::Deleted => "DELETED",
        }
    }

    /// Apply `action` to this status, returning the successor status.
    ///
    /// Any `(status, action)` pair outside the transition table fails with
    /// [`CoreError::IllegalTransition`]; there is no silent no-op.
    pub fn apply(self, action: DocumentAction) -> Result<DocumentStatus, CoreError> {
        use DocumentAction as A;
        use DocumentStatus as S;

        let next = match (self, action) {
            (S::PendingApproval, A::Approve) => S::Active,
            (S::PendingApproval, A::Reject) => S::Rejected,
            (S::Active, A::SubmitVersion) => S::PendingApproval,
            (S::Active, A::UpdateMetadata) => S::PendingApproval,
            (S::Active, A::Deactivate) => S::Inactive,
            (S::Active, A::RequestDelete) => S::PendingDelete,
            (S::PendingDelete, A::ApproveDelete) => S::Inactive,
            (S::PendingDelete, A::RejectDelete) => S::Active,
            (S::Inactive, A::RequestReactivate) => S::PendingApproval,
            (status, action) => return Err(CoreError::IllegalTransition { status, action }),
        };
        Ok(next)
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING_APPROVAL" => Ok(DocumentStatus::PendingApproval),
            "ACTIVE" => Ok(DocumentStatus::Active),
            "INACTIVE" => Ok(DocumentStatus::Inactive),
            "REJECTED" => Ok(DocumentStatus::Rejected),
            "PENDING_DELETE" => Ok(DocumentStatus::PendingDelete),
            "DELETED" => Ok(DocumentStatus::Deleted),
            other => Err(CoreError::Internal(format!(
                "Unknown document status '{other}' in store"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// Named lifecycle action, recorded verbatim in the action log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentAction {
    Create,
    SubmitVersion,
    Approve,
    Reject,
    Deactivate,
    RequestDelete,
    ApproveDelete,
    RejectDelete,
    UpdateMetadata,
    RequestReactivate,
    SoftDelete,
    Restore,
}

impl DocumentAction {
    pub fn as_str(self) -> &'static str {
        match self {
            DocumentAction::Create => "CREATE",
            DocumentAction::SubmitVersion => "SUBMIT_VERSION",
            DocumentAction::Approve => "APPROVE",
            DocumentAction::Reject => "REJECT",
            DocumentAction::Deactivate => "DEACTIVATE",
            DocumentAction::RequestDelete => "REQUEST_DELETE",
            DocumentAction::ApproveDelete => "APPROVE_DELETE",
            DocumentAction::RejectDelete => "REJECT_DELETE",
            DocumentAction::UpdateMetadata => "UPDATE_METADATA",
            DocumentAction::RequestReactivate => "REQUEST_REACTIVATE",
            DocumentAction::SoftDelete => "SOFT_DELETE",
            DocumentAction::Restore => "RESTORE",
        }
    }

    /// Whether this action reserves and records a new version number.
    pub fn records_version(self) -> bool {
        matches!(self, DocumentAction::Create | DocumentAction::SubmitVersion)
    }

    /// Whether this action is routable through the generic status-change
    /// entry point. CREATE and SUBMIT_VERSION have dedicated operations;
    /// UPDATE_METADATA, SOFT_DELETE and RESTORE carry payloads of their own.
    pub fn is_status_change(self) -> bool {
        matches!(
            self,
            DocumentAction::Approve
                | DocumentAction::Reject
                | DocumentAction::Deactivate
                | DocumentAction::RequestDelete
                | DocumentAction::ApproveDelete
                | DocumentAction::RejectDelete
                | DocumentAction::RequestReactivate
        )
    }
}

impl fmt::Display for DocumentAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentAction {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CREATE" => Ok(DocumentAction::Create),
            "SUBMIT_VERSION" => Ok(DocumentAction::SubmitVersion),
            "APPROVE" => Ok(DocumentAction::Approve),
            "REJECT" => Ok(DocumentAction::Reject),
            "DEACTIVATE" => Ok(DocumentAction::Deactivate),
            "REQUEST_DELETE" => Ok(DocumentAction::RequestDelete),
            "APPROVE_DELETE" => Ok(DocumentAction::ApproveDelete),
            "REJECT_DELETE" => Ok(DocumentAction::RejectDelete),
            "UPDATE_METADATA" => Ok(DocumentAction::UpdateMetadata),
            "REQUEST_REACTIVATE" => Ok(DocumentAction::RequestReactivate),
            "SOFT_DELETE" => Ok(DocumentAction::SoftDelete),
            "RESTORE" => Ok(DocumentAction::Restore),
            other => Err(CoreError::Validation(format!(
                "Unknown document action '{other}'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Visibility scope
// ---------------------------------------------------------------------------

/// Audience a document is published to. A document without a scope is
/// unrestricted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VisibilityScope {
    Public,
    Resident,
    Receptionist,
    Accounting,
}

impl VisibilityScope {
    pub const ALL: &'static [VisibilityScope] = &[
        VisibilityScope::Public,
        VisibilityScope::Resident,
        VisibilityScope::Receptionist,
        VisibilityScope::Accounting,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            VisibilityScope::Public => "PUBLIC",
            VisibilityScope::Resident => "RESIDENT",
            VisibilityScope::Receptionist => "RECEPTIONIST",
            VisibilityScope::Accounting => "ACCOUNTING",
        }
    }
}

impl FromStr for VisibilityScope {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PUBLIC" => Ok(VisibilityScope::Public),
            "RESIDENT" => Ok(VisibilityScope::Resident),
            "RECEPTIONIST" => Ok(VisibilityScope::Receptionist),
            "ACCOUNTING" => Ok(VisibilityScope::Accounting),
            other => Err(CoreError::Validation(format!(
                "Invalid visibility scope '{other}'. Must be one of: PUBLIC, RESIDENT, RECEPTIONIST, ACCOUNTING"
            ))),
        }
    }
}

impl fmt::Display for VisibilityScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Input normalization
// ---------------------------------------------------------------------------

/// Minimum length of a normalized document title.
pub const MIN_TITLE_LEN: usize = 3;

/// Collapse runs of whitespace into single spaces and trim the ends.
fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalize and validate a document title.
pub fn normalize_title(title: &str) -> Result<String, CoreError> {
    let cleaned = collapse_whitespace(title);
    if cleaned.is_empty() {
        return Err(CoreError::Validation("Title must not be empty".into()));
    }
    if cleaned.chars().count() < MIN_TITLE_LEN {
        return Err(CoreError::Validation(format!(
            "Title must be at least {MIN_TITLE_LEN} characters"
        )));
    }
    Ok(cleaned)
}

/// Normalize and validate a document category.
pub fn normalize_category(category: &str) -> Result<String, CoreError> {
    let cleaned = collapse_whitespace(category);
    if cleaned.is_empty() {
        return Err(CoreError::Validation("Category must not be empty".into()));
    }
    Ok(cleaned)
}

/// Normalize an optional visibility scope. Blank input means unrestricted.
pub fn normalize_visibility_scope(scope: Option<&str>) -> Result<Option<String>, CoreError> {
    match scope {
        None => Ok(None),
        Some(raw) => {
            let cleaned = collapse_whitespace(raw);
            if cleaned.is_empty() {
                return Ok(None);
            }
            let parsed: VisibilityScope = cleaned.parse()?;
            Ok(Some(parsed.as_str().to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    const ALL_STATUSES: &[DocumentStatus] = &[
        DocumentStatus::PendingApproval,
        DocumentStatus::Active,
        DocumentStatus::Inactive,
        DocumentStatus::Rejected,
        DocumentStatus::PendingDelete,
        DocumentStatus::Deleted,
    ];

    const ALL_ACTIONS: &[DocumentAction] = &[
        DocumentAction::Create,
        DocumentAction::SubmitVersion,
        DocumentAction::Approve,
        DocumentAction::Reject,
        DocumentAction::Deactivate,
        DocumentAction::RequestDelete,
        DocumentAction::ApproveDelete,
        DocumentAction::RejectDelete,
        DocumentAction::UpdateMetadata,
        DocumentAction::RequestReactivate,
        DocumentAction::SoftDelete,
        DocumentAction::Restore,
    ];

    /// The complete legal transition table.
    const LEGAL: &[(DocumentStatus, DocumentAction, DocumentStatus)] = &[
        (
            DocumentStatus::PendingApproval,
            DocumentAction::Approve,
            DocumentStatus::Active,
        ),
        (
            DocumentStatus::PendingApproval,
            DocumentAction::Reject,
            DocumentStatus::Rejected,
        ),
        (
            DocumentStatus::Active,
            DocumentAction::SubmitVersion,
            DocumentStatus::PendingApproval,
        ),
        (
            DocumentStatus::Active,
            DocumentAction::UpdateMetadata,
            DocumentStatus::PendingApproval,
        ),
        (
            DocumentStatus::Active,
            DocumentAction::Deactivate,
            DocumentStatus::Inactive,
        ),
        (
            DocumentStatus::Active,
            DocumentAction::RequestDelete,
            DocumentStatus::PendingDelete,
        ),
        (
            DocumentStatus::PendingDelete,
            DocumentAction::ApproveDelete,
            DocumentStatus::Inactive,
        ),
        (
            DocumentStatus::PendingDelete,
            DocumentAction::RejectDelete,
            DocumentStatus::Active,
        ),
        (
            DocumentStatus::Inactive,
            DocumentAction::RequestReactivate,
            DocumentStatus::PendingApproval,
        ),
    ];

    #[test]
    fn test_legal_transitions_match_table() {
        for &(from, action, to) in LEGAL {
            assert_eq!(
                from.apply(action).unwrap(),
                to,
                "{from} --{action}--> should be {to}"
            );
        }
    }

    #[test]
    fn test_every_pair_outside_table_is_illegal() {
        for &status in ALL_STATUSES {
            for &action in ALL_ACTIONS {
                let in_table = LEGAL.iter().any(|&(f, a, _)| f == status && a == action);
                if in_table {
                    continue;
                }
                assert_matches!(
                    status.apply(action),
                    Err(CoreError::IllegalTransition { status: s, action: a })
                        if s == status && a == action,
                    "{status} --{action}--> must be illegal"
                );
            }
        }
    }

    #[test]
    fn test_initial_status_is_pending_approval() {
        assert_eq!(DocumentStatus::initial(), DocumentStatus::PendingApproval);
    }

    #[test]
    fn test_rejected_is_terminal() {
        for &action in ALL_ACTIONS {
            assert!(DocumentStatus::Rejected.apply(action).is_err());
        }
    }

    #[test]
    fn test_deleted_is_unreachable() {
        for &(_, _, to) in LEGAL {
            assert_ne!(to, DocumentStatus::Deleted);
        }
        // And nothing leads out of it either.
        for &action in ALL_ACTIONS {
            assert!(DocumentStatus::Deleted.apply(action).is_err());
        }
    }

    #[test]
    fn test_status_string_round_trip() {
        for &status in ALL_STATUSES {
            assert_eq!(status.as_str().parse::<DocumentStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_action_string_round_trip() {
        for &action in ALL_ACTIONS {
            assert_eq!(action.as_str().parse::<DocumentAction>().unwrap(), action);
        }
    }

    #[test]
    fn test_unknown_status_string_is_internal_error() {
        assert_matches!(
            "NOT_A_STATUS".parse::<DocumentStatus>(),
            Err(CoreError::Internal(_))
        );
    }

    #[test]
    fn test_records_version_only_for_create_and_submit() {
        for &action in ALL_ACTIONS {
            let expected = matches!(
                action,
                DocumentAction::Create | DocumentAction::SubmitVersion
            );
            assert_eq!(action.records_version(), expected, "{action}");
        }
    }

    #[test]
    fn test_status_change_actions() {
        assert!(DocumentAction::Approve.is_status_change());
        assert!(DocumentAction::RequestReactivate.is_status_change());
        assert!(!DocumentAction::Create.is_status_change());
        assert!(!DocumentAction::SubmitVersion.is_status_change());
        assert!(!DocumentAction::UpdateMetadata.is_status_change());
        assert!(!DocumentAction::SoftDelete.is_status_change());
        assert!(!DocumentAction::Restore.is_status_change());
    }

    #[test]
    fn test_normalize_title_collapses_whitespace() {
        assert_eq!(
            normalize_title("  House   Rules \t 2026 ").unwrap(),
            "House Rules 2026"
        );
    }

    #[test]
    fn test_normalize_title_rejects_short_and_empty() {
        assert_matches!(normalize_title("   "), Err(CoreError::Validation(_)));
        assert_matches!(normalize_title("ab"), Err(CoreError::Validation(_)));
        assert!(normalize_title("abc").is_ok());
    }

    #[test]
    fn test_normalize_category() {
        assert_eq!(normalize_category(" POLICY  ").unwrap(), "POLICY");
        assert_matches!(normalize_category(""), Err(CoreError::Validation(_)));
    }

    #[test]
    fn test_visibility_scope_parse_case_insensitive() {
        assert_eq!(
            normalize_visibility_scope(Some("resident")).unwrap(),
            Some("RESIDENT".to_string())
        );
        assert_eq!(normalize_visibility_scope(Some("  ")).unwrap(), None);
        assert_eq!(normalize_visibility_scope(None).unwrap(), None);
        assert_matches!(
            normalize_visibility_scope(Some("EVERYONE")),
            Err(CoreError::Validation(_))
        );
    }
}
