//! Role-elevation requests and their decision state machine.

use chrono::{DateTime, Utc};
use common::RequestId;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// The privilege level a user is petitioning for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestType {
    Chef,
    Admin,
}

impl RequestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestType::Chef => "chef",
            RequestType::Admin => "admin",
        }
    }
}

impl std::fmt::Display for RequestType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Decision state of a request.
///
/// State transitions: `pending → {approved, rejected}`, both terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    /// Returns true if an admin decision has been applied.
    pub fn is_decided(&self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A user's petition to be elevated to chef or admin privilege.
///
/// At most one pending request may exist per (requester, type) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleRequest {
    pub id: RequestId,
    pub requester_email: String,
    pub request_type: RequestType,
    pub status: RequestStatus,
    pub requested_at: DateTime<Utc>,
}

impl RoleRequest {
    /// Opens a new pending request.
    pub fn open(new: NewRoleRequest, now: DateTime<Utc>) -> Self {
        RoleRequest {
            id: RequestId::new(),
            requester_email: new.requester_email,
            request_type: new.request_type,
            status: RequestStatus::Pending,
            requested_at: now,
        }
    }
}

/// Request-creation payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewRoleRequest {
    pub requester_email: String,
    pub request_type: RequestType,
}

impl NewRoleRequest {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.requester_email.trim().is_empty() {
            return Err(DomainError::Validation {
                field: "requester_email",
                reason: "must not be empty".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_requests_start_pending() {
        let req = RoleRequest::open(
            NewRoleRequest {
                requester_email: "bob@example.com".into(),
                request_type: RequestType::Chef,
            },
            Utc::now(),
        );
        assert_eq!(req.status, RequestStatus::Pending);
        assert!(!req.status.is_decided());
    }

    #[test]
    fn decided_statuses() {
        assert!(RequestStatus::Approved.is_decided());
        assert!(RequestStatus::Rejected.is_decided());
        assert!(!RequestStatus::Pending.is_decided());
    }

    #[test]
    fn wire_casing() {
        assert_eq!(
            serde_json::to_string(&RequestType::Chef).unwrap(),
            "\"chef\""
        );
        assert_eq!(
            serde_json::to_string(&RequestStatus::Rejected).unwrap(),
            "\"rejected\""
        );
    }

    #[test]
    fn payload_rejects_status_injection() {
        let json = serde_json::json!({
            "requester_email": "bob@example.com",
            "request_type": "admin",
            "status": "approved"
        });
        assert!(serde_json::from_value::<NewRoleRequest>(json).is_err());
    }
}
