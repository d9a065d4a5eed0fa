use std::str::FromStr;

use guardian_core::AppError;
use serde::{Deserialize, Serialize};

/// Operations a permission can authorize on a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Create a record of the resource.
    Create,
    /// Read records of the resource.
    Read,
    /// Update records of the resource.
    Update,
    /// Delete records of the resource.
    Delete,
}

impl Operation {
    /// Returns a stable storage value for this operation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }

    /// Returns all known operations.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Operation] = &[
            Operation::Create,
            Operation::Read,
            Operation::Update,
            Operation::Delete,
        ];

        ALL
    }

    /// Parses a transport value into an operation.
    pub fn from_transport(value: &str) -> Result<Self, AppError> {
        Self::from_str(value)
    }
}

impl FromStr for Operation {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "create" => Ok(Self::Create),
            "read" => Ok(Self::Read),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            _ => Err(AppError::Validation(format!(
                "unknown operation value '{value}'"
            ))),
        }
    }
}

/// Outcome categories of an access check, aligned with HTTP status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessStatus {
    /// Access granted.
    Ok,
    /// Malformed or missing input.
    BadRequest,
    /// Access denied by the permission graph.
    Forbidden,
    /// Target resource does not exist.
    NotFound,
    /// Store failure during resolution.
    Error,
}

impl AccessStatus {
    /// Returns the HTTP status code this outcome maps to.
    #[must_use]
    pub fn as_u16(&self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::BadRequest => 400,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::Error => 500,
        }
    }
}

/// Result of resolving one access check.
///
/// The reason string is part of the caller-facing contract and is stable for
/// every denial path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessDecision {
    /// Whether access is granted.
    pub access_granted: bool,
    /// Human-readable explanation of the outcome.
    pub reason: String,
    /// Outcome category.
    pub status: AccessStatus,
}

impl AccessDecision {
    /// Creates a granting decision.
    #[must_use]
    pub fn granted(reason: impl Into<String>) -> Self {
        Self {
            access_granted: true,
            reason: reason.into(),
            status: AccessStatus::Ok,
        }
    }

    /// Creates a denying decision with the given outcome category.
    #[must_use]
    pub fn denied(status: AccessStatus, reason: impl Into<String>) -> Self {
        Self {
            access_granted: false,
            reason: reason.into(),
            status,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use proptest::prelude::*;

    use super::{AccessDecision, AccessStatus, Operation};

    #[test]
    fn operation_roundtrip_storage_value() {
        for operation in Operation::all() {
            let restored = Operation::from_str(operation.as_str());
            assert_eq!(restored.ok(), Some(*operation));
        }
    }

    #[test]
    fn unknown_operation_is_rejected() {
        let parsed = Operation::from_str("transmogrify");
        assert!(parsed.is_err());
    }

    #[test]
    fn statuses_map_to_http_codes() {
        assert_eq!(AccessStatus::Ok.as_u16(), 200);
        assert_eq!(AccessStatus::BadRequest.as_u16(), 400);
        assert_eq!(AccessStatus::Forbidden.as_u16(), 403);
        assert_eq!(AccessStatus::NotFound.as_u16(), 404);
        assert_eq!(AccessStatus::Error.as_u16(), 500);
    }

    #[test]
    fn granted_decision_carries_ok_status() {
        let decision = AccessDecision::granted("Access granted by user role and policy.");
        assert!(decision.access_granted);
        assert_eq!(decision.status, AccessStatus::Ok);
    }

    proptest! {
        #[test]
        fn arbitrary_values_outside_the_enum_fail_to_parse(value in "[a-z]{1,12}") {
            let is_known = Operation::all()
                .iter()
                .any(|operation| operation.as_str() == value);
            prop_assert_eq!(Operation::from_str(value.as_str()).is_ok(), is_known);
        }
    }
}
