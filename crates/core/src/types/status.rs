//! Reception lifecycle status and caller roles.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a reception session.
///
/// A reception starts `InProgress` and moves to `Closed` exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReceptionStatus {
    #[default]
    InProgress,
    Closed,
}

impl ReceptionStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InProgress => "in_progress",
            Self::Closed => "closed",
        }
    }

    #[must_use]
    pub const fn is_in_progress(self) -> bool {
        matches!(self, Self::InProgress)
    }
}

impl std::fmt::Display for ReceptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ReceptionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_progress" => Ok(Self::InProgress),
            "closed" => Ok(Self::Closed),
            _ => Err(format!("invalid reception status: {s}")),
        }
    }
}

/// Role carried by an authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Pickup-point staff: runs receptions and records products.
    #[serde(alias = "employee")]
    Staff,
    /// Opens new pickup points.
    Moderator,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Staff => write!(f, "staff"),
            Self::Moderator => write!(f, "moderator"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "staff" | "employee" => Ok(Self::Staff),
            "moderator" => Ok(Self::Moderator),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_reception_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&ReceptionStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
        assert_eq!(
            serde_json::to_string(&ReceptionStatus::Closed).unwrap(),
            "\"closed\""
        );
        assert_eq!(
            "closed".parse::<ReceptionStatus>().unwrap(),
            ReceptionStatus::Closed
        );
    }

    #[test]
    fn test_default_status_is_in_progress() {
        assert!(ReceptionStatus::default().is_in_progress());
    }

    #[test]
    fn test_role_accepts_employee_alias() {
        assert_eq!("employee".parse::<Role>().unwrap(), Role::Staff);
        let role: Role = serde_json::from_str("\"employee\"").unwrap();
        assert_eq!(role, Role::Staff);
        assert_eq!(Role::Staff.to_string(), "staff");
        assert!("client".parse::<Role>().is_err());
    }
}
