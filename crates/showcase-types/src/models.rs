use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The two disjoint classes of account. Stored as the `is_admin` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Admin,
}

impl Role {
    pub fn from_is_admin(is_admin: bool) -> Self {
        if is_admin { Role::Admin } else { Role::Student }
    }

    pub fn is_admin(self) -> bool {
        matches!(self, Role::Admin)
    }

    /// Landing page after login for this role.
    pub fn home_path(self) -> &'static str {
        match self {
            Role::Student => "/student/dashboard",
            Role::Admin => "/admin/dashboard",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    Pending,
    Approved,
    Rejected,
}

/// An admin review action on a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

/// Why a review action was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ReviewRefusal {
    #[error("Project is already approved.")]
    AlreadyApproved,
    #[error("Approved projects cannot be rejected.")]
    ApprovedIsFinal,
}

impl ProjectStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ProjectStatus::Pending => "pending",
            ProjectStatus::Approved => "approved",
            ProjectStatus::Rejected => "rejected",
        }
    }

    /// Resolve a review decision against the current status.
    ///
    /// `Ok(Some(next))` moves the project, `Ok(None)` leaves it untouched.
    /// `Approved` is terminal: certificates are never revoked, so an approved
    /// project can be neither re-approved nor rejected.
    pub fn review(self, decision: Decision) -> Result<Option<ProjectStatus>, ReviewRefusal> {
        match (self, decision) {
            (ProjectStatus::Approved, Decision::Approve) => Err(ReviewRefusal::AlreadyApproved),
            (ProjectStatus::Approved, Decision::Reject) => Err(ReviewRefusal::ApprovedIsFinal),
            (_, Decision::Approve) => Ok(Some(ProjectStatus::Approved)),
            (ProjectStatus::Rejected, Decision::Reject) => Ok(None),
            (ProjectStatus::Pending, Decision::Reject) => Ok(Some(ProjectStatus::Rejected)),
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown project status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for ProjectStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ProjectStatus::Pending),
            "approved" => Ok(ProjectStatus::Approved),
            "rejected" => Ok(ProjectStatus::Rejected),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// A user as exposed outside the DB layer. The password hash never leaves `showcase-db`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub roll_number: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub tech_stack: String,
    pub project_link: Option<String>,
    pub media_file: Option<String>,
    pub roll_number: String,
    pub status: ProjectStatus,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}

/// An approved project on the public showcase, with its owner's current name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShowcaseEntry {
    #[serde(flatten)]
    pub project: Project,
    pub student_name: String,
}

/// Issuance record. Name fields are a snapshot taken at approval time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Certificate {
    pub id: i64,
    pub project_id: i64,
    pub student_name: String,
    pub project_name: String,
    pub roll_number: String,
    pub issued_at: DateTime<Utc>,
}
