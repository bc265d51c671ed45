//! Database row types. These map directly to SQLite rows and stay distinct
//! from the `showcase-types` models so the DB layer owns its own shapes.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use showcase_types::{Certificate, Project, ProjectStatus, Role, User};

pub struct UserRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub roll_number: String,
    pub password: String,
    pub is_admin: bool,
    pub created_at: String,
}

impl UserRow {
    pub fn role(&self) -> Role {
        Role::from_is_admin(self.is_admin)
    }
}

pub struct ProjectRow {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub tech_stack: String,
    pub project_link: Option<String>,
    pub media_file: Option<String>,
    pub roll_number: String,
    pub status: String,
    pub user_id: i64,
    pub created_at: String,
}

pub struct CertificateRow {
    pub id: i64,
    pub project_id: i64,
    pub student_name: String,
    pub project_name: String,
    pub roll_number: String,
    pub issued_at: String,
}

pub struct NewUser<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub roll_number: &'a str,
    pub password_hash: &'a str,
    pub role: Role,
}

pub struct NewProject<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub tech_stack: &'a str,
    pub project_link: Option<&'a str>,
    pub media_file: Option<&'a str>,
    pub roll_number: &'a str,
    pub user_id: i64,
}

/// Result of inserting a user. Uniqueness is checked before the insert, email first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateUser {
    Created(i64),
    EmailTaken,
    RollNumberTaken,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileUpdate {
    Updated,
    EmailTaken,
    NotFound,
}

/// SQLite stores `datetime('now')` as "YYYY-MM-DD HH:MM:SS" without a zone; it is UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc()))
        .with_context(|| format!("invalid timestamp '{}'", raw))
}

impl TryFrom<UserRow> for User {
    type Error = anyhow::Error;

    fn try_from(row: UserRow) -> Result<Self> {
        Ok(User {
            role: row.role(),
            created_at: parse_timestamp(&row.created_at)?,
            id: row.id,
            name: row.name,
            email: row.email,
            roll_number: row.roll_number,
        })
    }
}

impl TryFrom<ProjectRow> for Project {
    type Error = anyhow::Error;

    fn try_from(row: ProjectRow) -> Result<Self> {
        Ok(Project {
            status: row.status.parse::<ProjectStatus>()?,
            created_at: parse_timestamp(&row.created_at)?,
            id: row.id,
            name: row.name,
            description: row.description,
            tech_stack: row.tech_stack,
            project_link: row.project_link,
            media_file: row.media_file,
            roll_number: row.roll_number,
            user_id: row.user_id,
        })
    }
}

impl TryFrom<CertificateRow> for Certificate {
    type Error = anyhow::Error;

    fn try_from(row: CertificateRow) -> Result<Self> {
        Ok(Certificate {
            issued_at: parse_timestamp(&row.issued_at)?,
            id: row.id,
            project_id: row.project_id,
            student_name: row.student_name,
            project_name: row.project_name,
            roll_number: row.roll_number,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn parses_sqlite_and_rfc3339_timestamps() {
        let ts = parse_timestamp("2024-03-05 14:07:09").unwrap();
        assert_eq!((ts.year(), ts.month(), ts.day()), (2024, 3, 5));
        assert_eq!((ts.hour(), ts.minute(), ts.second()), (14, 7, 9));

        assert!(parse_timestamp("2024-03-05T14:07:09Z").is_ok());
        assert!(parse_timestamp("yesterday").is_err());
    }
}
