use anyhow::Result;
use rusqlite::{OptionalExtension, params};
use showcase_types::{Decision, ProjectStatus, ReviewRefusal};
use tracing::info;

use crate::Database;

/// What an admin review did to a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewOutcome {
    NotFound,
    /// Status changed. `certificate_id` is set exactly when the new status is approved.
    Moved {
        project_name: String,
        status: ProjectStatus,
        certificate_id: Option<i64>,
    },
    /// Already in the requested state; nothing written.
    Unchanged { project_name: String },
    Refused {
        project_name: String,
        refusal: ReviewRefusal,
    },
}

impl Database {
    /// Apply an admin decision to a project in a single transaction.
    ///
    /// Approval updates the status and inserts the certificate, snapshotting
    /// the owner's current name with the project name and roll number. Two
    /// concurrent approvals serialise on the connection; the second sees
    /// `approved` and is refused, so a project never gets a second certificate.
    pub fn review_project(&self, project_id: i64, decision: Decision) -> Result<ReviewOutcome> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let found = tx
                .query_row(
                    "SELECT p.name, p.status, p.roll_number, u.name
                     FROM projects p
                     JOIN users u ON p.user_id = u.id
                     WHERE p.id = ?1",
                    [project_id],
                    |row| {
                        Ok((
                            row.get::<_, String>(0)?,
                            row.get::<_, String>(1)?,
                            row.get::<_, String>(2)?,
                            row.get::<_, String>(3)?,
                        ))
                    },
                )
                .optional()?;

            let Some((project_name, status, roll_number, student_name)) = found else {
                return Ok(ReviewOutcome::NotFound);
            };

            let current: ProjectStatus = status.parse()?;
            let next = match current.review(decision) {
                Ok(Some(next)) => next,
                Ok(None) => return Ok(ReviewOutcome::Unchanged { project_name }),
                Err(refusal) => return Ok(ReviewOutcome::Refused { project_name, refusal }),
            };

            tx.execute(
                "UPDATE projects SET status = ?1 WHERE id = ?2",
                params![next.as_str(), project_id],
            )?;

            let certificate_id = if next == ProjectStatus::Approved {
                tx.execute(
                    "INSERT INTO certificates (project_id, student_name, project_name, roll_number)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![project_id, student_name, project_name, roll_number],
                )?;
                Some(tx.last_insert_rowid())
            } else {
                None
            };

            tx.commit()?;

            info!(project_id, from = %current, to = %next, "Project reviewed");
            Ok(ReviewOutcome::Moved {
                project_name,
                status: next,
                certificate_id,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::tests::{project, student};

    fn status_of(db: &Database, id: i64) -> String {
        db.get_project(id).unwrap().unwrap().status
    }

    #[test]
    fn approve_issues_exactly_one_certificate() {
        let db = Database::open_in_memory().unwrap();
        let ann = student(&db, "Ann", "a@x.com", "R1");
        let p = project(&db, ann, "R1", "Compiler");

        let outcome = db.review_project(p, Decision::Approve).unwrap();
        assert!(matches!(
            outcome,
            ReviewOutcome::Moved { status: ProjectStatus::Approved, certificate_id: Some(_), .. }
        ));
        assert_eq!(status_of(&db, p), "approved");

        let again = db.review_project(p, Decision::Approve).unwrap();
        assert_eq!(
            again,
            ReviewOutcome::Refused {
                project_name: "Compiler".into(),
                refusal: ReviewRefusal::AlreadyApproved
            }
        );
        assert_eq!(db.count_certificates_for_project(p).unwrap(), 1);

        let cert = db.get_certificate_for_project(p).unwrap().unwrap();
        assert_eq!(cert.student_name, "Ann");
        assert_eq!(cert.project_name, "Compiler");
        assert_eq!(cert.roll_number, "R1");
    }

    #[test]
    fn reject_leaves_no_certificate() {
        let db = Database::open_in_memory().unwrap();
        let ann = student(&db, "Ann", "a@x.com", "R1");
        let p = project(&db, ann, "R1", "Compiler");

        let outcome = db.review_project(p, Decision::Reject).unwrap();
        assert!(matches!(
            outcome,
            ReviewOutcome::Moved { status: ProjectStatus::Rejected, certificate_id: None, .. }
        ));
        assert_eq!(status_of(&db, p), "rejected");
        assert!(db.get_certificate_for_project(p).unwrap().is_none());

        assert_eq!(
            db.review_project(p, Decision::Reject).unwrap(),
            ReviewOutcome::Unchanged { project_name: "Compiler".into() }
        );
    }

    #[test]
    fn unknown_project_is_not_found() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.review_project(42, Decision::Approve).unwrap(), ReviewOutcome::NotFound);
    }

    #[test]
    fn snapshot_survives_profile_edit() {
        let db = Database::open_in_memory().unwrap();
        let ann = student(&db, "Ann", "a@x.com", "R1");
        let p = project(&db, ann, "R1", "Compiler");
        db.review_project(p, Decision::Approve).unwrap();

        db.update_profile(ann, "Annabel", "a@x.com").unwrap();

        let cert = db.get_certificate_for_project(p).unwrap().unwrap();
        assert_eq!(cert.student_name, "Ann");
    }

    #[test]
    fn certificate_exists_iff_approved_across_review_sequences() {
        let db = Database::open_in_memory().unwrap();
        let ann = student(&db, "Ann", "a@x.com", "R1");
        let ids: Vec<i64> = (0..4)
            .map(|i| project(&db, ann, "R1", &format!("Project {i}")))
            .collect();

        // Deterministic mix of decisions over the same projects, including repeats.
        let script = [
            (0, Decision::Approve),
            (1, Decision::Reject),
            (1, Decision::Approve),
            (0, Decision::Reject),
            (2, Decision::Reject),
            (2, Decision::Reject),
            (0, Decision::Approve),
            (3, Decision::Approve),
            (1, Decision::Reject),
            (3, Decision::Approve),
        ];

        for (idx, decision) in script {
            db.review_project(ids[idx], decision).unwrap();

            for &id in &ids {
                let approved = status_of(&db, id) == "approved";
                let certificates = db.count_certificates_for_project(id).unwrap();
                assert_eq!(certificates, i64::from(approved), "project {id} after {decision:?}");
            }
        }
    }
}
