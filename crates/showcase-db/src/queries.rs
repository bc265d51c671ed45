use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, Row, params};
use showcase_types::{ProjectStatus, Role};

use crate::Database;
use crate::models::{CertificateRow, CreateUser, NewProject, NewUser, ProfileUpdate, ProjectRow, UserRow};

const USER_COLUMNS: &str = "id, name, email, roll_number, password, is_admin, created_at";
const PROJECT_COLUMNS: &str = "id, name, description, tech_stack, project_link, media_file, \
                               roll_number, status, user_id, created_at";

impl Database {
    // -- Users --

    pub fn create_user(&self, user: &NewUser<'_>) -> Result<CreateUser> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            if exists(&tx, "SELECT 1 FROM users WHERE email = ?1", user.email)? {
                return Ok(CreateUser::EmailTaken);
            }
            if exists(&tx, "SELECT 1 FROM users WHERE roll_number = ?1", user.roll_number)? {
                return Ok(CreateUser::RollNumberTaken);
            }

            tx.execute(
                "INSERT INTO users (name, email, roll_number, password, is_admin)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    user.name,
                    user.email,
                    user.roll_number,
                    user.password_hash,
                    user.role.is_admin()
                ],
            )?;
            let id = tx.last_insert_rowid();
            tx.commit()?;
            Ok(CreateUser::Created(id))
        })
    }

    pub fn get_user_by_id(&self, id: i64) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1");
            Ok(conn.query_row(&sql, [id], user_from_row).optional()?)
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1");
            Ok(conn.query_row(&sql, [email], user_from_row).optional()?)
        })
    }

    /// Login lookup: only matches an account of the requested role.
    pub fn get_user_for_login(&self, email: &str, role: Role) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1 AND is_admin = ?2");
            Ok(conn
                .query_row(&sql, params![email, role.is_admin()], user_from_row)
                .optional()?)
        })
    }

    /// Profile edit touches name and email only. Certificates keep their snapshot.
    pub fn update_profile(&self, id: i64, name: &str, email: &str) -> Result<ProfileUpdate> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let taken = tx
                .query_row(
                    "SELECT 1 FROM users WHERE email = ?1 AND id != ?2",
                    params![email, id],
                    |_| Ok(()),
                )
                .optional()?
                .is_some();
            if taken {
                return Ok(ProfileUpdate::EmailTaken);
            }

            let changed = tx.execute(
                "UPDATE users SET name = ?1, email = ?2 WHERE id = ?3",
                params![name, email, id],
            )?;
            tx.commit()?;

            Ok(if changed == 0 { ProfileUpdate::NotFound } else { ProfileUpdate::Updated })
        })
    }

    pub fn count_students(&self) -> Result<i64> {
        self.with_conn(|conn| {
            Ok(conn.query_row("SELECT COUNT(*) FROM users WHERE is_admin = 0", [], |r| r.get(0))?)
        })
    }

    // -- Projects --

    pub fn insert_project(&self, project: &NewProject<'_>) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO projects
                    (name, description, tech_stack, project_link, media_file, roll_number, user_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    project.name,
                    project.description,
                    project.tech_stack,
                    project.project_link,
                    project.media_file,
                    project.roll_number,
                    project.user_id
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_project(&self, id: i64) -> Result<Option<ProjectRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ?1");
            Ok(conn.query_row(&sql, [id], project_from_row).optional()?)
        })
    }

    /// A student's own projects, newest first.
    pub fn list_projects_for_user(&self, user_id: i64) -> Result<Vec<ProjectRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {PROJECT_COLUMNS} FROM projects
                 WHERE user_id = ?1
                 ORDER BY created_at DESC, id DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([user_id], project_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn list_projects_by_status(&self, status: ProjectStatus) -> Result<Vec<ProjectRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {PROJECT_COLUMNS} FROM projects
                 WHERE status = ?1
                 ORDER BY created_at DESC, id DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([status.as_str()], project_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Approved projects joined with their owner's current name, newest first.
    pub fn list_showcase(&self) -> Result<Vec<(ProjectRow, String)>> {
        self.with_conn(|conn| {
            // JOIN users so the owner name comes back in the same query
            let mut stmt = conn.prepare(
                "SELECT p.id, p.name, p.description, p.tech_stack, p.project_link, p.media_file,
                        p.roll_number, p.status, p.user_id, p.created_at, u.name
                 FROM projects p
                 JOIN users u ON p.user_id = u.id
                 WHERE p.status = 'approved'
                 ORDER BY p.created_at DESC, p.id DESC",
            )?;
            let rows = stmt
                .query_map([], |row| Ok((project_from_row(row)?, row.get(10)?)))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// (total, approved, pending) for one student.
    pub fn project_counts_for_user(&self, user_id: i64) -> Result<(i64, i64, i64)> {
        self.with_conn(|conn| {
            Ok(conn.query_row(
                "SELECT COUNT(*),
                        COALESCE(SUM(status = 'approved'), 0),
                        COALESCE(SUM(status = 'pending'), 0)
                 FROM projects WHERE user_id = ?1",
                [user_id],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
            )?)
        })
    }

    pub fn count_projects(&self) -> Result<i64> {
        self.with_conn(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM projects", [], |r| r.get(0))?))
    }

    pub fn count_projects_by_status(&self, status: ProjectStatus) -> Result<i64> {
        self.with_conn(|conn| {
            Ok(conn.query_row(
                "SELECT COUNT(*) FROM projects WHERE status = ?1",
                [status.as_str()],
                |r| r.get(0),
            )?)
        })
    }

    // -- Certificates --

    pub fn get_certificate_for_project(&self, project_id: i64) -> Result<Option<CertificateRow>> {
        self.with_conn(|conn| {
            Ok(conn
                .query_row(
                    "SELECT id, project_id, student_name, project_name, roll_number, issued_at
                     FROM certificates WHERE project_id = ?1",
                    [project_id],
                    certificate_from_row,
                )
                .optional()?)
        })
    }

    pub fn count_certificates_for_project(&self, project_id: i64) -> Result<i64> {
        self.with_conn(|conn| {
            Ok(conn.query_row(
                "SELECT COUNT(*) FROM certificates WHERE project_id = ?1",
                [project_id],
                |r| r.get(0),
            )?)
        })
    }
}

fn exists(conn: &Connection, sql: &str, value: &str) -> Result<bool> {
    Ok(conn.query_row(sql, [value], |_| Ok(())).optional()?.is_some())
}

pub(crate) fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        roll_number: row.get(3)?,
        password: row.get(4)?,
        is_admin: row.get(5)?,
        created_at: row.get(6)?,
    })
}

pub(crate) fn project_from_row(row: &Row<'_>) -> rusqlite::Result<ProjectRow> {
    Ok(ProjectRow {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        tech_stack: row.get(3)?,
        project_link: row.get(4)?,
        media_file: row.get(5)?,
        roll_number: row.get(6)?,
        status: row.get(7)?,
        user_id: row.get(8)?,
        created_at: row.get(9)?,
    })
}

pub(crate) fn certificate_from_row(row: &Row<'_>) -> rusqlite::Result<CertificateRow> {
    Ok(CertificateRow {
        id: row.get(0)?,
        project_id: row.get(1)?,
        student_name: row.get(2)?,
        project_name: row.get(3)?,
        roll_number: row.get(4)?,
        issued_at: row.get(5)?,
    })
}
