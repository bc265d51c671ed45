use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

/// Apply every schema version newer than the one recorded in `schema_version`.
/// Safe to call on every startup.
pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 =
        conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    if version < 1 {
        info!("Running migration v1 (users, projects, certificates)");
        conn.execute_batch(
            "
            BEGIN;

            CREATE TABLE users (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                name        TEXT NOT NULL,
                email       TEXT NOT NULL UNIQUE,
                roll_number TEXT NOT NULL UNIQUE,
                password    TEXT NOT NULL,
                is_admin    INTEGER NOT NULL DEFAULT 0,
                created_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE projects (
                id           INTEGER PRIMARY KEY AUTOINCREMENT,
                name         TEXT NOT NULL,
                description  TEXT NOT NULL,
                tech_stack   TEXT NOT NULL,
                project_link TEXT,
                media_file   TEXT,
                roll_number  TEXT NOT NULL,
                status       TEXT NOT NULL DEFAULT 'pending'
                             CHECK (status IN ('pending', 'approved', 'rejected')),
                user_id      INTEGER NOT NULL REFERENCES users(id),
                created_at   TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX idx_projects_user ON projects(user_id, created_at);
            CREATE INDEX idx_projects_status ON projects(status, created_at);

            -- One certificate per project, issued on approval
            CREATE TABLE certificates (
                id           INTEGER PRIMARY KEY AUTOINCREMENT,
                project_id   INTEGER NOT NULL UNIQUE REFERENCES projects(id),
                student_name TEXT NOT NULL,
                project_name TEXT NOT NULL,
                roll_number  TEXT NOT NULL,
                issued_at    TEXT NOT NULL DEFAULT (datetime('now'))
            );

            INSERT INTO schema_version (version) VALUES (1);

            COMMIT;
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run(&conn).unwrap();
        run(&conn).unwrap();

        let versions: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_version", [], |r| r.get(0))
            .unwrap();
        assert_eq!(versions, 1);
    }

    #[test]
    fn status_column_rejects_unknown_values() {
        let conn = Connection::open_in_memory().unwrap();
        run(&conn).unwrap();
        conn.execute(
            "INSERT INTO users (name, email, roll_number, password) VALUES ('a', 'a@x', 'R', 'h')",
            [],
        )
        .unwrap();

        let result = conn.execute(
            "INSERT INTO projects (name, description, tech_stack, roll_number, status, user_id)
             VALUES ('p', 'long enough', 'rust', 'R', 'archived', 1)",
            [],
        );
        assert!(result.is_err());
    }
}
