//! Caller-owned transaction scope.
//!
//! # Responsibility
//! - Wrap one SQLite transaction that repositories borrow for a unit of work.
//! - Provide savepoint-scoped writes so one entity plus its children is
//!   persisted all-or-nothing.
//!
//! # Invariants
//! - A session only starts on a connection migrated to `latest_version()`.
//! - Dropping a session without `commit` rolls the transaction back.

use super::migrations::{current_user_version, latest_version};
use super::{DbError, DbResult};
use log::{debug, error, warn};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::time::Instant;

const WRITE_SAVEPOINT: &str = "entity_write";

/// One unit of work against the auction store.
///
/// Repositories borrow a `&Session`; the caller decides whether the work is
/// committed or rolled back.
pub struct Session<'conn> {
    tx: Transaction<'conn>,
    started_at: Instant,
}

impl<'conn> Session<'conn> {
    /// Starts an immediate transaction on a migrated connection.
    ///
    /// # Errors
    /// - `DbError::SchemaNotReady` when the connection was not bootstrapped.
    /// - `DbError::Sqlite` when the transaction cannot be started.
    pub fn begin(conn: &'conn mut Connection) -> DbResult<Self> {
        let expected_version = latest_version();
        let actual_version = current_user_version(conn)?;
        if actual_version != expected_version {
            error!(
                "event=session_begin module=db status=error error_code=schema_not_ready expected_version={} actual_version={}",
                expected_version, actual_version
            );
            return Err(DbError::SchemaNotReady {
                expected_version,
                actual_version,
            });
        }

        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        debug!("event=session_begin module=db status=ok");
        Ok(Self {
            tx,
            started_at: Instant::now(),
        })
    }

    /// Commits every write made through this session.
    pub fn commit(self) -> DbResult<()> {
        let elapsed = self.started_at.elapsed().as_millis();
        self.tx.commit()?;
        debug!("event=session_commit module=db status=ok duration_ms={elapsed}");
        Ok(())
    }

    /// Discards every write made through this session.
    pub fn rollback(self) -> DbResult<()> {
        let elapsed = self.started_at.elapsed().as_millis();
        self.tx.rollback()?;
        debug!("event=session_rollback module=db status=ok duration_ms={elapsed}");
        Ok(())
    }

    pub(crate) fn conn(&self) -> &Connection {
        &self.tx
    }

    /// Runs `write` inside a savepoint, undoing its partial effects on error.
    ///
    /// The outer transaction stays usable after a failed write.
    pub(crate) fn atomically<T, E>(
        &self,
        write: impl FnOnce(&Connection) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<rusqlite::Error>,
    {
        self.tx.execute_batch(&format!("SAVEPOINT {WRITE_SAVEPOINT};"))?;
        match write(&self.tx) {
            Ok(value) => {
                self.tx.execute_batch(&format!("RELEASE {WRITE_SAVEPOINT};"))?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = self.tx.execute_batch(&format!(
                    "ROLLBACK TO {WRITE_SAVEPOINT}; RELEASE {WRITE_SAVEPOINT};"
                )) {
                    warn!(
                        "event=savepoint_rollback module=db status=error error={}",
                        rollback_err
                    );
                }
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Session;
    use crate::db::{open_db_in_memory, DbError};
    use rusqlite::Connection;

    fn user_count(conn: &Connection) -> i64 {
        conn.query_row("SELECT COUNT(*) FROM users;", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn begin_rejects_unmigrated_connection() {
        let mut conn = Connection::open_in_memory().unwrap();
        let err = Session::begin(&mut conn).err().unwrap();
        assert!(matches!(
            err,
            DbError::SchemaNotReady {
                actual_version: 0,
                ..
            }
        ));
    }

    #[test]
    fn failed_atomic_write_leaves_session_usable() {
        let mut conn = open_db_in_memory().unwrap();
        let session = Session::begin(&mut conn).unwrap();

        let result: Result<(), rusqlite::Error> = session.atomically(|conn| {
            conn.execute(
                "INSERT INTO users (uuid, name, email) VALUES ('a', 'Ana', 'ana@email');",
                [],
            )?;
            conn.execute("INSERT INTO missing_table VALUES (1);", [])?;
            Ok(())
        });
        assert!(result.is_err());
        assert_eq!(user_count(session.conn()), 0);

        session
            .atomically(|conn| {
                conn.execute(
                    "INSERT INTO users (uuid, name, email) VALUES ('b', 'Bia', 'bia@email');",
                    [],
                )
            })
            .unwrap();
        assert_eq!(user_count(session.conn()), 1);
        session.commit().unwrap();

        assert_eq!(user_count(&conn), 1);
    }
}
