//! SQLite user storage behind `StorageGateway<User>`.

use super::{parse_uuid, require_id, RepoError, RepoResult, StorageGateway, UserCriteria};
use crate::db::Session;
use crate::model::user::User;
use rusqlite::{params, Row};
use uuid::Uuid;

const USER_SELECT_SQL: &str = "SELECT uuid, name, email FROM users";
const NAME_AND_EMAIL_FILTER_SQL: &str = "WHERE name = ?1 AND email = ?2 ORDER BY rowid ASC";

impl StorageGateway<User> for Session<'_> {
    fn insert(&self, user: &User) -> RepoResult<Uuid> {
        let id = user.id().unwrap_or_else(Uuid::new_v4);
        self.conn().execute(
            "INSERT INTO users (uuid, name, email) VALUES (?1, ?2, ?3);",
            params![id.to_string(), user.name.as_str(), user.email.as_str()],
        )?;
        Ok(id)
    }

    fn update(&self, user: &User) -> RepoResult<()> {
        let id = require_id(user)?;
        let changed = self.conn().execute(
            "UPDATE users SET name = ?1, email = ?2 WHERE uuid = ?3;",
            params![user.name.as_str(), user.email.as_str(), id.to_string()],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "user",
                id: Some(id),
            });
        }
        Ok(())
    }

    fn delete(&self, user: &User) -> RepoResult<()> {
        let id = require_id(user)?;
        let changed = self
            .conn()
            .execute("DELETE FROM users WHERE uuid = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "user",
                id: Some(id),
            });
        }
        Ok(())
    }

    fn fetch_by_id(&self, id: Uuid) -> RepoResult<Option<User>> {
        let mut stmt = self
            .conn()
            .prepare(&format!("{USER_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }
        Ok(None)
    }

    fn query(&self, criteria: &UserCriteria) -> RepoResult<Vec<User>> {
        let UserCriteria::NameAndEmail { name, email } = criteria;
        let mut stmt = self
            .conn()
            .prepare(&format!("{USER_SELECT_SQL} {NAME_AND_EMAIL_FILTER_SQL};"))?;

        let mut rows = stmt.query(params![name.as_str(), email.as_str()])?;
        let mut users = Vec::new();
        while let Some(row) = rows.next()? {
            users.push(parse_user_row(row)?);
        }
        Ok(users)
    }

    fn fetch_first(&self, criteria: &UserCriteria) -> RepoResult<Option<User>> {
        let UserCriteria::NameAndEmail { name, email } = criteria;
        let mut stmt = self
            .conn()
            .prepare(&format!("{USER_SELECT_SQL} {NAME_AND_EMAIL_FILTER_SQL} LIMIT 1;"))?;

        let mut rows = stmt.query(params![name.as_str(), email.as_str()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_user_row(row)?)),
            None => Ok(None),
        }
    }

    fn count(&self, criteria: &UserCriteria) -> RepoResult<u64> {
        let UserCriteria::NameAndEmail { name, email } = criteria;
        let total: i64 = self.conn().query_row(
            "SELECT COUNT(*) FROM users WHERE name = ?1 AND email = ?2;",
            params![name.as_str(), email.as_str()],
            |row| row.get(0),
        )?;
        Ok(total as u64)
    }
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    let uuid_text: String = row.get("uuid")?;
    let id = parse_uuid(&uuid_text, "users.uuid")?;
    Ok(User::with_id(id, row.get::<_, String>("name")?, row.get::<_, String>("email")?))
}
