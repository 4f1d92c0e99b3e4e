use std::collections::HashSet;
use std::sync::Arc;

use rusqlite::params;

use crate::db::Database;
use crate::error::Result;

#[derive(Clone)]
pub struct GuildsDao {
    db: Arc<Database>,
}

impl GuildsDao {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn members(&self, guild_id: i64) -> Result<HashSet<String>> {
        self.db.with_connection(|conn| {
            let mut stmt =
                conn.prepare("SELECT username FROM guildmembers WHERE guildid = ?1")?;
            let members = stmt
                .query_map(params![guild_id], |row| row.get(0))?
                .collect::<std::result::Result<HashSet<String>, _>>()?;
            Ok(members)
        })
    }

    /// Apply one membership sync: insert joined members, delete departed ones.
    pub fn insert_and_delete(
        &self,
        guild_id: i64,
        additions: &[String],
        deletions: &[String],
    ) -> Result<()> {
        if additions.is_empty() && deletions.is_empty() {
            return Ok(());
        }

        self.db.transaction(|tx| {
            {
                let mut stmt = tx
                    .prepare("INSERT INTO guildmembers (guildid, username) VALUES (?1, ?2)")?;
                for username in additions {
                    stmt.execute(params![guild_id, username])?;
                }
            }

            {
                let mut stmt = tx
                    .prepare("DELETE FROM guildmembers WHERE guildid = ?1 AND username = ?2")?;
                for username in deletions {
                    stmt.execute(params![guild_id, username])?;
                }
            }

            Ok(())
        })
    }
}
