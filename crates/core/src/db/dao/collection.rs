use std::collections::HashSet;
use std::sync::Arc;

use rusqlite::{Row, params};

use crate::db::Database;
use crate::error::Result;
use crate::models::CollectionItem;

#[derive(Clone)]
pub struct CollectionDao {
    db: Arc<Database>,
}

fn item_from_row(row: &Row<'_>) -> rusqlite::Result<CollectionItem> {
    Ok(CollectionItem {
        username: row.get(0)?,
        game_id: row.get(1)?,
        owned: row.get::<_, i64>(2)? != 0,
        rating: row.get(3)?,
    })
}

impl CollectionDao {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn for_user(&self, username: &str) -> Result<Vec<CollectionItem>> {
        self.db.with_connection(|conn| {
            let mut stmt = conn.prepare(
                "SELECT username, gameid, owned, rating
                 FROM collectionitems
                 WHERE username = ?1
                 ORDER BY gameid",
            )?;

            let items = stmt
                .query_map(params![username], item_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(items)
        })
    }

    pub fn all_items(&self) -> Result<Vec<CollectionItem>> {
        self.db.with_connection(|conn| {
            let mut stmt = conn.prepare(
                "SELECT username, gameid, owned, rating
                 FROM collectionitems
                 ORDER BY username, gameid",
            )?;

            let items = stmt
                .query_map([], item_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(items)
        })
    }

    pub fn gameids_for_user(&self, username: &str) -> Result<HashSet<i64>> {
        self.db.with_connection(|conn| {
            let mut stmt =
                conn.prepare("SELECT gameid FROM collectionitems WHERE username = ?1")?;
            let ids = stmt
                .query_map(params![username], |row| row.get(0))?
                .collect::<std::result::Result<HashSet<i64>, _>>()?;
            Ok(ids)
        })
    }

    /// Apply one collection sync: upsert current items, delete vanished ones.
    pub fn upsert_and_delete(
        &self,
        updates: &[CollectionItem],
        deletions: &[(String, i64)],
    ) -> Result<()> {
        if updates.is_empty() && deletions.is_empty() {
            return Ok(());
        }

        self.db.transaction(|tx| {
            {
                let mut stmt = tx.prepare(
                    "INSERT OR REPLACE INTO collectionitems (username, gameid, owned, rating)
                     VALUES (?1, ?2, ?3, ?4)",
                )?;

                for item in updates {
                    stmt.execute(params![
                        item.username,
                        item.game_id,
                        item.owned as i64,
                        item.rating,
                    ])?;
                }
            }

            {
                let mut stmt = tx.prepare(
                    "DELETE FROM collectionitems WHERE username = ?1 AND gameid = ?2",
                )?;

                for (username, game_id) in deletions {
                    stmt.execute(params![username, game_id])?;
                }
            }

            Ok(())
        })
    }
}
