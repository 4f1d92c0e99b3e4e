use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;
use rusqlite::{Row, params};

use crate::db::Database;
use crate::error::Result;
use crate::models::Play;

#[derive(Clone)]
pub struct PlaysDao {
    db: Arc<Database>,
}

fn play_from_row(row: &Row<'_>) -> rusqlite::Result<Play> {
    let date_str: String = row.get(3)?;
    let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(Play {
        id: row.get(0)?,
        username: row.get(1)?,
        game_id: row.get(2)?,
        date,
        quantity: row.get(4)?,
    })
}

impl PlaysDao {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Insert or replace play rows keyed by play id, all in one transaction.
    pub fn upsert_plays(&self, plays: &[Play]) -> Result<()> {
        if plays.is_empty() {
            return Ok(());
        }

        self.db.transaction(|tx| {
            let mut stmt = tx.prepare(
                "INSERT OR REPLACE INTO plays (playid, username, gameid, date, quantity)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;

            for play in plays {
                stmt.execute(params![
                    play.id,
                    play.username,
                    play.game_id,
                    play.date.format("%Y-%m-%d").to_string(),
                    play.quantity,
                ])?;
            }

            Ok(())
        })
    }

    pub fn for_user(&self, username: &str) -> Result<Vec<Play>> {
        self.db.with_connection(|conn| {
            let mut stmt = conn.prepare(
                "SELECT playid, username, gameid, date, quantity
                 FROM plays
                 WHERE username = ?1
                 ORDER BY date, playid",
            )?;

            let plays = stmt
                .query_map(params![username], play_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(plays)
        })
    }

    /// Latest date with plays already recorded for the user, used to fetch
    /// only newer plays from the catalog service.
    pub fn latest_play_date(&self, username: &str) -> Result<Option<NaiveDate>> {
        self.db.with_connection(|conn| {
            let latest: Option<String> = conn.query_row(
                "SELECT MAX(date) FROM plays WHERE username = ?1",
                params![username],
                |row| row.get(0),
            )?;

            match latest {
                Some(s) => {
                    let date = NaiveDate::parse_from_str(&s, "%Y-%m-%d").map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(
                            0,
                            rusqlite::types::Type::Text,
                            Box::new(e),
                        )
                    })?;
                    Ok(Some(date))
                }
                None => Ok(None),
            }
        })
    }

    pub fn played_gameids(&self) -> Result<HashSet<i64>> {
        self.db.with_connection(|conn| {
            let mut stmt = conn.prepare("SELECT DISTINCT gameid FROM plays")?;
            let ids = stmt
                .query_map([], |row| row.get(0))?
                .collect::<std::result::Result<HashSet<i64>, _>>()?;
            Ok(ids)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn setup_dao() -> PlaysDao {
        PlaysDao::new(Arc::new(Database::in_memory().unwrap()))
    }

    #[test]
    fn test_upsert_and_read_back() {
        let dao = setup_dao();

        dao.upsert_plays(&[
            Play::new(2, "alice", 10, date(2023, 3, 1), 2),
            Play::new(1, "alice", 10, date(2023, 1, 15), 1),
            Play::new(3, "bob", 11, date(2023, 2, 1), 1),
        ])
        .unwrap();

        let plays = dao.for_user("alice").unwrap();
        assert_eq!(plays.len(), 2);
        // Ordered by date
        assert_eq!(plays[0].date, date(2023, 1, 15));
        assert_eq!(plays[1].date, date(2023, 3, 1));
    }

    #[test]
    fn test_upsert_same_playid_replaces() {
        let dao = setup_dao();

        dao.upsert_plays(&[Play::new(1, "alice", 10, date(2023, 1, 15), 1)])
            .unwrap();
        dao.upsert_plays(&[Play::new(1, "alice", 10, date(2023, 1, 15), 4)])
            .unwrap();

        let plays = dao.for_user("alice").unwrap();
        assert_eq!(plays.len(), 1);
        assert_eq!(plays[0].quantity, 4);
    }

    #[test]
    fn test_latest_play_date() {
        let dao = setup_dao();

        assert_eq!(dao.latest_play_date("alice").unwrap(), None);

        dao.upsert_plays(&[
            Play::new(1, "alice", 10, date(2023, 1, 15), 1),
            Play::new(2, "alice", 12, date(2023, 6, 2), 1),
        ])
        .unwrap();

        assert_eq!(
            dao.latest_play_date("alice").unwrap(),
            Some(date(2023, 6, 2))
        );
    }

    #[test]
    fn test_played_gameids() {
        let dao = setup_dao();

        dao.upsert_plays(&[
            Play::new(1, "alice", 10, date(2023, 1, 15), 1),
            Play::new(2, "bob", 11, date(2023, 6, 2), 1),
            Play::new(3, "alice", 10, date(2023, 7, 1), 2),
        ])
        .unwrap();

        assert_eq!(dao.played_gameids().unwrap(), HashSet::from([10, 11]));
    }
}
