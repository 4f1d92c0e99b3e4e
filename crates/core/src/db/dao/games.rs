use std::collections::HashSet;
use std::sync::Arc;

use rusqlite::{OptionalExtension, Row, params};

use crate::db::Database;
use crate::error::Result;
use crate::models::Game;

#[derive(Clone)]
pub struct GamesDao {
    db: Arc<Database>,
}

fn game_from_row(row: &Row<'_>) -> rusqlite::Result<Game> {
    Ok(Game {
        id: row.get(0)?,
        name: row.get(1)?,
        expansion: row.get::<_, i64>(2)? != 0,
        min_players: row.get(3)?,
        max_players: row.get(4)?,
        playing_time: row.get(5)?,
        rank: row.get(6)?,
        rating_average: row.get(7)?,
        weight: row.get(8)?,
        year: row.get(9)?,
    })
}

const GAME_COLUMNS: &str = "gameid, name, expansion, min_players, max_players, playing_time, \
                            rank, rating_average, weight, year";

impl GamesDao {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn get_game(&self, game_id: i64) -> Result<Option<Game>> {
        self.db.with_connection(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {GAME_COLUMNS} FROM games WHERE gameid = ?1"
            ))?;

            let game = stmt.query_row(params![game_id], game_from_row).optional()?;

            Ok(game)
        })
    }

    pub fn all_games(&self) -> Result<Vec<Game>> {
        self.db.with_connection(|conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {GAME_COLUMNS} FROM games ORDER BY gameid"))?;

            let games = stmt
                .query_map([], game_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(games)
        })
    }

    /// Insert or replace catalog rows, all in one transaction.
    pub fn upsert_games(&self, games: &[Game]) -> Result<()> {
        if games.is_empty() {
            return Ok(());
        }

        self.db.transaction(|tx| {
            let mut stmt = tx.prepare(
                "INSERT OR REPLACE INTO games
                     (gameid, name, expansion, min_players, max_players, playing_time,
                      rank, rating_average, weight, year)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            )?;

            for game in games {
                stmt.execute(params![
                    game.id,
                    game.name,
                    game.expansion as i64,
                    game.min_players,
                    game.max_players,
                    game.playing_time,
                    game.rank,
                    game.rating_average,
                    game.weight,
                    game.year,
                ])?;
            }

            Ok(())
        })
    }

    /// Ids already present in the catalog table.
    pub fn known_gameids(&self) -> Result<HashSet<i64>> {
        self.db.with_connection(|conn| {
            let mut stmt = conn.prepare("SELECT gameid FROM games")?;
            let ids = stmt
                .query_map([], |row| row.get(0))?
                .collect::<std::result::Result<HashSet<i64>, _>>()?;
            Ok(ids)
        })
    }

    /// Every id referenced by a play or a collection item.
    pub fn tracked_gameids(&self) -> Result<HashSet<i64>> {
        self.db.with_connection(|conn| {
            let mut stmt = conn
                .prepare("SELECT gameid FROM plays UNION SELECT gameid FROM collectionitems")?;
            let ids = stmt
                .query_map([], |row| row.get(0))?
                .collect::<std::result::Result<HashSet<i64>, _>>()?;
            Ok(ids)
        })
    }

    /// Tracked ids with no catalog row yet.
    pub fn missing_gameids(&self) -> Result<HashSet<i64>> {
        self.db.with_connection(|conn| {
            let mut stmt = conn.prepare(
                "SELECT gameid FROM plays
                 UNION SELECT gameid FROM collectionitems
                 EXCEPT SELECT gameid FROM games",
            )?;
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

    fn setup_dao() -> GamesDao {
        GamesDao::new(Arc::new(Database::in_memory().unwrap()))
    }

    #[test]
    fn test_upsert_and_get_game() {
        let dao = setup_dao();

        let game = Game::new(174430, "Gloomhaven")
            .rank(Some(3))
            .year(Some(2017));
        dao.upsert_games(std::slice::from_ref(&game)).unwrap();

        let retrieved = dao.get_game(174430).unwrap().unwrap();
        assert_eq!(retrieved.name, "Gloomhaven");
        assert_eq!(retrieved.rank, Some(3));
        assert_eq!(retrieved.year, Some(2017));
        assert!(!retrieved.expansion);
    }

    #[test]
    fn test_upsert_replaces_existing_row() {
        let dao = setup_dao();

        dao.upsert_games(&[Game::new(10, "Old Name")]).unwrap();
        dao.upsert_games(&[Game::new(10, "New Name").expansion(true)])
            .unwrap();

        let games = dao.all_games().unwrap();
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].name, "New Name");
        assert!(games[0].expansion);
    }

    #[test]
    fn test_missing_gameids() {
        let db = Arc::new(Database::in_memory().unwrap());
        let dao = GamesDao::new(db.clone());

        db.with_connection(|conn| {
            conn.execute_batch(
                r#"
                INSERT INTO plays (playid, username, gameid, date, quantity)
                    VALUES (1, 'alice', 5, '2023-01-01', 1);
                INSERT INTO collectionitems (username, gameid, owned, rating)
                    VALUES ('alice', 7, 1, NULL);
                "#,
            )?;
            Ok(())
        })
        .unwrap();

        dao.upsert_games(&[Game::new(5, "Known")]).unwrap();

        let missing = dao.missing_gameids().unwrap();
        assert_eq!(missing, HashSet::from([7]));

        let tracked = dao.tracked_gameids().unwrap();
        assert_eq!(tracked, HashSet::from([5, 7]));
    }
}
