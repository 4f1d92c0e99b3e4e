use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::debug;

use crate::db::{CollectionDao, Database, GamesDao, PlaysDao};
use crate::error::{Error, Result};
use crate::models::{CollectionItem, Game, Play};

/// An immutable snapshot of one user's data, read once per report run.
///
/// Plays are filtered to the user (and to the as-of date when given); games
/// and collection are indexed by game id for the joins downstream.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub username: String,
    pub plays: Vec<Play>,
    pub games: HashMap<i64, Game>,
    pub collection: HashMap<i64, CollectionItem>,
}

impl Snapshot {
    /// Plays joined against the catalog and the user's collection, expansions
    /// dropped, grouped by game id in ascending id order.
    ///
    /// Plays referencing a game missing from either side of the join are
    /// silently excluded; catalog sync lag is expected.
    pub fn plays_by_game(&self) -> BTreeMap<i64, Vec<&Play>> {
        let mut grouped: BTreeMap<i64, Vec<&Play>> = BTreeMap::new();

        for play in &self.plays {
            let Some(game) = self.games.get(&play.game_id) else {
                continue;
            };
            if game.expansion || !self.collection.contains_key(&play.game_id) {
                continue;
            }
            grouped.entry(play.game_id).or_default().push(play);
        }

        grouped
    }
}

/// The data-loading boundary of the analytics core.
#[derive(Clone)]
pub struct DataLoader {
    games: GamesDao,
    plays: PlaysDao,
    collection: CollectionDao,
}

impl DataLoader {
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            games: GamesDao::new(db.clone()),
            plays: PlaysDao::new(db.clone()),
            collection: CollectionDao::new(db),
        }
    }

    /// Read the user's plays, the full catalog, and the user's collection.
    ///
    /// Any store failure is fatal here; the aggregator has no partial-result
    /// strategy.
    pub fn load(&self, username: &str, as_of: Option<NaiveDate>) -> Result<Snapshot> {
        let mut plays = self
            .plays
            .for_user(username)
            .map_err(|e| Error::DataUnavailable(format!("plays for {username}: {e}")))?;

        if let Some(cutoff) = as_of {
            plays.retain(|play| play.date <= cutoff);
        }

        let games = self
            .games
            .all_games()
            .map_err(|e| Error::DataUnavailable(format!("games: {e}")))?
            .into_iter()
            .map(|game| (game.id, game))
            .collect();

        let collection = self
            .collection
            .for_user(username)
            .map_err(|e| Error::DataUnavailable(format!("collection for {username}: {e}")))?
            .into_iter()
            .map(|item| (item.game_id, item))
            .collect::<HashMap<_, _>>();

        debug!(
            username,
            plays = plays.len(),
            collection = collection.len(),
            "loaded snapshot"
        );

        Ok(Snapshot {
            username: username.to_string(),
            plays,
            games,
            collection,
        })
    }
}
