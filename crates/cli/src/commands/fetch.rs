use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use bggstats_core::db::{CollectionDao, Database, GamesDao, GuildsDao, PlaysDao};

use crate::fetch::BggClient;

/// Sync a guild's member list, optionally merging in posters from a forum
/// thread, applying only the additions and departures.
pub fn guild_members(
    db: &Arc<Database>,
    client: &BggClient,
    guild_id: i64,
    thread_id: Option<i64>,
) -> Result<()> {
    let dao = GuildsDao::new(db.clone());
    let stored = dao.members(guild_id)?;

    let mut current: HashSet<String> = client.guild_members(guild_id)?.into_iter().collect();
    if let Some(thread_id) = thread_id {
        current.extend(client.thread_usernames(thread_id)?);
    }

    let mut additions: Vec<String> = current.difference(&stored).cloned().collect();
    let mut deletions: Vec<String> = stored.difference(&current).cloned().collect();
    additions.sort();
    deletions.sort();

    if additions.is_empty() && deletions.is_empty() {
        info!(guild_id, "guild membership unchanged");
        return Ok(());
    }

    info!(
        guild_id,
        adding = additions.len(),
        deleting = deletions.len(),
        "updating guild members"
    );
    dao.insert_and_delete(guild_id, &additions, &deletions)?;
    Ok(())
}

/// Sync one user's collection: upsert everything reported, delete what the
/// service no longer lists.
pub fn collection(db: &Arc<Database>, client: &BggClient, username: &str) -> Result<()> {
    let dao = CollectionDao::new(db.clone());
    let stored = dao.gameids_for_user(username)?;

    let updates = client.collection(username)?;

    let current: HashSet<i64> = updates.iter().map(|item| item.game_id).collect();
    let mut deletions: Vec<(String, i64)> = stored
        .difference(&current)
        .map(|&game_id| (username.to_string(), game_id))
        .collect();
    deletions.sort();

    if updates.is_empty() && deletions.is_empty() {
        info!(username, "collection unchanged");
        return Ok(());
    }

    info!(
        username,
        updating = updates.len(),
        deleting = deletions.len(),
        "updating collection"
    );
    dao.upsert_and_delete(&updates, &deletions)?;
    Ok(())
}

/// Sync the collections of every member of a guild.
pub fn guild_collections(db: &Arc<Database>, client: &BggClient, guild_id: i64) -> Result<()> {
    let mut members: Vec<String> = GuildsDao::new(db.clone())
        .members(guild_id)?
        .into_iter()
        .collect();
    members.sort();

    for member in &members {
        collection(db, client, member)?;
    }
    Ok(())
}

/// Refresh catalog rows for every tracked game, or only the ones with no
/// catalog row yet.
pub fn games(db: &Arc<Database>, client: &BggClient, missing_only: bool) -> Result<()> {
    let dao = GamesDao::new(db.clone());

    let mut ids: Vec<i64> = if missing_only {
        dao.missing_gameids()?
    } else {
        dao.tracked_gameids()?
    }
    .into_iter()
    .collect();
    ids.sort();

    info!(total = ids.len(), "games to update");
    let updates = client.things(&ids)?;
    dao.upsert_games(&updates)?;
    Ok(())
}

/// Fetch a user's plays since the latest stored play date.
pub fn plays(db: &Arc<Database>, client: &BggClient, username: &str) -> Result<()> {
    let dao = PlaysDao::new(db.clone());
    let min_date = dao.latest_play_date(username)?;

    let updates = client.plays(username, min_date)?;
    if updates.is_empty() {
        info!(username, "no new plays");
        return Ok(());
    }

    let sessions: i64 = updates.iter().map(|play| play.quantity).sum();
    info!(username, plays = updates.len(), sessions, "recording plays");
    dao.upsert_plays(&updates)?;
    Ok(())
}
