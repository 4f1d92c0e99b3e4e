use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use tracing::debug;

use bggstats_core::models::{CollectionItem, Game, Play};

use crate::fetch::xml::{attr, blocks, child_attr};

const BASE_URL: &str = "https://boardgamegeek.com/xmlapi2";
const USER_AGENT: &str = concat!("bggstats/", env!("CARGO_PKG_VERSION"));

/// Ids per thing request; larger batches get truncated server-side.
const THING_CHUNK: usize = 20;
const PLAYS_PAGE_SIZE: usize = 100;
const GUILD_PAGE_SIZE: usize = 25;

/// Client for the catalog's XML API 2.
pub struct BggClient {
    http: Client,
    base: String,
}

impl BggClient {
    pub fn new() -> Result<Self> {
        Self::with_base(BASE_URL)
    }

    pub fn with_base(base: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("building HTTP client")?;
        Ok(Self {
            http,
            base: base.into(),
        })
    }

    fn get(&self, path: &str, query: &[(&str, String)]) -> Result<String> {
        let url = format!("{}/{}", self.base, path);
        debug!(url, ?query, "GET");

        let response = self
            .http
            .get(&url)
            .query(query)
            .send()
            .with_context(|| format!("requesting {path}"))?;

        // The API answers 202 while it builds the response server-side.
        // Polling is out of scope; the operator reruns the command.
        if response.status() == StatusCode::ACCEPTED {
            bail!("the catalog queued the {path} request; retry in a moment");
        }
        if !response.status().is_success() {
            bail!("{path} request failed with status {}", response.status());
        }

        response.text().context("reading response body")
    }

    /// A user's collection with rating stats.
    pub fn collection(&self, username: &str) -> Result<Vec<CollectionItem>> {
        let body = self.get(
            "collection",
            &[
                ("username", username.to_string()),
                ("stats", "1".to_string()),
            ],
        )?;

        let mut items = Vec::new();
        for item in blocks(&body, "item") {
            let game_id: i64 = attr(item, "objectid")
                .context("collection item missing objectid")?
                .parse()
                .context("collection objectid is not numeric")?;

            let owned = child_attr(item, "status", "own").as_deref() == Some("1");
            let rating = child_attr(item, "rating", "value")
                .filter(|v| v != "N/A")
                .and_then(|v| v.parse::<f64>().ok())
                .map(|v| v.round() as i64);

            items.push(
                CollectionItem::new(username, game_id)
                    .owned(owned)
                    .rating(rating),
            );
        }

        Ok(items)
    }

    /// A user's logged plays, oldest pages first, optionally bounded below.
    pub fn plays(&self, username: &str, min_date: Option<NaiveDate>) -> Result<Vec<Play>> {
        let mut plays = Vec::new();

        for page in 1.. {
            let mut query = vec![
                ("username", username.to_string()),
                ("page", page.to_string()),
            ];
            if let Some(min_date) = min_date {
                query.push(("mindate", min_date.format("%Y-%m-%d").to_string()));
            }

            let body = self.get("plays", &query)?;
            let total: usize = blocks(&body, "plays")
                .first()
                .and_then(|b| attr(b, "total"))
                .and_then(|t| t.parse().ok())
                .unwrap_or(0);

            let page_blocks = blocks(&body, "play");
            if page_blocks.is_empty() {
                break;
            }

            for play in &page_blocks {
                let id: i64 = attr(play, "id")
                    .context("play missing id")?
                    .parse()
                    .context("play id is not numeric")?;
                let date = attr(play, "date").context("play missing date")?;
                let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
                    .with_context(|| format!("play {id} has unparsable date"))?;
                let quantity: i64 = attr(play, "quantity")
                    .unwrap_or_else(|| "1".to_string())
                    .parse()
                    .context("play quantity is not numeric")?;
                let game_id: i64 = child_attr(play, "item", "objectid")
                    .context("play missing item objectid")?
                    .parse()
                    .context("play objectid is not numeric")?;

                plays.push(Play::new(id, username, game_id, date, quantity));
            }

            if plays.len() >= total || page_blocks.len() < PLAYS_PAGE_SIZE {
                break;
            }
        }

        Ok(plays)
    }

    /// Catalog entries for the given ids, fetched in chunks.
    pub fn things(&self, ids: &[i64]) -> Result<Vec<Game>> {
        let mut games = Vec::new();

        for chunk in ids.chunks(THING_CHUNK) {
            let id_list = chunk
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(",");
            let body = self.get(
                "thing",
                &[("id", id_list), ("stats", "1".to_string())],
            )?;

            for item in blocks(&body, "item") {
                games.push(parse_thing(item)?);
            }
        }

        Ok(games)
    }

    /// Current member list of a guild.
    pub fn guild_members(&self, guild_id: i64) -> Result<Vec<String>> {
        let mut members = Vec::new();

        for page in 1.. {
            let body = self.get(
                "guild",
                &[
                    ("id", guild_id.to_string()),
                    ("members", "1".to_string()),
                    ("page", page.to_string()),
                ],
            )?;

            let page_members: Vec<String> = blocks(&body, "member")
                .iter()
                .filter_map(|m| attr(m, "name"))
                .collect();
            let found = page_members.len();
            members.extend(page_members);

            if found < GUILD_PAGE_SIZE {
                break;
            }
        }

        Ok(members)
    }

    /// Usernames that posted in a forum thread.
    pub fn thread_usernames(&self, thread_id: i64) -> Result<Vec<String>> {
        let body = self.get("thread", &[("id", thread_id.to_string())])?;

        Ok(blocks(&body, "article")
            .iter()
            .filter_map(|a| attr(a, "username"))
            .collect())
    }
}

fn parse_thing(item: &str) -> Result<Game> {
    let id: i64 = attr(item, "id")
        .context("thing missing id")?
        .parse()
        .context("thing id is not numeric")?;

    let name = blocks(item, "name")
        .iter()
        .find(|n| attr(n, "type").as_deref() == Some("primary"))
        .and_then(|n| attr(n, "value"))
        .with_context(|| format!("thing {id} has no primary name"))?;

    let mut game = Game::new(id, name)
        .expansion(attr(item, "type").as_deref() == Some("boardgameexpansion"));
    game.min_players = numeric_child(item, "minplayers");
    game.max_players = numeric_child(item, "maxplayers");
    game.playing_time = numeric_child(item, "playingtime");
    game.year = numeric_child(item, "yearpublished").map(|y| y as i32);
    game.rating_average = float_child(item, "average");
    game.weight = float_child(item, "averageweight");
    game.rank = blocks(item, "rank")
        .iter()
        .find(|r| attr(r, "name").as_deref() == Some("boardgame"))
        .and_then(|r| attr(r, "value"))
        .and_then(|v| v.parse().ok());

    Ok(game)
}

// Absent, zero and non-numeric values all collapse to None, matching how the
// original sync treated falsy fields.
fn numeric_child(item: &str, tag: &str) -> Option<i64> {
    child_attr(item, tag, "value")
        .and_then(|v| v.parse::<i64>().ok())
        .filter(|&v| v != 0)
}

fn float_child(item: &str, tag: &str) -> Option<f64> {
    child_attr(item, tag, "value")
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|&v| v != 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const THING: &str = r#"<items termsofuse="https://boardgamegeek.com/xmlapi/termsofuse">
  <item type="boardgame" id="224517">
    <thumbnail>x</thumbnail>
    <name type="primary" sortindex="1" value="Brass: Birmingham"/>
    <name type="alternate" sortindex="1" value="Brass: Birmingem"/>
    <yearpublished value="2018"/>
    <minplayers value="2"/>
    <maxplayers value="4"/>
    <playingtime value="120"/>
    <statistics page="1">
      <ratings>
        <average value="8.58462"/>
        <averageweight value="3.9120"/>
        <ranks>
          <rank type="subtype" id="1" name="boardgame" friendlyname="Board Game Rank" value="1"/>
          <rank type="family" id="5497" name="strategygames" friendlyname="Strategy Game Rank" value="1"/>
        </ranks>
      </ratings>
    </statistics>
  </item>
  <item type="boardgameexpansion" id="322524">
    <name type="primary" sortindex="1" value="Unranked Expansion"/>
    <yearpublished value="0"/>
    <statistics page="1">
      <ratings>
        <average value="0"/>
        <averageweight value="0"/>
        <ranks>
          <rank type="subtype" id="1" name="boardgame" friendlyname="Board Game Rank" value="Not Ranked"/>
        </ranks>
      </ratings>
    </statistics>
  </item>
</items>"#;

    #[test]
    fn test_parse_thing_full_entry() {
        let items = blocks(THING, "item");
        let game = parse_thing(items[0]).unwrap();

        assert_eq!(game.id, 224517);
        assert_eq!(game.name, "Brass: Birmingham");
        assert!(!game.expansion);
        assert_eq!(game.min_players, Some(2));
        assert_eq!(game.max_players, Some(4));
        assert_eq!(game.playing_time, Some(120));
        assert_eq!(game.year, Some(2018));
        assert_eq!(game.rank, Some(1));
        assert!((game.rating_average.unwrap() - 8.58462).abs() < 1e-9);
        assert!((game.weight.unwrap() - 3.912).abs() < 1e-9);
    }

    #[test]
    fn test_parse_thing_expansion_with_gaps() {
        let items = blocks(THING, "item");
        let game = parse_thing(items[1]).unwrap();

        assert!(game.expansion);
        assert_eq!(game.year, None);
        assert_eq!(game.rank, None); // "Not Ranked"
        assert_eq!(game.rating_average, None);
        assert_eq!(game.min_players, None);
    }
}
