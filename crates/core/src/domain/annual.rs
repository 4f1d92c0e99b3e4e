use std::collections::BTreeMap;

use crate::domain::aggregate::aggregate;
use crate::domain::hindex::h_index;
use crate::domain::loader::Snapshot;
use crate::domain::windows::{Window, new_to_me};
use crate::error::Result;
use crate::models::{AnnualSummary, GamePlays, Play, YearPlays};
use crate::utils::dates::year_window;

/// Play-count milestones reported by the annual summary.
pub const NICKEL_PLAYS: i64 = 5;
pub const DIME_PLAYS: i64 = 10;

/// Compose the per-year report: totals, new-to-me count, nickel/dime
/// milestones, h-index over the year's plays, plays by publication year,
/// and the full per-game play list. Zero metrics report 0, never absent.
pub fn annual_summary(
    snapshot: &Snapshot,
    year: i32,
    rating_filter: Option<i64>,
) -> Result<AnnualSummary> {
    let (start, finish) = year_window(year)?;
    let window = Window::new(start, finish);

    // In-year totals over the joined, non-expansion data.
    let mut in_year: BTreeMap<i64, i64> = BTreeMap::new();
    for (game_id, plays) in snapshot.plays_by_game() {
        let quantity: i64 = plays
            .iter()
            .filter(|p| window.contains(p.date))
            .map(|p| p.quantity)
            .sum();
        if quantity > 0 {
            in_year.insert(game_id, quantity);
        }
    }

    let total_plays = in_year.values().sum();
    let nickels = in_year.values().filter(|&&q| q >= NICKEL_PLAYS).count();
    let dimes = in_year.values().filter(|&&q| q >= DIME_PLAYS).count();

    let year_plays: Vec<Play> = snapshot
        .plays
        .iter()
        .filter(|p| window.contains(p.date))
        .cloned()
        .collect();
    let totals = aggregate(&year_plays, None);
    let h_report = h_index(&totals, &snapshot.games, &snapshot.collection, rating_filter);

    let mut by_year: BTreeMap<Option<i32>, i64> = BTreeMap::new();
    for (&game_id, &quantity) in &in_year {
        *by_year.entry(snapshot.games[&game_id].year).or_insert(0) += quantity;
    }
    let mut plays_by_year: Vec<YearPlays> = by_year
        .into_iter()
        .map(|(year, plays)| YearPlays { year, plays })
        .collect();
    plays_by_year.sort_by(|a, b| b.plays.cmp(&a.plays).then_with(|| b.year.cmp(&a.year)));

    let mut games: Vec<GamePlays> = in_year
        .iter()
        .map(|(&game_id, &plays)| GamePlays {
            game_id,
            name: snapshot.games[&game_id].name.clone(),
            plays,
        })
        .collect();
    games.sort_by(|a, b| b.plays.cmp(&a.plays).then_with(|| a.name.cmp(&b.name)));

    Ok(AnnualSummary {
        year,
        total_plays,
        new_to_me: new_to_me(snapshot, window).len(),
        nickels,
        dimes,
        h_index: h_report.size(),
        plays_by_year,
        games,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::NaiveDate;

    use super::*;
    use crate::models::{CollectionItem, Game};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn snapshot() -> Snapshot {
        let games = vec![
            Game::new(1, "Weekly Filler").year(Some(2019)),
            Game::new(2, "Heavy Euro").year(Some(2019)),
            Game::new(3, "New Arrival").year(Some(2022)),
            Game::new(4, "Expansion Pack").year(Some(2022)).expansion(true),
        ];
        let collection: HashMap<i64, CollectionItem> = games
            .iter()
            .map(|g| (g.id, CollectionItem::new("alice", g.id).owned(true)))
            .collect();

        let mut plays = Vec::new();
        let mut id = 0;
        let mut push = |game_id: i64, d: NaiveDate, q: i64| {
            id += 1;
            plays.push(Play::new(id, "alice", game_id, d, q));
        };

        // Game 1: 12 plays in 2022 (a dime), played before too.
        push(1, date(2021, 11, 1), 2);
        push(1, date(2022, 1, 10), 5);
        push(1, date(2022, 3, 10), 7);
        // Game 2: 6 plays in 2022 (a nickel).
        push(2, date(2022, 2, 1), 6);
        // Game 3: first ever play in 2022.
        push(3, date(2022, 8, 15), 2);
        // Game 4 is an expansion: excluded everywhere.
        push(4, date(2022, 9, 1), 3);

        Snapshot {
            username: "alice".to_string(),
            plays,
            games: games.into_iter().map(|g| (g.id, g)).collect(),
            collection,
        }
    }

    #[test]
    fn test_annual_summary_metrics() {
        let summary = annual_summary(&snapshot(), 2022, None).unwrap();

        assert_eq!(summary.year, 2022);
        assert_eq!(summary.total_plays, 20); // 12 + 6 + 2
        assert_eq!(summary.new_to_me, 1); // game 3
        assert_eq!(summary.nickels, 2); // games 1 and 2
        assert_eq!(summary.dimes, 1); // game 1
        // Totals 12, 6, 2: rank 2 fails the membership test (2 < 2 is false).
        assert_eq!(summary.h_index, 2);
    }

    #[test]
    fn test_plays_by_publication_year() {
        let summary = annual_summary(&snapshot(), 2022, None).unwrap();

        assert_eq!(
            summary.plays_by_year,
            vec![
                YearPlays {
                    year: Some(2019),
                    plays: 18,
                },
                YearPlays {
                    year: Some(2022),
                    plays: 2,
                },
            ]
        );
    }

    #[test]
    fn test_per_game_list_ordering() {
        let summary = annual_summary(&snapshot(), 2022, None).unwrap();

        let order: Vec<i64> = summary.games.iter().map(|g| g.game_id).collect();
        assert_eq!(order, vec![1, 2, 3]);
        assert_eq!(summary.games[0].plays, 12);
    }

    #[test]
    fn test_empty_year_reports_zeroes() {
        let summary = annual_summary(&snapshot(), 2019, None).unwrap();

        assert_eq!(summary.total_plays, 0);
        assert_eq!(summary.new_to_me, 0);
        assert_eq!(summary.nickels, 0);
        assert_eq!(summary.dimes, 0);
        assert_eq!(summary.h_index, 0);
        assert!(summary.plays_by_year.is_empty());
        assert!(summary.games.is_empty());
    }
}
