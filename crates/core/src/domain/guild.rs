use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::models::{CollectionItem, Game, GameSummary, RankedSummaryRow};

/// Phantom '5' ratings blended into the guild average to dampen small
/// sample sizes.
pub const EXTRA_RATINGS: i64 = 5;
const PHANTOM_RATING: f64 = 5.0;

/// Which side of the expansion flag a report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpansionFilter {
    GamesOnly,
    ExpansionsOnly,
    All,
}

/// The summary column a report sorts and reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    AdjustedAverage,
    GuildAverage,
    GuildStd,
    VsBgg,
}

impl SortKey {
    fn value(self, summary: &GameSummary) -> Option<f64> {
        match self {
            SortKey::AdjustedAverage => summary.adjusted_average,
            SortKey::GuildAverage => summary.guild_average,
            SortKey::GuildStd => summary.guild_std,
            SortKey::VsBgg => summary.vs_bgg,
        }
    }
}

/// Settings for one configured ranking report.
#[derive(Debug, Clone)]
pub struct ReportSettings {
    pub name: &'static str,
    pub title: &'static str,
    pub expansions: ExpansionFilter,
    pub min_ratings: i64,
    pub sort_by: SortKey,
    pub ascending: bool,
    pub rows: usize,
}

/// The built-in guild report roster, in presentation order.
pub fn builtin_reports() -> Vec<ReportSettings> {
    vec![
        ReportSettings {
            name: "top20",
            title: "Top 20 Games",
            expansions: ExpansionFilter::GamesOnly,
            min_ratings: 0,
            sort_by: SortKey::AdjustedAverage,
            ascending: false,
            rows: 20,
        },
        ReportSettings {
            name: "top10expansions",
            title: "Top 10 Expansions",
            expansions: ExpansionFilter::ExpansionsOnly,
            min_ratings: 0,
            sort_by: SortKey::AdjustedAverage,
            ascending: false,
            rows: 10,
        },
        ReportSettings {
            name: "bottom10",
            title: "Bottom 10 Games",
            expansions: ExpansionFilter::GamesOnly,
            min_ratings: 5,
            sort_by: SortKey::GuildAverage,
            ascending: true,
            rows: 10,
        },
        ReportSettings {
            name: "varied",
            title: "Most Varied Ratings",
            expansions: ExpansionFilter::GamesOnly,
            min_ratings: 5,
            sort_by: SortKey::GuildStd,
            ascending: false,
            rows: 10,
        },
        ReportSettings {
            name: "morethanbgg",
            title: "Games Liked More than BoardGameGeek",
            expansions: ExpansionFilter::GamesOnly,
            min_ratings: 5,
            sort_by: SortKey::VsBgg,
            ascending: false,
            rows: 10,
        },
        ReportSettings {
            name: "lessthanbgg",
            title: "Games Liked Less than BoardGameGeek",
            expansions: ExpansionFilter::GamesOnly,
            min_ratings: 5,
            sort_by: SortKey::VsBgg,
            ascending: true,
            rows: 10,
        },
    ]
}

fn mean(ratings: &[f64]) -> Option<f64> {
    if ratings.is_empty() {
        return None;
    }
    Some(ratings.iter().sum::<f64>() / ratings.len() as f64)
}

// Sample standard deviation; undefined below two ratings.
fn std_dev(ratings: &[f64], mean: f64) -> Option<f64> {
    if ratings.len() < 2 {
        return None;
    }
    let variance = ratings.iter().map(|r| (r - mean).powi(2)).sum::<f64>()
        / (ratings.len() - 1) as f64;
    Some(variance.sqrt())
}

/// Summarise the rating attributes of every game held by the guild's
/// members. Items of non-members and items whose game is missing from the
/// catalog are silently excluded. Output in ascending game-id order.
pub fn guild_collection_summary(
    members: &HashSet<String>,
    items: &[CollectionItem],
    games: &HashMap<i64, Game>,
) -> Vec<GameSummary> {
    struct Accumulator {
        copies_owned: i64,
        ratings: Vec<f64>,
    }

    let mut grouped: BTreeMap<i64, Accumulator> = BTreeMap::new();

    for item in items {
        if !members.contains(&item.username) || !games.contains_key(&item.game_id) {
            continue;
        }

        let acc = grouped.entry(item.game_id).or_insert(Accumulator {
            copies_owned: 0,
            ratings: Vec::new(),
        });
        acc.copies_owned += item.owned as i64;
        if let Some(rating) = item.rating {
            acc.ratings.push(rating as f64);
        }
    }

    grouped
        .into_iter()
        .map(|(game_id, acc)| {
            let game = &games[&game_id];
            let n = acc.ratings.len() as i64;
            let guild_average = mean(&acc.ratings);
            let guild_std = guild_average.and_then(|m| std_dev(&acc.ratings, m));
            let adjusted_average = guild_average.map(|avg| {
                (avg * n as f64 + PHANTOM_RATING * EXTRA_RATINGS as f64)
                    / (n + EXTRA_RATINGS) as f64
            });
            let vs_bgg = match (guild_average, game.rating_average) {
                (Some(guild), Some(bgg)) => Some(guild - bgg),
                _ => None,
            };

            GameSummary {
                game_id,
                name: game.name.clone(),
                expansion: game.expansion,
                copies_owned: acc.copies_owned,
                bgg_average: game.rating_average,
                guild_average,
                guild_std,
                guild_ratings: n,
                adjusted_average,
                vs_bgg,
            }
        })
        .collect()
}

// Missing values sort after present ones under either direction.
fn compare_values(a: Option<f64>, b: Option<f64>, ascending: bool) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => {
            let order = x.partial_cmp(&y).unwrap_or(Ordering::Equal);
            if ascending { order } else { order.reverse() }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Filter, sort, truncate and number the summary per the report settings.
pub fn run_report(summaries: &[GameSummary], settings: &ReportSettings) -> Vec<RankedSummaryRow> {
    let mut selected: Vec<&GameSummary> = summaries
        .iter()
        .filter(|s| match settings.expansions {
            ExpansionFilter::GamesOnly => !s.expansion,
            ExpansionFilter::ExpansionsOnly => s.expansion,
            ExpansionFilter::All => true,
        })
        .filter(|s| s.guild_ratings >= settings.min_ratings)
        .collect();

    selected.sort_by(|a, b| {
        compare_values(
            settings.sort_by.value(a),
            settings.sort_by.value(b),
            settings.ascending,
        )
        .then_with(|| a.name.cmp(&b.name))
    });
    selected.truncate(settings.rows);

    selected
        .into_iter()
        .enumerate()
        .map(|(i, summary)| RankedSummaryRow {
            row: i + 1,
            game_id: summary.game_id,
            name: summary.name.clone(),
            guild_ratings: summary.guild_ratings,
            value: settings.sort_by.value(summary),
        })
        .collect()
}
