use std::collections::HashMap;

use crate::models::{CollectionItem, Game, HIndexReport, PlayTotal, RankedPlay};

/// The collection rating that marks a game as a near-miss candidate.
pub const NEAR_MISS_RATING: i64 = 10;

/// Rank play totals and split them into h-index members and near misses.
///
/// Totals are joined against the catalog and collection (expansions and join
/// misses dropped), then sorted by descending total quantity with ties broken
/// by earlier latest-play date. A game at 0-based rank `h` makes the index
/// when `h < total_quantity`; a game that falls short is a near miss when its
/// collection rating equals `rating_filter` (default 10).
pub fn h_index(
    totals: &[PlayTotal],
    games: &HashMap<i64, Game>,
    collection: &HashMap<i64, CollectionItem>,
    rating_filter: Option<i64>,
) -> HIndexReport {
    let near_miss_rating = rating_filter.unwrap_or(NEAR_MISS_RATING);

    let mut ranked: Vec<RankedPlay> = totals
        .iter()
        .filter_map(|total| {
            let game = games.get(&total.game_id)?;
            let item = collection.get(&total.game_id)?;
            if game.expansion {
                return None;
            }
            Some(RankedPlay {
                rank: 0,
                game_id: total.game_id,
                name: game.name.clone(),
                total_quantity: total.total_quantity,
                latest: total.latest,
                rating: item.rating,
            })
        })
        .collect();

    // Stable sort over the aggregator's game-id order keeps full ties
    // deterministic without a third key.
    ranked.sort_by(|a, b| {
        b.total_quantity
            .cmp(&a.total_quantity)
            .then(a.latest.cmp(&b.latest))
    });

    let mut report = HIndexReport::default();

    for (rank, mut entry) in ranked.into_iter().enumerate() {
        entry.rank = rank;
        if (rank as i64) < entry.total_quantity {
            report.in_index.push(entry);
        } else if entry.rating == Some(near_miss_rating) {
            report.near_misses.push(entry);
        }
    }

    report
}
