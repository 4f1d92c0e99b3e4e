use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use crate::domain::loader::Snapshot;
use crate::models::{DayTotal, DustRow, FirstPlay, NewToMeRow, RankBucketRow, YearRow};
use crate::utils::dates::days_in_month;

/// A gap must be strictly longer than this to count as "out of the dust".
pub const DUST_GAP_DAYS: i64 = 365;

const RANK_BUCKET_WIDTH: i64 = 1000;
const MIN_RANK_BUCKETS: i64 = 10;

/// An inclusive calendar-date window. A play dated exactly on `start` or
/// `finish` is inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: NaiveDate,
    pub finish: NaiveDate,
}

impl Window {
    pub fn new(start: NaiveDate, finish: NaiveDate) -> Self {
        Self { start, finish }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.finish
    }
}

/// Games first played inside the window, with no prior plays at all.
///
/// Sorted by collection rating descending (unrated last), then name.
pub fn new_to_me(snapshot: &Snapshot, window: Window) -> Vec<NewToMeRow> {
    let mut rows = Vec::new();

    for (game_id, plays) in snapshot.plays_by_game() {
        let before: i64 = plays
            .iter()
            .filter(|p| p.date < window.start)
            .map(|p| p.quantity)
            .sum();
        let during: i64 = plays
            .iter()
            .filter(|p| window.contains(p.date))
            .map(|p| p.quantity)
            .sum();

        if before == 0 && during > 0 {
            let game = &snapshot.games[&game_id];
            rows.push(NewToMeRow {
                game_id,
                name: game.name.clone(),
                rating: snapshot.collection[&game_id].rating,
                plays: during,
            });
        }
    }

    rows.sort_by(|a, b| b.rating.cmp(&a.rating).then_with(|| a.name.cmp(&b.name)));
    rows
}

/// Games replayed inside the window after a gap of more than a year since
/// the last play before it.
///
/// Sorted by gap length descending, then name.
pub fn out_of_the_dust(snapshot: &Snapshot, window: Window) -> Vec<DustRow> {
    let mut rows = Vec::new();

    for (game_id, plays) in snapshot.plays_by_game() {
        let last_before = plays
            .iter()
            .filter(|p| p.date < window.start)
            .map(|p| p.date)
            .max();
        let first_during = plays
            .iter()
            .filter(|p| window.contains(p.date))
            .map(|p| p.date)
            .min();

        let (Some(last_before), Some(first_during)) = (last_before, first_during) else {
            continue;
        };

        let gap = (first_during - last_before).num_days();
        if gap > DUST_GAP_DAYS {
            rows.push(DustRow {
                game_id,
                name: snapshot.games[&game_id].name.clone(),
                last_before,
                first_during,
                gap_years: gap / 365,
                gap_days: gap % 365,
            });
        }
    }

    rows.sort_by(|a, b| b.gap().cmp(&a.gap()).then_with(|| a.name.cmp(&b.name)));
    rows
}

fn earlier(best: &Option<FirstPlay>, candidate: &FirstPlay) -> bool {
    match best {
        None => true,
        Some(current) => {
            (candidate.date, &candidate.name) < (current.date, &current.name)
        }
    }
}

/// For every publication year from `from_year` through `target_year`, the
/// earliest play in `target_year` of a game published that year.
///
/// Dense: years with no qualifying play still appear, with an empty entry.
pub fn through_the_years(snapshot: &Snapshot, target_year: i32, from_year: i32) -> Vec<YearRow> {
    let mut best: BTreeMap<i32, FirstPlay> = BTreeMap::new();

    for (game_id, plays) in snapshot.plays_by_game() {
        let game = &snapshot.games[&game_id];
        let Some(year) = game.year else { continue };
        if year < from_year || year > target_year {
            continue;
        }

        for play in plays {
            if play.date.year() != target_year {
                continue;
            }
            let candidate = FirstPlay {
                game_id,
                name: game.name.clone(),
                date: play.date,
            };
            let slot = best.get(&year).cloned();
            if earlier(&slot, &candidate) {
                best.insert(year, candidate);
            }
        }
    }

    (from_year..=target_year)
        .map(|year| YearRow {
            year,
            first: best.get(&year).cloned(),
        })
        .collect()
}

/// Plays in `target_year` binned by catalog rank in inclusive buckets of
/// width 1000 (1-1000, 1001-2000, ...), each bucket reporting its earliest
/// play. Unranked games are skipped.
///
/// Dense: at least ten buckets, extended to cover the highest observed rank.
pub fn archaeologist(snapshot: &Snapshot, target_year: i32) -> Vec<RankBucketRow> {
    let mut best: BTreeMap<i64, FirstPlay> = BTreeMap::new();
    let mut max_rank: i64 = 0;

    for (game_id, plays) in snapshot.plays_by_game() {
        let game = &snapshot.games[&game_id];
        let Some(rank) = game.rank else { continue };
        if rank < 1 {
            continue;
        }

        for play in plays {
            if play.date.year() != target_year {
                continue;
            }
            max_rank = max_rank.max(rank);
            let bucket = (rank - 1) / RANK_BUCKET_WIDTH;
            let candidate = FirstPlay {
                game_id,
                name: game.name.clone(),
                date: play.date,
            };
            let slot = best.get(&bucket).cloned();
            if earlier(&slot, &candidate) {
                best.insert(bucket, candidate);
            }
        }
    }

    let buckets = MIN_RANK_BUCKETS.max(max_rank.div_ceil(RANK_BUCKET_WIDTH));

    (0..buckets)
        .map(|bucket| RankBucketRow {
            bucket_start: bucket * RANK_BUCKET_WIDTH + 1,
            bucket_end: (bucket + 1) * RANK_BUCKET_WIDTH,
            first: best.get(&bucket).cloned(),
        })
        .collect()
}

/// Total plays per (month, day) across the whole history, year discarded.
///
/// All 366 calendar days appear, Feb 29 included, days never played at 0.
/// Sorted ascending by total, then calendar order.
pub fn fewest_plays(snapshot: &Snapshot) -> Vec<DayTotal> {
    let mut totals: BTreeMap<(u32, u32), i64> = BTreeMap::new();

    for month in 1..=12u32 {
        // A leap year so the histogram carries Feb 29.
        for day in 1..=days_in_month(2000, month) {
            totals.insert((month, day), 0);
        }
    }

    for plays in snapshot.plays_by_game().values() {
        for play in plays {
            if let Some(total) = totals.get_mut(&(play.date.month(), play.date.day())) {
                *total += play.quantity;
            }
        }
    }

    let mut rows: Vec<DayTotal> = totals
        .into_iter()
        .map(|((month, day), plays)| DayTotal { month, day, plays })
        .collect();

    rows.sort_by_key(|row| (row.plays, row.month, row.day));
    rows
}
