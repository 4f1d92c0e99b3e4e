use chrono::NaiveDate;

/// Per-game play aggregate over a selected subset of play records.
///
/// Games with no qualifying plays never appear; absence, not zero, means
/// "never played in window".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayTotal {
    pub game_id: i64,
    pub total_quantity: i64,
    pub latest: NaiveDate,
}

/// A play total joined with catalog and collection data, ranked for the
/// h-index computation.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedPlay {
    pub rank: usize,
    pub game_id: i64,
    pub name: String,
    pub total_quantity: i64,
    pub latest: NaiveDate,
    pub rating: Option<i64>,
}

/// Result of the h-index computation.
///
/// `in_index` holds the games that make the index, in rank order;
/// `near_misses` the top-rated games that fell short.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HIndexReport {
    pub in_index: Vec<RankedPlay>,
    pub near_misses: Vec<RankedPlay>,
}

impl HIndexReport {
    /// The h-index itself: the number of games making the membership test.
    pub fn size(&self) -> usize {
        self.in_index.len()
    }
}

/// A game first played inside the report window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewToMeRow {
    pub game_id: i64,
    pub name: String,
    pub rating: Option<i64>,
    pub plays: i64,
}

/// A game replayed inside the window after more than a year untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DustRow {
    pub game_id: i64,
    pub name: String,
    pub last_before: NaiveDate,
    pub first_during: NaiveDate,
    pub gap_years: i64,
    pub gap_days: i64,
}

impl DustRow {
    /// Total gap length in days.
    pub fn gap(&self) -> i64 {
        self.gap_years * 365 + self.gap_days
    }
}

/// The earliest qualifying play for one cell of a dense report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirstPlay {
    pub game_id: i64,
    pub name: String,
    pub date: NaiveDate,
}

/// One publication year of the through-the-years report. `first` is None
/// for years with no qualifying play.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearRow {
    pub year: i32,
    pub first: Option<FirstPlay>,
}

/// One rank bucket of the archaeologist report, bounds inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankBucketRow {
    pub bucket_start: i64,
    pub bucket_end: i64,
    pub first: Option<FirstPlay>,
}

/// Total plays on one day-of-year cell, all years merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayTotal {
    pub month: u32,
    pub day: u32,
    pub plays: i64,
}

/// Plays attributed to one publication year inside an annual summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearPlays {
    pub year: Option<i32>,
    pub plays: i64,
}

/// Per-game play count inside an annual summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GamePlays {
    pub game_id: i64,
    pub name: String,
    pub plays: i64,
}

/// Multi-metric report for a single calendar year. Zero metrics report 0.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnualSummary {
    pub year: i32,
    pub total_plays: i64,
    pub new_to_me: usize,
    pub nickels: usize,
    pub dimes: usize,
    pub h_index: usize,
    pub plays_by_year: Vec<YearPlays>,
    pub games: Vec<GamePlays>,
}

/// Aggregate rating attributes of one game across a guild's collections.
#[derive(Debug, Clone, PartialEq)]
pub struct GameSummary {
    pub game_id: i64,
    pub name: String,
    pub expansion: bool,
    pub copies_owned: i64,
    pub bgg_average: Option<f64>,
    pub guild_average: Option<f64>,
    pub guild_std: Option<f64>,
    pub guild_ratings: i64,
    pub adjusted_average: Option<f64>,
    pub vs_bgg: Option<f64>,
}

/// One numbered row of a configured guild ranking report.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedSummaryRow {
    pub row: usize,
    pub game_id: i64,
    pub name: String,
    pub guild_ratings: i64,
    pub value: Option<f64>,
}
