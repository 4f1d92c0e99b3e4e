use chrono::NaiveDate;

/// A logged play record: `quantity` sessions of one game on one calendar day.
///
/// Several rows may exist for the same (username, game_id, date); their
/// quantities accumulate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Play {
    pub id: i64,
    pub username: String,
    pub game_id: i64,
    pub date: NaiveDate,
    pub quantity: i64,
}

impl Play {
    pub fn new(id: i64, username: impl Into<String>, game_id: i64, date: NaiveDate, quantity: i64) -> Self {
        Self {
            id,
            username: username.into(),
            game_id,
            date,
            quantity,
        }
    }
}
