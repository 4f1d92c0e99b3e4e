/// A catalog entry for a board game, as synced from the remote service.
///
/// `rank` is the overall catalog rank (lower = more popular) and is absent
/// for unranked games. `year` is the publication year.
#[derive(Debug, Clone, PartialEq)]
pub struct Game {
    pub id: i64,
    pub name: String,
    pub expansion: bool,
    pub min_players: Option<i64>,
    pub max_players: Option<i64>,
    pub playing_time: Option<i64>,
    pub rank: Option<i64>,
    pub rating_average: Option<f64>,
    pub weight: Option<f64>,
    pub year: Option<i32>,
}

impl Game {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            expansion: false,
            min_players: None,
            max_players: None,
            playing_time: None,
            rank: None,
            rating_average: None,
            weight: None,
            year: None,
        }
    }

    pub fn expansion(mut self, expansion: bool) -> Self {
        self.expansion = expansion;
        self
    }

    pub fn rank(mut self, rank: Option<i64>) -> Self {
        self.rank = rank;
        self
    }

    pub fn year(mut self, year: Option<i32>) -> Self {
        self.year = year;
        self
    }
}
