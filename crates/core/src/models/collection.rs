/// One game in a user's collection. `rating` is the user's 1-10 rating,
/// absent when the game is unrated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionItem {
    pub username: String,
    pub game_id: i64,
    pub owned: bool,
    pub rating: Option<i64>,
}

impl CollectionItem {
    pub fn new(username: impl Into<String>, game_id: i64) -> Self {
        Self {
            username: username.into(),
            game_id,
            owned: false,
            rating: None,
        }
    }

    pub fn owned(mut self, owned: bool) -> Self {
        self.owned = owned;
        self
    }

    pub fn rating(mut self, rating: Option<i64>) -> Self {
        self.rating = rating;
        self
    }
}

/// Guild membership row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildMember {
    pub guild_id: i64,
    pub username: String,
}

impl GuildMember {
    pub fn new(guild_id: i64, username: impl Into<String>) -> Self {
        Self {
            guild_id,
            username: username.into(),
        }
    }
}
