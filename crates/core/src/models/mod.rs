pub mod collection;
pub mod game;
pub mod play;
pub mod report;

pub use collection::{CollectionItem, GuildMember};
pub use game::Game;
pub use play::Play;
pub use report::{
    AnnualSummary, DayTotal, DustRow, FirstPlay, GamePlays, GameSummary, HIndexReport, NewToMeRow,
    PlayTotal, RankBucketRow, RankedPlay, RankedSummaryRow, YearPlays, YearRow,
};
