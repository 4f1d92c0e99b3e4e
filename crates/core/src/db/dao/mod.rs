pub mod collection;
pub mod games;
pub mod guilds;
pub mod plays;

pub use collection::CollectionDao;
pub use games::GamesDao;
pub use guilds::GuildsDao;
pub use plays::PlaysDao;
