mod commands;
mod fetch;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use bggstats_core::db::Database;

use crate::fetch::BggClient;

#[derive(Parser, Debug)]
#[command(name = "bggstats", version, about = "Fetch BoardGameGeek data and run reports on it")]
struct Cli {
    /// Path to the SQLite database
    #[arg(long, env = "BGGSTATS_DB", default_value = "bgg.db")]
    db: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch data from the remote catalog into the local database
    #[command(subcommand)]
    Fetch(FetchCommand),

    /// Run reports on data in the local database
    #[command(subcommand)]
    Report(ReportCommand),
}

#[derive(Subcommand, Debug)]
enum FetchCommand {
    /// Update the stored member list of a guild
    GuildMembers {
        #[arg(long, env = "BGGSTATS_GUILD")]
        guild: i64,

        /// Forum thread whose posters also count as members
        #[arg(long)]
        thread: Option<i64>,
    },

    /// Update one user's collection
    Collection {
        #[arg(long, env = "BGGSTATS_USERNAME")]
        username: String,
    },

    /// Update the collections of every stored guild member
    GuildCollections {
        #[arg(long, env = "BGGSTATS_GUILD")]
        guild: i64,
    },

    /// Update catalog entries for tracked games
    Games {
        /// Only fetch games with no catalog entry yet
        #[arg(long)]
        missing_only: bool,
    },

    /// Update one user's plays since the last stored play
    Plays {
        #[arg(long, env = "BGGSTATS_USERNAME")]
        username: String,
    },
}

#[derive(Subcommand, Debug)]
enum ReportCommand {
    /// Lifetime h-index with near misses
    Hindex {
        #[arg(long, env = "BGGSTATS_USERNAME")]
        username: String,

        /// Only count plays up to this date (YYYY-MM-DD)
        #[arg(long)]
        as_of: Option<String>,

        /// Collection rating that marks a near miss
        #[arg(long)]
        rating: Option<i64>,
    },

    /// Games first played inside a date window
    NewToMe {
        #[arg(long, env = "BGGSTATS_USERNAME")]
        username: String,

        /// Window start (YYYY-MM-DD); defaults per the window rules
        #[arg(long)]
        start: Option<String>,

        /// Window finish (YYYY-MM-DD); defaults per the window rules
        #[arg(long)]
        finish: Option<String>,
    },

    /// Games replayed after more than a year untouched
    Dust {
        #[arg(long, env = "BGGSTATS_USERNAME")]
        username: String,

        #[arg(long)]
        start: Option<String>,

        #[arg(long)]
        finish: Option<String>,
    },

    /// Earliest play per publication year within a target year
    Years {
        #[arg(long, env = "BGGSTATS_USERNAME")]
        username: String,

        #[arg(long)]
        year: i32,

        /// First publication year to report
        #[arg(long, default_value_t = 2000)]
        from: i32,
    },

    /// Plays within a year binned by catalog rank
    Archaeologist {
        #[arg(long, env = "BGGSTATS_USERNAME")]
        username: String,

        #[arg(long)]
        year: i32,
    },

    /// Day-of-year histogram of the whole play history, fewest first
    Fewest {
        #[arg(long, env = "BGGSTATS_USERNAME")]
        username: String,

        /// How many calendar days to print
        #[arg(long, default_value_t = 366)]
        limit: usize,
    },

    /// Multi-metric summary of one calendar year
    Annual {
        #[arg(long, env = "BGGSTATS_USERNAME")]
        username: String,

        #[arg(long)]
        year: i32,

        /// Collection rating that marks a near miss
        #[arg(long)]
        rating: Option<i64>,
    },

    /// Guild collection rating reports
    Guild {
        #[arg(long, env = "BGGSTATS_GUILD")]
        guild: i64,

        /// Report name, or "all"
        #[arg(long, default_value = "all")]
        report: String,
    },
}

fn main() -> Result<()> {
    // Load .env early; ignore if missing.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("bggstats_cli=info,bggstats_core=info")),
        )
        .init();

    let cli = Cli::parse();
    let db = Arc::new(Database::new(&cli.db)?);

    match cli.command {
        Command::Fetch(fetch) => {
            let client = BggClient::new()?;
            match fetch {
                FetchCommand::GuildMembers { guild, thread } => {
                    commands::fetch::guild_members(&db, &client, guild, thread)
                }
                FetchCommand::Collection { username } => {
                    commands::fetch::collection(&db, &client, &username)
                }
                FetchCommand::GuildCollections { guild } => {
                    commands::fetch::guild_collections(&db, &client, guild)
                }
                FetchCommand::Games { missing_only } => {
                    commands::fetch::games(&db, &client, missing_only)
                }
                FetchCommand::Plays { username } => {
                    commands::fetch::plays(&db, &client, &username)
                }
            }
        }
        Command::Report(report) => match report {
            ReportCommand::Hindex {
                username,
                as_of,
                rating,
            } => commands::report::hindex(&db, &username, as_of.as_deref(), rating),
            ReportCommand::NewToMe {
                username,
                start,
                finish,
            } => commands::report::new_to_me_report(
                &db,
                &username,
                start.as_deref(),
                finish.as_deref(),
            ),
            ReportCommand::Dust {
                username,
                start,
                finish,
            } => {
                commands::report::dust_report(&db, &username, start.as_deref(), finish.as_deref())
            }
            ReportCommand::Years {
                username,
                year,
                from,
            } => commands::report::years_report(&db, &username, year, from),
            ReportCommand::Archaeologist { username, year } => {
                commands::report::archaeologist_report(&db, &username, year)
            }
            ReportCommand::Fewest { username, limit } => {
                commands::report::fewest_report(&db, &username, limit)
            }
            ReportCommand::Annual {
                username,
                year,
                rating,
            } => commands::report::annual_report(&db, &username, year, rating),
            ReportCommand::Guild { guild, report } => {
                commands::report::guild_report(&db, guild, &report)
            }
        },
    }
}
