use std::sync::Arc;

use anyhow::{Result, bail};
use chrono::Local;

use bggstats_core::db::{CollectionDao, Database, GamesDao, GuildsDao};
use bggstats_core::domain::{
    DataLoader, Window, aggregate, annual_summary, archaeologist, builtin_reports, fewest_plays,
    guild_collection_summary, h_index, new_to_me, out_of_the_dust, run_report, through_the_years,
};
use bggstats_core::models::RankedPlay;
use bggstats_core::utils::dates::{default_dates, parse_date};

fn fmt_rating(rating: Option<i64>) -> String {
    rating.map_or_else(|| "-".to_string(), |r| r.to_string())
}

fn print_ranked(rows: &[RankedPlay]) {
    for entry in rows {
        println!(
            "{:>4}  {:>5}  {}  {:>3}  {}",
            entry.rank + 1,
            entry.total_quantity,
            entry.latest,
            fmt_rating(entry.rating),
            entry.name
        );
    }
}

pub fn hindex(
    db: &Arc<Database>,
    username: &str,
    as_of: Option<&str>,
    rating_filter: Option<i64>,
) -> Result<()> {
    let as_of = as_of.map(parse_date).transpose()?;
    let snapshot = DataLoader::new(db.clone()).load(username, as_of)?;

    let totals = aggregate(&snapshot.plays, None);
    let report = h_index(&totals, &snapshot.games, &snapshot.collection, rating_filter);

    println!("h-index for {username}: {}", report.size());
    println!("{:>4}  {:>5}  {:<10}  {:>3}  name", "#", "plays", "latest", "rtg");
    print_ranked(&report.in_index);

    if !report.near_misses.is_empty() {
        println!("\nnear misses:");
        print_ranked(&report.near_misses);
    }
    Ok(())
}

fn resolve_window(start: Option<&str>, finish: Option<&str>) -> Result<Window> {
    let today = Local::now().date_naive();
    let (start, finish) = default_dates(start, finish, today)?;
    Ok(Window::new(start, finish))
}

pub fn new_to_me_report(
    db: &Arc<Database>,
    username: &str,
    start: Option<&str>,
    finish: Option<&str>,
) -> Result<()> {
    let window = resolve_window(start, finish)?;
    let snapshot = DataLoader::new(db.clone()).load(username, None)?;

    let rows = new_to_me(&snapshot, window);
    println!(
        "new to {username} between {} and {}: {} games",
        window.start,
        window.finish,
        rows.len()
    );
    for (i, row) in rows.iter().enumerate() {
        println!(
            "{:>4}  {:>3}  {:>5}  {}",
            i + 1,
            fmt_rating(row.rating),
            row.plays,
            row.name
        );
    }
    Ok(())
}

pub fn dust_report(
    db: &Arc<Database>,
    username: &str,
    start: Option<&str>,
    finish: Option<&str>,
) -> Result<()> {
    let window = resolve_window(start, finish)?;
    let snapshot = DataLoader::new(db.clone()).load(username, None)?;

    let rows = out_of_the_dust(&snapshot, window);
    println!(
        "out of the dust between {} and {}: {} games",
        window.start,
        window.finish,
        rows.len()
    );
    for (i, row) in rows.iter().enumerate() {
        println!(
            "{:>4}  {}y {:>3}d  last {}  again {}  {}",
            i + 1,
            row.gap_years,
            row.gap_days,
            row.last_before,
            row.first_during,
            row.name
        );
    }
    Ok(())
}

pub fn years_report(db: &Arc<Database>, username: &str, year: i32, from: i32) -> Result<()> {
    if from > year {
        bail!("starting year {from} is after target year {year}");
    }
    let snapshot = DataLoader::new(db.clone()).load(username, None)?;

    println!("through the years, plays in {year} by publication year:");
    for row in through_the_years(&snapshot, year, from) {
        match &row.first {
            Some(first) => println!("{:>6}  {}  {}", row.year, first.date, first.name),
            None => println!("{:>6}  -", row.year),
        }
    }
    Ok(())
}

pub fn archaeologist_report(db: &Arc<Database>, username: &str, year: i32) -> Result<()> {
    let snapshot = DataLoader::new(db.clone()).load(username, None)?;

    println!("archaeologist, plays in {year} by catalog rank:");
    for row in archaeologist(&snapshot, year) {
        let bucket = format!("{}-{}", row.bucket_start, row.bucket_end);
        match &row.first {
            Some(first) => println!("{:>12}  {}  {}", bucket, first.date, first.name),
            None => println!("{:>12}  -", bucket),
        }
    }
    Ok(())
}

pub fn fewest_report(db: &Arc<Database>, username: &str, limit: usize) -> Result<()> {
    let snapshot = DataLoader::new(db.clone()).load(username, None)?;

    println!("fewest plays by calendar day for {username}:");
    for row in fewest_plays(&snapshot).iter().take(limit) {
        println!("{:02}-{:02}  {:>5}", row.month, row.day, row.plays);
    }
    Ok(())
}

pub fn annual_report(
    db: &Arc<Database>,
    username: &str,
    year: i32,
    rating_filter: Option<i64>,
) -> Result<()> {
    let snapshot = DataLoader::new(db.clone()).load(username, None)?;
    let summary = annual_summary(&snapshot, year, rating_filter)?;

    println!("{year} in review for {username}");
    println!("total plays:      {}", summary.total_plays);
    println!("new to me:        {}", summary.new_to_me);
    println!("nickels (5+):     {}", summary.nickels);
    println!("dimes (10+):      {}", summary.dimes);
    println!("h-index:          {}", summary.h_index);

    println!("\nplays by publication year:");
    for row in &summary.plays_by_year {
        match row.year {
            Some(year) => println!("{:>6}  {:>5}", year, row.plays),
            None => println!("     ?  {:>5}", row.plays),
        }
    }

    println!("\nplays by game:");
    for (i, game) in summary.games.iter().enumerate() {
        println!("{:>4}  {:>5}  {}", i + 1, game.plays, game.name);
    }
    Ok(())
}

pub fn guild_report(db: &Arc<Database>, guild_id: i64, report_name: &str) -> Result<()> {
    let members = GuildsDao::new(db.clone()).members(guild_id)?;
    let items = CollectionDao::new(db.clone()).all_items()?;
    let games = GamesDao::new(db.clone())
        .all_games()?
        .into_iter()
        .map(|game| (game.id, game))
        .collect();

    let summaries = guild_collection_summary(&members, &items, &games);

    let reports: Vec<_> = builtin_reports()
        .into_iter()
        .filter(|settings| report_name == "all" || settings.name == report_name)
        .collect();
    if reports.is_empty() {
        bail!("no report named \"{report_name}\"");
    }

    for (i, settings) in reports.iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!("{}", settings.title);
        for row in run_report(&summaries, settings) {
            let value = row
                .value
                .map_or_else(|| "-".to_string(), |v| format!("{v:.4}"));
            println!(
                "{:>4}  {:>9}  {:>8}  {}",
                row.row, row.guild_ratings, value, row.name
            );
        }
    }
    Ok(())
}
