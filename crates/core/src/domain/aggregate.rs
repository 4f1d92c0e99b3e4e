use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::models::{Play, PlayTotal};

/// Group plays by game, summing quantities and keeping the latest play date.
///
/// Plays dated after `cutoff` are excluded. Games with no qualifying plays
/// are absent from the result, never zero-valued. Output is in ascending
/// game-id order.
pub fn aggregate(plays: &[Play], cutoff: Option<NaiveDate>) -> Vec<PlayTotal> {
    let mut totals: BTreeMap<i64, (i64, NaiveDate)> = BTreeMap::new();

    for play in plays {
        if cutoff.is_some_and(|c| play.date > c) {
            continue;
        }

        totals
            .entry(play.game_id)
            .and_modify(|(quantity, latest)| {
                *quantity += play.quantity;
                if play.date > *latest {
                    *latest = play.date;
                }
            })
            .or_insert((play.quantity, play.date));
    }

    totals
        .into_iter()
        .map(|(game_id, (total_quantity, latest))| PlayTotal {
            game_id,
            total_quantity,
            latest,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn play(id: i64, game_id: i64, date_: NaiveDate, quantity: i64) -> Play {
        Play::new(id, "alice", game_id, date_, quantity)
    }

    #[test]
    fn test_quantities_accumulate_and_latest_is_max() {
        let plays = vec![
            play(1, 1, date(2023, 1, 1), 3),
            play(2, 1, date(2023, 2, 1), 3),
            play(3, 2, date(2023, 1, 15), 1),
        ];

        let totals = aggregate(&plays, None);

        assert_eq!(
            totals,
            vec![
                PlayTotal {
                    game_id: 1,
                    total_quantity: 6,
                    latest: date(2023, 2, 1),
                },
                PlayTotal {
                    game_id: 2,
                    total_quantity: 1,
                    latest: date(2023, 1, 15),
                },
            ]
        );
    }

    #[test]
    fn test_aggregation_conserves_totals() {
        let plays = vec![
            play(1, 1, date(2022, 5, 1), 2),
            play(2, 3, date(2022, 5, 1), 7),
            play(3, 1, date(2022, 8, 9), 1),
            play(4, 2, date(2023, 1, 2), 4),
        ];

        let totals = aggregate(&plays, None);

        let input_sum: i64 = plays.iter().map(|p| p.quantity).sum();
        let output_sum: i64 = totals.iter().map(|t| t.total_quantity).sum();
        assert_eq!(input_sum, output_sum);
    }

    #[test]
    fn test_cutoff_excludes_later_plays() {
        let plays = vec![
            play(1, 1, date(2023, 1, 1), 2),
            play(2, 1, date(2023, 6, 1), 5),
            play(3, 2, date(2023, 7, 1), 1),
        ];

        let totals = aggregate(&plays, Some(date(2023, 5, 31)));

        // Game 2's only play is past the cutoff: absent, not zero.
        assert_eq!(totals.len(), 1);
        assert_eq!(totals[0].game_id, 1);
        assert_eq!(totals[0].total_quantity, 2);
        assert_eq!(totals[0].latest, date(2023, 1, 1));
    }

    #[test]
    fn test_cutoff_is_inclusive() {
        let plays = vec![play(1, 1, date(2023, 5, 31), 2)];

        let totals = aggregate(&plays, Some(date(2023, 5, 31)));

        assert_eq!(totals.len(), 1);
    }

    #[test]
    fn test_empty_input_yields_empty_output() {
        assert!(aggregate(&[], None).is_empty());
    }
}
