//! Monthly rating trend over a record set.

use std::collections::BTreeMap;

use chrono::Datelike as _;

use crate::records::{MonthlyStat, ReviewRecord};

/// Groups records by the calendar month of `exact_time` and computes the
/// mean rating and count per group, ascending by (year, month).
///
/// Pure and order-insensitive; months with no contributing records are
/// absent from the output rather than zero-filled.
pub fn monthly_stats(records: &[ReviewRecord]) -> Vec<MonthlyStat> {
    let mut buckets: BTreeMap<(i32, u32), (f64, usize)> = BTreeMap::new();
    for record in records {
        let key = (record.exact_time.year(), record.exact_time.month());
        let bucket = buckets.entry(key).or_insert((0.0, 0));
        bucket.0 += record.rating;
        bucket.1 += 1;
    }

    buckets
        .into_iter()
        .map(|((year, month), (sum, count))| MonthlyStat {
            year,
            month,
            avg_rating: sum / count as f64,
            review_count: count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone as _, Utc};

    fn record(rating: f64, year: i32, month: u32, day: u32) -> ReviewRecord {
        let when = Utc.with_ymd_and_hms(year, month, day, 9, 30, 0).unwrap();
        ReviewRecord {
            location: "Cafe".to_owned(),
            reviewer_name: "Reviewer".to_owned(),
            rating,
            time_text: String::new(),
            exact_time: when,
            scraped_at: when,
        }
    }

    #[test]
    fn means_and_counts_per_month() {
        let records = vec![
            record(4.0, 2023, 5, 2),
            record(5.0, 2023, 5, 20),
            record(2.0, 2023, 7, 1),
        ];

        let stats = monthly_stats(&records);

        assert_eq!(stats.len(), 2);
        assert_eq!((stats[0].year, stats[0].month), (2023, 5));
        assert_eq!(stats[0].avg_rating, 4.5);
        assert_eq!(stats[0].review_count, 2);
        assert_eq!((stats[1].year, stats[1].month), (2023, 7));
        assert_eq!(stats[1].avg_rating, 2.0);
        assert_eq!(stats[1].review_count, 1);
    }

    #[test]
    fn output_is_chronological_across_years() {
        let records = vec![
            record(3.0, 2024, 1, 5),
            record(4.0, 2022, 12, 5),
            record(5.0, 2023, 6, 5),
        ];

        let months: Vec<(i32, u32)> = monthly_stats(&records)
            .iter()
            .map(|stat| (stat.year, stat.month))
            .collect();

        assert_eq!(months, vec![(2022, 12), (2023, 6), (2024, 1)]);
    }

    #[test]
    fn invariant_under_input_permutation() {
        let mut records = vec![
            record(1.0, 2023, 2, 1),
            record(5.0, 2023, 2, 28),
            record(3.0, 2023, 3, 10),
            record(4.0, 2023, 4, 11),
        ];

        let forward = monthly_stats(&records);
        records.reverse();
        records.swap(0, 2);
        let shuffled = monthly_stats(&records);

        assert_eq!(forward, shuffled);
    }

    #[test]
    fn no_zero_count_months() {
        // January and April contribute nothing; neither may appear.
        let records = vec![record(4.0, 2023, 2, 1), record(4.0, 2023, 5, 1)];

        let stats = monthly_stats(&records);

        assert!(stats.iter().all(|stat| stat.review_count >= 1));
        assert_eq!(stats.len(), 2);
    }

    #[test]
    fn empty_input_yields_empty_series() {
        assert!(monthly_stats(&[]).is_empty());
    }
}
