//! CSV persistence for review records.
//!
//! Writes use the canonical column set; reads are tolerant of datasets from
//! older exports, which may call the rating column `score` and the time
//! column `datetime`, carry naive `YYYY-MM-DD HH:MM:SS` timestamps instead
//! of RFC 3339, or lack the time column entirely. A rating is required per
//! row; the review time is only required by the operations that consume it
//! (see [`resolve_records`]), so a time-less dataset still loads, previews,
//! and counts.

use std::path::Path;

use anyhow::Context as _;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;

use crate::records::{self, ReviewRecord};

pub fn write_records(path: &Path, records: &[ReviewRecord]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("create csv: {}", path.display()))?;
    for record in records {
        writer.serialize(record).context("write review row")?;
    }
    writer.flush().context("flush csv")?;
    Ok(())
}

/// Row as it may appear in any supported export. Every column is optional
/// so that files with a subset of the schema still parse; what is actually
/// required is resolved per row in [`read_rows`].
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FlexibleRow {
    location: Option<String>,
    reviewer_name: Option<String>,
    rating: Option<f64>,
    score: Option<f64>,
    time_text: Option<String>,
    exact_time: Option<String>,
    datetime: Option<String>,
    scraped_at: Option<String>,
}

/// One loaded row after column aliasing, before the review time is
/// required. [`StoredRow::into_record`] finishes the conversion and is
/// where a missing time becomes an error.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRow {
    pub location: String,
    pub reviewer_name: String,
    pub rating: f64,
    pub time_text: String,
    pub exact_time: Option<DateTime<Utc>>,
    pub scraped_at: Option<DateTime<Utc>>,
}

impl StoredRow {
    pub fn into_record(self) -> anyhow::Result<ReviewRecord> {
        let exact_time = self.exact_time.ok_or_else(|| {
            anyhow::anyhow!("no recognizable review time (tried exact_time, datetime, time_text)")
        })?;
        Ok(ReviewRecord {
            location: self.location,
            reviewer_name: self.reviewer_name,
            rating: self.rating,
            time_text: self.time_text,
            exact_time,
            scraped_at: self.scraped_at.unwrap_or(exact_time),
        })
    }
}

/// Loads a dataset, requiring a rating per row. A timestamp that is present
/// but unreadable is an error; an absent time column is not.
pub fn read_rows(path: &Path) -> anyhow::Result<Vec<StoredRow>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("open csv: {}", path.display()))?;

    let mut rows = Vec::new();
    for (index, row) in reader.deserialize::<FlexibleRow>().enumerate() {
        let line = index + 2; // header is line 1
        let row = row.with_context(|| format!("parse csv line {line}"))?;

        let rating = row
            .rating
            .or(row.score)
            .ok_or_else(|| anyhow::anyhow!("line {line}: no rating or score value"))?;

        let time_text = row.time_text.unwrap_or_default();
        let exact_time = match row.exact_time.or(row.datetime) {
            Some(raw) => Some(
                parse_timestamp(&raw)
                    .with_context(|| format!("line {line}: unreadable review time: {raw}"))?,
            ),
            // The time_text column normally holds a relative phrase, but
            // some exports put a timestamp there.
            None => parse_timestamp(&time_text).ok(),
        };

        let scraped_at = match row.scraped_at {
            Some(raw) => Some(
                parse_timestamp(&raw)
                    .with_context(|| format!("line {line}: unreadable scrape time: {raw}"))?,
            ),
            None => exact_time,
        };

        rows.push(StoredRow {
            location: row
                .location
                .unwrap_or_else(|| records::UNKNOWN_LOCATION.to_owned()),
            reviewer_name: row
                .reviewer_name
                .unwrap_or_else(|| records::UNKNOWN_REVIEWER.to_owned()),
            rating,
            time_text,
            exact_time,
            scraped_at,
        });
    }
    Ok(rows)
}

/// Converts loaded rows into full records; fails on the first row without a
/// usable review time. Time-dependent operations (the monthly series and
/// plot) call this so a time-less dataset fails there, not at load.
pub fn resolve_records(rows: Vec<StoredRow>) -> anyhow::Result<Vec<ReviewRecord>> {
    rows.into_iter()
        .enumerate()
        .map(|(index, row)| {
            row.into_record()
                .with_context(|| format!("csv line {}", index + 2))
        })
        .collect()
}

/// Full read for consumers that need every record time-resolved.
pub fn read_records(path: &Path) -> anyhow::Result<Vec<ReviewRecord>> {
    resolve_records(read_rows(path)?)
}

fn parse_timestamp(raw: &str) -> anyhow::Result<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
        return Ok(parsed.and_utc());
    }
    anyhow::bail!("not a recognized timestamp: {raw}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone as _;
    use std::io::Write as _;

    fn sample() -> ReviewRecord {
        ReviewRecord {
            location: "Test Cafe".to_owned(),
            reviewer_name: "A. Reviewer".to_owned(),
            rating: 4.5,
            time_text: "2 days ago".to_owned(),
            exact_time: Utc.with_ymd_and_hms(2024, 3, 14, 10, 0, 0).unwrap(),
            scraped_at: Utc.with_ymd_and_hms(2024, 3, 16, 10, 0, 0).unwrap(),
        }
    }

    #[test]
    fn roundtrip() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("reviews.csv");

        write_records(&path, &[sample()])?;
        let loaded = read_records(&path)?;

        assert_eq!(loaded, vec![sample()]);
        Ok(())
    }

    #[test]
    fn reads_legacy_column_names() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("legacy.csv");
        let mut file = std::fs::File::create(&path)?;
        writeln!(file, "score,datetime")?;
        writeln!(file, "3.0,2023-01-02 08:30:00")?;

        let loaded = read_records(&path)?;

        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].rating, 3.0);
        assert_eq!(loaded[0].location, records::UNKNOWN_LOCATION);
        assert_eq!(
            loaded[0].exact_time,
            Utc.with_ymd_and_hms(2023, 1, 2, 8, 30, 0).unwrap()
        );
        Ok(())
    }

    #[test]
    fn time_less_rows_load_but_do_not_resolve() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("ratings_only.csv");
        let mut file = std::fs::File::create(&path)?;
        writeln!(file, "rating,time_text")?;
        writeln!(file, "4.0,2 days ago")?;

        let rows = read_rows(&path)?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].rating, 4.0);
        assert_eq!(rows[0].exact_time, None);

        let err = resolve_records(rows).unwrap_err();
        assert!(format!("{err:#}").contains("review time"));
        Ok(())
    }

    #[test]
    fn missing_rating_column_is_an_error() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("broken.csv");
        let mut file = std::fs::File::create(&path)?;
        writeln!(file, "reviewer_name,exact_time")?;
        writeln!(file, "Someone,2023-01-02 08:30:00")?;

        let err = read_rows(&path).unwrap_err();
        assert!(err.to_string().contains("rating"));
        Ok(())
    }

    #[test]
    fn unreadable_timestamp_is_an_error() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("badtime.csv");
        let mut file = std::fs::File::create(&path)?;
        writeln!(file, "rating,exact_time")?;
        writeln!(file, "4.0,sometime in march")?;

        assert!(read_rows(&path).is_err());
        Ok(())
    }
}
