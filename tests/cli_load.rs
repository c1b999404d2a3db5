use std::io::Write as _;

use assert_cmd::Command;
use predicates::prelude::*;

fn write_fixture(dir: &std::path::Path, name: &str, body: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path).expect("create fixture");
    file.write_all(body.as_bytes()).expect("write fixture");
    path
}

#[test]
fn load_prints_summary_and_renders_plot() {
    let dir = tempfile::tempdir().expect("tempdir");
    let csv = write_fixture(
        dir.path(),
        "reviews.csv",
        "location,reviewer_name,rating,time_text,exact_time,scraped_at\n\
         Test Cafe,Alice,4.0,2 days ago,2024-03-14T10:00:00Z,2024-03-16T10:00:00Z\n\
         Test Cafe,Bob,5.0,a week ago,2024-03-09T10:00:00Z,2024-03-16T10:00:00Z\n",
    );
    let plot = dir.path().join("trend.svg");

    Command::cargo_bin("review-trend")
        .expect("binary")
        .arg("load")
        .arg("--input")
        .arg(&csv)
        .arg("--plot")
        .arg("--plot-output")
        .arg(&plot)
        .assert()
        .success()
        .stdout(predicate::str::contains("Total reviews: 2"))
        .stdout(predicate::str::contains("Location: Test Cafe"))
        .stdout(predicate::str::contains("2024-03-14 10:00"));

    assert!(plot.exists());
}

#[test]
fn load_without_time_column_counts_but_cannot_plot() {
    let dir = tempfile::tempdir().expect("tempdir");
    let csv = write_fixture(
        dir.path(),
        "ratings_only.csv",
        "rating,time_text\n4.0,2 days ago\n5.0,a week ago\n",
    );

    Command::cargo_bin("review-trend")
        .expect("binary")
        .arg("load")
        .arg("--input")
        .arg(&csv)
        .assert()
        .success()
        .stdout(predicate::str::contains("Total reviews: 2"));

    Command::cargo_bin("review-trend")
        .expect("binary")
        .arg("load")
        .arg("--input")
        .arg(&csv)
        .arg("--plot")
        .assert()
        .failure()
        .stderr(predicate::str::contains("review time"));
}

#[test]
fn load_accepts_legacy_score_and_datetime_columns() {
    let dir = tempfile::tempdir().expect("tempdir");
    let csv = write_fixture(
        dir.path(),
        "legacy.csv",
        "score,datetime\n4.5,2023-06-01 09:00:00\n",
    );

    Command::cargo_bin("review-trend")
        .expect("binary")
        .arg("load")
        .arg("--input")
        .arg(&csv)
        .assert()
        .success()
        .stdout(predicate::str::contains("Total reviews: 1"));
}

#[test]
fn load_fails_with_diagnostic_when_no_rating_column() {
    let dir = tempfile::tempdir().expect("tempdir");
    let csv = write_fixture(
        dir.path(),
        "broken.csv",
        "reviewer_name,exact_time\nAlice,2024-03-14T10:00:00Z\n",
    );

    Command::cargo_bin("review-trend")
        .expect("binary")
        .arg("load")
        .arg("--input")
        .arg(&csv)
        .assert()
        .failure()
        .stderr(predicate::str::contains("rating"));
}

#[test]
fn scrape_rejects_non_http_url() {
    Command::cargo_bin("review-trend")
        .expect("binary")
        .arg("scrape")
        .arg("--url")
        .arg("ftp://example.com/place")
        .assert()
        .failure()
        .stderr(predicate::str::contains("http"));
}
