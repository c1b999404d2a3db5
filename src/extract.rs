//! One review card to one validated record.

use chrono::{DateTime, Utc};

use crate::driver::BrowserDriver;
use crate::records::{self, ReviewRecord};
use crate::selectors;
use crate::timeparse;

/// Materializes a single review card.
///
/// A missing or unparsable rating drops the record; a missing time phrase
/// does too. Both are isolated failures: the caller moves on to the next
/// card, so a batch of N cards yields anywhere from 0 to N records. The
/// reviewer name degrades to a sentinel instead of dropping. `now` is the
/// single reference instant for the whole pass and doubles as `scraped_at`.
pub async fn extract_review<D: BrowserDriver>(
    driver: &mut D,
    card: &D::Element,
    location: &str,
    now: DateTime<Utc>,
) -> Option<ReviewRecord> {
    let rating = match rating_of(driver, card).await {
        Some(rating) => rating,
        None => {
            tracing::debug!("dropping review: missing or unparsable rating");
            return None;
        }
    };

    let time_text = match time_text_of(driver, card).await {
        Some(text) => text,
        None => {
            tracing::debug!("dropping review: missing time phrase");
            return None;
        }
    };
    let exact_time = timeparse::normalize(&time_text, now);

    let reviewer_name = reviewer_name_of(driver, card).await;

    Some(ReviewRecord {
        location: location.to_owned(),
        reviewer_name,
        rating,
        time_text,
        exact_time,
        scraped_at: now,
    })
}

async fn rating_of<D: BrowserDriver>(driver: &mut D, card: &D::Element) -> Option<f64> {
    let badges = selectors::resolve_first_within(driver, card, &[selectors::RATING_BADGE]).await;
    let badge = badges.first()?;
    let label = match driver.attribute(badge, "aria-label").await {
        Ok(Some(label)) => label,
        Ok(None) => return None,
        Err(err) => {
            tracing::debug!(?err, "failed to read rating label");
            return None;
        }
    };
    parse_rating_label(&label)
}

/// The aria-label reads like "4.0 stars" or "4,0 Sterne"; the leading token
/// is the rating, with locale decimal commas normalized.
fn parse_rating_label(label: &str) -> Option<f64> {
    let token = label.split_whitespace().next()?;
    token.replace(',', ".").parse().ok()
}

async fn time_text_of<D: BrowserDriver>(driver: &mut D, card: &D::Element) -> Option<String> {
    let elements = selectors::resolve_first_within(driver, card, &[selectors::REVIEW_TIME]).await;
    let element = elements.first()?;
    match driver.text(element).await {
        Ok(text) => Some(text),
        Err(err) => {
            tracing::debug!(?err, "failed to read time phrase");
            None
        }
    }
}

async fn reviewer_name_of<D: BrowserDriver>(driver: &mut D, card: &D::Element) -> String {
    let elements = selectors::resolve_first_within(driver, card, selectors::REVIEWER_NAME).await;
    if let Some(element) = elements.first() {
        match driver.text(element).await {
            Ok(name) if !name.trim().is_empty() => return name,
            Ok(_) => {}
            Err(err) => {
                tracing::debug!(?err, "failed to read reviewer name");
            }
        }
    }
    records::UNKNOWN_REVIEWER.to_owned()
}
