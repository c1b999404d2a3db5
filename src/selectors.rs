//! CSS selectors for the place page, plus the fallback resolver.
//!
//! Class names on the page rotate across locales and layout experiments, so
//! anything load-bearing gets an ordered candidate chain, most specific
//! first. When extraction starts failing, capture the page HTML and extend
//! the chains here.

use crate::driver::BrowserDriver;

/// Present once the place page has rendered; used as the ready signal.
pub const PLACE_HEADER: &str = ".lMbq3e";

/// Place name heading.
pub const LOCATION_TITLE: &str = "h1.DUwDvf";

/// Tab that switches the panel to reviews.
pub const REVIEWS_TAB: &str = "button[data-tab-index='1']";

/// Opens the review sort menu.
pub const SORT_BUTTON: &str = "button[data-value='Sort']";

/// Sort menu entries; the radio role is the current layout, the rest are
/// older ones still seen in some locales.
pub const SORT_MENU_ITEMS: &[&str] = &[
    "div[role='menuitemradio']",
    "div[role='menuitem']",
    ".yr2tVc,.fxNQSd",
];

/// Scrollable feed holding the review cards.
pub const REVIEW_CONTAINER: &[&str] = &[
    ".m6QErb.DxyBCb.kA9KIf.dS8AEf",
    ".m6QErb.DxyBCb.kA9KIf",
    "div[role='feed']",
    ".lXJj5c.Hk4XGb",
];

/// One review card.
pub const REVIEW_CARD: &str = "div.jftiEf";

/// Star badge inside a card; the rating lives in its aria-label.
pub const RATING_BADGE: &str = "span.kvMYJc";

/// Relative-time phrase inside a card.
pub const REVIEW_TIME: &str = "span.rsqaWe";

/// Reviewer name, with the compact-layout fallback second.
pub const REVIEWER_NAME: &[&str] = &["div.d4r55", "span.X7jCAb"];

/// Tries each candidate in order and returns the matches of the first one
/// that yields anything. Absence is a normal outcome: all-empty chains give
/// an empty vec, and per-candidate driver errors are logged and skipped
/// rather than propagated.
pub async fn resolve_first<D: BrowserDriver>(
    driver: &mut D,
    candidates: &[&str],
) -> Vec<D::Element> {
    for candidate in candidates.iter().copied() {
        match driver.query(candidate).await {
            Ok(matches) if !matches.is_empty() => {
                tracing::debug!(selector = candidate, count = matches.len(), "selector matched");
                return matches;
            }
            Ok(_) => {}
            Err(err) => {
                tracing::debug!(selector = candidate, ?err, "selector query failed");
            }
        }
    }
    Vec::new()
}

/// Same contract as [`resolve_first`], scoped to a subtree.
pub async fn resolve_first_within<D: BrowserDriver>(
    driver: &mut D,
    root: &D::Element,
    candidates: &[&str],
) -> Vec<D::Element> {
    for candidate in candidates.iter().copied() {
        match driver.query_within(root, candidate).await {
            Ok(matches) if !matches.is_empty() => return matches,
            Ok(_) => {}
            Err(err) => {
                tracing::debug!(selector = candidate, ?err, "scoped selector query failed");
            }
        }
    }
    Vec::new()
}
