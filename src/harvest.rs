//! Scroll loop over an infinite-scroll review feed.
//!
//! The feed signals "no more content" ambiguously: sometimes the page height
//! stops growing while the card count still increases, sometimes the other
//! way around. The loop tracks both, recovers from stalls with a forced
//! scroll reset, and bounds total wait time with a hard poll budget.

use std::path::Path;
use std::time::Duration;

use chrono::Utc;

use crate::driver::BrowserDriver;
use crate::extract;
use crate::records::{self, ReviewRecord};
use crate::selectors;

/// Pause after clicking the reviews tab.
const TAB_PAUSE: Duration = Duration::from_secs(2);

/// Where a dump of the page goes when the sort menu misbehaves.
const SORT_ERROR_SCREENSHOT: &str = "sort_error.png";

#[derive(Debug, Clone)]
pub struct HarvestConfig {
    /// Stop once this many cards are visible; `None` collects everything.
    pub target_count: Option<usize>,
    /// Hard ceiling on scroll attempts.
    pub poll_budget: u32,
    /// Wait after each ordinary scroll.
    pub poll_interval: Duration,
    /// Added to `poll_interval` for the one extended retry after a quiet poll.
    pub wait_extension: Duration,
    /// Pause between the scroll-to-top and scroll-to-bottom of a stall reset.
    pub recovery_pause: Duration,
    /// Bounded wait for the place page to render after navigation.
    pub ready_timeout: Duration,
    /// Pause after opening the sort menu and after picking an entry.
    pub menu_pause: Duration,
    /// Consecutive unchanged counts before forcing a scroll reset.
    pub stall_recovery_threshold: u32,
    /// Consecutive unchanged counts, reset included, before giving up.
    pub stall_abort_threshold: u32,
    /// Lower abort threshold once an extended retry also came back quiet.
    pub quiet_abort_threshold: u32,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            target_count: None,
            poll_budget: 30,
            poll_interval: Duration::from_secs(10),
            wait_extension: Duration::from_secs(5),
            recovery_pause: Duration::from_secs(2),
            ready_timeout: Duration::from_secs(10),
            menu_pause: Duration::from_secs(3),
            stall_recovery_threshold: 3,
            stall_abort_threshold: 5,
            quiet_abort_threshold: 2,
        }
    }
}

/// Why the scroll loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Enough cards were visible to satisfy `target_count`.
    TargetReached,
    /// `poll_budget` scroll attempts were spent.
    BudgetExhausted,
    /// The feed stalled through recovery; assumed to have no more content.
    Converged,
}

/// Result of one harvesting pass.
#[derive(Debug)]
pub struct Harvest {
    pub location: String,
    pub records: Vec<ReviewRecord>,
    pub stop_reason: StopReason,
    /// Whether `target_count` was actually met by the visible cards.
    pub target_reached: bool,
}

/// Runs one full pass: navigate, open and sort the review panel, scroll to
/// convergence, then materialize the visible cards most-recent-first.
///
/// Navigation, ready-wait, and reviews-tab failures abort the pass; sort
/// failures and per-card extraction failures do not.
pub async fn run_pass<D: BrowserDriver>(
    driver: &mut D,
    url: &str,
    config: &HarvestConfig,
) -> anyhow::Result<Harvest> {
    tracing::info!(url, "starting harvest pass");
    driver.navigate(url).await?;
    driver
        .wait_for(selectors::PLACE_HEADER, config.ready_timeout)
        .await?;

    let location = location_name(driver).await;
    tracing::info!(location = %location, "place page ready");

    open_reviews_tab(driver).await?;
    sort_by_newest(driver, config).await;

    let container = selectors::resolve_first(driver, selectors::REVIEW_CONTAINER)
        .await
        .into_iter()
        .next();
    if container.is_none() {
        tracing::info!("no dedicated reviews container found; scrolling the page body only");
    }

    let stop_reason = scroll_until_done(driver, container.as_ref(), config).await?;
    tracing::info!(?stop_reason, "scrolling finished");

    // Let the last batch of cards finish rendering before we read them.
    let settle = (config.poll_interval / 2).min(Duration::from_secs(5));
    tokio::time::sleep(settle).await;

    let (records, visible) = materialize(driver, &location, config).await;
    let target_reached = config.target_count.is_some_and(|target| visible >= target);

    tracing::info!(
        count = records.len(),
        target_reached,
        "harvest pass complete"
    );

    Ok(Harvest {
        location,
        records,
        stop_reason,
        target_reached,
    })
}

async fn location_name<D: BrowserDriver>(driver: &mut D) -> String {
    let headings = selectors::resolve_first(driver, &[selectors::LOCATION_TITLE]).await;
    if let Some(heading) = headings.first() {
        match driver.text(heading).await {
            Ok(name) if !name.trim().is_empty() => return name,
            Ok(_) => {}
            Err(err) => tracing::debug!(?err, "failed to read location name"),
        }
    }
    tracing::warn!("could not extract location name");
    records::UNKNOWN_LOCATION.to_owned()
}

async fn open_reviews_tab<D: BrowserDriver>(driver: &mut D) -> anyhow::Result<()> {
    let tabs = selectors::resolve_first(driver, &[selectors::REVIEWS_TAB]).await;
    let Some(tab) = tabs.first() else {
        anyhow::bail!("reviews tab not found; the page layout may have changed");
    };
    driver.click(tab).await?;
    tokio::time::sleep(TAB_PAUSE).await;
    Ok(())
}

/// Switches the sort order to newest-first. Every failure here is
/// non-fatal: the pass still works on the default order, just with a
/// screenshot left behind for debugging.
async fn sort_by_newest<D: BrowserDriver>(driver: &mut D, config: &HarvestConfig) {
    let buttons = selectors::resolve_first(driver, &[selectors::SORT_BUTTON]).await;
    let Some(button) = buttons.first() else {
        tracing::warn!("sort button not found; keeping default review order");
        return;
    };
    if let Err(err) = driver.click(button).await {
        tracing::warn!(?err, "could not open sort menu");
        capture_sort_error(driver).await;
        return;
    }
    tokio::time::sleep(config.menu_pause).await;

    let items = selectors::resolve_first(driver, selectors::SORT_MENU_ITEMS).await;
    if items.is_empty() {
        tracing::warn!("sort menu produced no entries");
        capture_sort_error(driver).await;
        return;
    }

    let mut newest = None;
    for item in &items {
        let text = match driver.text(item).await {
            Ok(text) => text,
            Err(err) => {
                tracing::debug!(?err, "failed to read sort menu entry");
                continue;
            }
        };
        if text.to_lowercase().contains("newest") {
            newest = Some(item.clone());
            break;
        }
    }
    // "Newest" is conventionally the second entry when the label is
    // localized away from English.
    if newest.is_none() && items.len() >= 2 {
        tracing::debug!("no entry labeled newest; falling back to the second menu item");
        newest = Some(items[1].clone());
    }

    match newest {
        Some(item) => {
            if let Err(err) = driver.click(&item).await {
                tracing::warn!(?err, "could not select sort entry");
                capture_sort_error(driver).await;
                return;
            }
            tokio::time::sleep(config.menu_pause).await;
            tracing::info!("reviews sorted newest first");
        }
        None => tracing::warn!("could not identify a newest option in the sort menu"),
    }
}

async fn capture_sort_error<D: BrowserDriver>(driver: &mut D) {
    if let Err(err) = driver.screenshot(Path::new(SORT_ERROR_SCREENSHOT)).await {
        tracing::debug!(?err, "failed to capture sort error screenshot");
    } else {
        tracing::info!(path = SORT_ERROR_SCREENSHOT, "saved sort error screenshot");
    }
}

async fn count_cards<D: BrowserDriver>(driver: &mut D) -> usize {
    selectors::resolve_first(driver, &[selectors::REVIEW_CARD])
        .await
        .len()
}

/// The polling state machine. Each iteration samples the card count,
/// applies the stall bookkeeping, triggers growth, and re-samples; exits
/// are target, budget, or convergence.
async fn scroll_until_done<D: BrowserDriver>(
    driver: &mut D,
    container: Option<&D::Element>,
    config: &HarvestConfig,
) -> anyhow::Result<StopReason> {
    let mut stall_streak: u32 = 0;
    let mut last_count: usize = 0;
    let mut last_height: u64 = 0;

    for attempt in 1..=config.poll_budget {
        let count = count_cards(driver).await;
        tracing::debug!(attempt, count, stall_streak, "poll");

        if let Some(target) = config.target_count {
            if count >= target {
                return Ok(StopReason::TargetReached);
            }
        }

        if attempt > 1 {
            if count == last_count {
                stall_streak += 1;
            } else {
                stall_streak = 0;
            }
        }

        if stall_streak >= config.stall_recovery_threshold {
            tracing::info!(count, "count stalled; forcing a scroll reset");
            driver.scroll_to_top().await?;
            tokio::time::sleep(config.recovery_pause).await;
            driver.scroll_to_bottom().await?;
            tokio::time::sleep(config.poll_interval).await;

            if stall_streak >= config.stall_abort_threshold {
                tracing::info!(count, "still stalled after recovery; assuming converged");
                return Ok(StopReason::Converged);
            }
        }

        // Ordinary growth trigger: the dedicated container when we have
        // one, and the page body as a redundant second signal.
        if let Some(container) = container {
            if let Err(err) = driver.scroll_element_to_bottom(container).await {
                tracing::debug!(?err, "container scroll failed");
            }
        }
        driver.scroll_to_bottom().await?;
        tokio::time::sleep(config.poll_interval).await;

        let mut height = driver.page_height().await?;
        let mut after = count_cards(driver).await;

        if height == last_height && after == count {
            // One extended retry before declaring the poll truly quiet.
            let extended = config.poll_interval + config.wait_extension;
            tracing::debug!(wait = ?extended, "no growth; retrying with extended wait");
            driver.scroll_to_bottom().await?;
            tokio::time::sleep(extended).await;

            height = driver.page_height().await?;
            after = count_cards(driver).await;

            if height == last_height && after == count {
                stall_streak += 1;
                if stall_streak >= config.quiet_abort_threshold {
                    tracing::info!(count = after, "nothing loading after extended retry");
                    return Ok(StopReason::Converged);
                }
            } else {
                stall_streak = 0;
            }
        } else if after > count {
            stall_streak = 0;
        }

        if let Some(target) = config.target_count {
            if after >= target {
                return Ok(StopReason::TargetReached);
            }
        }

        last_height = height;
        last_count = count;
    }

    Ok(StopReason::BudgetExhausted)
}

/// Converts the visible cards into records, capped at the target, in page
/// order (most recent first). Per-card failures drop only that card.
/// Returns the records together with the visible-card count before capping.
async fn materialize<D: BrowserDriver>(
    driver: &mut D,
    location: &str,
    config: &HarvestConfig,
) -> (Vec<ReviewRecord>, usize) {
    let cards = selectors::resolve_first(driver, &[selectors::REVIEW_CARD]).await;
    tracing::info!(count = cards.len(), "materializing review cards");

    let take = config.target_count.unwrap_or(cards.len()).min(cards.len());
    let now = Utc::now();

    let mut records = Vec::with_capacity(take);
    for card in cards.iter().take(take) {
        if let Some(record) = extract::extract_review(driver, card, location, now).await {
            records.push(record);
        }
    }
    (records, cards.len())
}
