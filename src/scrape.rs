use std::path::Path;
use std::time::Duration;

use anyhow::Context as _;
use url::Url;

use crate::cli::ScrapeArgs;
use crate::driver::WebDriverSession;
use crate::harvest::{self, HarvestConfig};
use crate::records::ReviewRecord;
use crate::{aggregate, plot, store};

pub async fn run(args: ScrapeArgs) -> anyhow::Result<()> {
    let url = Url::parse(&args.url).context("parse --url")?;
    if url.scheme() != "http" && url.scheme() != "https" {
        anyhow::bail!("--url must be http/https: {url}");
    }

    let config = HarvestConfig {
        target_count: args.max_reviews,
        poll_budget: args.max_scrolls,
        poll_interval: Duration::from_secs(args.wait_time),
        ..HarvestConfig::default()
    };

    let mut session = WebDriverSession::connect(&args.webdriver, !args.headed)
        .await
        .context("start browser session")?;

    // The session must be released on every exit path, including a failed
    // pass, so the pass result is held until after close.
    let outcome = harvest::run_pass(&mut session, url.as_str(), &config).await;
    if let Err(err) = session.close().await {
        tracing::warn!(?err, "failed to close browser session");
    }
    let harvest = outcome?;

    if harvest.records.is_empty() {
        println!("No reviews were found.");
        return Ok(());
    }

    println!(
        "Scraped {} reviews for {}",
        harvest.records.len(),
        harvest.location
    );
    print_preview(&harvest.records);

    if let Some(output) = &args.output {
        store::write_records(Path::new(output), &harvest.records)
            .with_context(|| format!("save reviews to {output}"))?;
        println!("Reviews saved to {output}");
    }

    println!("Total reviews: {}", harvest.records.len());
    if let Some(requested) = args.max_reviews {
        if !harvest.target_reached {
            println!(
                "Note: requested {requested} reviews but could only find {}",
                harvest.records.len()
            );
        }
    }

    if args.plot {
        let stats = aggregate::monthly_stats(&harvest.records);
        plot::render(&stats, Path::new(&args.plot_output)).context("render monthly plot")?;
        println!("Review plot saved to {}", args.plot_output);
    }

    Ok(())
}

/// Prints the first few records so a run can be eyeballed quickly.
fn print_preview(records: &[ReviewRecord]) {
    for record in records.iter().take(5) {
        println!(
            "  {:>3.1}  {}  {:<16} {}",
            record.rating,
            record.exact_time.format("%Y-%m-%d %H:%M"),
            record.time_text,
            record.reviewer_name
        );
    }
}
