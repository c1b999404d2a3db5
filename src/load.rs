use std::path::Path;

use anyhow::Context as _;

use crate::cli::LoadArgs;
use crate::store::StoredRow;
use crate::{aggregate, plot, store};

pub fn run(args: LoadArgs) -> anyhow::Result<()> {
    let rows = store::read_rows(Path::new(&args.input))
        .with_context(|| format!("load reviews from {}", args.input))?;

    if rows.is_empty() {
        println!("No reviews were found.");
        return Ok(());
    }

    println!("Loaded {} reviews from {}", rows.len(), args.input);
    print_preview(&rows);
    println!("Total reviews: {}", rows.len());

    if args.plot {
        // The review time is only required here, so a dataset without a
        // time column still previews and counts above.
        let records =
            store::resolve_records(rows).context("prepare records for the monthly plot")?;
        let stats = aggregate::monthly_stats(&records);
        plot::render(&stats, Path::new(&args.plot_output)).context("render monthly plot")?;
        println!("Review plot saved to {}", args.plot_output);
    }

    Ok(())
}

fn print_preview(rows: &[StoredRow]) {
    if let Some(first) = rows.first() {
        println!("Location: {}", first.location);
    }
    for row in rows.iter().take(5) {
        let when = row
            .exact_time
            .map(|time| time.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_owned());
        println!(
            "  {:>3.1}  {:<16}  {:<16} {}",
            row.rating, when, row.time_text, row.reviewer_name
        );
    }
}
