use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Harvest reviews from a live place page.
    Scrape(ScrapeArgs),
    /// Work with a previously exported reviews CSV.
    Load(LoadArgs),
}

#[derive(Debug, Args)]
pub struct ScrapeArgs {
    /// Place page URL to scrape (must be http/https).
    #[arg(long, short = 'u')]
    pub url: String,

    /// WebDriver endpoint to connect to (e.g. a running chromedriver).
    #[arg(long, default_value = "http://localhost:9515")]
    pub webdriver: String,

    /// Run the browser with a visible window instead of headless.
    #[arg(long)]
    pub headed: bool,

    /// Path to save the reviews CSV.
    #[arg(long, short = 'o')]
    pub output: Option<String>,

    /// Maximum number of reviews to collect (default: all available).
    #[arg(long, short = 'm')]
    pub max_reviews: Option<usize>,

    /// Seconds to wait between scrolls.
    #[arg(long, short = 'w', default_value_t = 10)]
    pub wait_time: u64,

    /// Maximum scroll attempts before giving up.
    #[arg(long, default_value_t = 30)]
    pub max_scrolls: u32,

    /// Render the monthly average plot.
    #[arg(long, short = 'p')]
    pub plot: bool,

    /// Path for the plot image.
    #[arg(long, default_value = "reviews_by_month.svg")]
    pub plot_output: String,
}

#[derive(Debug, Args)]
pub struct LoadArgs {
    /// Previously exported reviews CSV.
    #[arg(long, short = 'i')]
    pub input: String,

    /// Render the monthly average plot.
    #[arg(long, short = 'p')]
    pub plot: bool,

    /// Path for the plot image.
    #[arg(long, default_value = "reviews_by_month.svg")]
    pub plot_output: String,
}
