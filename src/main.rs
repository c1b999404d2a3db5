use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = try_main().await {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn try_main() -> anyhow::Result<()> {
    review_trend::logging::init().context("init logging")?;

    let cli = review_trend::cli::Cli::parse();
    tracing::debug!(?cli, "parsed cli");

    match cli.command {
        review_trend::cli::Command::Scrape(args) => {
            review_trend::scrape::run(args).await.context("scrape")?;
        }
        review_trend::cli::Command::Load(args) => {
            review_trend::load::run(args).context("load")?;
        }
    }

    Ok(())
}
