mod cli;
mod config;
mod error;
mod feed;
mod output;
mod partner;
mod progress;
mod ratecard;
mod reconcile;
mod types;

use anyhow::{Context, Result};
use clap::Parser;
use uuid::Uuid;

use cli::{Cli, OutputFormat};
use partner::{PartnerClient, UsageQuery};
use progress::with_spinner;
use types::UsageRecord;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // One correlation id ties every Partner Center call of this run together.
    let correlation_id = Uuid::new_v4();

    let config = config::load_config().context("loading Partner Center credentials")?;

    let client = PartnerClient::connect(&config, correlation_id)
        .with_context(|| format!("correlation id {correlation_id}"))?;

    let catalog = with_spinner("Fetching the Azure rate card", cli.quiet, || {
        client.rate_card()
    })
    .with_context(|| format!("correlation id {correlation_id}"))?;

    if !cli.quiet {
        eprintln!(
            "Rate card loaded: {} meters, currency {}.",
            catalog.len(),
            catalog.currency
        );
    }

    let customer_id = match cli.customer {
        Some(id) => id,
        None => cli::read_nonempty("Enter the customer ID")?,
    };
    let subscription_id = match cli.subscription {
        Some(id) => id,
        None => cli::read_nonempty("Enter the subscription ID")?,
    };

    let mut query = UsageQuery::trailing_days(cli.days);
    query.granularity = cli.granularity;
    query.show_details = !cli.no_details;
    query.page_size = cli.page_size;

    // Drain the paginated feed before reconciling; each page is a separate
    // round-trip and any page failure aborts the run.
    let records: Vec<UsageRecord> =
        with_spinner("Querying Azure utilization records", cli.quiet, || {
            client
                .usage(&customer_id, &subscription_id, &query)
                .collect::<error::Result<Vec<_>>>()
        })
        .with_context(|| format!("correlation id {correlation_id}"))?;

    if records.is_empty() {
        eprintln!("No usage records found for the requested window.");
        return Ok(());
    }
    if !cli.quiet {
        eprintln!("Found {} usage records.", records.len());
    }

    let items = reconcile::reconcile(&catalog, records, cli.missing_meters)
        .context("reconciling usage against the rate card")?;

    match cli.format {
        OutputFormat::Table => output::print_table(&items, &catalog),
        OutputFormat::Json => output::print_json(&items),
        OutputFormat::List => output::print_items(&items, &catalog),
    }

    Ok(())
}
