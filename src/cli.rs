use std::io::{self, BufRead, Write};

use clap::{Parser, ValueEnum};

use crate::reconcile::MissingMeterPolicy;
use crate::types::Granularity;

#[derive(Parser, Debug)]
#[command(
    name = "meterline",
    about = "Price Azure utilization records against the Partner Center rate card"
)]
pub struct Cli {
    /// Customer that owns the subscription (prompted for when omitted)
    #[arg(long)]
    pub customer: Option<String>,

    /// Azure subscription to query (prompted for when omitted)
    #[arg(long)]
    pub subscription: Option<String>,

    /// Trailing window of usage to fetch, in days
    #[arg(long, default_value = "7")]
    pub days: i64,

    /// Aggregation granularity of the usage query
    #[arg(long, default_value = "daily")]
    pub granularity: Granularity,

    /// Records per utilization page
    #[arg(long, default_value = "10")]
    pub page_size: u32,

    /// Skip instance details (resource URIs) in the usage query
    #[arg(long)]
    pub no_details: bool,

    /// Output format: table (default), json, list
    #[arg(long, default_value = "table")]
    pub format: OutputFormat,

    /// What to do when a usage record has no rate card entry
    #[arg(long, default_value = "fail-fast")]
    pub missing_meters: MissingMeterPolicy,

    /// Suppress progress output (for scripting)
    #[arg(long)]
    pub quiet: bool,
}

#[derive(ValueEnum, Debug, Clone, PartialEq)]
pub enum OutputFormat {
    Table,
    Json,
    /// Indented per-field listing, one block per line item
    List,
}

/// Prompt until the user enters a non-blank value. Blank input is handled
/// right here by re-prompting; it never escapes as an error.
pub fn read_nonempty(prompt: &str) -> io::Result<String> {
    let stdin = io::stdin();
    let mut line = String::new();

    loop {
        print!("{prompt}: ");
        io::stdout().flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "stdin closed while waiting for input",
            ));
        }

        let value = line.trim();
        if value.is_empty() {
            eprintln!("A non-empty value is required");
        } else {
            return Ok(value.to_string());
        }
    }
}
