//! `bizsearch <config.yaml> <query...>`: run one search and print the JSON envelope.

use std::error::Error;

use bizsearch::{RankedMatcher, SearchConfig, open_catalog};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let config_path = args.next().ok_or("usage: bizsearch <config.yaml> <query...>")?;
    let query = args.collect::<Vec<_>>().join(" ");

    let config = SearchConfig::from_file(&config_path)?;
    let catalog = open_catalog(&config.catalog)?;
    let matcher = RankedMatcher::new(config.matcher.clone())?;

    let response = matcher.search_response(&query, catalog.as_ref()).await?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
