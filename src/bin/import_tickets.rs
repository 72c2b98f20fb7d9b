// Small ops utility: import tickets from a CSV file or a published sheet link.
//
// Usage:
//   cargo run --bin import_tickets -- <csv_path|sheet_url> [strategy] [db_path]
//
// strategy: upsert_by_key (default from config) | replace_all

use anyhow::Context;
use plantx_hub::api::failure_message;
use plantx_hub::app::{get_default_db_path, AppState};
use plantx_hub::PersistenceStrategy;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    plantx_hub::logging::init();

    let mut args = std::env::args().skip(1);
    let target = args
        .next()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .context("usage: import_tickets <csv_path|sheet_url> [strategy] [db_path]")?;

    let strategy = match args.next().filter(|s| !s.trim().is_empty()) {
        Some(raw) => Some(
            raw.parse::<PersistenceStrategy>()
                .map_err(anyhow::Error::msg)?,
        ),
        None => None,
    };

    let db_path = args.next().unwrap_or_else(get_default_db_path);
    let state = AppState::new(db_path)?;

    let is_link = target.starts_with("http://") || target.starts_with("https://");
    let result = if is_link {
        state
            .import_api
            .import_from_google_sheet(Some(&target), strategy)
            .await
    } else {
        state.import_api.import_from_file(&target, strategy).await
    };

    match result {
        Ok(response) => {
            println!("{}", response.message);
            let outcome = &response.outcome;
            println!(
                "batch_id={} created={} updated={} deleted={} skipped_short={} skipped_empty={}",
                outcome.batch_id,
                outcome.created,
                outcome.updated,
                outcome.deleted,
                outcome.skipped_short,
                outcome.skipped_empty
            );
            for failure in &outcome.failures {
                println!(
                    "row {} [{:?}] {}",
                    failure.row_number, failure.stage, failure.message
                );
            }
            Ok(())
        }
        Err(err) => {
            eprintln!("{}", failure_message(&err));
            Err(err.into())
        }
    }
}
