mod api;
mod sanitize;
mod scraper;
mod store;
mod wiki;

use std::path::Path;
use std::time::Instant;

use anyhow::Result;

const OUTPUT_FILE: &str = "leaders.json";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();

    let api = api::ApiClient::new(api::BASE_URL);
    api.check_status().await;

    let session = api.acquire_session().await?;
    let countries = api.countries(&session).await?;
    println!("Fetching leaders for {} countries...", countries.len());

    let (map, stats) = scraper::fetch_all(&api, &countries, session).await?;
    println!(
        "Done: {} countries ({} ok, {} failed), {} leaders enriched.",
        stats.countries, stats.ok, stats.failed, stats.enriched
    );

    let path = Path::new(OUTPUT_FILE);
    store::save(&map, path)?;
    println!("Saved {}", path.display());

    // Reload as a smoke check that the document round-trips.
    let reloaded = store::load(path)?;
    let keys: Vec<&str> = reloaded.countries().collect();
    println!("Reloaded {} countries: {}", keys.len(), keys.join(", "));

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    Ok(())
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
