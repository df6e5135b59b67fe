use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{info, warn};

use crate::api::{ApiClient, Session};
use crate::store::{CountryLeadersMap, LeaderRecord};
use crate::wiki;

/// Upstream `/leaders` body: either a bare array of leader objects or an
/// object wrapping them in a `leaders` field. Normalized right here so the
/// shape ambiguity never leaves this module.
#[derive(Deserialize)]
#[serde(untagged)]
enum LeadersResponse {
    Bare(Vec<LeaderRecord>),
    Wrapped { leaders: Vec<LeaderRecord> },
}

impl LeadersResponse {
    fn into_records(self) -> Vec<LeaderRecord> {
        match self {
            LeadersResponse::Bare(records) => records,
            LeadersResponse::Wrapped { leaders } => leaders,
        }
    }
}

/// Per-country result. A `Failed` country still lands in the map as an empty
/// list, so no requested country is ever dropped.
enum CountryOutcome {
    Fetched(Vec<LeaderRecord>),
    Failed(String),
}

/// Fetch summary returned after completion.
pub struct FetchStats {
    pub countries: usize,
    pub ok: usize,
    pub failed: usize,
    pub enriched: usize,
}

/// Fetch the leaders of every country, one request at a time, enriching each
/// leader that has a `wikipedia_url` with its biography excerpt.
///
/// A 401/403 on a `/leaders` request renews the session once and retries
/// once; the renewed session then serves all remaining countries. Everything
/// else that goes wrong with one country is contained to that country.
pub async fn fetch_all(
    api: &ApiClient,
    countries: &[String],
    mut session: Session,
) -> Result<(CountryLeadersMap, FetchStats)> {
    let pb = ProgressBar::new(countries.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} {msg}")?
            .progress_chars("=> "),
    );

    // One client for every Wikipedia page in the run, to reuse connections.
    let wiki_http = reqwest::Client::new();

    let mut map = CountryLeadersMap::new();
    let mut stats = FetchStats {
        countries: countries.len(),
        ok: 0,
        failed: 0,
        enriched: 0,
    };

    for country in countries {
        pb.set_message(country.clone());
        match fetch_country(api, country, &mut session, &wiki_http).await? {
            CountryOutcome::Fetched(records) => {
                stats.ok += 1;
                stats.enriched += records
                    .iter()
                    .filter(|r| r.contains_key("first_paragraph"))
                    .count();
                map.insert(country.clone(), records);
            }
            CountryOutcome::Failed(reason) => {
                warn!("{}: {}", country, reason);
                stats.failed += 1;
                map.insert(country.clone(), Vec::new());
            }
        }
        pb.inc(1);
    }

    pb.finish_and_clear();
    info!(
        "Fetched {} countries ({} ok, {} failed), {} leaders enriched",
        stats.countries, stats.ok, stats.failed, stats.enriched
    );

    Ok((map, stats))
}

/// Process one country. `Err` is reserved for the single fatal case, a failed
/// session renewal; every recoverable problem becomes a `Failed` outcome.
async fn fetch_country(
    api: &ApiClient,
    country: &str,
    session: &mut Session,
    wiki_http: &reqwest::Client,
) -> Result<CountryOutcome> {
    let (mut status, mut body) = match api.leaders(country, session).await {
        Ok(r) => r,
        Err(e) => return Ok(CountryOutcome::Failed(format!("request failed: {}", e))),
    };

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        session.mark_suspect();
        info!("Cookie expired for {}, fetching a new one", country);
        *session = api.acquire_session().await?;
        match api.leaders(country, session).await {
            Ok(r) => (status, body) = r,
            Err(e) => {
                return Ok(CountryOutcome::Failed(format!(
                    "request failed after renewal: {}",
                    e
                )))
            }
        }
    }

    // A second 401/403 falls through here: a fresh cookie that still gets
    // rejected is not something another renewal would fix.
    if !status.is_success() {
        return Ok(CountryOutcome::Failed(format!(
            "leaders request returned {}",
            status
        )));
    }

    let records = match serde_json::from_str::<LeadersResponse>(&body) {
        Ok(parsed) => parsed.into_records(),
        Err(e) => {
            return Ok(CountryOutcome::Failed(format!(
                "unexpected response shape: {}",
                e
            )))
        }
    };

    match enrich(records, wiki_http).await {
        Ok(records) => Ok(CountryOutcome::Fetched(records)),
        Err(e) => Ok(CountryOutcome::Failed(format!("enrichment failed: {}", e))),
    }
}

/// Insert `first_paragraph` into every leader carrying a usable
/// `wikipedia_url`. Leaders without one pass through untouched.
async fn enrich(
    mut records: Vec<LeaderRecord>,
    http: &reqwest::Client,
) -> Result<Vec<LeaderRecord>> {
    for record in &mut records {
        let url = match record.get("wikipedia_url").and_then(|v| v.as_str()) {
            Some(u) if !u.is_empty() => u.to_string(),
            _ => continue,
        };
        let paragraph = wiki::first_paragraph(&url, http).await?;
        record.insert(
            "first_paragraph".to_string(),
            serde_json::Value::String(paragraph),
        );
    }
    Ok(records)
}

// ── Tests ──
