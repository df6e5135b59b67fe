use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One leader exactly as the API returned it: an opaque field set. Unknown
/// fields round-trip untouched; enrichment only ever adds `first_paragraph`.
pub type LeaderRecord = Map<String, Value>;

/// Country → leaders, keyed in processing order (serde_json is built with
/// `preserve_order`, so the document keeps the order countries were fetched).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CountryLeadersMap {
    inner: Map<String, Value>,
}

impl CountryLeadersMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the leaders for one country. An empty `Vec` is a legitimate
    /// value: failed countries are stored too, never dropped.
    pub fn insert(&mut self, country: String, leaders: Vec<LeaderRecord>) {
        let leaders = leaders.into_iter().map(Value::Object).collect();
        self.inner.insert(country, Value::Array(leaders));
    }

    pub fn countries(&self) -> impl Iterator<Item = &str> {
        self.inner.keys().map(String::as_str)
    }

    pub fn leaders(&self, country: &str) -> Option<&[Value]> {
        self.inner.get(country)?.as_array().map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// Write the map as pretty-printed UTF-8 JSON. Non-ASCII characters go out
/// verbatim; serde_json never escapes them. I/O failure propagates.
pub fn save(map: &CountryLeadersMap, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(map).context("Failed to serialize leaders map")?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

/// Read a saved document back into the same mapping shape.
pub fn load(path: &Path) -> Result<CountryLeadersMap> {
    let json =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("Failed to parse {}", path.display()))
}

// ── Tests ──
