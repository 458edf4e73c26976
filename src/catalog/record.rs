use crate::{event, warn};
use serde::{Deserialize, Deserializer};

/// Name reported for objects the registry lists without an `OBJECT_NAME`.
pub const UNKNOWN_OBJECT_NAME: &str = "UNKNOWN";

/// One raw catalog entry as delivered by the registry and persisted in the snapshot cache.
///
/// The element lines are kept verbatim; decoding them is the job of
/// [`crate::tracking::element_parser`] so a malformed entry only fails when it is used.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct OrbitalElementRecord {
    /// Human-readable object name, may be missing or `null` in the source.
    #[serde(
        rename = "OBJECT_NAME",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    object_name: Option<String>,
    /// The registry's stable catalog identifier.
    #[serde(rename = "NORAD_CAT_ID", deserialize_with = "catalog_id_from_json")]
    catalog_id: u32,
    #[serde(rename = "TLE_LINE1")]
    line1: String,
    #[serde(rename = "TLE_LINE2")]
    line2: String,
}

impl OrbitalElementRecord {
    pub fn new(
        catalog_id: u32,
        object_name: Option<String>,
        line1: impl Into<String>,
        line2: impl Into<String>,
    ) -> Self {
        Self { object_name, catalog_id, line1: line1.into(), line2: line2.into() }
    }

    pub fn catalog_id(&self) -> u32 { self.catalog_id }
    pub fn object_name(&self) -> Option<&str> { self.object_name.as_deref() }
    pub fn line1(&self) -> &str { &self.line1 }
    pub fn line2(&self) -> &str { &self.line2 }

    /// The object name, falling back to [`UNKNOWN_OBJECT_NAME`].
    pub fn display_name(&self) -> &str { self.object_name().unwrap_or(UNKNOWN_OBJECT_NAME) }
}

/// The registry serializes every column as a string, older cache files hold plain integers.
#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogIdRepr {
    Number(u32),
    Text(String),
}

fn catalog_id_from_json<'de, D>(deserializer: D) -> Result<u32, D::Error>
where D: Deserializer<'de> {
    match CatalogIdRepr::deserialize(deserializer)? {
        CatalogIdRepr::Number(id) => Ok(id),
        CatalogIdRepr::Text(text) => text.trim().parse::<u32>().map_err(serde::de::Error::custom),
    }
}

/// Decodes a catalog array entry by entry, as delivered by the registry or read from the
/// cache. Entries that do not form a record are dropped, the rest keep their order.
pub fn records_from_json(entries: Vec<serde_json::Value>) -> Vec<OrbitalElementRecord> {
    let total = entries.len();
    let records = entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value(entry) {
            Ok(record) => Some(record),
            Err(e) => {
                event!("Dropping malformed catalog entry #{index}: {e}");
                None
            }
        })
        .collect::<Vec<OrbitalElementRecord>>();
    if records.len() < total {
        let dropped = total - records.len();
        warn!("Dropped {dropped} of {total} catalog entries that could not be decoded.");
    }
    records
}
