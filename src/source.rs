use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use anyhow::Context as _;
use serde_json::Value;

use crate::foundation::error::{FitcardError, FitcardResult};
use crate::telemetry::model::Enrichment;

/// Endpoint name carrying per-sample endurance telemetry.
pub const ENDPOINT_DETAILS: &str = "details";
/// Endpoint name carrying the strength workout set log.
pub const ENDPOINT_WORKOUT: &str = "workout";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActivityKind {
    Endurance,
    Strength,
}

/// One synced activity as stored: raw provider payloads keyed by endpoint
/// name, plus the optional enrichment record.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct RawRecord {
    pub payloads: BTreeMap<String, Value>,
    pub enrichment: Option<Enrichment>,
}

impl RawRecord {
    pub fn payload(&self, endpoint: &str) -> Option<&Value> {
        self.payloads.get(endpoint)
    }

    /// A record with a workout payload is a strength activity; everything
    /// else renders as endurance.
    pub fn kind(&self) -> ActivityKind {
        if self.payloads.contains_key(ENDPOINT_WORKOUT) {
            ActivityKind::Strength
        } else {
            ActivityKind::Endurance
        }
    }
}

/// Source of raw activity records, keyed by record id.
pub trait RecordStore {
    fn load(&self, record_id: &str) -> FitcardResult<RawRecord>;
}

/// Directory-backed store: one `<id>.json` file per record.
///
/// The file is a flat JSON object. The `enrichment` key, when present, is
/// decoded into the typed enrichment record; every other key is kept as an
/// opaque endpoint payload.
pub struct DirRecordStore {
    root: PathBuf,
}

impl DirRecordStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl RecordStore for DirRecordStore {
    fn load(&self, record_id: &str) -> FitcardResult<RawRecord> {
        let path = self.root.join(format!("{record_id}.json"));
        if !path.exists() {
            return Err(FitcardError::not_found(record_id));
        }
        let bytes = fs::read(&path).with_context(|| format!("read record {}", path.display()))?;
        let doc: BTreeMap<String, Value> = serde_json::from_slice(&bytes)
            .map_err(|e| FitcardError::serde(format!("record {record_id}: {e}")))?;

        let mut record = RawRecord::default();
        for (endpoint, payload) in doc {
            if endpoint == "enrichment" {
                let enrichment = serde_json::from_value(payload)
                    .map_err(|e| FitcardError::serde(format!("record {record_id} enrichment: {e}")))?;
                record.enrichment = Some(enrichment);
            } else {
                record.payloads.insert(endpoint, payload);
            }
        }
        Ok(record)
    }
}
