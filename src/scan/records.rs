//! Record directory: maps code text to the record it identifies

use crate::error::{Result, ScanError};
use log::info;
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Structured information attached to a recognized code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub id: String,
    pub name: String,
    pub location: String,
    pub procedure: String,
}

/// On-disk shape of one directory entry; the code text is the map key.
#[derive(Debug, Deserialize)]
struct RecordEntry {
    name: String,
    #[serde(alias = "room")]
    location: String,
    procedure: String,
}

static WARD: Lazy<RecordDirectory> = Lazy::new(|| {
    RecordDirectory::from_entries([
        ("Patient 1", "Patient A", "101", "Knee Surgery"),
        ("Patient 2", "Patient B", "102", "Appendectomy"),
        ("Patient 3", "Patient C", "103", "Endoscopy"),
        ("Patient 4", "Patient D", "104", "Dialysis"),
    ])
});

/// Immutable lookup table, loaded once at startup
#[derive(Debug, Clone, Default)]
pub struct RecordDirectory {
    records: HashMap<String, Record>,
}

impl RecordDirectory {
    /// The ward directory compiled into the binary
    pub fn builtin() -> Self {
        WARD.clone()
    }

    pub fn from_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str, &'a str, &'a str)>) -> Self {
        let records = entries
            .into_iter()
            .map(|(code, name, location, procedure)| {
                (
                    code.to_string(),
                    Record {
                        id: code.to_string(),
                        name: name.to_string(),
                        location: location.to_string(),
                        procedure: procedure.to_string(),
                    },
                )
            })
            .collect();
        Self { records }
    }

    /// Parse a JSON object of `code -> {name, location|room, procedure}`
    pub fn from_json(json: &str) -> Result<Self> {
        let entries: HashMap<String, RecordEntry> =
            serde_json::from_str(json).map_err(|e| ScanError::Records(e.to_string()))?;

        let records = entries
            .into_iter()
            .map(|(code, entry)| {
                let record = Record {
                    id: code.clone(),
                    name: entry.name,
                    location: entry.location,
                    procedure: entry.procedure,
                };
                (code, record)
            })
            .collect();
        Ok(Self { records })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| ScanError::Records(format!("{}: {}", path.display(), e)))?;
        let directory = Self::from_json(&json)?;
        info!(
            "Loaded {} records from {}",
            directory.len(),
            path.display()
        );
        Ok(directory)
    }

    /// Look up the record for a code; unknown text is simply `None`.
    pub fn resolve(&self, text: &str) -> Option<&Record> {
        self.records.get(text)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
