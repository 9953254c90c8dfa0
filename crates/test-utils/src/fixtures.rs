//! A small native catalogue: two datasets, one publication referencing both, instruments and
//! one sample.
use std::sync::Arc;

use serde_json::{Value, json};

use scibridge_core::{Collection, Record};
use scibridge_fetch::Catalog;

use crate::memory::InMemoryCollection;

pub const LYSOZYME_PID: &str = "20.500.12269/ds-1";
pub const FERRITIN_PID: &str = "20.500.12269/ds-2";
pub const PUBLICATION_DOI: &str = "10.5072/pub-1";
pub const LOKI_PID: &str = "i-loki";
pub const SAMPLE_ID: &str = "s-1";

pub fn lysozyme_dataset() -> Record {
    json!({
        "pid": LYSOZYME_PID,
        "datasetName": "Lysozyme",
        "isPublished": true,
        "size": 1024,
        "creationTime": "2021-03-01T00:00:00Z",
        "owner": "ESS",
        "sampleId": SAMPLE_ID,
        "techniques": [{"pid": "t-sans", "name": "SANS"}],
        "instrument": {"pid": LOKI_PID, "name": "LoKI"},
        "scientificMetadata": {
            "temperature": {"value": 20, "unit": "degC", "valueSI": 293.15, "unitSI": "K"},
            "wavelength": {"value": 5, "unit": "angstrom", "valueSI": 5e-10, "unitSI": "m"},
            "mode": "fast"
        },
        "origdatablocks": [{
            "id": "blk-1",
            "dataFileList": [
                {"path": "raw/run1/a.nxs", "size": 100},
                {"path": "b.log", "size": 5}
            ]
        }]
    })
}

pub fn ferritin_dataset() -> Record {
    json!({
        "pid": FERRITIN_PID,
        "datasetName": "Ferritin",
        "isPublished": true,
        "size": 2048,
        "creationTime": "2022-06-15T00:00:00Z",
        "scientificMetadata": {
            "temperature": {"value": 4, "unit": "K", "valueSI": 4, "unitSI": "K"}
        },
        "origdatablocks": []
    })
}

/// References the first dataset with a duplicated namespace, as some stores record it.
pub fn publication() -> Record {
    json!({
        "doi": PUBLICATION_DOI,
        "title": "Protein structures at low temperature",
        "abstract": "Two proteins, two temperatures.",
        "pidArray": [format!("20.500.12269/{LYSOZYME_PID}"), FERRITIN_PID],
        "creator": ["Ada Lovelace"],
        "authors": ["Grace Hopper", "Alan Turing"]
    })
}

pub fn instruments() -> Vec<Record> {
    vec![
        json!({"pid": LOKI_PID, "name": "LoKI"}),
        json!({"pid": "i-odin", "name": "ODIN"}),
    ]
}

pub fn samples() -> Vec<Record> {
    vec![json!({"sampleId": SAMPLE_ID, "description": "Lysozyme crystal"})]
}

/// The four in-memory collections, kept so tests can inspect the calls they received.
#[derive(Debug, Clone)]
pub struct FixtureStore {
    pub datasets: Arc<InMemoryCollection>,
    pub publications: Arc<InMemoryCollection>,
    pub instruments: Arc<InMemoryCollection>,
    pub samples: Arc<InMemoryCollection>,
}

impl Default for FixtureStore {
    fn default() -> Self {
        Self::with_records(
            vec![lysozyme_dataset(), ferritin_dataset()],
            vec![publication()],
            instruments(),
            samples(),
        )
    }
}

impl FixtureStore {
    pub fn with_records(
        datasets: Vec<Value>,
        publications: Vec<Value>,
        instruments: Vec<Value>,
        samples: Vec<Value>,
    ) -> Self {
        Self {
            datasets: Arc::new(InMemoryCollection::new(Collection::Datasets, datasets)),
            publications: Arc::new(InMemoryCollection::new(
                Collection::PublishedData,
                publications,
            )),
            instruments: Arc::new(InMemoryCollection::new(Collection::Instruments, instruments)),
            samples: Arc::new(InMemoryCollection::new(Collection::Samples, samples)),
        }
    }

    pub fn catalog(&self) -> Catalog {
        Catalog::new(
            self.datasets.clone(),
            self.publications.clone(),
            self.instruments.clone(),
            self.samples.clone(),
        )
    }
}
