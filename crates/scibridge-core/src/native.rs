//! Field and relation names of the native dialect that the bridge addresses directly.

/// Scientific metadata map on a dataset: `{ <name>: { value, unit, valueSI, unitSI } }`.
pub const SCIENTIFIC_METADATA: &str = "scientificMetadata";
pub const VALUE: &str = "value";
pub const UNIT: &str = "unit";
pub const VALUE_SI: &str = "valueSI";
pub const UNIT_SI: &str = "unitSI";

/// Dataset relation holding file blocks, each with a `dataFileList`.
pub const ORIG_DATABLOCKS: &str = "origdatablocks";
pub const DATA_FILE_LIST: &str = "dataFileList";
pub const INSTRUMENT: &str = "instrument";
pub const TECHNIQUES: &str = "techniques";
pub const SAMPLE_ID: &str = "sampleId";
pub const PID: &str = "pid";

pub const DOI: &str = "doi";
pub const PID_ARRAY: &str = "pidArray";
pub const CREATOR: &str = "creator";
pub const AUTHORS: &str = "authors";

/// Dotted path to one metadata entry's sub-field, e.g. `scientificMetadata.energy.valueSI`.
pub fn metadata_path(name: &str, field: &str) -> String {
    format!("{SCIENTIFIC_METADATA}.{name}.{field}")
}
