//! Public → native field renaming tables.
use crate::native;

/// Immutable public-to-native field map for one entity kind.
#[derive(Debug)]
pub struct FieldDictionary {
    entries: &'static [(&'static str, &'static str)],
}

impl FieldDictionary {
    pub const fn new(entries: &'static [(&'static str, &'static str)]) -> Self {
        Self { entries }
    }

    /// Native name of a public field.
    pub fn native(&self, public: &str) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(p, _)| *p == public)
            .map(|(_, n)| *n)
    }

    /// `(public, native)` pairs in declaration order.
    pub fn entries(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.entries.iter().copied()
    }
}

pub static DATASET: FieldDictionary = FieldDictionary::new(&[
    ("pid", "pid"),
    ("title", "datasetName"),
    ("isPublic", "isPublished"),
    ("size", "size"),
    ("creationDate", "creationTime"),
]);

pub static DOCUMENT: FieldDictionary = FieldDictionary::new(&[
    ("pid", native::DOI),
    ("title", "title"),
    ("summary", "abstract"),
    ("doi", native::DOI),
]);

pub static FILE: FieldDictionary = FieldDictionary::new(&[
    ("id", "id"),
    ("name", "dataFileList.path"),
    ("path", "dataFileList.path"),
    ("size", "dataFileList.size"),
]);

pub static INSTRUMENT: FieldDictionary = FieldDictionary::new(&[("pid", "pid"), ("name", "name")]);

pub static SAMPLE: FieldDictionary = FieldDictionary::new(&[
    ("pid", native::SAMPLE_ID),
    ("name", "description"),
    ("description", "description"),
]);

pub static TECHNIQUE: FieldDictionary = FieldDictionary::new(&[
    ("pid", "techniques.pid"),
    ("name", "techniques.name"),
]);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_and_path_share_a_native_field() {
        assert_eq!(FILE.native("name"), FILE.native("path"));
        assert_eq!(FILE.native("name"), Some("dataFileList.path"));
    }

    #[test]
    fn unmapped_field_is_absent() {
        assert_eq!(DATASET.native("score"), None);
        assert_eq!(DOCUMENT.native("isPublic"), None);
        assert_eq!(DOCUMENT.native("summary"), Some("abstract"));
    }

    #[test]
    fn entries_keep_declaration_order() {
        let public: Vec<_> = DATASET.entries().map(|(public, _)| public).collect();
        assert_eq!(public, ["pid", "title", "isPublic", "size", "creationDate"]);
    }
}
