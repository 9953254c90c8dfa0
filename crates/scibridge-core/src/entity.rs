//! Public entity kinds, the relations between them and the native collections behind them.
//!
//! The relation graph is fixed: every relation has one target kind, and the hydrator refuses
//! to re-enter a kind already present on the current path, so nesting depth is bounded by
//! the number of kinds rather than by the client's filter.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::fields::{self, FieldDictionary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
    Dataset,
    Document,
    File,
    Instrument,
    Sample,
    Technique,
    Parameter,
    Member,
    Person,
}

impl EntityKind {
    pub const ALL: [EntityKind; 9] = [
        EntityKind::Dataset,
        EntityKind::Document,
        EntityKind::File,
        EntityKind::Instrument,
        EntityKind::Sample,
        EntityKind::Technique,
        EntityKind::Parameter,
        EntityKind::Member,
        EntityKind::Person,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Dataset => "dataset",
            EntityKind::Document => "document",
            EntityKind::File => "file",
            EntityKind::Instrument => "instrument",
            EntityKind::Sample => "sample",
            EntityKind::Technique => "technique",
            EntityKind::Parameter => "parameter",
            EntityKind::Member => "member",
            EntityKind::Person => "person",
        }
    }

    /// Field dictionary for kinds that have primitive fields of their own.
    pub fn dictionary(self) -> Option<&'static FieldDictionary> {
        match self {
            EntityKind::Dataset => Some(&fields::DATASET),
            EntityKind::Document => Some(&fields::DOCUMENT),
            EntityKind::File => Some(&fields::FILE),
            EntityKind::Instrument => Some(&fields::INSTRUMENT),
            EntityKind::Sample => Some(&fields::SAMPLE),
            EntityKind::Technique => Some(&fields::TECHNIQUE),
            EntityKind::Parameter | EntityKind::Member | EntityKind::Person => None,
        }
    }

    /// Relations a client may request on this kind.
    pub fn relations(self) -> &'static [Relation] {
        match self {
            EntityKind::Dataset => &[
                Relation::Document,
                Relation::Files,
                Relation::Instrument,
                Relation::Parameters,
                Relation::Samples,
                Relation::Techniques,
            ],
            EntityKind::Document => &[Relation::Datasets, Relation::Members, Relation::Parameters],
            EntityKind::Member => &[Relation::Person],
            EntityKind::File
            | EntityKind::Instrument
            | EntityKind::Sample
            | EntityKind::Technique
            | EntityKind::Parameter
            | EntityKind::Person => &[],
        }
    }

    pub fn has_relation(self, relation: Relation) -> bool {
        self.relations().contains(&relation)
    }

    /// Native collection holding records of this kind, when it is stored on its own.
    pub fn collection(self) -> Option<Collection> {
        match self {
            EntityKind::Dataset => Some(Collection::Datasets),
            EntityKind::Document => Some(Collection::PublishedData),
            EntityKind::Instrument => Some(Collection::Instruments),
            EntityKind::Sample => Some(Collection::Samples),
            _ => None,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Relation {
    Document,
    Datasets,
    Files,
    Instrument,
    Parameters,
    Samples,
    Techniques,
    Members,
    Person,
}

impl Relation {
    pub fn as_str(self) -> &'static str {
        match self {
            Relation::Document => "document",
            Relation::Datasets => "datasets",
            Relation::Files => "files",
            Relation::Instrument => "instrument",
            Relation::Parameters => "parameters",
            Relation::Samples => "samples",
            Relation::Techniques => "techniques",
            Relation::Members => "members",
            Relation::Person => "person",
        }
    }

    pub fn target(self) -> EntityKind {
        match self {
            Relation::Document => EntityKind::Document,
            Relation::Datasets => EntityKind::Dataset,
            Relation::Files => EntityKind::File,
            Relation::Instrument => EntityKind::Instrument,
            Relation::Parameters => EntityKind::Parameter,
            Relation::Samples => EntityKind::Sample,
            Relation::Techniques => EntityKind::Technique,
            Relation::Members => EntityKind::Member,
            Relation::Person => EntityKind::Person,
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRelation(pub String);

impl fmt::Display for UnknownRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown relation `{}`", self.0)
    }
}

impl std::error::Error for UnknownRelation {}

impl FromStr for Relation {
    type Err = UnknownRelation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "document" => Relation::Document,
            "datasets" => Relation::Datasets,
            "files" => Relation::Files,
            "instrument" => Relation::Instrument,
            "parameters" => Relation::Parameters,
            "samples" => Relation::Samples,
            "techniques" => Relation::Techniques,
            "members" => Relation::Members,
            "person" => Relation::Person,
            other => return Err(UnknownRelation(other.to_string())),
        })
    }
}

/// Record collections exposed by the backing store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Datasets,
    PublishedData,
    Instruments,
    Samples,
}

impl Collection {
    /// URL path segment of the collection.
    pub fn path(self) -> &'static str {
        match self {
            Collection::Datasets => "Datasets",
            Collection::PublishedData => "PublishedData",
            Collection::Instruments => "Instruments",
            Collection::Samples => "Samples",
        }
    }

    /// Native field used to address a single record.
    pub fn id_field(self) -> &'static str {
        match self {
            Collection::Datasets | Collection::Instruments => "pid",
            Collection::PublishedData => "doi",
            Collection::Samples => "sampleId",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}
