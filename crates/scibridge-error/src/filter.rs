/// The client supplied a filter that cannot be translated.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FilterError {
    #[error("Parameter name was not provided")]
    MissingParameterName,

    #[error("Parameter value was not provided")]
    MissingParameterValue,

    #[error("Member filters combined with `{combinator}` are not supported")]
    UnsupportedMemberFilter { combinator: &'static str },

    #[error("Unknown unit `{0}`")]
    UnknownUnit(String),

    #[error("Cannot convert from `{from}` to `{to}`: dimensions differ")]
    IncompatibleUnits { from: String, to: String },

    #[error("Parameter value `{0}` is not numeric")]
    NonNumericValue(String),

    #[error("Malformed filter: {0}")]
    Malformed(String),
}
