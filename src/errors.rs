//! Global error type definitions

use std::ops::Deref;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
/// An element attribute API was used incorrectly
pub enum UsageError {
    #[error("use add_class() / remove_class() to manage the class attribute")]
    /// The `class` attribute is synthesized from the class list and cannot be set directly
    ClassAttribute,
}

#[derive(Debug, Error)]
/// The form tree was constructed with an invalid configuration
///
/// These are programmer errors. They are reported when the tree is built and are never produced
/// while binding, validating or rendering.
pub enum ConfigurationError {
    #[error("unknown field class `{0}`")]
    /// No constructor is registered for the field class
    UnknownFieldClass(String),

    #[error("unknown validator `{0}`")]
    /// No validator matches the given validator name
    UnknownValidator(String),

    #[error("invalid argument for validator `{validator}`: {reason}")]
    /// The validator requires an argument that is missing or malformed
    InvalidValidatorArgument { validator: String, reason: String },

    #[error("field `{0}` does not exist in the container")]
    /// A validator references a field that is not part of the tree
    MissingField(String),

    #[error("failed to read field metadata: {0}")]
    /// Field metadata could not be deserialized
    Metadata(#[from] serde_json::Error),
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown format mode `{0}`, expected one of raw, html, form, export")]
/// A format mode name could not be parsed
pub struct UnknownFormatMode(pub String);

#[derive(Debug, Error)]
#[error("format failed: {0:?}")]
/// A formatter could not transform a value
///
/// Format errors never escape a render: they are caught at the formatter boundary and the
/// value degrades to null.
pub struct FormatError(#[from] anyhow::Error);

#[derive(Debug, Error)]
#[error(transparent)]
/// An external collaborator (row source, metadata provider) failed
///
/// The error is propagated unchanged, the engine makes no attempt to retry.
pub struct SourceError(Box<dyn std::error::Error + Send + Sync>);

impl SourceError {
    pub fn new<E: std::error::Error + Send + Sync + 'static>(err: E) -> Self {
        Self(Box::new(err))
    }
}

impl Deref for SourceError {
    type Target = Box<dyn std::error::Error + Send + Sync>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[derive(Debug, Error)]
#[error("submit handler failed: {0:?}")]
/// The persistence callback of a form returned an error
pub struct SubmitError(#[from] anyhow::Error);

#[derive(Debug, Error)]
/// Loading a data set from a row source failed
pub enum LoadError {
    #[error(transparent)]
    /// The row source failed
    Source(#[from] SourceError),

    #[error(transparent)]
    /// The columns supplied by the source could not be turned into fields
    Configuration(#[from] ConfigurationError),
}
