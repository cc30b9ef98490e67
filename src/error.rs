use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("malformed XML document")]
    Xml(#[from] quick_xml::Error),
    #[error("unrecognized file format")]
    Format,
    #[error("unsupported TTML version '{0}'")]
    UnsupportedVersion(String),
    #[error("invalid timestamp '{value}': {reason}")]
    Timestamp { value: String, reason: String },
    #[error("I/O error")]
    Io(#[from] io::Error),
}

impl From<quick_xml::events::attributes::AttrError> for ConvertError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        ConvertError::Xml(err.into())
    }
}
