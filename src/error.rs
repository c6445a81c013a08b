//! Error types for kmzkit operations.

use thiserror::Error;

/// Errors that can occur while reading, transforming, or writing KMZ containers.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Invalid KML: {0}")]
    InvalidKml(String),

    #[error("no GroundOverlay element found in KML document")]
    NoOverlayFound,

    #[error("UTF-8 decoding error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

pub type Result<T> = std::result::Result<T, Error>;
