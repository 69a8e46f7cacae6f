//! Error type shared by the readers and writers.

use thiserror::Error;

/// Everything that can go wrong while reading or writing properties.
#[derive(Error, Debug)]
pub enum Error {
    /// A `\u` escape that is not followed by exactly four hexadecimal digits.
    /// `escape` holds the backslash, the `u` and up to four of the characters after it.
    #[error("invalid \\u escape sequence: {escape:?}")]
    InvalidUEscape { escape: String },

    /// Reading the source or writing the target failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The output encoding has no representation for `character`.
    #[error("character {character:?} cannot be encoded as {encoding}")]
    Unencodable {
        character: char,
        encoding: &'static str,
    },

    /// The root element of an XML document is not `<properties>`.
    #[error("XML document is not rooted at <properties> but at <{tag}>")]
    NotPropertiesRoot { tag: String },

    /// An XML `<entry>` without `key` attribute.
    #[error("<entry> is missing \"key\" attribute")]
    MissingEntryKey,

    /// XML output was requested in an encoding other than UTF-8, ISO-8859-1 or US-ASCII.
    #[error("unsupported XML output encoding: {0}")]
    UnsupportedEncoding(String),

    /// The XML reader rejected the document.
    #[error("XML parse error: {0}")]
    Xml(String),
}

impl From<quick_xml::Error> for Error {
    fn from(value: quick_xml::Error) -> Self {
        Self::Xml(value.to_string())
    }
}

/// Result of every fallible operation in this crate.
pub type Result<T> = std::result::Result<T, Error>;
