//! # javaprops
//! Reader and writer for java `.properties` files that keeps comments and formatting intact.
//!
//! * [`load`]/[`loads`] read key/value pairs, [`dump`]/[`dumps`] write them.
//! * [`PropertiesFile`] edits a document while keeping everything that was not touched byte for byte.
//! * [`Properties`] mimics `java.util.Properties` including its chain of defaults.
//! * [`load_xml`]/[`dump_xml`] handle the XML flavour of properties files.
//!
//! Byte based input and output is ISO-8859-1, like `java.util.Properties#load(InputStream)`.
//!
//! # Example
//! ```rust
//! use javaprops::{loads, PropertiesFile};
//!
//! let text = "# database\nhost = db.local\nport: 5432\n";
//! let map = loads(text).unwrap();
//! assert_eq!(map["port"], "5432");
//!
//! let mut doc = PropertiesFile::loads(text).unwrap();
//! doc.set("port", "5433");
//! assert_eq!(doc.dumps("="), "# database\nhost = db.local\nport=5433\n");
//! ```
#![deny(
    clippy::correctness,
    clippy::perf,
    clippy::complexity,
    clippy::style,
    clippy::nursery,
    clippy::pedantic,
    clippy::clone_on_ref_ptr,
    clippy::decimal_literal_representation,
    clippy::float_cmp_const,
    clippy::multiple_inherent_impl,
    clippy::unwrap_used,
    clippy::used_underscore_binding
)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod document;
pub mod error;
pub mod io;
pub mod properties;
pub mod reader;
pub mod timestamp;
pub mod writer;
pub mod xml;

pub use document::PropertiesFile;
pub use error::{Error, Result};
pub use properties::Properties;
pub use reader::{
    load, load_with, loads, loads_bytes, loads_bytes_with, loads_with, parse, parse_bytes,
    parse_reader, unescape, LogicalLine, Parser,
};
pub use timestamp::{java_timestamp, Timestamp};
pub use writer::{
    dump, dumps, escape, escape_value, escape_value_with, escape_with, join_key_value,
    join_key_value_with, to_comment, to_comment_with, CommentEscape, DumpOptions,
};
pub use xml::{
    dump_xml, dumps_xml, load_xml, load_xml_with, loads_xml, loads_xml_with, XmlDumpOptions,
};
