//! The XML flavour of properties files, as read by `java.util.Properties#loadFromXML`.
//!
//! ```xml
//! <!DOCTYPE properties SYSTEM "http://java.sun.com/dtd/properties.dtd">
//! <properties>
//! <comment>optional</comment>
//! <entry key="key">value</entry>
//! </properties>
//! ```

use std::io::{BufRead, Write};

use indexmap::IndexMap;
use quick_xml::encoding::Decoder;
use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;

use crate::error::{Error, Result};

const DOCTYPE: &str = r#"<!DOCTYPE properties SYSTEM "http://java.sun.com/dtd/properties.dtd">"#;

/// Output settings for [`dump_xml`] and [`dumps_xml`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDumpOptions {
    /// Content of the `<comment>` element, omitted if None.
    pub comment: Option<String>,
    /// Encoding named in the XML declaration and used for the bytes written by [`dump_xml`].
    pub encoding: String,
    /// Write entries sorted by key instead of in iteration order.
    pub sort_keys: bool,
}

impl Default for XmlDumpOptions {
    fn default() -> Self {
        Self {
            comment: None,
            encoding: String::from("UTF-8"),
            sort_keys: false,
        }
    }
}

impl XmlDumpOptions {
    /// Set [`comment`](Self::comment).
    #[must_use]
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Set [`encoding`](Self::encoding).
    #[must_use]
    pub fn encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = encoding.into();
        self
    }

    /// Set [`sort_keys`](Self::sort_keys).
    #[must_use]
    pub const fn sort_keys(mut self, sort_keys: bool) -> Self {
        self.sort_keys = sort_keys;
        self
    }
}

/// Byte encodings [`dump_xml`] can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum XmlEncoding {
    Utf8,
    Latin1,
    Ascii,
}

impl XmlEncoding {
    fn from_name(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(Self::Utf8),
            "iso-8859-1" | "iso8859-1" | "latin-1" | "latin1" => Ok(Self::Latin1),
            "us-ascii" | "ascii" => Ok(Self::Ascii),
            _ => Err(Error::UnsupportedEncoding(name.to_owned())),
        }
    }

    /// Highest code point the encoding can hold.
    const fn max_char(self) -> u32 {
        match self {
            Self::Utf8 => char::MAX as u32,
            Self::Latin1 => 0xFF,
            Self::Ascii => 0x7F,
        }
    }

    /// Encode the text, replacing what cannot be encoded with `&#N;` character references.
    fn encode(self, text: &str) -> Vec<u8> {
        if self == Self::Utf8 {
            return text.as_bytes().to_vec();
        }

        let mut out = Vec::with_capacity(text.len());
        for c in text.chars() {
            match u8::try_from(u32::from(c)) {
                // C1 controls as references: ISO-8859-1 input is decoded as windows-1252.
                Ok(byte) if u32::from(c) <= self.max_char() && !(0x80..=0x9F).contains(&byte) => {
                    out.push(byte);
                }
                _ => out.extend_from_slice(format!("&#{};", u32::from(c)).as_bytes()),
            }
        }
        out
    }
}

/// Quote an attribute value, choosing single quotes if that avoids escaping.
fn quote_attr(value: &str) -> String {
    let escaped = partial_escape(value)
        .replace('\n', "&#10;")
        .replace('\r', "&#13;")
        .replace('\t', "&#9;");

    if !escaped.contains('"') {
        format!("\"{escaped}\"")
    } else if !escaped.contains('\'') {
        format!("'{escaped}'")
    } else {
        format!("\"{}\"", escaped.replace('"', "&quot;"))
    }
}

/// Check that the root element is `<properties>`.
fn check_root(element: &BytesStart<'_>) -> Result<()> {
    if element.name().as_ref() == b"properties" {
        return Ok(());
    }

    let tag = String::from_utf8_lossy(element.name().as_ref()).into_owned();
    debug!(tag = %tag, "XML properties document has the wrong root element");
    Err(Error::NotPropertiesRoot { tag })
}

/// The decoded and unescaped `key` attribute of an `<entry>`.
fn entry_key(element: &BytesStart<'_>, decoder: Decoder) -> Result<String> {
    let Some(attribute) = element
        .try_get_attribute("key")
        .map_err(|e| Error::Xml(e.to_string()))?
    else {
        debug!("XML <entry> without key attribute");
        return Err(Error::MissingEntryKey);
    };

    Ok(attribute
        .decode_and_unescape_value(decoder)
        .map_err(|e| Error::Xml(e.to_string()))?
        .into_owned())
}

/// Collect the `<entry>` children of the root element in document order.
///
/// The value of an entry is the text before its first child element, if any.
/// Text is decoded with the encoding of the XML declaration, UTF-8 if there is none.
fn read_entries<R: BufRead>(reader: &mut Reader<R>) -> Result<Vec<(String, String)>> {
    let mut entries = Vec::new();
    let mut buf = Vec::new();
    let mut depth = 0usize;
    let mut seen_root = false;
    // Entry being read, and whether a child element already ended its text.
    let mut current: Option<(String, String)> = None;
    let mut has_child = false;

    loop {
        let event = reader.read_event_into(&mut buf)?;
        // The declaration may switch the encoding, so ask after every event.
        let decoder = reader.decoder();
        match event {
            Event::Start(e) => {
                depth += 1;
                match depth {
                    1 => {
                        check_root(&e)?;
                        seen_root = true;
                    }
                    2 if e.name().as_ref() == b"entry" => {
                        current = Some((entry_key(&e, decoder)?, String::new()));
                        has_child = false;
                    }
                    3 => has_child = true,
                    _ => {}
                }
            }
            Event::Empty(e) => match depth {
                0 => {
                    check_root(&e)?;
                    seen_root = true;
                }
                1 if e.name().as_ref() == b"entry" => {
                    entries.push((entry_key(&e, decoder)?, String::new()));
                }
                2 => has_child = true,
                _ => {}
            },
            Event::End(_) => {
                if depth == 2 {
                    if let Some(entry) = current.take() {
                        entries.push(entry);
                    }
                }
                depth = depth.saturating_sub(1);
            }
            Event::Text(t) if depth == 2 && !has_child => {
                if let Some((_, value)) = current.as_mut() {
                    value.push_str(&t.unescape().map_err(|e| Error::Xml(e.to_string()))?);
                }
            }
            Event::CData(c) if depth == 2 && !has_child => {
                if let Some((_, value)) = current.as_mut() {
                    let text = decoder.decode(&c).map_err(|e| Error::Xml(e.to_string()))?;
                    value.push_str(&text);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !seen_root {
        return Err(Error::Xml(String::from("document has no root element")));
    }

    Ok(entries)
}

/// Read an XML properties document from a stream.
///
/// The bytes are decoded as announced by the XML declaration (or a byte order mark),
/// so documents written by [`dump_xml`] in any of its encodings load back.
///
/// # Errors
/// * `Error::NotPropertiesRoot` if the root element is not `<properties>`.
/// * `Error::MissingEntryKey` if an `<entry>` has no `key` attribute.
/// * `Error::Xml` for malformed XML or IO errors of the source.
pub fn load_xml<R: BufRead>(source: R) -> Result<IndexMap<String, String>> {
    load_xml_with(source)
}

/// Like [`load_xml`], collecting the pairs into any map.
///
/// # Errors
/// See [`load_xml`].
pub fn load_xml_with<M: FromIterator<(String, String)>, R: BufRead>(source: R) -> Result<M> {
    let mut reader = Reader::from_reader(source);
    Ok(read_entries(&mut reader)?.into_iter().collect())
}

/// Read an XML properties document from a string.
///
/// # Errors
/// See [`load_xml`].
pub fn loads_xml(text: &str) -> Result<IndexMap<String, String>> {
    loads_xml_with(text)
}

/// Like [`loads_xml`], collecting the pairs into any map.
///
/// The text is already decoded, so the encoding named in its declaration is ignored.
///
/// # Errors
/// See [`load_xml`].
pub fn loads_xml_with<M: FromIterator<(String, String)>>(text: &str) -> Result<M> {
    let mut reader = Reader::from_str(text);
    Ok(read_entries(&mut reader)?.into_iter().collect())
}

/// Everything after the XML declaration, one element per line.
fn render<K, V>(pairs: impl IntoIterator<Item = (K, V)>, options: &XmlDumpOptions) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut out = String::new();
    out.push_str(DOCTYPE);
    out.push_str("\n<properties>\n");

    if let Some(comment) = &options.comment {
        out.push_str("<comment>");
        out.push_str(&partial_escape(comment.as_str()));
        out.push_str("</comment>\n");
    }

    let mut pairs: Vec<(K, V)> = pairs.into_iter().collect();
    if options.sort_keys {
        pairs.sort_by(|a, b| a.0.as_ref().cmp(b.0.as_ref()));
    }

    for (key, value) in &pairs {
        out.push_str("<entry key=");
        out.push_str(&quote_attr(key.as_ref()));
        out.push('>');
        out.push_str(&partial_escape(value.as_ref()));
        out.push_str("</entry>\n");
    }

    out.push_str("</properties>\n");
    out
}

/// Serialize key/value pairs as an XML properties document, without XML declaration.
///
/// `options.encoding` is ignored since no bytes are produced.
#[must_use]
pub fn dumps_xml<K, V>(pairs: impl IntoIterator<Item = (K, V)>, options: &XmlDumpOptions) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    render(pairs, options)
}

/// Write key/value pairs as an XML properties document in `options.encoding`.
///
/// Characters the encoding cannot hold are written as `&#N;` character references.
///
/// # Errors
/// * `Error::UnsupportedEncoding` if the encoding is not UTF-8, ISO-8859-1 or US-ASCII.
/// * IO errors of the target.
pub fn dump_xml<K, V>(
    pairs: impl IntoIterator<Item = (K, V)>,
    target: &mut impl Write,
    options: &XmlDumpOptions,
) -> Result<()>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let encoding = XmlEncoding::from_name(&options.encoding)?;

    let mut text = format!(
        "<?xml version=\"1.0\" encoding={} standalone=\"no\"?>\n",
        quote_attr(&options.encoding)
    );
    text.push_str(&render(pairs, options));

    target.write_all(&encoding.encode(&text))?;
    Ok(())
}
