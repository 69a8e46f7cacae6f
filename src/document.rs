//! Format preserving .properties documents.

use std::collections::{BTreeMap, HashMap};
use std::io::{Read, Write};

use indexmap::IndexMap;
use tracing::debug;

use crate::error::Result;
use crate::io::{write_latin1, CharacterInput};
use crate::reader::{
    has_continuation, is_comment_or_blank, parse, parse_bytes, parse_reader, strip_terminator,
    LogicalLine, Parser,
};
use crate::writer::join_key_value;

/// A .properties document that remembers how it was written.
///
/// Comments, blank lines and untouched entries are written back exactly as they
/// were read. Entries that are set after loading are written in the escaped form
/// produced by [`join_key_value`].
///
/// Duplicate keys are kept in the document; the last occurrence is the one
/// [`get`](Self::get) returns.
///
/// # Example
/// ```rust
/// use javaprops::PropertiesFile;
///
/// let mut doc = PropertiesFile::loads("# settings\nhost = localhost\nport:80\n").unwrap();
/// doc.set("port", "8080");
/// doc.set("user", "admin");
/// assert_eq!(doc.dumps("="), "# settings\nhost = localhost\nport=8080\nuser=admin\n");
/// ```
#[derive(Debug, Clone, Default)]
pub struct PropertiesFile {
    /// Logical lines by position. Positions only ever grow, deleted ones leave gaps.
    lines: BTreeMap<usize, LogicalLine>,
    /// Positions of every key, in order of first occurrence.
    indices: IndexMap<String, Vec<usize>>,
}

impl PropertiesFile {
    /// An empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the document from a scan.
    fn from_parser<I: CharacterInput>(parser: Parser<I>) -> Result<Self> {
        let mut doc = Self::new();
        for (ix, line) in parser.enumerate() {
            let line = line?;
            if let Some(key) = line.key() {
                doc.indices.entry(key.to_owned()).or_default().push(ix);
            }
            doc.lines.insert(ix, line);
        }

        debug!(
            lines = doc.lines.len(),
            keys = doc.indices.len(),
            "loaded properties document"
        );
        Ok(doc)
    }

    /// Read a document from an ISO-8859-1 encoded stream.
    ///
    /// # Errors
    /// * IO errors of the source.
    /// * `Error::InvalidUEscape` for a malformed `\u` escape.
    pub fn load<R: Read>(source: R) -> Result<Self> {
        Self::from_parser(parse_reader(source))
    }

    /// Read a document from a string.
    ///
    /// # Errors
    /// `Error::InvalidUEscape` for a malformed `\u` escape.
    pub fn loads(text: &str) -> Result<Self> {
        Self::from_parser(parse(text))
    }

    /// Read a document from ISO-8859-1 encoded bytes.
    ///
    /// # Errors
    /// `Error::InvalidUEscape` for a malformed `\u` escape.
    pub fn loads_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_parser(parse_bytes(bytes))
    }

    /// Value of the last occurrence of `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        let ix = self.indices.get(key)?.last()?;
        self.lines.get(ix).and_then(LogicalLine::value)
    }

    /// True if any line holds `key`.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.indices.contains_key(key)
    }

    /// Set the value of `key`.
    ///
    /// An existing key keeps the position of its first occurrence and loses all
    /// other occurrences. A new key is appended to the end of the document.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();

        if let Some(ixes) = self.indices.get_mut(&key) {
            let keep = ixes[0];
            if ixes.len() > 1 {
                debug!(key = %key, dropped = ixes.len() - 1, "collapsing duplicate keys");
            }
            for ix in ixes.drain(1..) {
                self.lines.remove(&ix);
            }
            self.lines.insert(keep, LogicalLine::synthesized(key, value));
            return;
        }

        let ix = match self.lines.keys().next_back().copied() {
            None => 0,
            Some(last) => {
                self.terminate_line(last);
                last + 1
            }
        };

        self.indices.insert(key.clone(), vec![ix]);
        self.lines.insert(ix, LogicalLine::synthesized(key, value));
    }

    /// Make sure the stored source of line `ix` ends cleanly so that a line can follow it.
    fn terminate_line(&mut self, ix: usize) {
        let Some(line) = self.lines.get_mut(&ix) else {
            return;
        };
        let Some(source) = line.source() else {
            return;
        };

        let body = strip_terminator(source);
        let terminator = &source[body.len()..];
        let mut body = body.to_owned();

        // A dangling continuation would swallow the next line.
        if !is_comment_or_blank(source) && has_continuation(&body) {
            body.pop();
        }

        body.push_str(if terminator.is_empty() { "\n" } else { terminator });
        if body != source {
            line.set_source(body);
        }
    }

    /// Remove every occurrence of `key`, returning the value of the last one.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let ixes = self.indices.shift_remove(key)?;
        let mut value = None;
        for ix in ixes {
            value = self
                .lines
                .remove(&ix)
                .and_then(LogicalLine::into_entry)
                .map(|(_, v)| v);
        }
        value
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// True if the document holds no entries. Comments do not count.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Keys in order of first occurrence. Use `.rev()` for the reverse order.
    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &str> + ExactSizeIterator {
        self.indices.keys().map(String::as_str)
    }

    /// Keys and their current values in order of first occurrence.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&str, &str)> + ExactSizeIterator {
        self.indices.iter().map(move |(key, ixes)| {
            let value = ixes
                .last()
                .and_then(|ix| self.lines.get(ix))
                .and_then(LogicalLine::value)
                .unwrap_or_default();
            (key.as_str(), value)
        })
    }

    /// Every logical line of the document, including comments and duplicates.
    pub fn lines(&self) -> impl Iterator<Item = &LogicalLine> {
        self.lines.values()
    }

    /// The lines that decide equality: comments by their source, and the last
    /// occurrence of every key by key and value.
    fn comparable(&self) -> impl Iterator<Item = (Option<&str>, Option<&str>)> {
        self.lines.iter().filter_map(move |(ix, line)| match line.key() {
            None => Some((None, line.source())),
            Some(key) => {
                let authoritative = self.indices.get(key).and_then(|ixes| ixes.last()) == Some(ix);
                authoritative.then(|| (Some(key), line.value()))
            }
        })
    }

    /// Render the document as text.
    ///
    /// Lines without source text are written as `key<separator>value`.
    #[must_use]
    pub fn dumps(&self, separator: &str) -> String {
        let mut out = String::new();
        for line in self.lines.values() {
            if let Some(source) = line.source() {
                out.push_str(source);
            } else if let (Some(key), Some(value)) = (line.key(), line.value()) {
                out.push_str(&join_key_value(key, value, separator));
                out.push('\n');
            }
        }
        out
    }

    /// Write the document as ISO-8859-1.
    ///
    /// # Errors
    /// * `Error::Unencodable` if the document was loaded from text containing
    ///   characters above U+00FF outside of escapes.
    /// * IO errors of the target.
    pub fn dump(&self, target: &mut impl Write, separator: &str) -> Result<()> {
        write_latin1(target, &self.dumps(separator))
    }
}

impl PartialEq for PropertiesFile {
    fn eq(&self, other: &Self) -> bool {
        self.comparable().eq(other.comparable())
    }
}

impl Eq for PropertiesFile {}

impl PartialEq<IndexMap<String, String>> for PropertiesFile {
    fn eq(&self, other: &IndexMap<String, String>) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(k, v)| other.get(k).is_some_and(|o| o == v))
    }
}

impl PartialEq<HashMap<String, String>> for PropertiesFile {
    fn eq(&self, other: &HashMap<String, String>) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(k, v)| other.get(k).is_some_and(|o| o == v))
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for PropertiesFile {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.set(key, value);
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PropertiesFile {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut doc = Self::new();
        doc.extend(iter);
        doc
    }
}
