//! Scanner for the line oriented `.properties` format.

use std::io::Read;

use indexmap::IndexMap;
use tracing::trace;

use crate::error::{Error, Result};
use crate::io::{latin1_chars, CharacterInput, Latin1Input};

/// Whitespace the format knows about. Everything else is part of a key or value.
pub(crate) const WHITESPACE: [char; 3] = [' ', '\t', '\x0C'];

/// One entry of a .properties file, possibly spanning several physical lines.
///
/// Comments and blank lines carry no key and no value, only their source text.
/// Lines created by assignment rather than parsing have no source text.
#[derive(Debug, Eq, PartialEq, Clone, Hash)]
pub struct LogicalLine {
    /// Unescaped key and value. None for comments and blank lines.
    entry: Option<(String, String)>,
    /// Exact original text including all line terminators.
    source: Option<String>,
}

impl LogicalLine {
    /// A comment or blank line read from `source`.
    #[must_use]
    pub const fn comment(source: String) -> Self {
        Self {
            entry: None,
            source: Some(source),
        }
    }

    /// A key/value entry read from `source`.
    #[must_use]
    pub const fn entry(key: String, value: String, source: String) -> Self {
        Self {
            entry: Some((key, value)),
            source: Some(source),
        }
    }

    /// A key/value entry that has never been written anywhere.
    #[must_use]
    pub const fn synthesized(key: String, value: String) -> Self {
        Self {
            entry: Some((key, value)),
            source: None,
        }
    }

    /// Unescaped key, None for comments and blank lines.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.entry.as_ref().map(|(k, _)| k.as_str())
    }

    /// Unescaped value, None for comments and blank lines.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.entry.as_ref().map(|(_, v)| v.as_str())
    }

    /// Text the line was read from, None if it was synthesized.
    #[must_use]
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// True for key/value entries.
    #[must_use]
    pub const fn is_entry(&self) -> bool {
        self.entry.is_some()
    }

    /// Take the key/value pair out of the line.
    #[must_use]
    pub fn into_entry(self) -> Option<(String, String)> {
        self.entry
    }

    pub(crate) fn set_source(&mut self, source: String) {
        self.source = Some(source);
    }
}

/// Splits a character stream into physical lines, keeping `\n`, `\r\n` or `\r` at the end.
struct PhysicalLines<I: CharacterInput> {
    input: I,
    /// Character read after a lone `\r` that belongs to the next line.
    pending: Option<char>,
}

impl<I: CharacterInput> PhysicalLines<I> {
    /// Read the next physical line, None at EOF.
    fn next_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        loop {
            let next = match self.pending.take() {
                Some(c) => Some(c),
                None => self.input.next_character()?,
            };

            let Some(c) = next else {
                return Ok((!line.is_empty()).then_some(line));
            };

            line.push(c);
            match c {
                '\n' => return Ok(Some(line)),
                '\r' => {
                    //Either CRLF (Windows) or CR (Mac)
                    match self.input.next_character()? {
                        Some('\n') => line.push('\n'),
                        other => self.pending = other,
                    }
                    return Ok(Some(line));
                }
                _ => {}
            }
        }
    }
}

/// Lazy scanner over the logical lines of a .properties document.
///
/// Single pass: once the input is exhausted or an error has been returned, the
/// iterator only yields `None`.
pub struct Parser<I: CharacterInput> {
    lines: PhysicalLines<I>,
    done: bool,
}

impl<I: CharacterInput> Parser<I> {
    /// Scan characters from `input`.
    pub const fn new(input: I) -> Self {
        Self {
            lines: PhysicalLines {
                input,
                pending: None,
            },
            done: false,
        }
    }

    /// Scan one logical line.
    fn scan(&mut self) -> Result<Option<LogicalLine>> {
        let Some(mut source) = self.lines.next_line()? else {
            return Ok(None);
        };

        if is_comment_or_blank(&source) {
            return Ok(Some(LogicalLine::comment(source)));
        }

        let mut content = String::from(logical_content(&source));
        while has_continuation(&content) {
            content.pop();
            let next = self.lines.next_line()?.unwrap_or_default();
            content.push_str(logical_content(&next));
            source.push_str(&next);
        }

        if content.is_empty() {
            return Ok(Some(LogicalLine::comment(source)));
        }

        let (key, value) = match find_separator(&content) {
            Some((key_end, value_start)) => (
                unescape(&content[..key_end])?,
                unescape(&content[value_start..])?,
            ),
            None => (unescape(&content)?, String::new()),
        };

        Ok(Some(LogicalLine::entry(key, value, source)))
    }
}

impl<I: CharacterInput> Iterator for Parser<I> {
    type Item = Result<LogicalLine>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.scan() {
            Ok(Some(line)) => {
                trace!(key = ?line.key(), "scanned logical line");
                Some(Ok(line))
            }
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl<I: CharacterInput> std::iter::FusedIterator for Parser<I> {}

/// Strip the line terminator, if any.
pub(crate) fn strip_terminator(line: &str) -> &str {
    line.strip_suffix("\r\n")
        .or_else(|| line.strip_suffix('\n'))
        .or_else(|| line.strip_suffix('\r'))
        .unwrap_or(line)
}

/// The line without leading whitespace and without its terminator.
fn logical_content(line: &str) -> &str {
    strip_terminator(line.trim_start_matches(WHITESPACE))
}

/// True if the physical line is a comment or consists only of whitespace.
pub(crate) fn is_comment_or_blank(line: &str) -> bool {
    let rest = line.trim_start_matches(WHITESPACE);
    rest.starts_with(['#', '!']) || strip_terminator(rest).is_empty()
}

/// True if the text ends in an odd number of backslashes.
pub(crate) fn has_continuation(text: &str) -> bool {
    let trailing = text.chars().rev().take_while(|c| *c == '\\').count();
    trailing % 2 == 1
}

/// Byte offset of the first character that is not whitespace, starting at `from`.
fn skip_whitespace(text: &str, from: usize) -> usize {
    text.len() - text[from..].trim_start_matches(WHITESPACE).len()
}

/// Locate the key/value separator.
///
/// Returns the end of the raw key and the start of the raw value, or None if the
/// whole line is the key.
fn find_separator(content: &str) -> Option<(usize, usize)> {
    let mut escaped = false;
    for (i, c) in content.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }

        match c {
            '\\' => escaped = true,
            '=' | ':' => return Some((i, skip_whitespace(content, i + 1))),
            ' ' | '\t' | '\x0C' => {
                let mut value_start = skip_whitespace(content, i);
                if content[value_start..].starts_with(['=', ':']) {
                    value_start = skip_whitespace(content, value_start + 1);
                }
                return Some((i, value_start));
            }
            _ => {}
        }
    }

    None
}

/// Resolve the escape sequences of a raw key or value.
///
/// `\t`, `\n`, `\f`, `\r` and `\uXXXX` are decoded, any other escaped character
/// stands for itself. A backslash at the end or before a line break is kept. Consecutive `\u` escapes forming a UTF-16 surrogate pair are
/// combined into one character; a surrogate without its partner becomes U+FFFD.
///
/// # Errors
/// `Error::InvalidUEscape` if a `\u` is not followed by four hexadecimal digits.
pub fn unescape(field: &str) -> Result<String> {
    let mut units: Vec<u16> = Vec::with_capacity(field.len());
    let mut buf = [0u16; 2];
    let mut chars = field.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            units.extend_from_slice(c.encode_utf16(&mut buf));
            continue;
        }

        let decoded = match chars.next() {
            // A dangling backslash is kept as is.
            None => '\\',
            // So is one in front of a line break.
            Some('\n') => {
                units.extend_from_slice(&[u16::from(b'\\'), u16::from(b'\n')]);
                continue;
            }
            Some('t') => '\t',
            Some('n') => '\n',
            Some('f') => '\x0C',
            Some('r') => '\r',
            Some('u') => {
                let digits: String = chars
                    .clone()
                    .take_while(|d| *d != '\n')
                    .take(4)
                    .collect();
                let unit = (digits.len() == 4 && digits.chars().all(|d| d.is_ascii_hexdigit()))
                    .then(|| u16::from_str_radix(&digits, 16).ok())
                    .flatten()
                    .ok_or_else(|| Error::InvalidUEscape {
                        escape: format!("\\u{digits}"),
                    })?;
                chars.nth(3);
                units.push(unit);
                continue;
            }
            Some(other) => other,
        };
        units.extend_from_slice(decoded.encode_utf16(&mut buf));
    }

    Ok(char::decode_utf16(units)
        .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect())
}

/// Scan a .properties document held in a string.
pub fn parse(text: &str) -> Parser<std::str::Chars<'_>> {
    Parser::new(text.chars())
}

/// Scan ISO-8859-1 encoded bytes.
pub fn parse_bytes(bytes: &[u8]) -> Parser<impl Iterator<Item = char> + '_> {
    Parser::new(latin1_chars(bytes))
}

/// Scan an ISO-8859-1 encoded stream.
pub fn parse_reader<R: Read>(source: R) -> Parser<Latin1Input<R>> {
    Parser::new(Latin1Input::new(source))
}

/// Feed the key/value pairs of a scan into a combine strategy.
fn combine<M, I>(parser: Parser<I>) -> Result<M>
where
    M: FromIterator<(String, String)>,
    I: CharacterInput,
{
    parser
        .filter_map(|line| line.map(LogicalLine::into_entry).transpose())
        .collect()
}

/// Read key/value pairs from an ISO-8859-1 encoded stream.
///
/// Keys keep the position of their first occurrence, the last value wins.
///
/// # Errors
/// * IO errors of the source.
/// * `Error::InvalidUEscape` for a malformed `\u` escape.
pub fn load<R: Read>(source: R) -> Result<IndexMap<String, String>> {
    load_with(source)
}

/// Like [`load`], collecting the pairs into any map (or `Vec` to keep duplicates).
///
/// # Errors
/// * IO errors of the source.
/// * `Error::InvalidUEscape` for a malformed `\u` escape.
pub fn load_with<M: FromIterator<(String, String)>, R: Read>(source: R) -> Result<M> {
    combine(parse_reader(source))
}

/// Read key/value pairs from a string.
///
/// # Errors
/// `Error::InvalidUEscape` for a malformed `\u` escape.
pub fn loads(text: &str) -> Result<IndexMap<String, String>> {
    loads_with(text)
}

/// Like [`loads`], collecting the pairs into any map.
///
/// # Errors
/// `Error::InvalidUEscape` for a malformed `\u` escape.
pub fn loads_with<M: FromIterator<(String, String)>>(text: &str) -> Result<M> {
    combine(parse(text))
}

/// Read key/value pairs from ISO-8859-1 encoded bytes.
///
/// # Errors
/// `Error::InvalidUEscape` for a malformed `\u` escape.
pub fn loads_bytes(bytes: &[u8]) -> Result<IndexMap<String, String>> {
    loads_bytes_with(bytes)
}

/// Like [`loads_bytes`], collecting the pairs into any map.
///
/// # Errors
/// `Error::InvalidUEscape` for a malformed `\u` escape.
pub fn loads_bytes_with<M: FromIterator<(String, String)>>(bytes: &[u8]) -> Result<M> {
    combine(parse_bytes(bytes))
}
