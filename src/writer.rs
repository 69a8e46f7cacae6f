//! Escaping and serialization of key/value pairs.

use std::io::Write;

use crate::error::Result;
use crate::io::write_latin1;
use crate::timestamp::{java_timestamp, Timestamp};

/// Output settings for [`dump`] and [`dumps`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpOptions {
    /// Written between each key and value, conventionally `=`, `:` or a space.
    pub separator: String,
    /// Comment written at the top of the output.
    pub comments: Option<String>,
    /// Timestamp comment written after `comments`.
    pub timestamp: Timestamp,
    /// Write entries sorted by key instead of in iteration order.
    pub sort_keys: bool,
    /// `\u` escape every character outside printable ASCII.
    /// If false only control characters are escaped.
    pub ensure_ascii: bool,
    /// Terminator written after every line, `\n` by default.
    pub line_ending: String,
}

impl Default for DumpOptions {
    fn default() -> Self {
        Self {
            separator: String::from("="),
            comments: None,
            timestamp: Timestamp::Now,
            sort_keys: false,
            ensure_ascii: true,
            line_ending: String::from("\n"),
        }
    }
}

impl DumpOptions {
    /// Set [`separator`](Self::separator).
    #[must_use]
    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// Set [`comments`](Self::comments).
    #[must_use]
    pub fn comments(mut self, comments: impl Into<String>) -> Self {
        self.comments = Some(comments.into());
        self
    }

    /// Set [`timestamp`](Self::timestamp).
    #[must_use]
    pub fn timestamp(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Set [`sort_keys`](Self::sort_keys).
    #[must_use]
    pub const fn sort_keys(mut self, sort_keys: bool) -> Self {
        self.sort_keys = sort_keys;
        self
    }

    /// Set [`ensure_ascii`](Self::ensure_ascii).
    #[must_use]
    pub const fn ensure_ascii(mut self, ensure_ascii: bool) -> Self {
        self.ensure_ascii = ensure_ascii;
        self
    }

    /// Set [`line_ending`](Self::line_ending).
    #[must_use]
    pub fn line_ending(mut self, line_ending: impl Into<String>) -> Self {
        self.line_ending = line_ending.into();
        self
    }
}

/// Which characters [`to_comment_with`] turns into `\uXXXX` escapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommentEscape {
    /// Everything above U+00FF, so the comment survives ISO-8859-1 encoding.
    #[default]
    Latin1,
    /// Everything above U+007F.
    Ascii,
    /// Nothing.
    None,
}

/// Emits the 6-character sequence (\uxxxx, xxxx being lowercase HEX) needed to escape a single char.
/// For characters that need 2 utf-16 escape sequences (surrogates), it emits 12 characters.
fn escape_unicode(target: &mut String, c: char) {
    static LUT: [char; 16] = [
        '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f',
    ];

    let mut buf = [0; 2];
    for n in c.encode_utf16(&mut buf) {
        let n = *n;
        target.push('\\');
        target.push('u');
        target.push(LUT[((n >> 12) & 0xF) as usize]);
        target.push(LUT[((n >> 8) & 0xF) as usize]);
        target.push(LUT[((n >> 4) & 0xF) as usize]);
        target.push(LUT[(n & 0xF) as usize]);
    }
}

/// Escaping shared by keys and values. Spaces are left alone.
fn base_escape(target: &mut String, c: char, ensure_ascii: bool) {
    match c {
        '\t' => target.push_str("\\t"),
        '\n' => target.push_str("\\n"),
        '\x0C' => target.push_str("\\f"),
        '\r' => target.push_str("\\r"),
        '!' | '#' | ':' | '=' | '\\' => {
            target.push('\\');
            target.push(c);
        }
        other => {
            let needs_escape = if ensure_ascii {
                !(' '..='~').contains(&other)
            } else {
                other.is_ascii_control()
            };

            if needs_escape {
                escape_unicode(target, other);
            } else {
                target.push(other);
            }
        }
    }
}

/// Escape a key for use in a .properties file.
///
/// Reserved characters (`\ # ! = :`), control characters, non-ASCII characters and
/// every space are escaped.
#[must_use]
pub fn escape(field: &str) -> String {
    escape_with(field, true)
}

/// Like [`escape`]; with `ensure_ascii` false, non-ASCII characters are written as is.
#[must_use]
pub fn escape_with(field: &str, ensure_ascii: bool) -> String {
    let mut out = String::with_capacity(field.len());
    for c in field.chars() {
        if c == ' ' {
            out.push_str("\\ ");
        } else {
            base_escape(&mut out, c, ensure_ascii);
        }
    }
    out
}

/// Escape a value for use in a .properties file.
///
/// Unlike keys, only the leading spaces of a value need escaping.
#[must_use]
pub fn escape_value(field: &str) -> String {
    escape_value_with(field, true)
}

/// Like [`escape_value`]; with `ensure_ascii` false, non-ASCII characters are written as is.
#[must_use]
pub fn escape_value_with(field: &str, ensure_ascii: bool) -> String {
    let mut out = String::with_capacity(field.len());
    let mut had_non_whitespace = false;
    for c in field.chars() {
        if c == ' ' {
            if !had_non_whitespace {
                out.push('\\');
            }
            out.push(' ');
            continue;
        }

        had_non_whitespace = true;
        base_escape(&mut out, c, ensure_ascii);
    }
    out
}

/// Render a key/value pair as a single line, without line terminator.
#[must_use]
pub fn join_key_value(key: &str, value: &str, separator: &str) -> String {
    join_key_value_with(key, value, separator, true)
}

/// Like [`join_key_value`]; with `ensure_ascii` false, non-ASCII characters are written as is.
#[must_use]
pub fn join_key_value_with(key: &str, value: &str, separator: &str, ensure_ascii: bool) -> String {
    let mut line = escape_with(key, ensure_ascii);
    line.push_str(separator);
    line.push_str(&escape_value_with(value, ensure_ascii));
    line
}

/// Turn arbitrary text into a comment, escaping characters above U+00FF.
///
/// Every line of the result starts with `#` unless it already started with `#` or `!`.
/// No trailing line terminator is added.
#[must_use]
pub fn to_comment(comment: &str) -> String {
    to_comment_with(comment, CommentEscape::Latin1)
}

/// Like [`to_comment`] with a choice of which characters to escape.
#[must_use]
pub fn to_comment_with(comment: &str, escaping: CommentEscape) -> String {
    let normalized = comment.replace("\r\n", "\n").replace('\r', "\n");
    let mut out = String::with_capacity(normalized.len() + 1);
    out.push('#');

    let mut chars = normalized.chars().peekable();
    while let Some(c) = chars.next() {
        let needs_escape = match escaping {
            CommentEscape::Latin1 => u32::from(c) > 0xFF,
            CommentEscape::Ascii => u32::from(c) > 0x7F,
            CommentEscape::None => false,
        };

        if needs_escape {
            escape_unicode(&mut out, c);
        } else {
            out.push(c);
        }

        if c == '\n' && !matches!(chars.peek(), Some('#' | '!')) {
            out.push('#');
        }
    }
    out
}

/// Render the whole document as text.
fn render<K, V>(pairs: impl IntoIterator<Item = (K, V)>, options: &DumpOptions) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut out = String::new();
    if let Some(comments) = &options.comments {
        out.push_str(&to_comment(comments));
        out.push_str(&options.line_ending);
    }

    if options.timestamp != Timestamp::None {
        out.push_str(&to_comment(&java_timestamp(&options.timestamp)));
        out.push_str(&options.line_ending);
    }

    let mut pairs: Vec<(K, V)> = pairs.into_iter().collect();
    if options.sort_keys {
        pairs.sort_by(|a, b| a.0.as_ref().cmp(b.0.as_ref()));
    }

    for (key, value) in &pairs {
        out.push_str(&join_key_value_with(
            key.as_ref(),
            value.as_ref(),
            &options.separator,
            options.ensure_ascii,
        ));
        out.push_str(&options.line_ending);
    }
    out
}

/// Serialize key/value pairs into a .properties document.
///
/// Types typically used as `pairs`:
/// * `&IndexMap<String, String>` or `&HashMap<String, String>`
/// * `Vec<(&str, &str)>`
///
/// # Example
/// ```rust
/// use javaprops::{dumps, DumpOptions, Timestamp};
///
/// let options = DumpOptions::default().timestamp(Timestamp::None);
/// let text = dumps(vec![("key", "value"), ("other key", " x")], &options);
/// assert_eq!(text, "key=value\nother\\ key=\\ x\n");
/// ```
#[must_use]
pub fn dumps<K, V>(pairs: impl IntoIterator<Item = (K, V)>, options: &DumpOptions) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    render(pairs, options)
}

/// Serialize key/value pairs into a .properties document and write it as ISO-8859-1.
///
/// # Errors
/// * `Error::Unencodable` if the output contains characters above U+00FF, which
///   can only happen with `ensure_ascii` turned off.
/// * IO errors of the target.
pub fn dump<K, V>(
    pairs: impl IntoIterator<Item = (K, V)>,
    target: &mut impl Write,
    options: &DumpOptions,
) -> Result<()>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    write_latin1(target, &render(pairs, options))
}
