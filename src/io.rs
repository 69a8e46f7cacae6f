//! Character level input and Latin-1 output used by the scanner and the writers.

use std::io::{BufReader, Bytes, Read, Write};

use crate::error::{Error, Result};

/// Source of characters for the scanner.
pub trait CharacterInput {
    /// Read the next character from some input source
    ///
    /// # Return values
    /// 1. Ok(None) to signal EOF.
    /// 2. Ok(Some) to give the next character to the scanner.
    /// 3. Err is passed as is to the caller.
    ///
    /// # Errors
    /// Presumably IO Errors
    fn next_character(&mut self) -> Result<Option<char>>;
}

/// Already decoded text, for example `str::chars()`.
impl<T: Iterator<Item = char>> CharacterInput for T {
    fn next_character(&mut self) -> Result<Option<char>> {
        Ok(self.next())
    }
}

/// ISO-8859-1 character input over a byte stream.
///
/// Every byte maps to the code point of the same value, so decoding cannot fail.
pub struct Latin1Input<R: Read>(Bytes<BufReader<R>>);

impl<R: Read> Latin1Input<R> {
    /// Decode `source` byte by byte.
    pub fn new(source: R) -> Self {
        Self(BufReader::new(source).bytes())
    }
}

impl<R: Read> CharacterInput for Latin1Input<R> {
    fn next_character(&mut self) -> Result<Option<char>> {
        match self.0.next() {
            None => Ok(None), //EOF
            Some(byte) => Ok(Some(char::from(byte?))),
        }
    }
}

/// Decode a byte slice as ISO-8859-1.
pub fn latin1_chars(bytes: &[u8]) -> impl Iterator<Item = char> + '_ {
    bytes.iter().copied().map(char::from)
}

/// Encode text as ISO-8859-1.
///
/// # Errors
/// `Error::Unencodable` for the first character above U+00FF.
pub fn encode_latin1(text: &str) -> Result<Vec<u8>> {
    text.chars()
        .map(|c| {
            u8::try_from(u32::from(c)).map_err(|_| Error::Unencodable {
                character: c,
                encoding: "ISO-8859-1",
            })
        })
        .collect()
}

/// Encode text as ISO-8859-1 and write it out in one go.
///
/// Nothing is written if the text cannot be encoded.
///
/// # Errors
/// * `Error::Unencodable` if the text contains a character above U+00FF.
/// * IO errors of the target.
pub fn write_latin1(target: &mut impl Write, text: &str) -> Result<()> {
    let bytes = encode_latin1(text)?;
    target.write_all(&bytes)?;
    Ok(())
}
