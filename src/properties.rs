//! `java.util.Properties` look-alike with a chain of default values.

use std::collections::{HashMap, HashSet};
use std::io::{BufRead, Read, Write};
use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::Result;
use crate::reader::{load, loads};
use crate::writer::{dump, DumpOptions};
use crate::xml::{dump_xml, load_xml, XmlDumpOptions};

/// String to string store with read-only fallbacks.
///
/// The `defaults` are only consulted by [`get_property`](Self::get_property),
/// [`property_names`](Self::property_names) and
/// [`string_property_names`](Self::string_property_names). Every other method
/// looks at the local entries alone.
///
/// Defaults are shared behind an [`Arc`] and can no longer change once shared,
/// so a chain of defaults always ends.
///
/// # Example
/// ```rust
/// use std::sync::Arc;
/// use javaprops::Properties;
///
/// let base: Properties = [("color", "blue")].into_iter().collect();
/// let mut props = Properties::with_defaults(Arc::new(base));
/// props.set_property("size", "10");
///
/// assert_eq!(props.get_property("color"), Some("blue"));
/// assert_eq!(props.get("color"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    data: IndexMap<String, String>,
    defaults: Option<Arc<Properties>>,
}

impl Properties {
    /// An empty store without defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty store falling back to `defaults`.
    #[must_use]
    pub fn with_defaults(defaults: Arc<Self>) -> Self {
        Self {
            data: IndexMap::new(),
            defaults: Some(defaults),
        }
    }

    /// Local entries from `data`, falling back to `defaults`.
    pub fn from_entries<K, V>(
        data: impl IntoIterator<Item = (K, V)>,
        defaults: Option<Arc<Self>>,
    ) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut props = Self {
            data: IndexMap::new(),
            defaults,
        };
        props.extend(data);
        props
    }

    /// The next store of the chain, if any.
    #[must_use]
    pub fn defaults(&self) -> Option<&Arc<Self>> {
        self.defaults.as_ref()
    }

    /// Replace the next store of the chain.
    pub fn set_defaults(&mut self, defaults: Option<Arc<Self>>) {
        self.defaults = defaults;
    }

    /// Look up `key` locally, then along the chain of defaults.
    #[must_use]
    pub fn get_property(&self, key: &str) -> Option<&str> {
        match self.data.get(key) {
            Some(value) => Some(value.as_str()),
            None => self.defaults.as_ref()?.get_property(key),
        }
    }

    /// Like [`get_property`](Self::get_property), returning `default` if no store in
    /// the chain has the key.
    #[must_use]
    pub fn get_property_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get_property(key).unwrap_or(default)
    }

    /// Same as [`set`](Self::set).
    pub fn set_property(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Option<String> {
        self.set(key, value)
    }

    /// Every key of the chain, local keys first, each key once.
    ///
    /// Names are produced lazily while iterating.
    pub fn property_names(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        let local = self.data.keys().map(String::as_str);
        match &self.defaults {
            None => Box::new(local),
            Some(defaults) => Box::new(
                local.chain(
                    defaults
                        .property_names()
                        .filter(move |key| !self.data.contains_key(*key)),
                ),
            ),
        }
    }

    /// Every key of the chain.
    #[must_use]
    pub fn string_property_names(&self) -> HashSet<&str> {
        let mut names = self
            .defaults
            .as_ref()
            .map(|defaults| defaults.string_property_names())
            .unwrap_or_default();
        names.extend(self.data.keys().map(String::as_str));
        names
    }

    /// Local value of `key`; the defaults are not consulted.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }

    /// Set a local value, returning the previous local value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.data.insert(key.into(), value.into())
    }

    /// Remove a local value. The order of the remaining entries is kept.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.data.shift_remove(key)
    }

    /// True if `key` has a local value.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Number of local entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if there are no local entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Local keys in insertion order.
    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &str> + ExactSizeIterator {
        self.data.keys().map(String::as_str)
    }

    /// Local entries in insertion order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&str, &str)> + ExactSizeIterator {
        self.data.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Merge the entries of an ISO-8859-1 encoded .properties stream into the local entries.
    ///
    /// # Errors
    /// * IO errors of the source.
    /// * `Error::InvalidUEscape` for a malformed `\u` escape.
    pub fn load<R: Read>(&mut self, source: R) -> Result<()> {
        self.data.extend(load(source)?);
        Ok(())
    }

    /// Merge the entries of a .properties document held in a string.
    ///
    /// # Errors
    /// `Error::InvalidUEscape` for a malformed `\u` escape.
    pub fn loads(&mut self, text: &str) -> Result<()> {
        self.data.extend(loads(text)?);
        Ok(())
    }

    /// Write the local entries, preceded by `comments` and the current time.
    ///
    /// # Errors
    /// IO errors of the target.
    pub fn store(&self, target: &mut impl Write, comments: Option<&str>) -> Result<()> {
        let options = DumpOptions {
            comments: comments.map(String::from),
            ..DumpOptions::default()
        };
        self.store_with(target, &options)
    }

    /// Write the local entries with full control over the output.
    ///
    /// # Errors
    /// * `Error::Unencodable` if `ensure_ascii` is off and an entry holds
    ///   characters above U+00FF.
    /// * IO errors of the target.
    pub fn store_with(&self, target: &mut impl Write, options: &DumpOptions) -> Result<()> {
        dump(&self.data, target, options)
    }

    /// Merge the entries of an XML properties document into the local entries.
    ///
    /// # Errors
    /// * `Error::NotPropertiesRoot` or `Error::MissingEntryKey` for documents of the wrong shape.
    /// * `Error::Xml` for malformed XML.
    pub fn load_from_xml<R: BufRead>(&mut self, source: R) -> Result<()> {
        self.data.extend(load_xml(source)?);
        Ok(())
    }

    /// Write the local entries as an XML properties document.
    ///
    /// # Errors
    /// * `Error::UnsupportedEncoding` if `encoding` is not UTF-8, ISO-8859-1 or US-ASCII.
    /// * IO errors of the target.
    pub fn store_to_xml(
        &self,
        target: &mut impl Write,
        comment: Option<&str>,
        encoding: &str,
    ) -> Result<()> {
        let options = XmlDumpOptions {
            comment: comment.map(String::from),
            ..XmlDumpOptions::default().encoding(encoding)
        };
        dump_xml(&self.data, target, &options)
    }
}

impl PartialEq<IndexMap<String, String>> for Properties {
    fn eq(&self, other: &IndexMap<String, String>) -> bool {
        self.data == *other
    }
}

impl PartialEq<HashMap<String, String>> for Properties {
    fn eq(&self, other: &HashMap<String, String>) -> bool {
        self.data.len() == other.len()
            && self
                .data
                .iter()
                .all(|(k, v)| other.get(k).is_some_and(|o| o == v))
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for Properties {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        self.data
            .extend(iter.into_iter().map(|(k, v)| (k.into(), v.into())));
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Properties {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self::from_entries(iter, None)
    }
}
