//! Properties files
//!
//! Line-oriented `key=value` tables. This is the format of the provider
//! configuration file (`provider.1=beecrypt`, `keystore.default=BEE`, ...).
//!
//! Rules:
//! - blank lines and lines starting with `#` or `!` are ignored
//! - the key ends at the first `=` or `:` (or whitespace when neither is present)
//! - keys and values are trimmed
//! - a later definition of a key overrides an earlier one

use std::collections::BTreeMap;
use std::fs;
use std::io::Read;
use std::path::Path;

use log::trace;

use crate::common::Result;

/// An ordered string-to-string table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    entries: BTreeMap<String, String>,
}

impl Properties {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse properties from text
    pub fn parse(text: &str) -> Self {
        let mut props = Self::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }

            let split = line
                .find(|c| c == '=' || c == ':')
                .or_else(|| line.find(char::is_whitespace));

            let (key, value) = match split {
                Some(pos) => (&line[..pos], &line[pos + 1..]),
                None => (line, ""),
            };

            let key = key.trim();
            if key.is_empty() {
                continue;
            }
            trace!("property {} = {}", key, value.trim());
            props.set(key, value.trim());
        }
        props
    }

    /// Read and parse properties from a reader
    pub fn load<R: Read>(mut reader: R) -> Result<Self> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        Ok(Self::parse(&text))
    }

    /// Read and parse a properties file
    pub fn load_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(Self::parse(&text))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Value of `key`, or `default` when absent
    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over keys and values in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_separators_and_comments() {
        let props = Properties::parse(
            "# providers\n\
             ! another comment\n\
             provider.1 = beecrypt\n\
             provider.2: other\n\
             keystore.default BEE\n\
             \n\
             empty=\n",
        );

        assert_eq!(props.get("provider.1"), Some("beecrypt"));
        assert_eq!(props.get("provider.2"), Some("other"));
        assert_eq!(props.get("keystore.default"), Some("BEE"));
        assert_eq!(props.get("empty"), Some(""));
        assert_eq!(props.len(), 4);
    }

    #[test]
    fn test_later_keys_override() {
        let props = Properties::parse("a=1\na=2\n");
        assert_eq!(props.get("a"), Some("2"));
        assert_eq!(props.get_or("b", "x"), "x");
    }

    #[test]
    fn test_dotted_keys_stay_flat() {
        let props = Properties::parse("provider.1=beecrypt
provider.1.note=first
Provider.1=Other
");
        assert_eq!(props.get("provider.1"), Some("beecrypt"));
        assert_eq!(props.get("provider.1.note"), Some("first"));
        assert_eq!(props.get("Provider.1"), Some("Other"));
        assert_eq!(props.len(), 3);
    }

    #[test]
    fn test_value_keeps_inner_separators() {
        let props = Properties::parse("Signature.X = a=b:c d\n");
        assert_eq!(props.get("Signature.X"), Some("a=b:c d"));
    }
}
