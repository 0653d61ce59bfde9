//! Properties-style overrides (`key=value` lines).

use std::path::Path;

use crate::{Error, Result};

/// Property keys understood by [`KilnConfig::apply_properties`].
///
/// [`KilnConfig::apply_properties`]: crate::KilnConfig::apply_properties
pub mod keys {
    pub const TRACK_SOURCE_FILES: &str = "kiln.trackSourceFiles";
    pub const OUTPUT_DIR: &str = "kiln.outputDir";
    pub const PARALLEL: &str = "kiln.parallel";
    pub const MAX_ROUNDS: &str = "kiln.maxRounds";
}

/// A parsed properties file.
///
/// Later definitions of a key win, like in `java.util.Properties`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    entries: Vec<(String, String)>,
}

impl Properties {
    /// Parse properties text. Blank lines and lines starting with `#` or `!`
    /// are ignored; the first `=` or `:` separates key and value.
    pub fn parse(content: &str) -> Self {
        let entries = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with('!'))
            .map(|line| match line.find(['=', ':']) {
                Some(idx) => (line[..idx].trim().to_string(), line[idx + 1..].trim().to_string()),
                None => (line.to_string(), String::new()),
            })
            .collect();
        Self { entries }
    }

    /// Read and parse a properties file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Box::new(Error::Io {
                path: path.to_path_buf(),
                source: e,
            })
        })?;
        Ok(Self::parse(&content))
    }

    /// Set a property, replacing any earlier value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.push((key.into(), value.into()));
    }

    /// The last value defined for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub(crate) fn get_bool(&self, key: &str) -> Result<Option<bool>> {
        let Some(value) = self.get(key) else {
            return Ok(None);
        };
        match value.to_ascii_lowercase().as_str() {
            "true" => Ok(Some(true)),
            "false" => Ok(Some(false)),
            _ => Err(invalid(key, value, "`true` or `false`")),
        }
    }

    pub(crate) fn get_usize(&self, key: &str) -> Result<Option<usize>> {
        let Some(value) = self.get(key) else {
            return Ok(None);
        };
        value
            .parse()
            .map(Some)
            .map_err(|_| invalid(key, value, "a positive integer"))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn invalid(key: &str, value: &str, expected: &'static str) -> Box<Error> {
    Box::new(Error::InvalidProperty {
        key: key.to_string(),
        value: value.to_string(),
        expected,
    })
}
