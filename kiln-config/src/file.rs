use std::path::{Path, PathBuf};

use crate::{KilnConfig, Properties, Result};

/// File name of the project configuration.
pub const CONFIG_FILE: &str = "kiln.toml";
/// File name of the per-build property overrides.
pub const PROPERTIES_FILE: &str = "kiln.properties";

/// Represents a kiln.toml file with both raw content and parsed config.
#[derive(Debug)]
pub struct KilnToml {
    path: PathBuf,
    content: String,
    config: KilnConfig,
}

impl KilnToml {
    /// Open and parse a kiln.toml file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let content = std::fs::read_to_string(&path).map_err(|e| {
            Box::new(crate::Error::Io {
                path: path.clone(),
                source: e,
            })
        })?;
        let filename = path.display().to_string();
        let config = KilnConfig::from_str_with_filename(&content, &filename)?;

        Ok(Self {
            path,
            content,
            config,
        })
    }

    /// Load the effective configuration of a project directory.
    ///
    /// Missing `kiln.toml` means defaults; a `kiln.properties` next to it is
    /// applied on top.
    pub fn load(project_dir: impl AsRef<Path>) -> Result<KilnConfig> {
        let project_dir = project_dir.as_ref();

        let config_path = project_dir.join(CONFIG_FILE);
        let mut config = if config_path.is_file() {
            Self::open(&config_path)?.config
        } else {
            KilnConfig::default()
        };

        let properties_path = project_dir.join(PROPERTIES_FILE);
        if properties_path.is_file() {
            config.apply_properties(&Properties::from_file(&properties_path)?)?;
        }

        Ok(config)
    }

    /// Get the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the raw content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Get the parsed config.
    pub fn config(&self) -> &KilnConfig {
        &self.config
    }
}
