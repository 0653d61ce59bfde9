//! Configuration types and parsing for kiln.toml files.

use std::{
    path::{Path, PathBuf},
    str::FromStr,
};

use serde::Deserialize;

use crate::{Error, Properties, Result, SourceContext, keys};

/// Root configuration for kiln.toml
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KilnConfig {
    /// Code generation settings
    #[serde(default)]
    pub generation: GenerationConfig,
}

/// The `[generation]` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields, default)]
pub struct GenerationConfig {
    /// Root generated-sources directory, relative to the project directory
    /// unless absolute.
    pub output_dir: PathBuf,

    /// Require every generated file to report its originating source files.
    pub track_source_files: bool,

    /// Run the invocations of a round on a worker pool.
    pub parallel: bool,

    /// Upper bound on rounds that produce new files. The final empty round
    /// confirming the fixed point is not counted.
    pub max_rounds: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("build/kiln"),
            track_source_files: false,
            parallel: true,
            max_rounds: 100,
        }
    }
}

impl FromStr for KilnConfig {
    type Err = Box<Error>;

    fn from_str(s: &str) -> Result<Self> {
        parse_config(s, "kiln.toml")
    }
}

impl KilnConfig {
    /// Parse a kiln.toml file from the given path.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Box::new(Error::Io {
                path: path.to_path_buf(),
                source: e,
            })
        })?;
        parse_config(&content, &path.display().to_string())
    }

    /// Parse a kiln.toml from a string with a custom filename for error reporting.
    pub fn from_str_with_filename(content: &str, filename: &str) -> Result<Self> {
        parse_config(content, filename)
    }

    /// Apply property overrides on top of this configuration.
    ///
    /// Unrelated keys are ignored, a malformed value for a known key is an
    /// error.
    pub fn apply_properties(&mut self, properties: &Properties) -> Result<()> {
        let generation = &mut self.generation;

        if let Some(value) = properties.get_bool(keys::TRACK_SOURCE_FILES)? {
            generation.track_source_files = value;
        }
        if let Some(value) = properties.get_bool(keys::PARALLEL)? {
            generation.parallel = value;
        }
        if let Some(value) = properties.get_usize(keys::MAX_ROUNDS)? {
            if value == 0 {
                return Err(Box::new(Error::InvalidProperty {
                    key: keys::MAX_ROUNDS.to_string(),
                    value: value.to_string(),
                    expected: "a positive integer",
                }));
            }
            generation.max_rounds = value;
        }
        if let Some(value) = properties.get(keys::OUTPUT_DIR) {
            generation.output_dir = PathBuf::from(value);
        }

        Ok(())
    }

    /// Builder-style tracking toggle, handy for hosts and tests.
    pub fn with_track_source_files(mut self, enabled: bool) -> Self {
        self.generation.track_source_files = enabled;
        self
    }

    /// Resolve the generated-sources root against the project directory.
    pub fn output_root(&self, project_dir: &Path) -> PathBuf {
        if self.generation.output_dir.is_absolute() {
            self.generation.output_dir.clone()
        } else {
            project_dir.join(&self.generation.output_dir)
        }
    }
}

/// Parse a config from content with the given filename for error reporting.
fn parse_config(content: &str, filename: &str) -> Result<KilnConfig> {
    let source_ctx = SourceContext::new(content, filename);
    let config: KilnConfig = toml::from_str(content).map_err(|e| source_ctx.parse_error(e))?;
    validate_config(&config, &source_ctx)?;
    Ok(config)
}

fn validate_config(config: &KilnConfig, ctx: &SourceContext) -> Result<()> {
    if config.generation.max_rounds == 0 {
        return Err(ctx.validation_error("max-rounds must be at least 1", "max-rounds"));
    }
    if config.generation.output_dir.as_os_str().is_empty() {
        return Err(ctx.validation_error("output-dir must not be empty", "output-dir"));
    }
    Ok(())
}
