// Miette's derive macro generates code that triggers these warnings
#![allow(unused_assignments)]

//! Configuration for the Kiln code generation orchestrator.
//!
//! Settings come from a `kiln.toml` file and can be overridden per build by
//! a properties-style file (`kiln.properties`), which wins over the TOML.

mod config;
mod error;
mod file;
mod properties;

pub use config::{GenerationConfig, KilnConfig};
pub use error::{Error, Result, SourceContext};
pub use file::{CONFIG_FILE, KilnToml, PROPERTIES_FILE};
pub use properties::{Properties, keys};
