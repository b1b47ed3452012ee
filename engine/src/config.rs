//! Loading of [`Tuning`] overrides from TOML documents.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use flappy_core::Tuning;

/// Parses and validates tuning from TOML contents.
///
/// Fields missing from the document keep their default values.
pub fn parse_tuning(contents: &str) -> Result<Tuning> {
    let tuning: Tuning =
        toml::from_str(contents).context("failed to parse tuning toml contents")?;
    tuning.validate().context("tuning failed validation")?;
    Ok(tuning)
}

/// Reads, parses, and validates the tuning file at `path`.
pub fn load_tuning(path: impl AsRef<Path>) -> Result<Tuning> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read tuning file at {}", path.display()))?;
    parse_tuning(&contents).with_context(|| format!("invalid tuning file {}", path.display()))
}
