use std::{io, path::Path};

use serde::Deserialize;

use crate::{common, orchestrator::Strategy};

/// Looked up in the working directory. The program takes no arguments, so this is the only way to
/// change its behaviour.
pub const CONFIG_FILE: &str = "rowmul.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpawnMode {
    ThreadPerRow,
    Pool,
}

#[derive(Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigOptional {
    strategy: Option<SpawnMode>,
    threads: Option<usize>,
    log: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub strategy: SpawnMode,
    /// Number of pool threads, only used with `SpawnMode::Pool`
    pub threads: usize,
    pub log: String,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_optional(Default::default())
    }
}

impl Config {
    fn from_optional(optional: ConfigOptional) -> Self {
        Config {
            strategy: optional.strategy.unwrap_or(SpawnMode::ThreadPerRow),
            threads: optional
                .threads
                .unwrap_or_else(common::hardware_concurrency)
                .max(1),
            log: optional.log.unwrap_or_else(|| "warn".to_owned()),
        }
    }

    pub fn from_toml(s: &str) -> io::Result<Self> {
        toml::from_str(s)
            .map(Self::from_optional)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Returns `Ok(None)` if the file doesn't exist.
    pub fn from_file(file: &Path) -> io::Result<Option<Self>> {
        match std::fs::read_to_string(file) {
            Ok(s) => Self::from_toml(&s).map(Some),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn strategy(&self) -> Strategy {
        match self.strategy {
            SpawnMode::ThreadPerRow => Strategy::ThreadPerRow,
            SpawnMode::Pool => Strategy::Pool {
                threads: self.threads,
            },
        }
    }
}
