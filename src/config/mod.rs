use dirs::home_dir;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{FluxcError, Result};

/// Connection block of the config file: where the database lives.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ConnectionSettings {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub ssl: bool,
}

/// A named credential set from the `profiles` block.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Profile {
    pub name: String,
    pub pw: String,
}

/// Parsed config file: connection settings plus the user profiles.
///
/// Loaded once per invocation and immutable afterwards. Profiles are kept in
/// a `BTreeMap` so diagnostics list names in a stable order.
#[derive(Serialize, Deserialize, Debug)]
pub struct Config {
    pub connection: ConnectionSettings,
    profiles: BTreeMap<String, Profile>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        read_yaml(path)
    }

    /// Resolve a profile by name.
    ///
    /// An unknown name is fatal for every command mode, so the error carries
    /// the full set of defined names for the diagnostic.
    pub fn profile(&self, name: &str) -> Result<&Profile> {
        self.profiles
            .get(name)
            .ok_or_else(|| FluxcError::UnknownProfile {
                name: name.to_string(),
                known: self.profiles.keys().cloned().collect(),
            })
    }

    pub fn profile_names(&self) -> Vec<String> {
        self.profiles.keys().cloned().collect()
    }

    /// Default config location: `~/.fluxc.conf`.
    pub fn default_path() -> PathBuf {
        home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".fluxc.conf")
    }
}

/// Read a YAML file into any deserializable shape.
///
/// Shared by the config and library loaders so both report missing and
/// malformed files the same way.
pub(crate) fn read_yaml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path).map_err(|err| {
        if err.kind() == io::ErrorKind::NotFound {
            FluxcError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            FluxcError::ConfigMalformed {
                path: path.to_path_buf(),
                reason: err.to_string(),
            }
        }
    })?;

    serde_yaml::from_str(&content).map_err(|err| FluxcError::ConfigMalformed {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })
}
