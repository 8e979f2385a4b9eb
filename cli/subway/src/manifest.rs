//! `subway.toml` manifest parsing and project configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const MANIFEST_FILE: &str = "subway.toml";
pub const DEFAULT_STORE_PATH: &str = "data/network.sln";

/// The top-level manifest structure for a subway project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubwayManifest {
    /// Network metadata (required).
    pub network: NetworkConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Store file, relative to the manifest directory unless absolute.
    #[serde(default = "default_store_path")]
    pub path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

fn default_store_path() -> String {
    DEFAULT_STORE_PATH.to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive, e.g. "info" or "subway_store=debug".
    #[serde(default)]
    pub level: Option<String>,
}

impl SubwayManifest {
    /// Search upward from `start_dir` for a `subway.toml` file, parse and
    /// return it along with the directory it was found in.
    pub fn find_and_load(start_dir: &Path) -> Result<Option<(Self, PathBuf)>> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let candidate = dir.join(MANIFEST_FILE);
            if candidate.is_file() {
                let content = std::fs::read_to_string(&candidate)
                    .with_context(|| format!("reading {}", candidate.display()))?;
                let manifest: SubwayManifest = toml::from_str(&content)
                    .with_context(|| format!("parsing {}", candidate.display()))?;
                return Ok(Some((manifest, dir)));
            }
            if !dir.pop() {
                break;
            }
        }
        Ok(None)
    }

    /// Parse a manifest from a TOML string.
    #[cfg(test)]
    pub fn from_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("parsing subway.toml")
    }

    /// Absolute location of the store file for a manifest found in `dir`.
    pub fn store_path(&self, dir: &Path) -> PathBuf {
        let path = Path::new(&self.store.path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            dir.join(path)
        }
    }

    pub fn log_level(&self) -> Option<&str> {
        self.logging.level.as_deref()
    }

    /// Generate the default template for `subway init`.
    pub fn template(name: &str) -> String {
        format!(
            r#"[network]
name = "{name}"

[store]
path = "{DEFAULT_STORE_PATH}"

[logging]
level = "warn"
"#
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_manifest() {
        let manifest = SubwayManifest::from_str(
            r#"
[network]
name = "metro"
description = "Seoul Metropolitan Subway"

[store]
path = "/var/lib/subway/metro.sln"

[logging]
level = "info"
"#,
        )
        .unwrap();

        assert_eq!(manifest.network.name, "metro");
        assert_eq!(
            manifest.network.description.as_deref(),
            Some("Seoul Metropolitan Subway")
        );
        assert_eq!(manifest.log_level(), Some("info"));
        assert_eq!(
            manifest.store_path(Path::new("/home/me/metro")),
            PathBuf::from("/var/lib/subway/metro.sln")
        );
    }

    #[test]
    fn parse_minimal_manifest() {
        let manifest = SubwayManifest::from_str("[network]\nname = \"tiny\"\n").unwrap();
        assert_eq!(manifest.store.path, DEFAULT_STORE_PATH);
        assert!(manifest.log_level().is_none());
        assert_eq!(
            manifest.store_path(Path::new("/p")),
            Path::new("/p").join(DEFAULT_STORE_PATH)
        );
    }

    #[test]
    fn missing_network_is_an_error() {
        assert!(SubwayManifest::from_str("[store]\npath = \"x.sln\"\n").is_err());
    }

    #[test]
    fn template_round_trips() {
        let manifest = SubwayManifest::from_str(&SubwayManifest::template("metro")).unwrap();
        assert_eq!(manifest.network.name, "metro");
        assert_eq!(manifest.log_level(), Some("warn"));
    }

    #[test]
    fn find_and_load_searches_upward() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(MANIFEST_FILE),
            SubwayManifest::template("metro"),
        )
        .unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        let (manifest, found) = SubwayManifest::find_and_load(&nested).unwrap().unwrap();
        assert_eq!(manifest.network.name, "metro");
        assert_eq!(found, dir.path());
    }

    #[test]
    fn find_and_load_without_manifest() {
        let dir = tempfile::tempdir().unwrap();
        // A manifest further up the real filesystem is not expected in a
        // fresh temp dir, but tolerate one rather than fail spuriously.
        if let Some((_, found)) = SubwayManifest::find_and_load(dir.path()).unwrap() {
            assert!(!found.starts_with(dir.path()));
        }
    }
}
