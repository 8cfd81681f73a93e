use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Configuration for a `BloodLink` data directory.
///
/// Paths are relative to the directory root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// JSON file holding the donor directory (`{"donors": [...]}`).
    pub donors_file: PathBuf,

    /// JSON file holding the blood bank directory (`{"banks": [...]}`).
    pub banks_file: PathBuf,

    /// JSON file holding blood requests (an array).
    pub requests_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            donors_file: default_donors_file(),
            banks_file: default_banks_file(),
            requests_file: default_requests_file(),
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write config file: {e}"))
    }
}

fn default_donors_file() -> PathBuf {
    PathBuf::from("donors.json")
}

fn default_banks_file() -> PathBuf {
    PathBuf::from("banks.json")
}

fn default_requests_file() -> PathBuf {
    PathBuf::from("requests.json")
}

/// The serialized versions of the configuration.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_donors_file")]
        donors_file: PathBuf,

        #[serde(default = "default_banks_file")]
        banks_file: PathBuf,

        #[serde(default = "default_requests_file")]
        requests_file: PathBuf,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                donors_file,
                banks_file,
                requests_file,
            } => Self {
                donors_file,
                banks_file,
                requests_file,
            },
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            donors_file: config.donors_file,
            banks_file: config.banks_file,
            requests_file: config.requests_file,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn load_reads_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            b"_version = \"1\"\ndonors_file = \"data/donors.json\"\nbanks_file = \"data/banks.json\"\n",
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.donors_file, PathBuf::from("data/donors.json"));
        assert_eq!(config.banks_file, PathBuf::from("data/banks.json"));
        assert_eq!(config.requests_file, PathBuf::from("requests.json"));
    }

    #[test]
    fn load_missing_file_returns_error() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing.toml");

        let error = Config::load(&missing).unwrap_err();
        assert!(error.starts_with("Failed to read config file:"));
    }

    #[test]
    fn load_invalid_toml_returns_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"_version = \"1\"\nbanks_file = 3\n").unwrap();

        let error = Config::load(file.path()).unwrap_err();
        assert!(error.starts_with("Failed to parse config file:"));
    }

    #[test]
    fn version_only_returns_default() {
        let expected = Config::default();
        let actual: Config = toml::from_str(r#"_version = "1""#).unwrap();
        assert_eq!(actual, expected);
    }

    #[test]
    fn save_then_load_preserves_paths() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        let config = Config {
            requests_file: PathBuf::from("live/requests.json"),
            ..Config::default()
        };

        config.save(&path).unwrap();

        assert_eq!(Config::load(&path).unwrap(), config);
    }
}
