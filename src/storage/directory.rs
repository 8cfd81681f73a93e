//! A filesystem backed store of reference data.
//!
//! The [`Directory`] reads the donor and blood bank collections named by its
//! configuration once, and holds them immutably from then on.

use std::{
    collections::HashSet,
    fs, io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::instrument;

use crate::{
    domain::{BloodBank, Config, Criteria, Donor, LocationRecord, Selection},
    storage::JsonRequestStore,
};

/// Name of the metadata folder inside a data directory.
pub const METADATA_DIR: &str = ".bloodlink";

/// Reference data that has been read from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loaded {
    donors: Vec<Donor>,
    banks: Vec<BloodBank>,
}

/// Reference data that has not been read yet.
#[derive(Debug, PartialEq, Eq)]
pub struct Unloaded;

/// A data directory holding a config file and the reference collections.
#[derive(Debug)]
pub struct Directory<S> {
    root: PathBuf,
    config: Config,
    state: S,
}

impl<S> Directory<S> {
    /// The directory root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The configuration in effect.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Open the blood request store configured for this directory.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`](crate::storage::StoreError) if the requests
    /// file exists but cannot be read or parsed.
    pub fn requests(&self) -> Result<JsonRequestStore, crate::storage::StoreError> {
        JsonRequestStore::open(self.root.join(&self.config.requests_file))
    }
}

impl Directory<Unloaded> {
    /// Open the directory at `root`, reading its config if there is one.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Config`] if a config file exists but is invalid.
    pub fn new(root: PathBuf) -> Result<Self, LoadError> {
        let config = load_config(&root)?;
        Ok(Self {
            root,
            config,
            state: Unloaded,
        })
    }

    /// Create the metadata folder, a default config and empty data files.
    ///
    /// Existing data files are left alone.
    ///
    /// # Errors
    ///
    /// Fails if the directory is already initialized or a file cannot be
    /// written.
    #[instrument]
    pub fn init(root: PathBuf) -> Result<Self, LoadError> {
        let metadata = root.join(METADATA_DIR);
        if metadata.exists() {
            return Err(LoadError::AlreadyInitialized(root));
        }
        fs::create_dir_all(&metadata).map_err(|source| LoadError::Io {
            path: metadata.clone(),
            source,
        })?;

        let config = Config::default();
        config
            .save(&config_path(&root))
            .map_err(LoadError::Config)?;

        write_if_missing(&root.join(&config.donors_file), &DonorFile::default())?;
        write_if_missing(&root.join(&config.banks_file), &BankFile::default())?;
        write_if_missing(
            &root.join(&config.requests_file),
            &Vec::<crate::domain::BloodRequest>::new(),
        )?;

        tracing::info!("Initialized data directory in {}", root.display());
        Ok(Self {
            root,
            config,
            state: Unloaded,
        })
    }

    /// Read the donor and blood bank collections.
    ///
    /// A missing data file is treated as an empty collection.
    ///
    /// # Errors
    ///
    /// Fails if a data file cannot be read or parsed, or if two records in the
    /// same collection share an id.
    #[instrument(skip(self), fields(root = %self.root.display()))]
    pub fn load(self) -> Result<Directory<Loaded>, LoadError> {
        let donors_path = self.root.join(&self.config.donors_file);
        let banks_path = self.root.join(&self.config.banks_file);

        let donors = read_or_default::<DonorFile>(&donors_path)?.donors;
        check_unique_ids(&donors, "donor", &donors_path)?;

        let banks = read_or_default::<BankFile>(&banks_path)?.banks;
        check_unique_ids(&banks, "bank", &banks_path)?;

        tracing::info!(
            donors = donors.len(),
            banks = banks.len(),
            "loaded reference data"
        );

        Ok(Directory {
            root: self.root,
            config: self.config,
            state: Loaded { donors, banks },
        })
    }
}

impl Directory<Loaded> {
    /// Every donor, in file order.
    #[must_use]
    pub fn donors(&self) -> &[Donor] {
        &self.state.donors
    }

    /// Every blood bank, in file order.
    #[must_use]
    pub fn banks(&self) -> &[BloodBank] {
        &self.state.banks
    }

    /// A picker session over the donors.
    #[must_use]
    pub fn donor_selection(&self, criteria: Criteria) -> Selection<'_, Donor> {
        Selection::with_criteria(&self.state.donors, criteria)
    }

    /// A picker session over the blood banks.
    #[must_use]
    pub fn bank_selection(&self, criteria: Criteria) -> Selection<'_, BloodBank> {
        Selection::with_criteria(&self.state.banks, criteria)
    }
}

/// Errors that can occur opening or loading a [`Directory`].
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The config file exists but could not be used.
    #[error("{0}")]
    Config(String),

    /// A file could not be read or written.
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        /// The file.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },

    /// A data file is not valid JSON of the expected shape.
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        /// The file.
        path: PathBuf,
        /// The underlying error.
        source: serde_json::Error,
    },

    /// Two records in one collection share an id.
    #[error("duplicate {kind} id '{id}' in {}", .path.display())]
    DuplicateId {
        /// "donor" or "bank".
        kind: &'static str,
        /// The repeated id.
        id: String,
        /// The file.
        path: PathBuf,
    },

    /// `init` was run on a directory that already has metadata.
    #[error("{} is already initialized", .0.display())]
    AlreadyInitialized(PathBuf),
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct DonorFile {
    donors: Vec<Donor>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct BankFile {
    banks: Vec<BloodBank>,
}

fn config_path(root: &Path) -> PathBuf {
    root.join(METADATA_DIR).join("config.toml")
}

fn load_config(root: &Path) -> Result<Config, LoadError> {
    let path = config_path(root);
    if !path.exists() {
        tracing::debug!("No config at {}, using defaults", path.display());
        return Ok(Config::default());
    }
    Config::load(&path).map_err(LoadError::Config)
}

fn read_or_default<T: DeserializeOwned + Default>(path: &Path) -> Result<T, LoadError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::warn!("{} not found, treating it as empty", path.display());
            return Ok(T::default());
        }
        Err(source) => {
            return Err(LoadError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    serde_json::from_str(&content).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn write_if_missing<T: Serialize>(path: &Path, value: &T) -> Result<(), LoadError> {
    if path.exists() {
        return Ok(());
    }
    let io_error = |source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_error)?;
    }
    let content = serde_json::to_string_pretty(value).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, content).map_err(io_error)
}

fn check_unique_ids<R: LocationRecord>(
    records: &[R],
    kind: &'static str,
    path: &Path,
) -> Result<(), LoadError> {
    let mut seen = HashSet::with_capacity(records.len());
    for record in records {
        if !seen.insert(record.id()) {
            return Err(LoadError::DuplicateId {
                kind,
                id: record.id().to_string(),
                path: path.to_path_buf(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::{domain::BloodType, storage::RequestStore};

    const DONORS: &str = r#"{"donors": [
        {"id":"d1","fullName":"A","bloodType":"O+","lastDonation":"","phoneNumber":"9000000001",
         "state":"Kerala","district":"Ernakulam","city":"Kochi"},
        {"id":"d2","fullName":"B","bloodType":"A-","lastDonation":"2024-01-05","phoneNumber":"9000000002",
         "state":"Goa","district":"North Goa","city":"Panaji"}
    ]}"#;

    const BANKS: &str = r#"{"banks": [
        {"id":"b1","name":"Bank","address":"Rd","pincode":"682001","phoneNumber":"0484",
         "operatingHours":"24x7","state":"Kerala","district":"Ernakulam","city":"Kochi",
         "bloodInventory":{"A+":1,"A-":0,"B+":0,"B-":0,"AB+":0,"AB-":0,"O+":15,"O-":2}}
    ]}"#;

    fn setup_temp_directory() -> TempDir {
        let tmp = TempDir::new().expect("failed to create temp dir");
        fs::write(tmp.path().join("donors.json"), DONORS).unwrap();
        fs::write(tmp.path().join("banks.json"), BANKS).unwrap();
        tmp
    }

    #[test]
    fn loads_reference_collections() {
        let tmp = setup_temp_directory();

        let directory = Directory::new(tmp.path().to_path_buf())
            .unwrap()
            .load()
            .unwrap();

        assert_eq!(directory.donors().len(), 2);
        assert_eq!(directory.banks().len(), 1);
        assert_eq!(directory.banks()[0].inventory.units(BloodType::OPositive), 15);
    }

    #[test]
    fn selections_filter_loaded_data() {
        let tmp = setup_temp_directory();
        let directory = Directory::new(tmp.path().to_path_buf())
            .unwrap()
            .load()
            .unwrap();

        let donors = directory.donor_selection(Criteria::new().with_state("Goa"));
        assert_eq!(donors.results().len(), 1);
        assert_eq!(donors.districts(), ["North Goa"]);

        let banks = directory.bank_selection(
            Criteria::new().with_blood_type(Some(BloodType::AbPositive)),
        );
        assert!(banks.results().is_empty());
    }

    #[test]
    fn missing_files_load_as_empty() {
        let tmp = TempDir::new().unwrap();
        let directory = Directory::new(tmp.path().to_path_buf())
            .unwrap()
            .load()
            .unwrap();
        assert!(directory.donors().is_empty());
        assert!(directory.banks().is_empty());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let tmp = TempDir::new().unwrap();
        let donor = r#"{"id":"d1","fullName":"A","bloodType":"O+","phoneNumber":"1",
            "state":"S","district":"D","city":"C"}"#;
        fs::write(
            tmp.path().join("donors.json"),
            format!(r#"{{"donors": [{donor}, {donor}]}}"#),
        )
        .unwrap();

        let error = Directory::new(tmp.path().to_path_buf())
            .unwrap()
            .load()
            .unwrap_err();

        assert!(matches!(error, LoadError::DuplicateId { kind: "donor", ref id, .. } if id == "d1"));
    }

    #[test]
    fn blank_location_level_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let donors = r#"{"donors": [
            {"id":"d1","fullName":"A","bloodType":"O+","phoneNumber":"1",
             "state":"  ","district":"D","city":"C"},
            {"id":"d2","fullName":"B","bloodType":"O+","phoneNumber":"2",
             "state":"Goa","district":"North Goa","city":"Panaji"}
        ]}"#;
        fs::write(tmp.path().join("donors.json"), donors).unwrap();

        let error = Directory::new(tmp.path().to_path_buf())
            .unwrap()
            .load()
            .unwrap_err();

        assert!(matches!(error, LoadError::Parse { .. }));
        assert!(error.to_string().contains("state must not be empty"));
    }

    #[test]
    fn malformed_data_reports_path() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("banks.json"), r#"{"banks": [{"id": 1}]}"#).unwrap();

        let error = Directory::new(tmp.path().to_path_buf())
            .unwrap()
            .load()
            .unwrap_err();

        assert!(matches!(error, LoadError::Parse { .. }));
        assert!(error.to_string().contains("banks.json"));
    }

    #[test]
    fn init_creates_config_and_empty_files() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().to_path_buf();

        let directory = Directory::init(root.clone()).unwrap();

        assert!(root.join(".bloodlink/config.toml").exists());
        assert!(root.join("donors.json").exists());
        assert!(root.join("requests.json").exists());
        let loaded = directory.load().unwrap();
        assert!(loaded.donors().is_empty());
        assert!(loaded.requests().unwrap().all().is_empty());

        assert!(matches!(
            Directory::init(root),
            Err(LoadError::AlreadyInitialized(_))
        ));
    }

    #[test]
    fn config_redirects_data_files() {
        let tmp = setup_temp_directory();
        let root = tmp.path();
        fs::create_dir_all(root.join("alt")).unwrap();
        fs::write(root.join("alt/only.json"), r#"{"donors": []}"#).unwrap();
        fs::create_dir_all(root.join(METADATA_DIR)).unwrap();
        fs::write(
            config_path(root),
            "_version = \"1\"\ndonors_file = \"alt/only.json\"\n",
        )
        .unwrap();

        let directory = Directory::new(root.to_path_buf()).unwrap().load().unwrap();

        assert!(directory.donors().is_empty());
        assert_eq!(directory.banks().len(), 1);
    }
}
