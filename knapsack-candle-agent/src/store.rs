//! Directory-backed storage of a policy model.
use crate::reinforce::{PolicyModel, PolicyModelConfig};
use anyhow::Result;
use candle_core::Device;
use chrono::{DateTime, Local};
use knapsack_core::error::KnapsackError;
use log::info;
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::{BufReader, Write},
    path::{Path, PathBuf},
};

const PARAMS_FILE: &str = "policy.safetensors";
const CONFIG_FILE: &str = "policy_model.yaml";
const SAVED_FILE: &str = "saved.yaml";

/// Status of a stored model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelStatus {
    /// When the model was saved.
    pub date_saved: DateTime<Local>,
}

#[derive(Debug, Deserialize, Serialize)]
struct SavedInfo {
    date_saved: String,
}

/// Stores a [`PolicyModel`] in a directory.
///
/// A stored model consists of three files:
///
/// * `policy.safetensors` - parameters,
/// * `policy_model.yaml` - [`PolicyModelConfig`], including the sizes of the
///   hidden layers needed to rebuild the network,
/// * `saved.yaml` - the date the model was saved.
///
/// `saved.yaml` is written last, so a model counts as stored only once all
/// of its files are in place.
#[derive(Debug, Clone)]
pub struct ModelStore {
    dir: PathBuf,
}

impl ModelStore {
    /// A store in the given directory. Nothing is created until [`ModelStore::save`].
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_owned(),
        }
    }

    /// The directory of the store.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Saves the model, replacing a previously stored one, and returns the directory.
    pub fn save(&self, policy: &PolicyModel) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        policy.save(self.dir.join(PARAMS_FILE))?;
        policy.config().save(self.dir.join(CONFIG_FILE))?;

        let info = SavedInfo {
            date_saved: Local::now().to_rfc3339(),
        };
        let mut file = File::create(self.dir.join(SAVED_FILE))?;
        file.write_all(serde_yaml::to_string(&info)?.as_bytes())?;
        info!("Saved the model in {:?}", self.dir);

        Ok(self.dir.clone())
    }

    /// Loads the stored model onto `device`, `None` if no model is stored.
    pub fn load(&self, device: Device) -> Result<Option<PolicyModel>> {
        if self.check_status()?.is_none() {
            return Ok(None);
        }

        let config = PolicyModelConfig::load(self.dir.join(CONFIG_FILE))?;
        let mut policy = PolicyModel::build(config, device, 0)?;
        policy.load(self.dir.join(PARAMS_FILE))?;

        Ok(Some(policy))
    }

    /// Returns the status of the stored model, `None` if no model is stored.
    pub fn check_status(&self) -> Result<Option<ModelStatus>> {
        let saved = self.dir.join(SAVED_FILE);
        if !saved.is_file() || !self.dir.join(PARAMS_FILE).is_file() {
            return Ok(None);
        }

        let rdr = BufReader::new(File::open(saved)?);
        let info: SavedInfo = serde_yaml::from_reader(rdr)?;
        let date_saved = DateTime::parse_from_rfc3339(&info.date_saved)?.with_timezone(&Local);

        Ok(Some(ModelStatus { date_saved }))
    }

    /// Removes the stored model.
    ///
    /// Fails with [`KnapsackError::NoStoredModel`] if no model is stored.
    pub fn remove(&self) -> Result<()> {
        if self.check_status()?.is_none() {
            return Err(KnapsackError::NoStoredModel(self.dir.display().to_string()).into());
        }

        // The marker goes first, so that an interrupted removal leaves no model behind.
        for name in [SAVED_FILE, PARAMS_FILE, CONFIG_FILE] {
            let path = self.dir.join(name);
            if path.exists() {
                fs::remove_file(path)?;
            }
        }
        info!("Removed the model in {:?}", self.dir);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    fn policy(seed: u64) -> PolicyModel {
        let config = PolicyModelConfig::default()
            .obs_dim(8)
            .hidden_layer_sizes(vec![16, 4]);
        PolicyModel::build(config, Device::Cpu, seed).unwrap()
    }

    #[test]
    fn test_save_load_remove() -> Result<()> {
        let dir = TempDir::new("model_store")?;
        let store = ModelStore::new(dir.path().join("model"));
        assert!(store.check_status()?.is_none());
        assert!(store.load(Device::Cpu)?.is_none());

        let before = Local::now();
        let policy = policy(5);
        let path = store.save(&policy)?;
        assert_eq!(path, dir.path().join("model"));

        let status = store.check_status()?.expect("model should be stored");
        assert!(status.date_saved.timestamp() >= before.timestamp());

        let loaded = store.load(Device::Cpu)?.expect("model should be stored");
        assert_eq!(loaded.hidden_layer_sizes(), &[16, 4]);
        assert_eq!(loaded.params()?, policy.params()?);

        store.remove()?;
        assert!(store.check_status()?.is_none());
        assert!(store.remove().is_err());
        Ok(())
    }
}
