use super::MarketProfile;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("unable to access market profile {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("market profile {path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("unable to serialize market profile: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("no default market profile snapshot at {0}")]
    MissingDefault(PathBuf),
}

impl MarketProfile {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ProfileError> {
        let path = path.as_ref();
        let document = fs::read_to_string(path).map_err(|source| ProfileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&document).map_err(|source| ProfileError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Writes the canonical document, creating parent directories as needed.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ProfileError> {
        let path = path.as_ref();
        let document = self.to_json_string()?;
        if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| ProfileError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, document).map_err(|source| ProfileError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// The active profile document plus the snapshot it can be reset to.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    path: PathBuf,
    default_path: PathBuf,
}

impl ProfileStore {
    pub fn new(path: impl Into<PathBuf>, default_path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            default_path: default_path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn default_path(&self) -> &Path {
        &self.default_path
    }

    /// Loads the active document, or the built-in defaults when none exists yet.
    pub fn load_or_default(&self) -> Result<MarketProfile, ProfileError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no market profile on disk, using defaults");
            return Ok(MarketProfile::default());
        }
        let profile = MarketProfile::load(&self.path)?;
        info!(path = %self.path.display(), "loaded market profile");
        Ok(profile)
    }

    pub fn save(&self, profile: &MarketProfile) -> Result<(), ProfileError> {
        profile.save(&self.path)?;
        info!(path = %self.path.display(), "saved market profile");
        Ok(())
    }

    /// Copies the active document to the snapshot path unless a snapshot already exists.
    ///
    /// Returns `true` when a snapshot was written.
    pub fn ensure_default_snapshot(&self) -> Result<bool, ProfileError> {
        if self.default_path.exists() {
            return Ok(false);
        }
        let profile = self.load_or_default()?;
        profile.save(&self.default_path)?;
        info!(path = %self.default_path.display(), "wrote default market profile snapshot");
        Ok(true)
    }

    /// Restores the snapshot over the active document and returns it.
    pub fn reset_to_default(&self) -> Result<MarketProfile, ProfileError> {
        if !self.default_path.exists() {
            return Err(ProfileError::MissingDefault(self.default_path.clone()));
        }
        let profile = MarketProfile::load(&self.default_path)?;
        self.save(&profile)?;
        Ok(profile)
    }
}
