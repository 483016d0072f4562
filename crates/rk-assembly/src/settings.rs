//! Solver settings file serialization

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_SPIN_ACCURACY, SPIN_THRESHOLD_FACTOR};

/// Parameters the dependency engine reads from the outer solver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverSettings {
    /// Spin accuracy of the outer solver, used as a relative tolerance
    pub spin_accuracy: f64,
    /// Seed for the degeneracy disturbance (None = seeded from entropy)
    pub seed: Option<u64>,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            spin_accuracy: DEFAULT_SPIN_ACCURACY,
            seed: None,
        }
    }
}

impl SolverSettings {
    /// Create settings with the given spin accuracy
    pub fn new(spin_accuracy: f64) -> Self {
        Self {
            spin_accuracy,
            ..Self::default()
        }
    }

    /// Set a random seed for reproducible disturbances
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Threshold below which offsets and axis misalignments count as zero
    pub fn threshold(&self) -> f64 {
        self.spin_accuracy * SPIN_THRESHOLD_FACTOR
    }

    /// Check that the spin accuracy is usable as a tolerance
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !self.spin_accuracy.is_finite() || self.spin_accuracy <= 0.0 {
            return Err(SettingsError::Invalid(format!(
                "spin accuracy must be a positive number, got {}",
                self.spin_accuracy
            )));
        }
        Ok(())
    }

    /// Save settings to a file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let content = self.to_bytes()?;
        std::fs::write(path.as_ref(), content).map_err(|e| SettingsError::Io(e.to_string()))?;
        Ok(())
    }

    /// Serialize settings to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>, SettingsError> {
        let content = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| SettingsError::Serialize(e.to_string()))?;
        Ok(content.into_bytes())
    }

    /// Load settings from a file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let content =
            std::fs::read_to_string(path.as_ref()).map_err(|e| SettingsError::Io(e.to_string()))?;
        Self::load_from_str(&content)
    }

    /// Load settings from bytes
    pub fn load_from_bytes(data: &[u8]) -> Result<Self, SettingsError> {
        let content =
            std::str::from_utf8(data).map_err(|e| SettingsError::Deserialize(e.to_string()))?;
        Self::load_from_str(content)
    }

    fn load_from_str(content: &str) -> Result<Self, SettingsError> {
        let settings: SolverSettings =
            ron::from_str(content).map_err(|e| SettingsError::Deserialize(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }
}

/// Settings-related errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialize(String),
    #[error("Deserialization error: {0}")]
    Deserialize(String),
    #[error("Invalid settings: {0}")]
    Invalid(String),
}
