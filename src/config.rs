//! Persisted step factors.
//!
//! Two plain-text files, each holding one decimal integer:
//! `fb_factor.dat` scales forward/backward steps, `lr_factor.dat` scales
//! left/right turns. They are read once at startup and rewritten whenever
//! the operator commits new values.

use crate::constants::{DEFAULT_STEP_FACTOR, FB_FACTOR_FILE, LR_FACTOR_FILE};
use crate::error::{ControlError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Scalar multipliers converting user-entered steps into wire magnitudes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepFactors {
    /// Factor for forward/backward movement
    pub longitudinal: u32,
    /// Factor for left/right turns
    pub rotational: u32,
}

/// Owns the in-memory factors and their backing files.
#[derive(Debug)]
pub struct StepFactorStore {
    dir: PathBuf,
    factors: StepFactors,
}

impl StepFactorStore {
    /// Load both factors from `dir`, validating that each is a positive
    /// integer. A missing file is seeded with [`DEFAULT_STEP_FACTOR`]; a
    /// present but corrupt file is an error rather than a silent fallback.
    pub fn load(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        let longitudinal = load_factor(&dir.join(FB_FACTOR_FILE))?;
        let rotational = load_factor(&dir.join(LR_FACTOR_FILE))?;
        info!(longitudinal, rotational, dir = %dir.display(), "step factors loaded");
        Ok(StepFactorStore { dir, factors: StepFactors { longitudinal, rotational } })
    }

    /// Current in-memory factors.
    pub fn factors(&self) -> StepFactors {
        self.factors
    }

    /// Commit new factors, rewriting each backing file and the in-memory
    /// value per field. Zero factors are rejected.
    pub fn update(&mut self, longitudinal: u32, rotational: u32) -> Result<()> {
        validate(self.dir.join(FB_FACTOR_FILE), longitudinal)?;
        validate(self.dir.join(LR_FACTOR_FILE), rotational)?;

        write_factor(&self.dir.join(FB_FACTOR_FILE), longitudinal)?;
        self.factors.longitudinal = longitudinal;
        write_factor(&self.dir.join(LR_FACTOR_FILE), rotational)?;
        self.factors.rotational = rotational;

        info!(longitudinal, rotational, "step factors updated");
        Ok(())
    }
}

fn validate(path: PathBuf, value: u32) -> Result<()> {
    if value == 0 {
        return Err(ControlError::InvalidFactor {
            path: path.display().to_string(),
            reason: "factor must be a positive integer".into(),
        });
    }
    Ok(())
}

fn load_factor(path: &Path) -> Result<u32> {
    if !path.exists() {
        debug!(path = %path.display(), "settings file missing, seeding default");
        write_factor(path, DEFAULT_STEP_FACTOR)?;
        return Ok(DEFAULT_STEP_FACTOR);
    }
    let text = fs::read_to_string(path)?;
    let value: u32 = text.trim().parse().map_err(|_| ControlError::InvalidFactor {
        path: path.display().to_string(),
        reason: format!("not a decimal integer: {:?}", text.trim()),
    })?;
    if value == 0 {
        return Err(ControlError::InvalidFactor {
            path: path.display().to_string(),
            reason: "factor must be a positive integer".into(),
        });
    }
    Ok(value)
}

fn write_factor(path: &Path, value: u32) -> Result<()> {
    fs::write(path, value.to_string())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_files_are_seeded_with_defaults() {
        let dir = tempdir().unwrap();
        let store = StepFactorStore::load(dir.path()).unwrap();
        assert_eq!(
            store.factors(),
            StepFactors { longitudinal: DEFAULT_STEP_FACTOR, rotational: DEFAULT_STEP_FACTOR }
        );
        assert!(dir.path().join(FB_FACTOR_FILE).exists());
        assert!(dir.path().join(LR_FACTOR_FILE).exists());
    }

    #[test]
    fn update_rewrites_files_and_memory() {
        let dir = tempdir().unwrap();
        let mut store = StepFactorStore::load(dir.path()).unwrap();
        store.update(10, 5).unwrap();
        assert_eq!(store.factors(), StepFactors { longitudinal: 10, rotational: 5 });

        // A fresh load must observe the committed values.
        let reloaded = StepFactorStore::load(dir.path()).unwrap();
        assert_eq!(reloaded.factors(), StepFactors { longitudinal: 10, rotational: 5 });
        assert_eq!(fs::read_to_string(dir.path().join(FB_FACTOR_FILE)).unwrap(), "10");
        assert_eq!(fs::read_to_string(dir.path().join(LR_FACTOR_FILE)).unwrap(), "5");
    }

    #[test]
    fn zero_factor_is_rejected_on_update() {
        let dir = tempdir().unwrap();
        let mut store = StepFactorStore::load(dir.path()).unwrap();
        assert!(matches!(store.update(0, 5), Err(ControlError::InvalidFactor { .. })));
        // The rejected update must leave memory and disk untouched.
        assert_eq!(
            store.factors(),
            StepFactors { longitudinal: DEFAULT_STEP_FACTOR, rotational: DEFAULT_STEP_FACTOR }
        );
    }

    #[test]
    fn corrupt_file_fails_load() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(FB_FACTOR_FILE), "banana").unwrap();
        assert!(matches!(
            StepFactorStore::load(dir.path()),
            Err(ControlError::InvalidFactor { .. })
        ));
    }

    #[test]
    fn non_positive_persisted_value_fails_load() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(FB_FACTOR_FILE), "0").unwrap();
        assert!(matches!(
            StepFactorStore::load(dir.path()),
            Err(ControlError::InvalidFactor { .. })
        ));
    }

    #[test]
    fn whitespace_around_persisted_value_is_tolerated() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(FB_FACTOR_FILE), "12\n").unwrap();
        fs::write(dir.path().join(LR_FACTOR_FILE), " 7 ").unwrap();
        let store = StepFactorStore::load(dir.path()).unwrap();
        assert_eq!(store.factors(), StepFactors { longitudinal: 12, rotational: 7 });
    }
}
