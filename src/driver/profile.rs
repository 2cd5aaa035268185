//! Browser profile (user data directory) management.
//!
//! Every browser instance gets a fresh temporary `--user-data-dir`, so no
//! cookies, cache or service workers leak between captures. The directory is
//! removed explicitly on release and, as a fallback, when the [`Profile`] is
//! dropped.
//!
//! # Example
//!
//! ```no_run
//! use har_capture::driver::Profile;
//!
//! # fn example() -> har_capture::Result<()> {
//! let mut profile = Profile::new_temp()?;
//! println!("Profile at: {}", profile.path().display());
//! profile.remove()?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::debug;

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Prefix of temporary profile directories.
const TEMP_PREFIX: &str = "har-capture-";

// ============================================================================
// Profile
// ============================================================================

/// A temporary Chromium user data directory.
pub struct Profile {
    /// Temporary directory handle; `None` once removed.
    temp_dir: Option<TempDir>,

    /// Path to the profile directory.
    path: PathBuf,
}

// ============================================================================
// Profile - Constructors
// ============================================================================

impl Profile {
    /// Creates a new temporary profile in the system temp directory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Profile`] if the directory cannot be created.
    pub fn new_temp() -> Result<Self> {
        let temp_dir = TempDir::with_prefix(TEMP_PREFIX)
            .map_err(|e| Error::profile(format!("Failed to create temp profile: {e}")))?;

        let path = temp_dir.path().to_path_buf();
        debug!(path = %path.display(), "Created temporary profile");

        Ok(Self {
            temp_dir: Some(temp_dir),
            path,
        })
    }
}

// ============================================================================
// Profile - Accessors
// ============================================================================

impl Profile {
    /// Returns the path to the profile directory.
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `true` until [`Profile::remove`] succeeded.
    #[inline]
    #[must_use]
    pub fn exists(&self) -> bool {
        self.temp_dir.is_some()
    }

    /// Returns the `--user-data-dir` argument for this profile.
    #[must_use]
    pub fn to_arg(&self) -> String {
        format!("--user-data-dir={}", self.path.display())
    }
}

// ============================================================================
// Profile - Removal
// ============================================================================

impl Profile {
    /// Deletes the profile directory.
    ///
    /// Calling it again after success is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Profile`] if the directory cannot be removed; the
    /// directory is then left in place.
    pub fn remove(&mut self) -> Result<()> {
        let Some(temp_dir) = self.temp_dir.take() else {
            return Ok(());
        };

        temp_dir.close().map_err(|e| {
            Error::profile(format!(
                "Failed to remove profile at {}: {e}",
                self.path.display()
            ))
        })?;

        debug!(path = %self.path.display(), "Removed temporary profile");
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_temp_creates_directory() {
        let profile = Profile::new_temp().expect("create profile");
        assert!(profile.path().is_dir());
        assert!(profile.exists());
        assert!(
            profile
                .path()
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(TEMP_PREFIX))
        );
    }

    #[test]
    fn test_to_arg() {
        let profile = Profile::new_temp().expect("create profile");
        let arg = profile.to_arg();
        assert!(arg.starts_with("--user-data-dir="));
        assert!(arg.ends_with(&profile.path().display().to_string()));
    }

    #[test]
    fn test_remove_deletes_directory() {
        let mut profile = Profile::new_temp().expect("create profile");
        let path = profile.path().to_path_buf();
        std::fs::write(path.join("Local State"), "{}").expect("write file");

        profile.remove().expect("remove");
        assert!(!path.exists());
        assert!(!profile.exists());
        profile.remove().expect("second remove is a no-op");
    }

    #[test]
    fn test_drop_deletes_directory() {
        let profile = Profile::new_temp().expect("create profile");
        let path = profile.path().to_path_buf();
        drop(profile);
        assert!(!path.exists());
    }
}
