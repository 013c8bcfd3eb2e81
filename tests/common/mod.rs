//! Common test utilities: temp dirs and env-var isolation.

use std::env;
use tempfile::TempDir;

pub fn create_temp_dir() -> TempDir {
    tempfile::tempdir().expect("failed to create temp directory")
}

/// Saves and restores `CONFIG_FILE` / `LOG_LEVEL` around a test body so
/// tests that set process-wide env vars don't leak into others.
pub struct IsolatedEnv {
    original_config_file: Option<String>,
    original_log_level: Option<String>,
}

impl IsolatedEnv {
    pub fn new() -> Self {
        let original_config_file = env::var("CONFIG_FILE").ok();
        let original_log_level = env::var("LOG_LEVEL").ok();

        env::remove_var("CONFIG_FILE");
        env::remove_var("LOG_LEVEL");

        Self {
            original_config_file,
            original_log_level,
        }
    }

    pub fn set_config_file(&self, path: &std::path::Path) {
        env::set_var("CONFIG_FILE", path);
    }
}

impl Default for IsolatedEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for IsolatedEnv {
    fn drop(&mut self) {
        match &self.original_config_file {
            Some(v) => env::set_var("CONFIG_FILE", v),
            None => env::remove_var("CONFIG_FILE"),
        }
        match &self.original_log_level {
            Some(v) => env::set_var("LOG_LEVEL", v),
            None => env::remove_var("LOG_LEVEL"),
        }
    }
}
