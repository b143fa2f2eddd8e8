//! Index configuration (made by FontLab https://www.fontlab.com/)

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Directory scanned when nothing else is configured.
pub const DEFAULT_FONT_DIR: &str = "/system/fonts";
/// Font path list for stylish fonts, reloaded on every scan.
pub const DEFAULT_STYLISH_CONFIG: &str = "/system/fonts/visibility_list.json";
/// Font path list for user-installed fonts, reloaded on every lookup.
pub const DEFAULT_INSTALL_CONFIG: &str = "/system/etc/install_fontconfig.json";

pub const FONT_DIR_ENV: &str = "FONTDESC_FONT_DIR";
pub const WORKERS_ENV: &str = "FONTDESC_WORKERS";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Directory whose top-level files are indexed.
    pub font_dir: PathBuf,
    /// JSON path list of stylish fonts. A missing file means none.
    pub stylish_config: PathBuf,
    /// JSON path list of installed fonts. A missing file means none.
    pub install_config: PathBuf,
    /// Background worker threads. One is enough: scans and clears are
    /// serialized by the index state machine anyway.
    pub workers: usize,
    /// Threads serving asynchronous queries.
    pub query_workers: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            font_dir: PathBuf::from(DEFAULT_FONT_DIR),
            stylish_config: PathBuf::from(DEFAULT_STYLISH_CONFIG),
            install_config: PathBuf::from(DEFAULT_INSTALL_CONFIG),
            workers: 1,
            query_workers: 2,
        }
    }
}

impl IndexConfig {
    pub fn with_font_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.font_dir = dir.into();
        self
    }

    pub fn with_stylish_config(mut self, path: impl Into<PathBuf>) -> Self {
        self.stylish_config = path.into();
        self
    }

    pub fn with_install_config(mut self, path: impl Into<PathBuf>) -> Self {
        self.install_config = path.into();
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_query_workers(mut self, workers: usize) -> Self {
        self.query_workers = workers;
        self
    }

    /// Load a JSON config file; missing keys keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Apply `FONTDESC_FONT_DIR` and `FONTDESC_WORKERS` when set.
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Some(dir) = env::var_os(FONT_DIR_ENV).filter(|v| !v.is_empty()) {
            self.font_dir = PathBuf::from(dir);
        }
        if let Ok(raw) = env::var(WORKERS_ENV) {
            self.workers = raw
                .trim()
                .parse()
                .with_context(|| format!("{WORKERS_ENV} must be a positive integer, got {raw:?}"))?;
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_point_at_system_fonts() {
        let config = IndexConfig::default();
        assert_eq!(config.font_dir, PathBuf::from("/system/fonts"));
        assert_eq!(config.workers, 1);
    }

    #[test]
    fn json_file_fills_missing_keys_with_defaults() {
        let tmp = tempdir().expect("tempdir");
        let path = tmp.path().join("fontdesc.json");
        fs::write(&path, r#"{ "font_dir": "/opt/fonts" }"#).expect("write");

        let config = IndexConfig::from_json_file(&path).expect("config");
        assert_eq!(config.font_dir, PathBuf::from("/opt/fonts"));
        assert_eq!(config.workers, 1);
        assert_eq!(config.install_config, PathBuf::from(DEFAULT_INSTALL_CONFIG));
    }

    #[test]
    fn json_file_sets_font_list_paths() {
        let tmp = tempdir().expect("tempdir");
        let path = tmp.path().join("fontdesc.json");
        fs::write(
            &path,
            r#"{ "stylish_config": "/etc/fontdesc/stylish.json", "install_config": "/etc/fontdesc/installed.json" }"#,
        )
        .expect("write");

        let config = IndexConfig::from_json_file(&path).expect("config");
        assert_eq!(config.stylish_config, PathBuf::from("/etc/fontdesc/stylish.json"));
        assert_eq!(config.install_config, PathBuf::from("/etc/fontdesc/installed.json"));
        assert_eq!(config.font_dir, PathBuf::from(DEFAULT_FONT_DIR));
    }

    #[test]
    fn malformed_json_is_an_error() {
        let tmp = tempdir().expect("tempdir");
        let path = tmp.path().join("broken.json");
        fs::write(&path, "{ font_dir").expect("write");

        assert!(IndexConfig::from_json_file(&path).is_err());
    }
}
