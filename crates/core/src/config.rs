//! Section/key configuration store
//!
//! Plugins keep their settings in a small INI file (by default
//! `~/.edgekit/config`). The store tracks whether anything changed so
//! [`ConfigFile::save`] only touches disk when needed.

use crate::error::{Error, Result};
use ini::Ini;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Prefix for every environment variable produced by [`ConfigFile::env_vars`]
pub const ENV_PREFIX: &str = "EDGEKIT_";

/// INI-backed configuration file
#[derive(Debug)]
pub struct ConfigFile {
    path: PathBuf,
    ini: Ini,
    dirty: bool,
}

impl ConfigFile {
    /// Open the file at `path`; a missing file yields an empty store
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let ini = if path.exists() {
            Ini::load_from_file(&path).map_err(|e| match e {
                ini::Error::Io(io) => Error::from(io)
                    .with_context(format!("Reading {}", path.display())),
                ini::Error::Parse(parse) => Error::config_parse(&path, parse),
            })?
        } else {
            tracing::debug!(path = %path.display(), "config file missing, starting empty");
            Ini::new()
        };

        Ok(Self {
            path,
            ini,
            dirty: false,
        })
    }

    /// Location this store saves to
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether there are unsaved changes
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Value of `key` in `section`, or an empty string when absent
    pub fn get(&self, section: &str, key: &str) -> String {
        self.ini
            .get_from(Some(section), key)
            .map(str::to_string)
            .unwrap_or_default()
    }

    /// Set `key` in `section`, creating the section when needed
    pub fn set(&mut self, section: &str, key: &str, value: &str) {
        self.ini
            .with_section(Some(section))
            .set(key, value);
        self.dirty = true;
    }

    /// Remove `key` from `section`
    pub fn unset(&mut self, section: &str, key: &str) {
        self.ini.delete_from(Some(section), key);
        self.dirty = true;
    }

    /// Persist to disk if anything changed since the last save
    pub fn save(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        self.ini.write_to_file(&self.path)?;
        self.dirty = false;
        tracing::debug!(path = %self.path.display(), "config saved");
        Ok(())
    }

    /// Names of all named sections, in file order
    pub fn sections(&self) -> Vec<String> {
        self.ini.sections().flatten().map(str::to_string).collect()
    }

    /// Key/value pairs of `section`, in file order
    pub fn entries(&self, section: &str) -> Vec<(String, String)> {
        self.ini
            .section(Some(section))
            .map(|props| {
                props
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Environment variables describing every key, as `EDGEKIT_<SECTION>_<KEY>`
    pub fn env_vars(&self) -> Vec<(String, String)> {
        self.ini
            .iter()
            .filter_map(|(section, props)| section.map(|s| (s, props)))
            .flat_map(|(section, props)| {
                props
                    .iter()
                    .map(move |(key, value)| (env_var_name(section, key), value.to_string()))
            })
            .collect()
    }

    /// Apply [`env_vars`](Self::env_vars) to a child process
    pub fn export_to(&self, command: &mut Command) {
        command.envs(self.env_vars());
    }
}

/// `EDGEKIT_<SECTION>_<KEY>`, upper-cased with dashes turned into underscores
pub fn env_var_name(section: &str, key: &str) -> String {
    format!(
        "{}{}_{}",
        ENV_PREFIX,
        section.to_uppercase(),
        key.replace('-', "_").to_uppercase()
    )
}

/// Expand a leading `~` to the home directory
pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

/// `~/.edgekit/config`
pub fn default_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_default()
        .join(".edgekit")
        .join("config")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("config");
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let config = ConfigFile::open(dir.path().join("absent")).unwrap();

        assert_eq!(config.get("cli", "last-upgrade-check"), "");
        assert!(config.sections().is_empty());
        assert!(!config.is_dirty());
    }

    #[test]
    fn test_get_existing_and_absent() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "[cli]\ncache-path = /tmp/cache\n");
        let config = ConfigFile::open(path).unwrap();

        assert_eq!(config.get("cli", "cache-path"), "/tmp/cache");
        assert_eq!(config.get("cli", "missing"), "");
        assert_eq!(config.get("other", "cache-path"), "");
    }

    #[test]
    fn test_set_marks_dirty_and_save_persists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config");
        let mut config = ConfigFile::open(&path).unwrap();

        config.set("cli", "enable-cli-statistics", "true");
        assert!(config.is_dirty());
        config.save().unwrap();
        assert!(!config.is_dirty());

        let reloaded = ConfigFile::open(&path).unwrap();
        assert_eq!(reloaded.get("cli", "enable-cli-statistics"), "true");
    }

    #[test]
    fn test_save_without_changes_does_not_write() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config");
        let mut config = ConfigFile::open(&path).unwrap();

        config.save().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_unset_removes_key() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "[cli]\na = 1\nb = 2\n");
        let mut config = ConfigFile::open(&path).unwrap();

        config.unset("cli", "a");
        assert!(config.is_dirty());
        assert_eq!(config.get("cli", "a"), "");
        config.save().unwrap();

        let reloaded = ConfigFile::open(&path).unwrap();
        assert_eq!(reloaded.get("cli", "a"), "");
        assert_eq!(reloaded.get("cli", "b"), "2");
    }

    #[test]
    fn test_parse_error_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "[unterminated\nkey = value\n");
        let err = ConfigFile::open(path).unwrap_err();

        assert_eq!(err.code, crate::ErrorCode::ConfigParseError);
    }

    #[test]
    fn test_sections_and_entries() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "[cli]\na = 1\n\n[purge]\nnetwork = staging\n");
        let config = ConfigFile::open(path).unwrap();

        assert_eq!(config.sections(), vec!["cli", "purge"]);
        assert_eq!(
            config.entries("purge"),
            vec![("network".to_string(), "staging".to_string())]
        );
        assert!(config.entries("nope").is_empty());
    }

    #[test]
    fn test_env_var_name() {
        assert_eq!(env_var_name("cli", "cache-path"), "EDGEKIT_CLI_CACHE_PATH");
        assert_eq!(env_var_name("Purge", "net"), "EDGEKIT_PURGE_NET");
    }

    #[test]
    fn test_env_vars_cover_every_key() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "[cli]\ncache-path = /tmp\n\n[purge]\nnetwork = staging\n");
        let config = ConfigFile::open(path).unwrap();

        let vars = config.env_vars();
        assert!(vars.contains(&("EDGEKIT_CLI_CACHE_PATH".to_string(), "/tmp".to_string())));
        assert!(vars.contains(&("EDGEKIT_PURGE_NETWORK".to_string(), "staging".to_string())));
        assert_eq!(vars.len(), 2);
    }

    #[cfg(unix)]
    #[test]
    fn test_export_to_child_process() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "[purge]\nnetwork = staging\n");
        let config = ConfigFile::open(path).unwrap();

        let mut cmd = Command::new("sh");
        cmd.args(["-c", "printf %s \"$EDGEKIT_PURGE_NETWORK\""]);
        config.export_to(&mut cmd);
        let output = cmd.output().unwrap();

        assert_eq!(String::from_utf8_lossy(&output.stdout), "staging");
    }

    #[test]
    fn test_expand_path_keeps_absolute() {
        assert_eq!(expand_path("/etc/edgerc"), PathBuf::from("/etc/edgerc"));
    }
}
