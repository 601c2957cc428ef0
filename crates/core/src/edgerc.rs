//! EdgeGrid credentials from `.edgerc` files or the environment

use crate::config::{ENV_PREFIX, expand_path};
use crate::error::{Error, Result, ResultExt};
use ini::Ini;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Section used when none is given
pub const DEFAULT_SECTION: &str = "default";

/// Request body size limit when `max_body` is not configured
pub const DEFAULT_MAX_BODY: usize = 131_072;

const REQUIRED_KEYS: [&str; 4] = ["host", "client_token", "client_secret", "access_token"];

/// API credentials for one `.edgerc` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EdgeGridConfig {
    pub host: String,
    pub client_token: String,
    #[serde(skip_serializing)]
    pub client_secret: String,
    pub access_token: String,
    pub max_body: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_key: Option<String>,
}

impl EdgeGridConfig {
    /// Load `section` from the environment or, failing that, from `path`
    pub fn load(path: impl AsRef<Path>, section: &str) -> Result<Self> {
        Self::load_with_env(path, section, |name| std::env::var(name).ok())
    }

    /// Like [`load`](Self::load) with an explicit environment lookup
    pub fn load_with_env<F>(path: impl AsRef<Path>, section: &str, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let section = if section.is_empty() {
            DEFAULT_SECTION
        } else {
            section
        };

        if let Some(config) = Self::from_env(section, &env)? {
            tracing::debug!(section, "credentials loaded from environment");
            return Ok(config);
        }

        let path = resolve(path.as_ref());
        let config = Self::from_file(&path, section)
            .context(format!("Loading section \"{}\"", section))?;
        tracing::debug!(section, path = %path.display(), "credentials loaded from file");
        Ok(config)
    }

    /// Override the account switch key; empty keys are ignored
    pub fn with_account_key(mut self, key: Option<&str>) -> Self {
        if let Some(key) = key.filter(|k| !k.is_empty()) {
            self.account_key = Some(key.to_string());
        }
        self
    }

    fn from_env<F>(section: &str, env: &F) -> Result<Option<Self>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| env(&env_name(section, key)).filter(|v| !v.is_empty());

        let mut values = Vec::with_capacity(REQUIRED_KEYS.len());
        for key in REQUIRED_KEYS {
            match lookup(key) {
                Some(value) => values.push(value),
                None => return Ok(None),
            }
        }

        let max_body = lookup("max_body");
        Self::build(section, values, max_body.as_deref()).map(Some)
    }

    fn from_file(path: &Path, section: &str) -> Result<Self> {
        if !path.exists() {
            return Err(Error::credentials_not_found(path));
        }

        let ini = Ini::load_from_file(path).map_err(|e| match e {
            ini::Error::Io(io) => Error::from(io),
            ini::Error::Parse(parse) => Error::config_parse(path, parse),
        })?;
        let props = ini
            .section(Some(section))
            .ok_or_else(|| Error::section_not_found(section, path))?;

        let values = REQUIRED_KEYS
            .iter()
            .map(|key| {
                props
                    .get(key)
                    .map(|v| v.trim().to_string())
                    .filter(|v| !v.is_empty())
                    .ok_or_else(|| Error::missing_credential(section, key))
            })
            .collect::<Result<Vec<_>>>()?;

        let max_body = props.get("max_body").or_else(|| props.get("max-body"));
        Self::build(section, values, max_body)
    }

    fn build(section: &str, values: Vec<String>, max_body: Option<&str>) -> Result<Self> {
        let [host, client_token, client_secret, access_token]: [String; 4] = values
            .try_into()
            .map_err(|_| Error::missing_credential(section, "host"))?;

        if host.contains("://") || host.ends_with('/') {
            return Err(Error::invalid_host(&host));
        }

        let max_body = match max_body.map(str::trim) {
            None | Some("") => DEFAULT_MAX_BODY,
            Some(raw) => raw
                .parse()
                .map_err(|_| Error::invalid_value("max_body", raw))?,
        };

        Ok(Self {
            host,
            client_token,
            client_secret,
            access_token,
            max_body,
            account_key: None,
        })
    }
}

/// `~/.edgerc`
pub fn default_edgerc_path() -> PathBuf {
    dirs::home_dir().unwrap_or_default().join(".edgerc")
}

fn resolve(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(s) => expand_path(s),
        None => path.to_path_buf(),
    }
}

/// `EDGEKIT_HOST` for the default section, `EDGEKIT_<SECTION>_HOST` otherwise
fn env_name(section: &str, key: &str) -> String {
    if section == DEFAULT_SECTION {
        format!("{}{}", ENV_PREFIX, key.to_uppercase())
    } else {
        format!("{}{}_{}", ENV_PREFIX, section.to_uppercase(), key.to_uppercase())
    }
}
