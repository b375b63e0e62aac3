//! Endpoint and credential resolution
//!
//! Defaults are layered: built-in values, then an optional TOML file, then
//! `BHCE_*` environment variables. Operator overrides from the command line
//! are applied on top by [`resolve`]. Nothing here touches the network.

use crate::error::{CliError, Result};
use hounds_common::types::{parse_port, Credentials, EndpointConfig, Scheme};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

// ============================================================================
// Built-in Defaults
// ============================================================================

/// Default API scheme when nothing else is configured.
pub const DEFAULT_SCHEME: &str = "http";

/// Default API host when nothing else is configured.
pub const DEFAULT_HOST: &str = "localhost";

/// Default API port when nothing else is configured.
pub const DEFAULT_PORT: &str = "8080";

/// Name of the defaults file under the user config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Default endpoint and credentials for a run
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Defaults {
    pub scheme: String,
    pub host: String,
    pub port: String,
    pub token_id: String,
    pub token_key: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            scheme: DEFAULT_SCHEME.to_string(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT.to_string(),
            token_id: String::new(),
            token_key: String::new(),
        }
    }
}

impl fmt::Debug for Defaults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Defaults")
            .field("scheme", &self.scheme)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("token_id", &redacted(&self.token_id))
            .field("token_key", &redacted(&self.token_key))
            .finish()
    }
}

fn redacted(value: &str) -> &'static str {
    if value.is_empty() {
        ""
    } else {
        "<redacted>"
    }
}

/// Per-field view used when layering a TOML file over the built-ins
#[derive(Debug, Default, Deserialize)]
struct DefaultsFile {
    scheme: Option<String>,
    host: Option<String>,
    port: Option<toml::Value>,
    token_id: Option<String>,
    token_key: Option<String>,
}

impl Defaults {
    /// Built-ins, then the config file, then the environment
    ///
    /// An explicit `path` must exist. Without one, the per-user file is read
    /// only when present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut defaults = Self::default();

        match path {
            Some(path) => defaults.merge_file(path)?,
            None => {
                if let Some(path) = default_config_path().filter(|p| p.is_file()) {
                    defaults.merge_file(&path)?;
                }
            },
        }

        defaults.merge_env();
        Ok(defaults)
    }

    /// Overlay the values present in a TOML file
    pub fn merge_file(&mut self, path: &Path) -> Result<()> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            CliError::config(format!("cannot read config file '{}': {}", path.display(), e))
        })?;
        let file: DefaultsFile = toml::from_str(&raw)?;

        debug!(path = %path.display(), "Loaded defaults file");

        if let Some(scheme) = file.scheme {
            self.scheme = scheme;
        }
        if let Some(host) = file.host {
            self.host = host;
        }
        if let Some(port) = file.port {
            self.port = match port {
                toml::Value::String(s) => s,
                other => other.to_string(),
            };
        }
        if let Some(token_id) = file.token_id {
            self.token_id = token_id;
        }
        if let Some(token_key) = file.token_key {
            self.token_key = token_key;
        }

        Ok(())
    }

    /// Overlay `BHCE_SCHEME`, `BHCE_DOMAIN`, `BHCE_PORT`, `BHCE_TOKEN_ID`, `BHCE_TOKEN_KEY`
    pub fn merge_env(&mut self) {
        let fields: [(&str, &mut String); 5] = [
            ("BHCE_SCHEME", &mut self.scheme),
            ("BHCE_DOMAIN", &mut self.host),
            ("BHCE_PORT", &mut self.port),
            ("BHCE_TOKEN_ID", &mut self.token_id),
            ("BHCE_TOKEN_KEY", &mut self.token_key),
        ];

        for (var, field) in fields {
            if let Ok(value) = std::env::var(var) {
                *field = value;
            }
        }
    }
}

/// `<config_dir>/hounds/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("hounds").join(CONFIG_FILE_NAME))
}

/// Operator-supplied overrides, all optional
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub url: Option<String>,
    pub token_id: Option<String>,
    pub token_key: Option<String>,
}

/// Final endpoint and credentials for the run
#[derive(Debug, Clone)]
pub struct Resolved {
    pub endpoint: EndpointConfig,
    pub credentials: Credentials,
}

/// Apply overrides on top of defaults
pub fn resolve(defaults: &Defaults, overrides: &Overrides) -> Result<Resolved> {
    let token_id = pick(overrides.token_id.as_deref(), &defaults.token_id);
    let token_key = pick(overrides.token_key.as_deref(), &defaults.token_key);

    let endpoint = match supplied(overrides.url.as_deref()) {
        Some(url) => parse_url(url)?,
        None => {
            let scheme: Scheme = defaults.scheme.parse()?;
            let port = parse_port(&defaults.port)?;
            EndpointConfig::new(scheme, defaults.host.clone(), port)?
        },
    };

    if token_id.is_empty() {
        return Err(CliError::config(
            "no token id given (use --tokenid or BHCE_TOKEN_ID)",
        ));
    }
    if token_key.is_empty() {
        return Err(CliError::config(
            "no token key given (use --tokenkey or BHCE_TOKEN_KEY)",
        ));
    }

    Ok(Resolved {
        endpoint,
        credentials: Credentials::new(token_id, token_key),
    })
}

/// An empty override counts as not given
fn supplied(over: Option<&str>) -> Option<&str> {
    over.filter(|s| !s.is_empty())
}

fn pick(over: Option<&str>, default: &str) -> String {
    supplied(over).unwrap_or(default).to_string()
}

/// Parse a `scheme://host:port` URL
///
/// The string must split on `:` into exactly three segments. Anything else,
/// including IPv6 literals and embedded credentials, is rejected.
pub fn parse_url(url: &str) -> Result<EndpointConfig> {
    let invalid = || CliError::InvalidUrl(url.to_string());

    let segments: Vec<&str> = url.split(':').collect();
    let [scheme, authority, port] = segments.as_slice() else {
        return Err(invalid());
    };

    let scheme: Scheme = scheme.parse().map_err(|_| invalid())?;
    let host = authority.strip_prefix("//").ok_or_else(invalid)?;
    if host.is_empty() || host.contains('/') {
        return Err(invalid());
    }
    let port = parse_port(port.trim_end_matches('/')).map_err(|_| invalid())?;

    Ok(EndpointConfig::new(scheme, host, port)?)
}
