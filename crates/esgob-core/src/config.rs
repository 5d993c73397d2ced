//! Configuration types for the Esgob client
//!
//! Credentials are resolved from three sources, in priority order:
//!
//! 1. Explicit values (command-line arguments, library callers)
//! 2. Environment variables (`ESGOB_ACCOUNT`, `ESGOB_KEY`)
//! 3. A config file: an explicit path, or the first existing default path
//!
//! ## File Format
//!
//! One `name value` pair per line. Blank lines and lines starting with `#`
//! are ignored; any other name than the ones below is rejected.
//!
//! ```text
//! account myaccount
//! endpoint https://api.esgob.com/1.0/
//! key 0123456789abcdef
//! timeout 30
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

/// Esgob API base URL
pub const DEFAULT_API_ENDPOINT: &str = "https://api.esgob.com/1.0/";

/// Default HTTP timeout for API requests (30 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Environment variable holding the account name
pub const ACCOUNT_ENV_VAR: &str = "ESGOB_ACCOUNT";

/// Environment variable holding the API key
pub const KEY_ENV_VAR: &str = "ESGOB_KEY";

/// Unresolved client configuration
///
/// Every field is optional so that partial configurations from several
/// sources can be layered with [`Config::or`].
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Account name
    pub account: Option<String>,

    /// API key
    /// ⚠️ NEVER log this value
    pub key: Option<String>,

    /// API endpoint (defaults to [`DEFAULT_API_ENDPOINT`])
    pub endpoint: Option<String>,

    /// HTTP timeout in seconds (defaults to [`DEFAULT_TIMEOUT_SECS`])
    pub timeout_secs: Option<u64>,
}

// Custom Debug implementation that hides the API key
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("account", &self.account)
            .field("key", &self.key.as_ref().map(|_| "<REDACTED>"))
            .field("endpoint", &self.endpoint)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Config {
    /// Create an empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the account name
    pub fn with_account(mut self, account: impl Into<String>) -> Self {
        self.account = Some(account.into());
        self
    }

    /// Set the API key
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Set the API endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the HTTP timeout in seconds
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Read account and key from the process environment
    pub fn from_env() -> Self {
        Self::from_env_with(|name| std::env::var(name).ok())
    }

    /// Read account and key through an arbitrary variable lookup
    pub fn from_env_with<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            account: non_empty(lookup(ACCOUNT_ENV_VAR)),
            key: non_empty(lookup(KEY_ENV_VAR)),
            endpoint: None,
            timeout_secs: None,
        }
    }

    /// Ordered list of config files consulted when no explicit file is given
    pub fn default_file_paths() -> Vec<PathBuf> {
        let mut paths = Vec::with_capacity(3);
        if let Some(home) = std::env::var_os("HOME") {
            paths.push(Path::new(&home).join(".esgob"));
        }
        paths.push(PathBuf::from("/etc/esgob"));
        paths.push(PathBuf::from("/usr/local/etc/esgob"));
        paths
    }

    /// Parse the contents of a config file
    pub fn parse(contents: &str) -> Result<Self> {
        let mut config = Self::new();

        for (index, raw) in contents.lines().enumerate() {
            let line_no = index + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (name, value) = match line.split_once(char::is_whitespace) {
                Some((name, value)) => (name, value.trim()),
                None => (line, ""),
            };

            if !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
                return Err(Error::config(format!(
                    "Malformed configuration line {line_no}: '{line}'"
                )));
            }
            if value.is_empty() {
                return Err(Error::config(format!(
                    "Missing value for configuration key '{name}' on line {line_no}"
                )));
            }

            match name {
                "account" => config.account = Some(value.to_string()),
                "key" => config.key = Some(value.to_string()),
                "endpoint" => config.endpoint = Some(value.to_string()),
                "timeout" => {
                    let secs = value.parse::<u64>().map_err(|_| {
                        Error::config(format!(
                            "Invalid timeout '{value}' on line {line_no}: expected whole seconds"
                        ))
                    })?;
                    config.timeout_secs = Some(secs);
                }
                other => {
                    return Err(Error::config(format!(
                        "Unknown configuration key '{other}' on line {line_no}"
                    )));
                }
            }
        }

        Ok(config)
    }

    /// Load a config file from disk
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read config file {}: {e}", path.display()))
        })?;

        let config = Self::parse(&contents).map_err(|e| match e {
            Error::Config(msg) => Error::config(format!("{}: {msg}", path.display())),
            other => other,
        })?;

        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Render the configuration in config file format, names sorted
    pub fn to_file_contents(&self) -> String {
        let mut out = String::new();
        let timeout = self.timeout_secs.map(|secs| secs.to_string());
        let pairs = [
            ("account", self.account.as_deref()),
            ("endpoint", self.endpoint.as_deref()),
            ("key", self.key.as_deref()),
            ("timeout", timeout.as_deref()),
        ];
        for (name, value) in pairs {
            if let Some(value) = value {
                out.push_str(name);
                out.push(' ');
                out.push_str(value);
                out.push('\n');
            }
        }
        out
    }

    /// Write the configuration to `path`, readable by the owner only
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, self.to_file_contents())?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
        }

        tracing::debug!("Saved configuration to {}", path.display());
        Ok(())
    }

    /// Fill every missing field from `fallback`
    pub fn or(self, fallback: Config) -> Config {
        Config {
            account: non_empty(self.account).or(non_empty(fallback.account)),
            key: non_empty(self.key).or(non_empty(fallback.key)),
            endpoint: non_empty(self.endpoint).or(non_empty(fallback.endpoint)),
            timeout_secs: self.timeout_secs.or(fallback.timeout_secs),
        }
    }

    /// Effective API endpoint
    pub fn endpoint(&self) -> &str {
        self.endpoint.as_deref().unwrap_or(DEFAULT_API_ENDPOINT)
    }

    /// Effective HTTP timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    /// Resolve into immutable credentials
    pub fn credentials(&self) -> Result<Credentials> {
        let account = non_empty(self.account.clone())
            .ok_or_else(|| Error::config("No account name configured for Esgob"))?;
        let key = non_empty(self.key.clone())
            .ok_or_else(|| Error::config("No API key configured for Esgob"))?;
        Credentials::with_endpoint(account, key, self.endpoint())
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Account, API key and endpoint used to authenticate every request
///
/// Constructed once and never mutated. The Debug implementation does NOT
/// expose the API key.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    account: String,
    key: String,
    endpoint: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("account", &self.account)
            .field("key", &"<REDACTED>")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl Credentials {
    /// Credentials for the default endpoint
    pub fn new(account: impl Into<String>, key: impl Into<String>) -> Result<Self> {
        Self::with_endpoint(account, key, DEFAULT_API_ENDPOINT)
    }

    /// Credentials for a custom endpoint
    ///
    /// The endpoint must be an `http` or `https` URL; a trailing `/` is added
    /// when missing so operation names can be appended directly.
    pub fn with_endpoint(
        account: impl Into<String>,
        key: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Result<Self> {
        let account = account.into();
        let key = key.into();
        let mut endpoint = endpoint.into();

        if account.trim().is_empty() {
            return Err(Error::config("No account name configured for Esgob"));
        }
        if key.trim().is_empty() {
            return Err(Error::config("No API key configured for Esgob"));
        }
        if !endpoint.starts_with("https://") && !endpoint.starts_with("http://") {
            return Err(Error::config(format!(
                "Esgob endpoint must use HTTP or HTTPS scheme. Got: {endpoint}"
            )));
        }
        if !endpoint.ends_with('/') {
            endpoint.push('/');
        }

        Ok(Self {
            account,
            key,
            endpoint,
        })
    }

    /// Account name
    pub fn account(&self) -> &str {
        &self.account
    }

    /// API key
    pub fn key(&self) -> &str {
        &self.key
    }

    /// API endpoint, always ending in `/`
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Layers explicit values, environment and config files into a [`Config`]
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    explicit: Config,
    env: Config,
    file: Option<PathBuf>,
    search_paths: Vec<PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Loader reading the process environment and the default file paths
    pub fn new() -> Self {
        Self {
            explicit: Config::new(),
            env: Config::from_env(),
            file: None,
            search_paths: Config::default_file_paths(),
        }
    }

    /// Values that take precedence over every other source
    pub fn with_explicit(mut self, explicit: Config) -> Self {
        self.explicit = explicit;
        self
    }

    /// Replace the environment-derived values
    pub fn with_env(mut self, env: Config) -> Self {
        self.env = env;
        self
    }

    /// Read this config file instead of searching the default paths
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Replace the list of default config file paths
    pub fn with_search_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.search_paths = paths;
        self
    }

    /// Path of the config file that [`ConfigLoader::load`] would read
    pub fn config_file(&self) -> Option<&Path> {
        match &self.file {
            Some(path) => Some(path.as_path()),
            None => self
                .search_paths
                .iter()
                .find(|path| path.is_file())
                .map(PathBuf::as_path),
        }
    }

    /// Merge all sources
    ///
    /// An explicit config file is always read and must exist. The default
    /// search paths are only consulted while explicit values and the
    /// environment still lack an account or key. Fails when no file was
    /// read and neither source names an account or key.
    pub fn load(&self) -> Result<Config> {
        let merged = self.explicit.clone().or(self.env.clone());

        let file_config = match &self.file {
            Some(path) => Some(Config::load_file(path)?),
            None if merged.account.is_some() && merged.key.is_some() => None,
            None => self
                .config_file()
                .map(Config::load_file)
                .transpose()?,
        };

        let found_file = file_config.is_some();
        let merged = merged.or(file_config.unwrap_or_default());

        if !found_file && merged.account.is_none() && merged.key.is_none() {
            return Err(Error::config("Unable to load Esgob configuration"));
        }

        Ok(merged)
    }

    /// Merge all sources and resolve credentials
    pub fn credentials(&self) -> Result<Credentials> {
        self.load()?.credentials()
    }
}
