//! Configuration management for the CertChain indexer.
//!
//! This module handles loading configuration from:
//! - TOML files
//! - Environment variables referenced as `${VAR_NAME}`
//! - Default values (fallbacks)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::decoder::TypeNames;

/// Largest page the ledger read API accepts.
pub const MAX_PAGE_SIZE: usize = 50;

/// Main configuration for the indexer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Ledger endpoint
    pub network: NetworkConfig,

    /// Deployed package and type names
    pub contracts: ContractsConfig,

    /// Query page sizes and lookup fan-out
    #[serde(default)]
    pub query: QueryConfig,

    /// Content gateway
    #[serde(default)]
    pub content: ContentConfig,

    /// Periodic refresh
    #[serde(default)]
    pub refresh: RefreshConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Network configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// JSON-RPC endpoint of a full node
    pub rpc_url: String,

    /// Per-request timeout
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// Deployed package configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractsConfig {
    /// Package address (`0x`-prefixed hex)
    pub package_id: String,

    /// Move module name
    #[serde(default = "default_module")]
    pub module: String,

    /// Credential struct name
    #[serde(default = "default_credential_struct")]
    pub credential_struct: String,

    /// Issuance event struct name
    #[serde(default = "default_event_struct")]
    pub event_struct: String,

    /// Holder profile struct name
    #[serde(default = "default_profile_struct")]
    pub profile_struct: String,

    /// Issuer capability struct name
    #[serde(default = "default_admin_cap_struct")]
    pub admin_cap_struct: String,
}

/// Query configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Events read per issuance scan
    #[serde(default = "default_page_size")]
    pub event_page_size: usize,

    /// Transactions read per history scan
    #[serde(default = "default_page_size")]
    pub tx_page_size: usize,

    /// Point lookups in flight at once during resolution
    #[serde(default = "default_lookup_concurrency")]
    pub lookup_concurrency: usize,

    /// Owned-object pages followed per address
    #[serde(default = "default_max_owned_pages")]
    pub max_owned_pages: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            event_page_size: default_page_size(),
            tx_page_size: default_page_size(),
            lookup_concurrency: default_lookup_concurrency(),
            max_owned_pages: default_max_owned_pages(),
        }
    }
}

/// Content gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Gateway base URL that content addresses are appended to
    #[serde(default = "default_gateway")]
    pub gateway: String,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            gateway: default_gateway(),
        }
    }
}

/// Refresh scheduler configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshConfig {
    /// Delay between successful refreshes
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Upper bound for the delay after consecutive failures
    #[serde(default = "default_max_backoff_secs")]
    pub max_backoff_secs: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            max_backoff_secs: default_max_backoff_secs(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (json, pretty)
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_module() -> String {
    certchain_core::MODULE_CERTIFICATE.to_string()
}

fn default_credential_struct() -> String {
    certchain_core::STRUCT_CERTIFICATE.to_string()
}

fn default_event_struct() -> String {
    certchain_core::STRUCT_CERTIFICATE_ISSUED.to_string()
}

fn default_profile_struct() -> String {
    certchain_core::STRUCT_USER_PROFILE.to_string()
}

fn default_admin_cap_struct() -> String {
    certchain_core::STRUCT_ADMIN_CAP.to_string()
}

fn default_page_size() -> usize {
    MAX_PAGE_SIZE
}

fn default_lookup_concurrency() -> usize {
    1
}

fn default_max_owned_pages() -> usize {
    10
}

fn default_gateway() -> String {
    "https://gateway.pinata.cloud/ipfs".to_string()
}

fn default_interval_secs() -> u64 {
    10
}

fn default_max_backoff_secs() -> u64 {
    300
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// Environment variables can be referenced using `${VAR_NAME}` syntax.
    /// For example: `rpc_url = "${SUI_RPC_URL}"`
    ///
    /// # Example
    /// ```no_run
    /// # use certchain_indexer::config::Config;
    /// let config = Config::from_file("certchain.toml")?;
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let expanded = Self::expand_env_vars(&contents)?;

        let config: Config = toml::from_str(&expanded)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a TOML string.
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        let config: Config = toml::from_str(toml).context("Failed to parse TOML configuration")?;

        config.validate()?;

        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        let rpc_url = self.network.rpc_url.trim();
        if rpc_url.is_empty() {
            anyhow::bail!("Network RPC URL cannot be empty");
        }
        if !(rpc_url.starts_with("http://") || rpc_url.starts_with("https://")) {
            anyhow::bail!("Network RPC URL must start with http:// or https://");
        }
        if self.network.request_timeout_secs == 0 {
            anyhow::bail!("Network request_timeout_secs must be > 0");
        }

        let package = &self.contracts.package_id;
        let Some(hex) = package.strip_prefix("0x") else {
            anyhow::bail!("Contracts package_id must be 0x-prefixed");
        };
        if hex.is_empty() || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            anyhow::bail!("Contracts package_id must be a hexadecimal address");
        }
        for (name, value) in [
            ("module", &self.contracts.module),
            ("credential_struct", &self.contracts.credential_struct),
            ("event_struct", &self.contracts.event_struct),
            ("profile_struct", &self.contracts.profile_struct),
            ("admin_cap_struct", &self.contracts.admin_cap_struct),
        ] {
            if value.trim().is_empty() {
                anyhow::bail!("Contracts {} cannot be empty", name);
            }
        }

        for (name, value) in [
            ("event_page_size", self.query.event_page_size),
            ("tx_page_size", self.query.tx_page_size),
        ] {
            if value == 0 || value > MAX_PAGE_SIZE {
                anyhow::bail!("Query {} must be between 1 and {}", name, MAX_PAGE_SIZE);
            }
        }
        if self.query.lookup_concurrency == 0 {
            anyhow::bail!("Query lookup_concurrency must be > 0");
        }
        if self.query.max_owned_pages == 0 {
            anyhow::bail!("Query max_owned_pages must be > 0");
        }

        let gateway = self.content.gateway.trim();
        if !(gateway.starts_with("http://") || gateway.starts_with("https://")) {
            anyhow::bail!("Content gateway must start with http:// or https://");
        }

        if self.refresh.interval_secs == 0 {
            anyhow::bail!("Refresh interval_secs must be > 0");
        }
        if self.refresh.max_backoff_secs < self.refresh.interval_secs {
            anyhow::bail!(
                "Refresh max_backoff_secs ({}) must be >= interval_secs ({})",
                self.refresh.max_backoff_secs,
                self.refresh.interval_secs
            );
        }

        if !matches!(
            self.logging.level.as_str(),
            "trace" | "debug" | "info" | "warn" | "error"
        ) {
            anyhow::bail!("Invalid log level: {}", self.logging.level);
        }
        if !matches!(self.logging.format.as_str(), "json" | "pretty") {
            anyhow::bail!(
                "Invalid log format: {} (expected json or pretty)",
                self.logging.format
            );
        }

        Ok(())
    }

    /// Type names for the configured package.
    pub fn type_names(&self) -> TypeNames {
        let c = &self.contracts;
        TypeNames::new(
            &c.package_id,
            &c.module,
            &c.credential_struct,
            &c.event_struct,
            &c.profile_struct,
            &c.admin_cap_struct,
        )
    }

    /// Per-request RPC timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.network.request_timeout_secs)
    }

    /// Expand `${VAR_NAME}` placeholders.
    ///
    /// Placeholders after a `#` that is outside a quoted string are left
    /// alone, so commented-out examples do not need their variables set.
    /// Strings are tracked per line.
    fn expand_env_vars(input: &str) -> Result<String> {
        let mut result = String::with_capacity(input.len());

        for (index, line) in input.split_inclusive('\n').enumerate() {
            let line_no = index + 1;
            let mut chars = line.chars().peekable();
            let mut quote: Option<char> = None;
            let mut escape_next = false;

            while let Some(ch) = chars.next() {
                if escape_next {
                    escape_next = false;
                    result.push(ch);
                    continue;
                }

                match (ch, quote) {
                    ('\\', Some('"')) => {
                        escape_next = true;
                        result.push(ch);
                    }
                    ('"' | '\'', None) => {
                        quote = Some(ch);
                        result.push(ch);
                    }
                    (c, Some(open)) if c == open => {
                        quote = None;
                        result.push(ch);
                    }
                    ('#', None) => {
                        // Rest of the line is a comment.
                        result.push(ch);
                        result.extend(chars.by_ref());
                    }
                    ('$', _) if chars.peek() == Some(&'{') => {
                        chars.next();
                        let mut var_name = String::new();
                        let mut closed = false;
                        for c in chars.by_ref() {
                            if c == '}' {
                                closed = true;
                                break;
                            }
                            var_name.push(c);
                        }

                        if !closed {
                            anyhow::bail!(
                                "Unclosed environment variable placeholder on line {}",
                                line_no
                            );
                        }
                        if var_name.is_empty() {
                            anyhow::bail!("Empty environment variable name on line {}", line_no);
                        }

                        let value = std::env::var(&var_name).with_context(|| {
                            format!(
                                "Environment variable '{}' is not set (referenced on line {})",
                                var_name, line_no
                            )
                        })?;
                        result.push_str(&value);
                    }
                    _ => result.push(ch),
                }
            }
        }

        Ok(result)
    }
}
