//! Runtime configuration loaded from `chainlink-fixtures.toml`.
//!
//! The file is optional. It can supply a default RPC endpoint template, a
//! per-network endpoint, and the per-request timeout:
//!
//! ```toml
//! rpc = "https://{network}.infura.io/v3/<key>"
//! timeout_secs = 30
//!
//! [networks.polygon-mainnet]
//! rpc = "https://polygon-rpc.com"
//! ```
//!
//! Endpoint templates may contain the `{network}` placeholder, which is
//! replaced by the canonical network name.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use alloy::transports::http::reqwest::Url;
use anyhow::{Context, Result};
use chainlink_rounds::source::DEFAULT_TIMEOUT;
use chainlink_rounds::{Error, Network};
use serde::Deserialize;

/// Placeholder substituted with the network name in endpoint templates.
pub const NETWORK_PLACEHOLDER: &str = "{network}";

/// Environment variable holding the RPC endpoint template.
pub const RPC_ENV: &str = "API_TEMPLATE";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Endpoint template used for every network without its own entry.
    #[serde(default)]
    pub rpc: Option<String>,
    /// Per-request timeout in seconds.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// Per-network overrides, keyed by canonical network name.
    #[serde(default)]
    pub networks: HashMap<String, NetworkRpc>,
}

/// Endpoint override for a single network.
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkRpc {
    /// RPC URL or template for this network.
    pub rpc: String,
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// Returns [`Config::default`] if the file does not exist,
    /// allowing the binary to work without any config.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text =
            std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing {}", path.display()))
    }

    /// Parse configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if `text` is not valid configuration TOML.
    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Per-request timeout, falling back to the provider default.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout_secs
            .map_or(DEFAULT_TIMEOUT, Duration::from_secs)
    }

    /// Resolve the RPC endpoint for `network`.
    ///
    /// Precedence: `cli_rpc` (the `--rpc` flag or [`RPC_ENV`]), then the
    /// network's own entry, then the top-level `rpc` template. Blank values
    /// are skipped.
    ///
    /// # Errors
    ///
    /// - [`Error::MissingRpc`] if no source provides an endpoint.
    /// - [`Error::InvalidRpcUrl`] if the expanded endpoint is not a URL.
    pub fn resolve_rpc(&self, network: Network, cli_rpc: Option<&str>) -> Result<Url, Error> {
        let per_network = self.networks.get(network.name()).map(|n| n.rpc.as_str());
        let template = [cli_rpc, per_network, self.rpc.as_deref()]
            .into_iter()
            .flatten()
            .find(|t| !t.trim().is_empty())
            .ok_or_else(|| Error::MissingRpc(network.name().to_owned()))?;
        expand(template, network)
    }
}

/// Substitute [`NETWORK_PLACEHOLDER`] in `template` and parse the result.
///
/// # Errors
///
/// Returns [`Error::InvalidRpcUrl`] if the expanded text is not a URL.
pub fn expand(template: &str, network: Network) -> Result<Url, Error> {
    let url = template.trim().replace(NETWORK_PLACEHOLDER, network.name());
    match Url::parse(&url) {
        Ok(parsed) => Ok(parsed),
        Err(e) => Err(Error::InvalidRpcUrl {
            url,
            reason: e.to_string(),
        }),
    }
}
