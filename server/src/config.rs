//! Server configuration, read from a TOML file.

use serde::{Deserialize, Serialize};
use std::net::{AddrParseError, SocketAddr};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to.
    pub listen_addr: String,
    /// SQLite change log. Without it changes live in memory only.
    pub database_path: Option<PathBuf>,
    /// JSON file with the classes and definitions to serve.
    pub seed_path: Option<PathBuf>,
    /// Write commits and deployments to the change log.
    pub persist_changes: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            database_path: None,
            seed_path: None,
            persist_changes: true,
        }
    }
}

impl ServerConfig {
    /// Loads configuration from `path`.
    /// Falls back to defaults with a warning when the file is missing or
    /// cannot be parsed.
    pub fn load_from(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            warn!("No config file at {:?}, using defaults", path);
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<ServerConfig>(&contents) {
                Ok(config) => {
                    info!("Loaded config from {:?}", path);
                    config
                }
                Err(e) => {
                    warn!("Failed to parse config file {:?}: {}. Using defaults.", path, e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read config file {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    /// The listen address, with its port replaced by `port` when given.
    pub fn socket_addr(&self, port: Option<u16>) -> Result<SocketAddr, AddrParseError> {
        let mut addr: SocketAddr = self.listen_addr.parse()?;
        if let Some(port) = port {
            addr.set_port(port);
        }
        Ok(addr)
    }
}
