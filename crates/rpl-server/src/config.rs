use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rpl_rides::RideConfig;
use rpl_store::{InMemoryLedger, JournalConfig, JournalLedger, KvLedger, SyncMode};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ServerError, ServerResult};

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 7054;

/// Full node configuration, as read from a TOML file.
///
/// ```toml
/// [server]
/// bind_addr = "127.0.0.1:7054"
///
/// [ledger]
/// path = "data/ridepool.journal"
/// sync = "every_commit"
///
/// [rides]
/// check_references = true
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub server: ServerConfig,
    pub ledger: LedgerConfig,
    pub rides: RideConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_PORT)),
        }
    }
}

/// Where the ledger lives. Without a path the ledger is in memory only.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    pub sync: SyncMode,
}

impl LedgerConfig {
    /// Open the configured ledger backend.
    pub fn open(&self) -> ServerResult<Arc<dyn KvLedger>> {
        match &self.path {
            Some(path) => {
                let config = JournalConfig {
                    sync_mode: self.sync,
                };
                Ok(Arc::new(JournalLedger::open(path, config)?))
            }
            None => {
                info!("using in-memory ledger; nothing will be persisted");
                Ok(Arc::new(InMemoryLedger::new()))
            }
        }
    }
}

impl NodeConfig {
    /// Read a configuration file.
    pub fn load(path: &Path) -> ServerResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ServerError::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> ServerResult<Self> {
        toml::from_str(text).map_err(|e| ServerError::Config(e.to_string()))
    }

    pub fn to_toml(&self) -> ServerResult<String> {
        toml::to_string_pretty(self).map_err(|e| ServerError::Config(e.to_string()))
    }
}
