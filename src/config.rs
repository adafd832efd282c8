use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use anyhow::Result;
use crate::RouterId;
use crate::error::RouterError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    pub router_id: RouterId,
    pub server_host: String,
    pub server_port: u16,
    /// Period between distance-vector broadcasts, in milliseconds.
    pub update_interval: u64,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            router_id: 0,
            server_host: "localhost".to_string(),
            server_port: 2227,
            update_interval: 1000, // 1 second
        }
    }
}

impl RouterConfig {
    pub fn new(router_id: RouterId) -> Self {
        Self {
            router_id,
            ..Self::default()
        }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: RouterConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), RouterError> {
        if self.update_interval == 0 {
            return Err(RouterError::InvalidConfig("update interval must be at least 1 ms".to_string()));
        }
        if self.server_host.is_empty() {
            return Err(RouterError::InvalidConfig("relay host name is empty".to_string()));
        }
        Ok(())
    }

    pub fn update_period(&self) -> Duration {
        Duration::from_millis(self.update_interval)
    }
}
