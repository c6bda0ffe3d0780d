//! Configuration management for hotspotctl

use crate::error::{HotspotError, HotspotResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration file read when no path is given and it exists
pub const DEFAULT_CONFIG_PATH: &str = "/etc/hotspotctl/config.toml";

/// Main hotspotctl configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotspotctlConfig {
    /// NetworkManager binding settings
    #[serde(default)]
    pub networkmanager: NetworkManagerSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkManagerSettings {
    /// nmcli executable
    #[serde(default = "default_nmcli")]
    pub nmcli: PathBuf,
    /// ip (iproute2) executable
    #[serde(default = "default_ip")]
    pub ip: PathBuf,
    /// Name of the connection profile holding the hotspot configuration
    #[serde(default = "default_connection_name")]
    pub connection_name: String,
    /// Wi-Fi interface for the access point; discovered when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interface: Option<String>,
    /// Directory holding the dnsmasq lease files of shared connections
    #[serde(default = "default_leases_dir")]
    pub leases_dir: PathBuf,
    /// Client limit reported as the maximum connection count
    #[serde(default = "default_max_clients")]
    pub max_clients: u32,
}

fn default_nmcli() -> PathBuf {
    PathBuf::from("nmcli")
}

fn default_ip() -> PathBuf {
    PathBuf::from("ip")
}

fn default_connection_name() -> String {
    "Hotspot".to_string()
}

fn default_leases_dir() -> PathBuf {
    PathBuf::from("/var/lib/NetworkManager")
}

fn default_max_clients() -> u32 {
    10
}

impl Default for NetworkManagerSettings {
    fn default() -> Self {
        Self {
            nmcli: default_nmcli(),
            ip: default_ip(),
            connection_name: default_connection_name(),
            interface: None,
            leases_dir: default_leases_dir(),
            max_clients: default_max_clients(),
        }
    }
}

impl HotspotctlConfig {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> HotspotResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            HotspotError::Config(format!("Failed to read config {}: {}", path.display(), e))
        })?;

        Self::parse(&content)
            .map_err(|e| HotspotError::Config(format!("Failed to parse config {}: {}", path.display(), e)))
    }

    /// Load the explicit path if given, else the default file when present
    pub fn load_or_default(path: Option<&Path>) -> HotspotResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_PATH);
                if default_path.exists() {
                    Self::load(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> HotspotResult<()> {
        let content = self.to_toml()?;

        std::fs::write(path.as_ref(), content)
            .map_err(|e| HotspotError::Config(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    pub fn to_toml(&self) -> HotspotResult<String> {
        toml::to_string_pretty(self)
            .map_err(|e| HotspotError::Config(format!("Failed to serialize config: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = HotspotctlConfig::parse("").unwrap();
        assert_eq!(config, HotspotctlConfig::default());
        assert_eq!(config.networkmanager.connection_name, "Hotspot");
        assert_eq!(config.networkmanager.max_clients, 10);
        assert!(config.networkmanager.interface.is_none());
    }

    #[test]
    fn test_partial_section() {
        let config = HotspotctlConfig::parse(
            r#"
            [networkmanager]
            interface = "wlan1"
            max_clients = 4
            "#,
        )
        .unwrap();

        assert_eq!(config.networkmanager.interface.as_deref(), Some("wlan1"));
        assert_eq!(config.networkmanager.max_clients, 4);
        assert_eq!(config.networkmanager.nmcli, PathBuf::from("nmcli"));
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = HotspotctlConfig::default();
        config.networkmanager.connection_name = "Shared".to_string();
        config.networkmanager.interface = Some("wlp3s0".to_string());
        config.save(&path).unwrap();

        let loaded = HotspotctlConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_errors_are_config_errors() {
        let dir = TempDir::new().unwrap();

        let missing = HotspotctlConfig::load(dir.path().join("missing.toml"));
        assert!(matches!(missing, Err(HotspotError::Config(_))));

        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[networkmanager\nmax_clients = \"many\"").unwrap();
        let bad = HotspotctlConfig::load(&path);
        assert!(matches!(bad, Err(HotspotError::Config(ref msg)) if msg.contains("parse")));
    }
}
