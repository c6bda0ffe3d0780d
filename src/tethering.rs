//! Platform tethering binding
//!
//! The platform's tethering service is consumed through two traits:
//! [`TetheringPlatform`] resolves the active internet connection and hands
//! out a [`TetheringManager`] bound to it. Everything the controller knows
//! about the hotspot is read through these traits.

use crate::error::{HotspotError, PlatformResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Wireless band of the access point
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WifiBand {
    /// Let the device pick
    #[default]
    Auto,
    /// 2.4 GHz
    #[serde(rename = "2.4ghz")]
    TwoPointFourGhz,
    /// 5 GHz
    #[serde(rename = "5ghz")]
    FiveGhz,
}

impl WifiBand {
    /// Human readable label used in status output
    pub fn label(&self) -> &'static str {
        match self {
            WifiBand::Auto => "2.4GHz/5GHz (device decides)",
            WifiBand::TwoPointFourGhz => "2.4GHz",
            WifiBand::FiveGhz => "5GHz",
        }
    }
}

impl fmt::Display for WifiBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WifiBand::Auto => write!(f, "auto"),
            WifiBand::TwoPointFourGhz => write!(f, "2.4GHz"),
            WifiBand::FiveGhz => write!(f, "5GHz"),
        }
    }
}

impl FromStr for WifiBand {
    type Err = HotspotError;

    /// Accepts `auto`, `2.4` and `5`, optionally suffixed with `g` or `ghz`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let value = lower
            .strip_suffix("ghz")
            .or_else(|| lower.strip_suffix('g'))
            .unwrap_or(&lower);

        match value {
            "auto" => Ok(WifiBand::Auto),
            "2.4" => Ok(WifiBand::TwoPointFourGhz),
            "5" => Ok(WifiBand::FiveGhz),
            _ => Err(HotspotError::InvalidArgument(format!(
                "unknown band '{}' (expected auto, 2.4 or 5)",
                s
            ))),
        }
    }
}

/// Access point configuration as stored by the platform
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessPointConfig {
    /// Broadcast network name
    pub ssid: String,
    /// WPA passphrase
    pub passphrase: String,
    /// Frequency band
    pub band: WifiBand,
}

/// Internet connection profile the hotspot shares
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionProfile {
    /// Profile name as shown to users
    pub name: String,
    /// Connection type (ethernet, wifi, gsm, ...)
    pub connection_type: String,
    /// Device carrying the connection, if known
    pub device: Option<String>,
}

/// Platform-reported tethering support for a connection profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TetheringCapability {
    Enabled,
    DisabledByGroupPolicy,
    DisabledByHardwareLimitation,
    DisabledByOperator,
    DisabledBySku,
    DisabledByRequiredAppNotInstalled,
    DisabledDueToUnknownCause,
    DisabledBySystemCapability,
}

impl fmt::Display for TetheringCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TetheringCapability::Enabled => "enabled",
            TetheringCapability::DisabledByGroupPolicy => "disabled by group policy",
            TetheringCapability::DisabledByHardwareLimitation => "disabled by hardware limitation",
            TetheringCapability::DisabledByOperator => "disabled by operator",
            TetheringCapability::DisabledBySku => "disabled by SKU",
            TetheringCapability::DisabledByRequiredAppNotInstalled => {
                "disabled, required application not installed"
            }
            TetheringCapability::DisabledDueToUnknownCause => "disabled due to unknown cause",
            TetheringCapability::DisabledBySystemCapability => "disabled by system capability",
        };
        f.write_str(text)
    }
}

/// Operational state of the tethering session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationalState {
    Unknown,
    On,
    Off,
    InTransition,
}

/// Kind of a client host name entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HostNameKind {
    /// Friendly host name
    DomainName,
    Ipv4,
    Ipv6,
    Bluetooth,
}

/// One network identity of a connected client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostName {
    /// Canonical form (address text for IP entries)
    pub canonical_name: String,
    /// Display form
    pub display_name: String,
    pub kind: HostNameKind,
}

impl HostName {
    pub fn domain(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            canonical_name: name.to_ascii_lowercase(),
            display_name: name,
            kind: HostNameKind::DomainName,
        }
    }

    pub fn ipv4(address: impl Into<String>) -> Self {
        let address = address.into();
        Self {
            canonical_name: address.clone(),
            display_name: address,
            kind: HostNameKind::Ipv4,
        }
    }

    pub fn ipv6(address: impl Into<String>) -> Self {
        let address = address.into();
        Self {
            canonical_name: address.clone(),
            display_name: address,
            kind: HostNameKind::Ipv6,
        }
    }
}

/// Raw client record as reported by the platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TetheringClient {
    /// Host names in platform order; `None` when the platform reports none
    pub host_names: Option<Vec<HostName>>,
    pub mac_address: String,
}

/// Entry point into the platform tethering service
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TetheringPlatform: Send + Sync {
    /// Active internet connection profile, if any
    async fn internet_connection_profile(&self) -> PlatformResult<Option<ConnectionProfile>>;

    /// Tethering support for the given profile
    async fn tethering_capability(
        &self,
        profile: &ConnectionProfile,
    ) -> PlatformResult<TetheringCapability>;

    /// Create a tethering manager bound to the given profile
    async fn create_manager(
        &self,
        profile: &ConnectionProfile,
    ) -> PlatformResult<Box<dyn TetheringManager>>;
}

/// Tethering manager bound to one connection profile
///
/// Every method is a live query or a single platform operation. Implementors
/// must not cache state on behalf of callers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TetheringManager: Send + Sync {
    /// Current access point configuration, `None` if never configured
    async fn access_point_configuration(&self) -> PlatformResult<Option<AccessPointConfig>>;

    /// Replace the access point configuration
    async fn configure_access_point(&self, config: &AccessPointConfig) -> PlatformResult<()>;

    async fn start_tethering(&self) -> PlatformResult<()>;

    async fn stop_tethering(&self) -> PlatformResult<()>;

    async fn enable_no_connections_timeout(&self) -> PlatformResult<()>;

    async fn disable_no_connections_timeout(&self) -> PlatformResult<()>;

    async fn is_no_connections_timeout_enabled(&self) -> PlatformResult<bool>;

    async fn operational_state(&self) -> PlatformResult<OperationalState>;

    async fn client_count(&self) -> PlatformResult<u32>;

    async fn max_client_count(&self) -> PlatformResult<u32>;

    /// Snapshot of connected clients, `None` if the platform has no list
    async fn tethering_clients(&self) -> PlatformResult<Option<Vec<TetheringClient>>>;
}
