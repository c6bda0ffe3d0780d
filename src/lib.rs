//! hotspotctl - Wi-Fi Hotspot Control Library
//!
//! Manages the wireless access point that shares the host's active
//! internet connection:
//! - Access point configuration (SSID, passphrase, band) with partial updates
//! - Idempotent start/stop and auto-stop on idle
//! - Connected client enumeration
//!
//! The platform tethering service is reached through the
//! [`TetheringPlatform`] and [`TetheringManager`] traits. A NetworkManager
//! implementation is provided in [`networkmanager`].

pub mod error;
pub mod validation;
pub mod tethering;
pub mod client;
pub mod hotspot;
pub mod networkmanager;
pub mod config;
pub mod status;

// Re-export commonly used types
pub use error::{HotspotError, HotspotResult, PlatformError, PlatformResult};
pub use tethering::{
    AccessPointConfig, ConnectionProfile, HostName, HostNameKind, OperationalState,
    TetheringCapability, TetheringClient, TetheringManager, TetheringPlatform, WifiBand,
};
pub use client::ClientDescriptor;
pub use hotspot::{ConfigUpdate, ConnectedClients, HotspotController, ToggleOptions};
pub use networkmanager::{NmcliPlatform, NmcliTetheringManager};
pub use config::{HotspotctlConfig, NetworkManagerSettings};
pub use status::{HotspotStatus, ClientSummary};
