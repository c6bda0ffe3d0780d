//! Hotspot controller
//!
//! Reconciles the requested access point configuration with what the
//! platform reports, and wraps start/stop and auto-stop in idempotent
//! operations. Nothing is cached: every accessor is a live platform read.

use crate::client::ClientDescriptor;
use crate::error::{HotspotError, HotspotResult};
use crate::tethering::{
    AccessPointConfig, ConnectionProfile, OperationalState, TetheringCapability, TetheringClient,
    TetheringManager, TetheringPlatform, WifiBand,
};
use crate::validation::{validate_passphrase, validate_ssid};
use tracing::{debug, info};

/// Partial configuration update; `None` fields keep their current value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigUpdate {
    pub ssid: Option<String>,
    pub passphrase: Option<String>,
    pub band: Option<WifiBand>,
}

impl ConfigUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ssid(mut self, ssid: impl Into<String>) -> Self {
        self.ssid = Some(ssid.into());
        self
    }

    pub fn passphrase(mut self, passphrase: impl Into<String>) -> Self {
        self.passphrase = Some(passphrase.into());
        self
    }

    pub fn band(mut self, band: WifiBand) -> Self {
        self.band = Some(band);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.ssid.is_none() && self.passphrase.is_none() && self.band.is_none()
    }
}

/// One `toggle` request: configuration changes, auto-stop, then on/off
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToggleOptions {
    pub update: ConfigUpdate,
    /// Auto-stop on no connections; always applied, enabled or disabled
    pub auto_stop: bool,
    /// Turn the hotspot off, or keep it off
    pub disable: bool,
    /// Stop and start again if already running; wins over `disable`
    pub restart: bool,
}

/// Controller for the hotspot sharing the active internet connection
pub struct HotspotController {
    profile: ConnectionProfile,
    manager: Box<dyn TetheringManager>,
}

impl HotspotController {
    /// Bind to the platform's tethering manager for the active connection
    ///
    /// Fails with [`HotspotError::Capability`] if tethering is not enabled
    /// for the connection. This is permanent for the session.
    pub async fn new(platform: &dyn TetheringPlatform) -> HotspotResult<Self> {
        let profile = platform
            .internet_connection_profile()
            .await?
            .ok_or(HotspotError::NoInternetConnection)?;

        let capability = platform.tethering_capability(&profile).await?;
        if capability != TetheringCapability::Enabled {
            return Err(HotspotError::Capability(capability));
        }

        let manager = platform.create_manager(&profile).await?;
        info!(profile = %profile.name, "Bound to tethering manager");

        Ok(Self { profile, manager })
    }

    /// Connection profile being shared
    pub fn connection_profile(&self) -> &ConnectionProfile {
        &self.profile
    }

    /// Current access point configuration, `None` if unconfigured
    pub async fn config(&self) -> HotspotResult<Option<AccessPointConfig>> {
        Ok(self.manager.access_point_configuration().await?)
    }

    pub async fn ssid(&self) -> HotspotResult<Option<String>> {
        Ok(self.config().await?.map(|config| config.ssid))
    }

    pub async fn passphrase(&self) -> HotspotResult<Option<String>> {
        Ok(self.config().await?.map(|config| config.passphrase))
    }

    pub async fn band(&self) -> HotspotResult<Option<WifiBand>> {
        Ok(self.config().await?.map(|config| config.band))
    }

    pub async fn is_running(&self) -> HotspotResult<bool> {
        Ok(self.manager.operational_state().await? == OperationalState::On)
    }

    /// Whether the platform stops the hotspot once no clients are connected
    pub async fn will_disable_on_no_connections(&self) -> HotspotResult<bool> {
        Ok(self.manager.is_no_connections_timeout_enabled().await?)
    }

    pub async fn connection_count(&self) -> HotspotResult<u32> {
        Ok(self.manager.client_count().await?)
    }

    pub async fn max_connection_count(&self) -> HotspotResult<u32> {
        Ok(self.manager.max_client_count().await?)
    }

    /// Merge `update` into the current configuration and write it if it changed
    ///
    /// All provided fields are validated before anything is written. When the
    /// merged configuration equals what the platform already holds, no
    /// platform write is issued.
    pub async fn update_config(&mut self, update: ConfigUpdate) -> HotspotResult<()> {
        let mut config = self.config().await?.unwrap_or_default();

        if let Some(ssid) = update.ssid {
            validate_ssid(&ssid)?;
            config.ssid = ssid;
        }

        if let Some(passphrase) = update.passphrase {
            validate_passphrase(&passphrase)?;
            config.passphrase = passphrase;
        }

        // Band support is not checked against the hardware
        if let Some(band) = update.band {
            config.band = band;
        }

        let current = self.config().await?.unwrap_or_default();
        if current.ssid == config.ssid
            && current.passphrase == config.passphrase
            && current.band == config.band
        {
            debug!("Access point configuration unchanged");
            return Ok(());
        }

        info!(ssid = %config.ssid, band = %config.band, "Configuring access point");
        self.manager.configure_access_point(&config).await?;
        Ok(())
    }

    pub async fn start(&mut self) -> HotspotResult<()> {
        if self.is_running().await? {
            debug!("Hotspot already running");
            return Ok(());
        }

        info!(profile = %self.profile.name, "Starting hotspot");
        self.manager.start_tethering().await?;
        Ok(())
    }

    pub async fn stop(&mut self) -> HotspotResult<()> {
        if !self.is_running().await? {
            debug!("Hotspot already stopped");
            return Ok(());
        }

        info!(profile = %self.profile.name, "Stopping hotspot");
        self.manager.stop_tethering().await?;
        Ok(())
    }

    pub async fn enable_auto_stop(&mut self) -> HotspotResult<()> {
        if self.will_disable_on_no_connections().await? {
            debug!("Auto-stop already enabled");
            return Ok(());
        }

        info!("Enabling auto-stop on no connections");
        self.manager.enable_no_connections_timeout().await?;
        Ok(())
    }

    pub async fn disable_auto_stop(&mut self) -> HotspotResult<()> {
        if !self.will_disable_on_no_connections().await? {
            debug!("Auto-stop already disabled");
            return Ok(());
        }

        info!("Disabling auto-stop on no connections");
        self.manager.disable_no_connections_timeout().await?;
        Ok(())
    }

    /// Apply a toggle request
    ///
    /// A running hotspot is stopped on `disable` or `restart` and started
    /// again on `restart`. A stopped hotspot is started unless `disable` is
    /// set. The configuration is only touched when the update carries at
    /// least one field.
    pub async fn toggle(&mut self, options: ToggleOptions) -> HotspotResult<()> {
        if !options.update.is_empty() {
            self.update_config(options.update).await?;
        }

        if options.auto_stop {
            self.enable_auto_stop().await?;
        } else {
            self.disable_auto_stop().await?;
        }

        if self.is_running().await? {
            if options.disable || options.restart {
                self.stop().await?;
            }
            if options.restart {
                self.start().await?;
            }
        } else if !options.disable {
            self.start().await?;
        }

        Ok(())
    }

    /// Clients connected right now, from a single platform snapshot
    pub async fn connected_clients(&self) -> HotspotResult<ConnectedClients> {
        let records = self.manager.tethering_clients().await?.unwrap_or_default();
        debug!(count = records.len(), "Enumerated tethering clients");
        Ok(ConnectedClients {
            records: records.into_iter(),
        })
    }
}

/// Lazily converts one snapshot of client records into descriptors
#[derive(Debug)]
pub struct ConnectedClients {
    records: std::vec::IntoIter<TetheringClient>,
}

impl Iterator for ConnectedClients {
    type Item = ClientDescriptor;

    fn next(&mut self) -> Option<Self::Item> {
        self.records.next().map(ClientDescriptor::from)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.records.size_hint()
    }
}

impl ExactSizeIterator for ConnectedClients {}
