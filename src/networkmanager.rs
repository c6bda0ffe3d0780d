//! NetworkManager tethering binding
//!
//! Implements the tethering traits on top of NetworkManager's `nmcli`.
//! The hotspot lives in a dedicated connection profile (802-11-wireless
//! mode `ap`, `ipv4.method shared`); connected clients are taken from the
//! neighbour table of the access point device, named after the dnsmasq
//! leases NetworkManager keeps for shared connections.

use crate::config::NetworkManagerSettings;
use crate::error::{PlatformError, PlatformResult};
use crate::tethering::{
    AccessPointConfig, ConnectionProfile, HostName, OperationalState, TetheringCapability,
    TetheringClient, TetheringManager, TetheringPlatform, WifiBand,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::io;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, warn};

/// nmcli exit code for an unknown connection, device or access point
const NMCLI_NOT_FOUND: i32 = 10;

const FIELD_SSID: &str = "802-11-wireless.ssid";
const FIELD_PSK: &str = "802-11-wireless-security.psk";
const FIELD_BAND: &str = "802-11-wireless.band";
const FIELD_STATE: &str = "GENERAL.STATE";
const FIELD_AP_SUPPORT: &str = "WIFI-PROPERTIES.AP";

struct CommandOutput {
    cmd: String,
    code: Option<i32>,
    success: bool,
    stdout: String,
    stderr: String,
}

impl CommandOutput {
    fn into_stdout(self) -> PlatformResult<String> {
        if !self.success {
            return Err(PlatformError::CommandFailed {
                cmd: self.cmd,
                code: self.code,
                stderr: self.stderr.trim().to_string(),
            });
        }
        Ok(self.stdout)
    }
}

/// Command line for logs, with secrets masked
fn display_command(program: &Path, args: &[&str]) -> String {
    let mut parts = vec![program.display().to_string()];
    let mut mask_next = false;
    for arg in args {
        if mask_next {
            parts.push("********".to_string());
        } else {
            parts.push(arg.to_string());
        }
        mask_next = arg.ends_with(".psk");
    }
    parts.join(" ")
}

async fn exec(program: &Path, args: &[&str]) -> PlatformResult<CommandOutput> {
    let cmd = display_command(program, args);
    debug!(cmd = %cmd, "Running platform command");

    let output = Command::new(program).args(args).output().await?;

    Ok(CommandOutput {
        cmd,
        code: output.status.code(),
        success: output.status.success(),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    })
}

async fn run(program: &Path, args: &[&str]) -> PlatformResult<String> {
    exec(program, args).await?.into_stdout()
}

/// Split a line of `nmcli -t` output, undoing its `\:` and `\\` escapes
fn split_terse(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            }
            ':' => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

/// Parse `name:value` lines of `nmcli -t -f ... show` output
fn parse_fields(output: &str) -> HashMap<String, String> {
    output
        .lines()
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            let mut fields = split_terse(line);
            if fields.len() < 2 {
                return None;
            }
            let name = fields.remove(0);
            Some((name, fields.join(":")))
        })
        .collect()
}

/// First active connection that could be shared
fn parse_active_connection(output: &str, hotspot_name: &str) -> Option<ConnectionProfile> {
    output.lines().find_map(|line| {
        let fields = split_terse(line);
        if fields.len() < 3 {
            return None;
        }
        let (name, connection_type, device) = (&fields[0], &fields[1], &fields[2]);
        if connection_type == "loopback" || name == hotspot_name || device.is_empty() {
            return None;
        }
        Some(ConnectionProfile {
            name: name.clone(),
            connection_type: connection_type.clone(),
            device: Some(device.clone()),
        })
    })
}

fn parse_wifi_devices(output: &str) -> Vec<String> {
    output
        .lines()
        .map(split_terse)
        .filter(|fields| fields.len() >= 2 && fields[1] == "wifi")
        .map(|mut fields| fields.swap_remove(0))
        .collect()
}

fn band_from_nm(value: &str) -> PlatformResult<WifiBand> {
    match value.trim() {
        "" | "--" => Ok(WifiBand::Auto),
        "bg" => Ok(WifiBand::TwoPointFourGhz),
        "a" => Ok(WifiBand::FiveGhz),
        other => Err(PlatformError::Parse(format!("unknown band '{}'", other))),
    }
}

fn band_to_nm(band: WifiBand) -> &'static str {
    match band {
        WifiBand::Auto => "",
        WifiBand::TwoPointFourGhz => "bg",
        WifiBand::FiveGhz => "a",
    }
}

fn parse_access_point_config(fields: &HashMap<String, String>) -> PlatformResult<AccessPointConfig> {
    let value = |name: &str| fields.get(name).cloned().unwrap_or_default();

    Ok(AccessPointConfig {
        ssid: value(FIELD_SSID),
        passphrase: value(FIELD_PSK),
        band: band_from_nm(&value(FIELD_BAND))?,
    })
}

fn operational_state_from_nm(value: Option<&str>) -> OperationalState {
    match value.map(str::trim) {
        None | Some("") => OperationalState::Off,
        Some("activated") => OperationalState::On,
        Some("activating") | Some("deactivating") => OperationalState::InTransition,
        Some(_) => OperationalState::Unknown,
    }
}

/// Parse `ip neigh show dev <dev>` into (address, MAC) pairs
fn parse_neighbors(output: &str) -> Vec<(IpAddr, String)> {
    output
        .lines()
        .filter_map(|line| {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            let address = tokens.first()?.parse::<IpAddr>().ok()?;
            if matches!(tokens.last(), Some(&"FAILED") | Some(&"INCOMPLETE")) {
                return None;
            }
            let position = tokens.iter().position(|t| *t == "lladdr")?;
            let mac = tokens.get(position + 1)?;
            Some((address, mac.to_ascii_lowercase()))
        })
        .collect()
}

/// Host names by MAC from a dnsmasq leases file
fn parse_leases(content: &str) -> HashMap<String, String> {
    content
        .lines()
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            let mac = fields.get(1)?;
            let hostname = fields.get(3)?;
            if *hostname == "*" {
                return None;
            }
            Some((mac.to_ascii_lowercase(), hostname.to_string()))
        })
        .collect()
}

/// Group neighbours into client records, in first-seen order
///
/// Each record lists its leased host name first, then IPv4 and IPv6
/// addresses in neighbour table order.
fn build_clients(
    neighbors: Vec<(IpAddr, String)>,
    leases: &HashMap<String, String>,
) -> Vec<TetheringClient> {
    let mut order: Vec<String> = Vec::new();
    let mut addresses: HashMap<String, Vec<IpAddr>> = HashMap::new();

    for (address, mac) in neighbors {
        if !addresses.contains_key(&mac) {
            order.push(mac.clone());
        }
        addresses.entry(mac).or_default().push(address);
    }

    order
        .into_iter()
        .map(|mac| {
            let mut host_names = Vec::new();
            if let Some(name) = leases.get(&mac) {
                host_names.push(HostName::domain(name.clone()));
            }

            let client_addresses = addresses.remove(&mac).unwrap_or_default();
            host_names.extend(
                client_addresses
                    .iter()
                    .filter(|a| a.is_ipv4())
                    .map(|a| HostName::ipv4(a.to_string())),
            );
            host_names.extend(
                client_addresses
                    .iter()
                    .filter(|a| a.is_ipv6())
                    .map(|a| HostName::ipv6(a.to_string())),
            );

            TetheringClient {
                host_names: Some(host_names),
                mac_address: mac,
            }
        })
        .collect()
}

/// NetworkManager platform entry point
pub struct NmcliPlatform {
    settings: NetworkManagerSettings,
}

impl NmcliPlatform {
    pub fn new(settings: NetworkManagerSettings) -> Self {
        Self { settings }
    }

    async fn nmcli(&self, args: &[&str]) -> PlatformResult<String> {
        run(&self.settings.nmcli, args).await
    }

    /// Wi-Fi device to run the access point on
    ///
    /// The configured interface wins; otherwise the first Wi-Fi device that
    /// does not carry the shared connection.
    async fn access_point_device(&self, profile: &ConnectionProfile) -> PlatformResult<Option<String>> {
        if let Some(interface) = &self.settings.interface {
            return Ok(Some(interface.clone()));
        }

        let output = self.nmcli(&["-t", "-f", "DEVICE,TYPE", "device"]).await?;
        Ok(parse_wifi_devices(&output)
            .into_iter()
            .find(|device| profile.device.as_deref() != Some(device.as_str())))
    }
}

#[async_trait]
impl TetheringPlatform for NmcliPlatform {
    async fn internet_connection_profile(&self) -> PlatformResult<Option<ConnectionProfile>> {
        let output = self
            .nmcli(&["-t", "-f", "NAME,TYPE,DEVICE", "connection", "show", "--active"])
            .await?;
        Ok(parse_active_connection(&output, &self.settings.connection_name))
    }

    async fn tethering_capability(
        &self,
        profile: &ConnectionProfile,
    ) -> PlatformResult<TetheringCapability> {
        let radio = match self.nmcli(&["radio", "wifi"]).await {
            Ok(radio) => radio,
            Err(PlatformError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                warn!(nmcli = %self.settings.nmcli.display(), "nmcli not found");
                return Ok(TetheringCapability::DisabledByRequiredAppNotInstalled);
            }
            Err(e) => return Err(e),
        };
        if radio.trim() != "enabled" {
            return Ok(TetheringCapability::DisabledBySystemCapability);
        }

        let Some(device) = self.access_point_device(profile).await? else {
            return Ok(TetheringCapability::DisabledByHardwareLimitation);
        };

        let output = exec(
            &self.settings.nmcli,
            &["-t", "-f", FIELD_AP_SUPPORT, "device", "show", &device],
        )
        .await?;
        if output.code == Some(NMCLI_NOT_FOUND) {
            return Ok(TetheringCapability::DisabledByHardwareLimitation);
        }

        let fields = parse_fields(&output.into_stdout()?);
        match fields.get(FIELD_AP_SUPPORT).map(String::as_str) {
            Some("yes") => Ok(TetheringCapability::Enabled),
            _ => Ok(TetheringCapability::DisabledByHardwareLimitation),
        }
    }

    async fn create_manager(
        &self,
        profile: &ConnectionProfile,
    ) -> PlatformResult<Box<dyn TetheringManager>> {
        let device = self.access_point_device(profile).await?.ok_or_else(|| {
            PlatformError::NotSupported("no Wi-Fi device available for the access point".to_string())
        })?;

        Ok(Box::new(NmcliTetheringManager {
            settings: self.settings.clone(),
            device,
        }))
    }
}

/// Tethering manager backed by a NetworkManager connection profile
pub struct NmcliTetheringManager {
    settings: NetworkManagerSettings,
    device: String,
}

impl NmcliTetheringManager {
    async fn nmcli(&self, args: &[&str]) -> PlatformResult<String> {
        run(&self.settings.nmcli, args).await
    }

    /// Show fields of the hotspot profile, `None` if the profile does not exist
    async fn show_profile(&self, fields: &str) -> PlatformResult<Option<HashMap<String, String>>> {
        let output = exec(
            &self.settings.nmcli,
            &[
                "-s",
                "-t",
                "-f",
                fields,
                "connection",
                "show",
                &self.settings.connection_name,
            ],
        )
        .await?;

        if output.code == Some(NMCLI_NOT_FOUND) {
            return Ok(None);
        }
        Ok(Some(parse_fields(&output.into_stdout()?)))
    }

    fn leases_path(&self) -> PathBuf {
        self.settings
            .leases_dir
            .join(format!("dnsmasq-{}.leases", self.device))
    }

    async fn read_leases(&self) -> HashMap<String, String> {
        let path = self.leases_path();
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => parse_leases(&content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read dnsmasq leases");
                HashMap::new()
            }
        }
    }
}

#[async_trait]
impl TetheringManager for NmcliTetheringManager {
    async fn access_point_configuration(&self) -> PlatformResult<Option<AccessPointConfig>> {
        let fields = format!("{},{},{}", FIELD_SSID, FIELD_PSK, FIELD_BAND);
        match self.show_profile(&fields).await? {
            Some(values) => Ok(Some(parse_access_point_config(&values)?)),
            None => Ok(None),
        }
    }

    async fn configure_access_point(&self, config: &AccessPointConfig) -> PlatformResult<()> {
        if config.ssid.is_empty() {
            return Err(PlatformError::Rejected("an SSID is required".to_string()));
        }
        if config.passphrase.is_empty() {
            return Err(PlatformError::Rejected("a passphrase is required".to_string()));
        }

        let name = self.settings.connection_name.as_str();
        let band = band_to_nm(config.band);

        if self.show_profile("connection.id").await?.is_some() {
            self.nmcli(&[
                "connection",
                "modify",
                name,
                FIELD_SSID,
                &config.ssid,
                "802-11-wireless-security.key-mgmt",
                "wpa-psk",
                FIELD_PSK,
                &config.passphrase,
                FIELD_BAND,
                band,
            ])
            .await?;
        } else {
            let mut args = vec![
                "connection",
                "add",
                "type",
                "wifi",
                "ifname",
                self.device.as_str(),
                "con-name",
                name,
                "autoconnect",
                "no",
                "ssid",
                config.ssid.as_str(),
                "802-11-wireless.mode",
                "ap",
                "ipv4.method",
                "shared",
                "802-11-wireless-security.key-mgmt",
                "wpa-psk",
                FIELD_PSK,
                config.passphrase.as_str(),
            ];
            if config.band != WifiBand::Auto {
                args.extend([FIELD_BAND, band]);
            }
            self.nmcli(&args).await?;
        }

        Ok(())
    }

    async fn start_tethering(&self) -> PlatformResult<()> {
        self.nmcli(&[
            "connection",
            "up",
            &self.settings.connection_name,
            "ifname",
            &self.device,
        ])
        .await?;
        Ok(())
    }

    async fn stop_tethering(&self) -> PlatformResult<()> {
        self.nmcli(&["connection", "down", &self.settings.connection_name])
            .await?;
        Ok(())
    }

    async fn enable_no_connections_timeout(&self) -> PlatformResult<()> {
        warn!(
            connection = %self.settings.connection_name,
            "Auto-disable requested, but NetworkManager cannot stop a hotspot when idle"
        );
        Err(PlatformError::NotSupported(
            "NetworkManager has no idle timeout for shared connections".to_string(),
        ))
    }

    async fn disable_no_connections_timeout(&self) -> PlatformResult<()> {
        Ok(())
    }

    async fn is_no_connections_timeout_enabled(&self) -> PlatformResult<bool> {
        Ok(false)
    }

    async fn operational_state(&self) -> PlatformResult<OperationalState> {
        let state = self.show_profile(FIELD_STATE).await?;
        Ok(operational_state_from_nm(
            state.as_ref().and_then(|fields| fields.get(FIELD_STATE)).map(String::as_str),
        ))
    }

    async fn client_count(&self) -> PlatformResult<u32> {
        let clients = self.tethering_clients().await?.unwrap_or_default();
        Ok(clients.len() as u32)
    }

    async fn max_client_count(&self) -> PlatformResult<u32> {
        Ok(self.settings.max_clients)
    }

    async fn tethering_clients(&self) -> PlatformResult<Option<Vec<TetheringClient>>> {
        if self.operational_state().await? != OperationalState::On {
            return Ok(None);
        }

        let neighbors = run(&self.settings.ip, &["neigh", "show", "dev", &self.device]).await?;
        let leases = self.read_leases().await;

        Ok(Some(build_clients(parse_neighbors(&neighbors), &leases)))
    }
}
