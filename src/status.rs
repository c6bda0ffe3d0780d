//! Hotspot status snapshot and terminal rendering

use crate::client::{ClientDescriptor, UNKNOWN_IP_ADDRESS, UNKNOWN_NAME};
use crate::error::HotspotResult;
use crate::hotspot::HotspotController;
use crate::tethering::WifiBand;
use crate::validation::escape_wifi_field;
use owo_colors::OwoColorize;
use serde::Serialize;
use std::fmt::Write;

/// Client line data for status output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientSummary {
    pub name: Option<String>,
    pub mac_address: String,
    pub ip_address: Option<String>,
}

impl From<&ClientDescriptor> for ClientSummary {
    fn from(client: &ClientDescriptor) -> Self {
        Self {
            name: client.display_name().map(str::to_string),
            mac_address: client.mac_address().to_string(),
            ip_address: client.any_ip_address().map(str::to_string),
        }
    }
}

/// Everything `hotspotctl status` shows, read in one pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HotspotStatus {
    pub ssid: Option<String>,
    pub passphrase: Option<String>,
    pub band: Option<WifiBand>,
    pub profile: String,
    pub running: bool,
    pub auto_stop: bool,
    pub connection_count: u32,
    pub max_connection_count: u32,
    pub clients: Vec<ClientSummary>,
}

impl HotspotStatus {
    /// Read the current status; clients are only enumerated while running
    pub async fn collect(hotspot: &HotspotController) -> HotspotResult<Self> {
        let config = hotspot.config().await?;
        let running = hotspot.is_running().await?;

        let clients: Vec<ClientSummary> = if running {
            hotspot
                .connected_clients()
                .await?
                .map(|client| ClientSummary::from(&client))
                .collect()
        } else {
            Vec::new()
        };

        Ok(Self {
            ssid: config.as_ref().map(|c| c.ssid.clone()),
            passphrase: config.as_ref().map(|c| c.passphrase.clone()),
            band: config.as_ref().map(|c| c.band),
            profile: hotspot.connection_profile().name.clone(),
            running,
            auto_stop: hotspot.will_disable_on_no_connections().await?,
            connection_count: hotspot.connection_count().await?,
            max_connection_count: hotspot.max_connection_count().await?,
            clients,
        })
    }

    /// `WIFI:` payload for a join QR code, if the hotspot is configured
    pub fn qr_payload(&self) -> Option<String> {
        match (&self.ssid, &self.passphrase) {
            (Some(ssid), Some(passphrase)) => Some(wifi_qr_payload(ssid, passphrase)),
            _ => None,
        }
    }
}

/// `WIFI:T:WPA;S:<ssid>;P:<passphrase>;;` with both fields escaped
pub fn wifi_qr_payload(ssid: &str, passphrase: &str) -> String {
    format!(
        "WIFI:T:WPA;S:{};P:{};;",
        escape_wifi_field(ssid),
        escape_wifi_field(passphrase)
    )
}

/// One numbered client line, with placeholders for missing values
pub fn client_line(index: usize, client: &ClientSummary) -> String {
    format!(
        "    {}. {} ({}, {})",
        index,
        client.name.as_deref().unwrap_or(UNKNOWN_NAME),
        client.mac_address,
        client.ip_address.as_deref().unwrap_or(UNKNOWN_IP_ADDRESS)
    )
}

/// Terminal styling for status output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Style {
    pub colors: bool,
}

impl Style {
    fn bold_green(&self, text: &str) -> String {
        if self.colors {
            text.bold().green().to_string()
        } else {
            text.to_string()
        }
    }

    fn bold_red(&self, text: &str) -> String {
        if self.colors {
            text.bold().red().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn dim(&self, text: &str) -> String {
        if self.colors {
            text.dimmed().to_string()
        } else {
            text.to_string()
        }
    }
}

/// Render the status block shown after every command
pub fn render_status(status: &HotspotStatus, style: Style) -> String {
    let mut out = String::new();

    let ssid = status.ssid.as_deref().unwrap_or("(unconfigured)");
    let ssid = if status.running {
        style.bold_green(ssid)
    } else {
        style.bold_red(ssid)
    };
    let band = status.band.unwrap_or_default().label();
    let _ = writeln!(
        out,
        "{} {}",
        ssid,
        style.dim(&format!("{}, sharing from {}", band, status.profile))
    );
    let _ = writeln!(
        out,
        "passwd: '{}'",
        status.passphrase.as_deref().unwrap_or_default()
    );

    if status.running {
        let _ = writeln!(
            out,
            "{}/{} connected.",
            status.connection_count, status.max_connection_count
        );

        if status.auto_stop {
            let _ = writeln!(
                out,
                "{}",
                style.dim("The hotspot will be disabled after a while when no devices are connected.")
            );
        }

        for (n, client) in status.clients.iter().enumerate() {
            let _ = writeln!(out, "{}", client_line(n + 1, client));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tethering::HostName;

    const PLAIN: Style = Style { colors: false };

    fn status(running: bool) -> HotspotStatus {
        HotspotStatus {
            ssid: Some("Home".to_string()),
            passphrase: Some("abcdefgh".to_string()),
            band: Some(WifiBand::Auto),
            profile: "Wired connection 1".to_string(),
            running,
            auto_stop: true,
            connection_count: 2,
            max_connection_count: 10,
            clients: vec![
                ClientSummary {
                    name: Some("phone".to_string()),
                    mac_address: "aa:aa:aa:aa:aa:01".to_string(),
                    ip_address: Some("10.42.0.10".to_string()),
                },
                ClientSummary {
                    name: None,
                    mac_address: "aa:aa:aa:aa:aa:02".to_string(),
                    ip_address: None,
                },
            ],
        }
    }

    #[test]
    fn test_client_line_placeholders() {
        let empty = ClientSummary::from(&ClientDescriptor::new(Vec::new(), "aa:aa:aa:aa:aa:03"));
        assert_eq!(
            client_line(3, &empty),
            "    3. ??? (aa:aa:aa:aa:aa:03, unknown IP address)"
        );

        let named = ClientSummary::from(&ClientDescriptor::new(
            vec![HostName::ipv6("fe80::5"), HostName::domain("tablet")],
            "aa:aa:aa:aa:aa:04",
        ));
        assert_eq!(client_line(1, &named), "    1. tablet (aa:aa:aa:aa:aa:04, fe80::5)");
    }

    #[test]
    fn test_render_running_status() {
        let text = render_status(&status(true), PLAIN);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            "Home 2.4GHz/5GHz (device decides), sharing from Wired connection 1"
        );
        assert_eq!(lines[1], "passwd: 'abcdefgh'");
        assert_eq!(lines[2], "2/10 connected.");
        assert!(lines[3].contains("disabled after a while"));
        assert_eq!(lines[4], "    1. phone (aa:aa:aa:aa:aa:01, 10.42.0.10)");
        assert_eq!(lines[5], "    2. ??? (aa:aa:aa:aa:aa:02, unknown IP address)");
    }

    #[test]
    fn test_render_stopped_status_hides_clients() {
        let text = render_status(&status(false), PLAIN);
        assert_eq!(text.lines().count(), 2);
        assert!(!text.contains("connected."));
    }

    #[test]
    fn test_render_colors() {
        let color = Style { colors: true };

        let text = render_status(&status(true), color);
        assert!(text.starts_with(&"Home".bold().green().to_string()));
        assert!(text.contains("2/10 connected."));
        assert!(text.contains("\x1b["));

        let text = render_status(&status(false), color);
        assert!(text.starts_with(&"Home".bold().red().to_string()));

        assert_eq!(color.dim("note"), "note".dimmed().to_string());
        assert_eq!(PLAIN.dim("note"), "note");
    }

    #[test]
    fn test_qr_payload() {
        assert_eq!(
            status(true).qr_payload().unwrap(),
            "WIFI:T:WPA;S:Home;P:abcdefgh;;"
        );
        assert_eq!(
            wifi_qr_payload("my;net", "pa\"ss\\word"),
            "WIFI:T:WPA;S:my\\;net;P:pa\\\"ss\\\\word;;"
        );

        let mut unconfigured = status(false);
        unconfigured.ssid = None;
        assert!(unconfigured.qr_payload().is_none());
    }

    #[test]
    fn test_status_serializes_band_names() {
        let mut snapshot = status(true);
        snapshot.band = Some(WifiBand::FiveGhz);
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["band"], "5ghz");
        assert_eq!(json["clients"][1]["name"], serde_json::Value::Null);
    }
}
