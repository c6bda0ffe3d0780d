//! Connected client descriptors

use crate::error::{HotspotError, HotspotResult};
use crate::tethering::{HostName, HostNameKind, TetheringClient};
use std::fmt;

/// Placeholder shown for a client without a friendly name
pub const UNKNOWN_NAME: &str = "???";

/// Placeholder shown for a client without an IP address
pub const UNKNOWN_IP_ADDRESS: &str = "unknown IP address";

/// A client attached to the hotspot, as seen in one enumeration snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientDescriptor {
    hostnames: Vec<HostName>,
    mac_address: String,
}

impl ClientDescriptor {
    pub fn new(hostnames: Vec<HostName>, mac_address: impl Into<String>) -> Self {
        Self {
            hostnames,
            mac_address: mac_address.into(),
        }
    }

    /// Host names in the order the platform reported them
    pub fn hostnames(&self) -> &[HostName] {
        &self.hostnames
    }

    pub fn mac_address(&self) -> &str {
        &self.mac_address
    }

    /// First address matching an enabled address family
    ///
    /// The host name list is scanned in order, so an IPv4 entry listed before
    /// an IPv6 one wins when both families are requested. At least one of
    /// `ipv4` and `ipv6` must be set.
    pub fn ip_address(&self, ipv4: bool, ipv6: bool) -> HotspotResult<Option<&str>> {
        if !ipv4 && !ipv6 {
            return Err(HotspotError::InvalidArgument(
                "at least one of ipv4 or ipv6 must be requested".to_string(),
            ));
        }

        for host in &self.hostnames {
            if ipv4 && host.kind == HostNameKind::Ipv4 {
                return Ok(Some(&host.canonical_name));
            }

            if ipv6 && host.kind == HostNameKind::Ipv6 {
                return Ok(Some(&host.canonical_name));
            }
        }

        Ok(None)
    }

    /// First address of either family
    pub fn any_ip_address(&self) -> Option<&str> {
        self.hostnames
            .iter()
            .find(|host| matches!(host.kind, HostNameKind::Ipv4 | HostNameKind::Ipv6))
            .map(|host| host.canonical_name.as_str())
    }

    /// Friendly name from the first domain name entry
    pub fn display_name(&self) -> Option<&str> {
        self.hostnames
            .iter()
            .find(|host| host.kind == HostNameKind::DomainName)
            .map(|host| host.display_name.as_str())
    }
}

impl From<TetheringClient> for ClientDescriptor {
    fn from(client: TetheringClient) -> Self {
        Self::new(client.host_names.unwrap_or_default(), client.mac_address)
    }
}

impl fmt::Display for ClientDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Client(name='{}', ip='{}', mac={})",
            self.display_name().unwrap_or("?"),
            self.any_ip_address().unwrap_or("?"),
            self.mac_address
        )
    }
}
