//! Machine identity derived from local network hardware.
//!
//! The machine symbol spreads hosts across 61 buckets without any central
//! registry. Two hosts can still land in the same bucket; it lowers the chance
//! of collisions, it does not rule them out.

use crate::error::HostIdentityError;
use idforge_core::base62;
use network_interface::{Addr, NetworkInterface, NetworkInterfaceConfig};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, trace, warn};

/// Interface name prefixes of loopback, container, VM and tunnel devices.
const VIRTUAL_PREFIXES: &[&str] = &[
    "lo", "docker", "veth", "br-", "virbr", "vmnet", "vboxnet", "vethernet", "tun", "tap", "utun",
    "bridge", "cni", "flannel", "cali", "vxlan", "wg", "zt", "awdl", "llw",
];

/// A 48-bit hardware (MAC) address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MacAddress([u8; 6]);

impl MacAddress {
    pub const fn new(octets: [u8; 6]) -> Self {
        Self(octets)
    }

    pub fn octets(&self) -> [u8; 6] {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0; 6]
    }
}

impl FromStr for MacAddress {
    type Err = HostIdentityError;

    /// Parses `aa:bb:cc:dd:ee:ff` or `aa-bb-cc-dd-ee-ff`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || HostIdentityError::InvalidHardwareAddress(s.to_string());

        let mut octets = [0u8; 6];
        let mut parts = s.split([':', '-']);
        for octet in octets.iter_mut() {
            let part = parts.next().ok_or_else(invalid)?;
            if part.len() != 2 {
                return Err(invalid());
            }
            *octet = u8::from_str_radix(part, 16).map_err(|_| invalid())?;
        }
        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(Self(octets))
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

/// Source of the host's machine identity.
///
/// Generators call [`HostIdentity::machine_symbol`] once and cache the
/// result, so implementations may be slow but must be deterministic.
pub trait HostIdentity: Send + Sync {
    /// Hardware addresses of the host's physical interfaces.
    fn hardware_addresses(&self) -> Result<Vec<MacAddress>, HostIdentityError>;

    /// Sums every octet of every address and reduces it to a symbol in
    /// `1..=z`. `'0'` is never returned.
    fn machine_symbol(&self) -> Result<char, HostIdentityError> {
        let addresses = self.hardware_addresses()?;
        if addresses.is_empty() {
            warn!("no physical network interface found, machine symbol is derived from nothing");
        }

        let octet_sum: u64 = addresses
            .iter()
            .flat_map(MacAddress::octets)
            .map(u64::from)
            .sum();
        let symbol = base62::nonzero_symbol(octet_sum);

        debug!(
            interfaces = addresses.len(),
            octet_sum,
            symbol = %symbol,
            "derived machine symbol"
        );
        Ok(symbol)
    }
}

/// Reads hardware addresses from the operating system.
///
/// Loopback and virtual interfaces are skipped, as are interfaces without a
/// hardware address or with an all-zero one.
#[derive(Debug, Clone, Copy, Default)]
pub struct NetworkInterfaces;

impl HostIdentity for NetworkInterfaces {
    fn hardware_addresses(&self) -> Result<Vec<MacAddress>, HostIdentityError> {
        let interfaces =
            NetworkInterface::show().map_err(|e| HostIdentityError::Enumerate(e.to_string()))?;

        // One entry per interface name, in a stable order.
        let mut physical = BTreeMap::new();
        for interface in interfaces {
            if is_virtual(&interface.name) || is_loopback(&interface) {
                trace!(name = %interface.name, "skipping virtual interface");
                continue;
            }
            let Some(raw) = interface.mac_addr.as_deref() else {
                continue;
            };
            match raw.parse::<MacAddress>() {
                Ok(mac) if !mac.is_zero() => {
                    physical.insert(interface.name, mac);
                }
                Ok(_) => {}
                Err(err) => {
                    warn!(name = %interface.name, error = %err, "ignoring interface");
                }
            }
        }

        Ok(physical.into_values().collect())
    }
}

fn is_virtual(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    VIRTUAL_PREFIXES
        .iter()
        .any(|prefix| name.starts_with(prefix))
}

fn is_loopback(interface: &NetworkInterface) -> bool {
    interface.addr.iter().any(|addr| match addr {
        Addr::V4(v4) => v4.ip.is_loopback(),
        Addr::V6(v6) => v6.ip.is_loopback(),
    })
}

/// A fixed set of hardware addresses.
#[derive(Debug, Clone, Default)]
pub struct StaticAddresses(pub Vec<MacAddress>);

impl HostIdentity for StaticAddresses {
    fn hardware_addresses(&self) -> Result<Vec<MacAddress>, HostIdentityError> {
        Ok(self.0.clone())
    }
}

/// Pins the machine symbol, bypassing hardware lookup.
#[derive(Debug, Clone, Copy)]
pub struct FixedSymbol(pub char);

impl HostIdentity for FixedSymbol {
    fn hardware_addresses(&self) -> Result<Vec<MacAddress>, HostIdentityError> {
        Ok(Vec::new())
    }

    fn machine_symbol(&self) -> Result<char, HostIdentityError> {
        match base62::index_of(self.0) {
            Some(_) => Ok(self.0),
            None => Err(HostIdentityError::InvalidSymbol(self.0)),
        }
    }
}
