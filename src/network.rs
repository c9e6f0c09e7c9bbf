use core::fmt;
use core::net::Ipv4Addr;

use crate::config::CONFIG;
use crate::constants::MAX_HOSTNAME_LEN;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkError {
    MulticastMac,
    MacMismatch {
        configured: MacAddress,
        station: MacAddress,
    },
    InvalidHostname,
    NonContiguousSubnet,
    InvalidPrefix(u8),
    InvalidAddress(Ipv4Addr),
    HostIsNetworkOrBroadcast(Ipv4Addr),
    GatewayOutsideSubnet(Ipv4Addr),
    GatewayIsHost,
    InvalidDnsServer(Ipv4Addr),
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MulticastMac => write!(f, "mac address has the multicast bit set"),
            Self::MacMismatch {
                configured,
                station,
            } => write!(
                f,
                "configured mac {} does not match station mac {}",
                configured, station
            ),
            Self::InvalidHostname => {
                write!(f, "hostname must be 1 to {} bytes", MAX_HOSTNAME_LEN)
            }
            Self::NonContiguousSubnet => write!(f, "subnet mask is not contiguous"),
            Self::InvalidPrefix(len) => write!(f, "subnet prefix /{} leaves no host range", len),
            Self::InvalidAddress(ip) => write!(f, "{} is not a usable host address", ip),
            Self::HostIsNetworkOrBroadcast(ip) => {
                write!(f, "{} is the network or broadcast address of its subnet", ip)
            }
            Self::GatewayOutsideSubnet(gw) => write!(f, "gateway {} is outside the subnet", gw),
            Self::GatewayIsHost => write!(f, "gateway equals the device address"),
            Self::InvalidDnsServer(dns) => write!(f, "{} is not a usable dns server", dns),
        }
    }
}

/// 48-bit hardware address of the network interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacAddress([u8; 6]);

impl MacAddress {
    pub const fn new(octets: [u8; 6]) -> Self {
        Self(octets)
    }

    pub const fn octets(&self) -> [u8; 6] {
        self.0
    }

    /// Group addresses (I/G bit set) cannot be assigned to an interface.
    pub const fn is_multicast(&self) -> bool {
        self.0[0] & 0x01 != 0
    }

    pub const fn is_locally_administered(&self) -> bool {
        self.0[0] & 0x02 != 0
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            a, b, c, d, e, g
        )
    }
}

/// Fixed IPv4 addressing used instead of DHCP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticIpConfig {
    pub ip: Ipv4Addr,
    pub dns_server: Ipv4Addr,
    pub gateway: Ipv4Addr,
    pub subnet: Ipv4Addr,
}

impl StaticIpConfig {
    /// CIDR prefix length of the subnet mask, if the mask is contiguous.
    pub fn prefix_len(&self) -> Result<u8, NetworkError> {
        let mask = u32::from(self.subnet);
        let len = mask.leading_ones();
        if mask.checked_shl(len).unwrap_or(0) != 0 {
            return Err(NetworkError::NonContiguousSubnet);
        }
        Ok(len as u8)
    }

    fn contains(&self, addr: Ipv4Addr) -> bool {
        let mask = u32::from(self.subnet);
        u32::from(addr) & mask == u32::from(self.ip) & mask
    }

    pub fn validate(&self) -> Result<(), NetworkError> {
        let prefix = self.prefix_len()?;
        if prefix == 0 || prefix >= 31 {
            return Err(NetworkError::InvalidPrefix(prefix));
        }

        let ip = self.ip;
        if ip.is_unspecified() || ip.is_broadcast() || ip.is_multicast() || ip.is_loopback() {
            return Err(NetworkError::InvalidAddress(ip));
        }

        let mask = u32::from(self.subnet);
        let host_bits = u32::from(ip) & !mask;
        if host_bits == 0 || host_bits == !mask {
            return Err(NetworkError::HostIsNetworkOrBroadcast(ip));
        }

        if !self.contains(self.gateway) {
            return Err(NetworkError::GatewayOutsideSubnet(self.gateway));
        }
        if self.gateway == ip {
            return Err(NetworkError::GatewayIsHost);
        }

        // The resolver may live outside the local subnet.
        let dns = self.dns_server;
        if dns.is_unspecified() || dns.is_broadcast() || dns.is_multicast() {
            return Err(NetworkError::InvalidDnsServer(dns));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Addressing {
    Dhcp,
    Static(StaticIpConfig),
}

/// Link and network identity handed to the network stack at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkConfig {
    pub mac: MacAddress,
    pub hostname: &'static str,
    pub addressing: Addressing,
}

impl NetworkConfig {
    /// Network identity fixed by `cfg.toml` and the enabled features.
    pub fn from_build() -> Self {
        #[cfg(feature = "static-ip")]
        let addressing = Addressing::Static(crate::config::STATIC_IP);
        #[cfg(not(feature = "static-ip"))]
        let addressing = Addressing::Dhcp;

        Self {
            mac: CONFIG.mac,
            hostname: CONFIG.hostname,
            addressing,
        }
    }

    pub fn validate(&self) -> Result<(), NetworkError> {
        if self.mac.is_multicast() {
            return Err(NetworkError::MulticastMac);
        }
        if self.hostname.is_empty() || self.hostname.len() > MAX_HOSTNAME_LEN {
            return Err(NetworkError::InvalidHostname);
        }
        match &self.addressing {
            Addressing::Dhcp => Ok(()),
            Addressing::Static(static_ip) => static_ip.validate(),
        }
    }

    /// The radio driver keeps the eFuse station address, so the configured
    /// identity must name that interface.
    pub fn check_station_mac(&self, station: MacAddress) -> Result<(), NetworkError> {
        if station != self.mac {
            return Err(NetworkError::MacMismatch {
                configured: self.mac,
                station,
            });
        }
        Ok(())
    }

    pub fn log_summary(&self) {
        log::info!("MAC address: {}", self.mac);
        match &self.addressing {
            Addressing::Dhcp => log::info!("Addressing: DHCP (hostname {})", self.hostname),
            Addressing::Static(s) => log::info!(
                "Addressing: static {} mask {} gateway {} dns {}",
                s.ip,
                s.subnet,
                s.gateway,
                s.dns_server
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn furnace_lan() -> StaticIpConfig {
        StaticIpConfig {
            ip: Ipv4Addr::new(10, 0, 0, 177),
            dns_server: Ipv4Addr::new(10, 0, 0, 1),
            gateway: Ipv4Addr::new(10, 0, 0, 1),
            subnet: Ipv4Addr::new(255, 255, 255, 0),
        }
    }

    fn dhcp(mac: [u8; 6], hostname: &'static str) -> NetworkConfig {
        NetworkConfig {
            mac: MacAddress::new(mac),
            hostname,
            addressing: Addressing::Dhcp,
        }
    }

    #[test]
    fn mac_formats_as_colon_separated_hex() {
        let mac = MacAddress::new([0xDE, 0xAD, 0xBE, 0xEF, 0xFE, 0xED]);
        assert_eq!(format!("{}", mac), "DE:AD:BE:EF:FE:ED");
        assert!(!mac.is_multicast());
        assert!(mac.is_locally_administered());
    }

    #[test]
    fn build_config_has_fixed_length_identity() {
        let config = NetworkConfig::from_build();
        assert_eq!(config.mac.octets().len(), 6);
        if let Addressing::Static(s) = config.addressing {
            for addr in [s.ip, s.dns_server, s.gateway, s.subnet] {
                assert_eq!(addr.octets().len(), 4);
            }
        }
    }

    #[cfg(not(feature = "static-ip"))]
    #[test]
    fn dhcp_without_static_ip_feature() {
        assert_eq!(NetworkConfig::from_build().addressing, Addressing::Dhcp);
    }

    #[cfg(feature = "static-ip")]
    #[test]
    fn static_addressing_with_feature() {
        let config = NetworkConfig::from_build();
        assert_eq!(
            config.addressing,
            Addressing::Static(crate::config::STATIC_IP)
        );
    }

    #[test]
    fn shipped_config_validates() {
        assert_eq!(NetworkConfig::from_build().validate(), Ok(()));
        assert_eq!(furnace_lan().validate(), Ok(()));
    }

    #[test]
    fn prefix_length_from_mask() {
        assert_eq!(furnace_lan().prefix_len(), Ok(24));

        let mut cfg = furnace_lan();
        cfg.subnet = Ipv4Addr::new(255, 255, 252, 0);
        assert_eq!(cfg.prefix_len(), Ok(22));

        cfg.subnet = Ipv4Addr::new(255, 0, 255, 0);
        assert_eq!(cfg.prefix_len(), Err(NetworkError::NonContiguousSubnet));

        cfg.subnet = Ipv4Addr::new(255, 255, 255, 255);
        assert_eq!(cfg.prefix_len(), Ok(32));
    }

    #[test]
    fn rejects_degenerate_prefixes() {
        let mut cfg = furnace_lan();
        cfg.subnet = Ipv4Addr::UNSPECIFIED;
        assert_eq!(cfg.validate(), Err(NetworkError::InvalidPrefix(0)));

        cfg.subnet = Ipv4Addr::new(255, 255, 255, 255);
        assert_eq!(cfg.validate(), Err(NetworkError::InvalidPrefix(32)));
    }

    #[test]
    fn rejects_network_and_broadcast_host() {
        let mut cfg = furnace_lan();
        cfg.ip = Ipv4Addr::new(10, 0, 0, 0);
        assert_eq!(
            cfg.validate(),
            Err(NetworkError::HostIsNetworkOrBroadcast(cfg.ip))
        );

        cfg.ip = Ipv4Addr::new(10, 0, 0, 255);
        assert_eq!(
            cfg.validate(),
            Err(NetworkError::HostIsNetworkOrBroadcast(cfg.ip))
        );
    }

    #[test]
    fn rejects_unusable_host_address() {
        let mut cfg = furnace_lan();
        cfg.ip = Ipv4Addr::new(127, 0, 0, 1);
        cfg.gateway = Ipv4Addr::new(127, 0, 0, 2);
        assert_eq!(cfg.validate(), Err(NetworkError::InvalidAddress(cfg.ip)));
    }

    #[test]
    fn gateway_must_be_on_link() {
        let mut cfg = furnace_lan();
        cfg.gateway = Ipv4Addr::new(10, 0, 1, 1);
        assert_eq!(
            cfg.validate(),
            Err(NetworkError::GatewayOutsideSubnet(cfg.gateway))
        );

        cfg.gateway = cfg.ip;
        assert_eq!(cfg.validate(), Err(NetworkError::GatewayIsHost));
    }

    #[test]
    fn dns_may_be_off_subnet_but_not_unspecified() {
        let mut cfg = furnace_lan();
        cfg.dns_server = Ipv4Addr::new(1, 1, 1, 1);
        assert_eq!(cfg.validate(), Ok(()));

        cfg.dns_server = Ipv4Addr::UNSPECIFIED;
        assert_eq!(
            cfg.validate(),
            Err(NetworkError::InvalidDnsServer(Ipv4Addr::UNSPECIFIED))
        );
    }

    #[test]
    fn network_config_checks_identity() {
        let ok = [0xDE, 0xAD, 0xBE, 0xEF, 0xFE, 0xED];
        assert_eq!(dhcp(ok, "uv-furnace").validate(), Ok(()));

        let group = [0x01, 0x00, 0x5E, 0x00, 0x00, 0x01];
        assert_eq!(
            dhcp(group, "uv-furnace").validate(),
            Err(NetworkError::MulticastMac)
        );

        assert_eq!(
            dhcp(ok, "").validate(),
            Err(NetworkError::InvalidHostname)
        );
        assert_eq!(
            dhcp(ok, "a-hostname-that-is-much-too-long-for-dhcp").validate(),
            Err(NetworkError::InvalidHostname)
        );
    }

    #[test]
    fn station_mac_must_match_configured_identity() {
        let config = dhcp([0xDE, 0xAD, 0xBE, 0xEF, 0xFE, 0xED], "uv-furnace");
        assert_eq!(config.check_station_mac(config.mac), Ok(()));

        let station = MacAddress::new([0x02, 0x00, 0x00, 0x00, 0x00, 0x01]);
        let err = config.check_station_mac(station).unwrap_err();
        assert_eq!(
            err,
            NetworkError::MacMismatch {
                configured: config.mac,
                station,
            }
        );
        assert_eq!(
            format!("{}", err),
            "configured mac DE:AD:BE:EF:FE:ED does not match station mac 02:00:00:00:00:01"
        );
    }

    #[test]
    fn network_config_propagates_static_errors() {
        let mut lan = furnace_lan();
        lan.gateway = Ipv4Addr::new(192, 168, 1, 1);
        let config = NetworkConfig {
            addressing: Addressing::Static(lan),
            ..dhcp([0xDE, 0xAD, 0xBE, 0xEF, 0xFE, 0xED], "uv-furnace")
        };
        assert_eq!(
            config.validate(),
            Err(NetworkError::GatewayOutsideSubnet(lan.gateway))
        );
    }
}
