#[allow(unused_imports)]
use core::net::Ipv4Addr;

#[allow(unused_imports)]
use crate::network::{MacAddress, StaticIpConfig};

pub struct Config {
    // DHCP hostname of the station interface
    pub hostname: &'static str,

    // Hardware address expected on the station interface
    pub mac: MacAddress,

    // Wi-Fi SSID to connect to
    pub wifi_ssid: &'static str,

    // Wi-Fi pre-shared key (password)
    pub wifi_psk: &'static str,

    // Time-series database settings, present only with the `influxdb` feature
    pub influxdb: Option<InfluxDbConfig>,

    // Remote dashboard settings, present only with the `blynk` feature
    pub blynk: Option<BlynkConfig>,
}

pub struct InfluxDbConfig {
    pub host: &'static str,
    pub port: u16,
    pub database: &'static str,
    pub measurement: &'static str,
    pub token: Option<&'static str>,
}

pub struct BlynkConfig {
    pub auth_token: &'static str,
    pub host: &'static str,
    pub port: u16,
}

// config values are generated at compile time
include!(concat!(env!("OUT_DIR"), "/config.rs"));
