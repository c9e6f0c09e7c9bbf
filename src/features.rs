/// Compile-time toggles the firmware was built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Features {
    pub debug: bool,
    pub influxdb: bool,
    pub blynk: bool,
    pub static_ip: bool,
}

pub const FEATURES: Features = Features {
    debug: cfg!(feature = "debug"),
    influxdb: cfg!(feature = "influxdb"),
    blynk: cfg!(feature = "blynk"),
    static_ip: cfg!(feature = "static-ip"),
};

fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "on"
    } else {
        "off"
    }
}

impl Features {
    pub fn log_summary(&self) {
        log::info!(
            "Features: debug={} influxdb={} blynk={} static-ip={}",
            on_off(self.debug),
            on_off(self.influxdb),
            on_off(self.blynk),
            on_off(self.static_ip)
        );
    }
}
