use embassy_executor::Spawner;
use embassy_net::{Ipv4Cidr, Runner, Stack, StackResources, StaticConfigV4};
use embassy_time::{with_timeout, Duration, Timer};

use esp_hal::{peripherals, rng::Rng, timer::timg::Timer as TimgTimer};
use esp_wifi::{
    wifi::{ClientConfiguration, Configuration, WifiController, WifiDevice, WifiEvent, WifiState},
    EspWifiController,
};

use core::str::FromStr;
use heapless::{String, Vec};
use log::info;
use static_cell::StaticCell;

use uv_furnace::config::CONFIG;
use uv_furnace::constants::{
    MAX_HOSTNAME_LEN, NET_POLL_INTERVAL_MS, WIFI_CONNECT_TIMEOUT_SECS, WIFI_RECONNECT_DELAY_MS,
};
use uv_furnace::network::{Addressing, MacAddress, NetworkConfig, NetworkError};

static ESP_WIFI_CTRL: StaticCell<EspWifiController<'static>> = StaticCell::new();
static RESOURCES: StaticCell<StackResources<3>> = StaticCell::new();

pub struct Wifi {
    pub stack: Stack<'static>,
}

#[derive(Debug)]
pub enum Error {
    WifiInitFailed,
    HostnameTooLong,
    InvalidNetwork(NetworkError),
    TaskSpawnFailed,
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::WifiInitFailed => write!(f, "radio initialisation failed"),
            Self::HostnameTooLong => write!(f, "hostname does not fit the DHCP option"),
            Self::InvalidNetwork(e) => write!(f, "{}", e),
            Self::TaskSpawnFailed => write!(f, "could not spawn network task"),
        }
    }
}

/// Translate the build-time network identity into a stack configuration.
fn stack_config(network: &NetworkConfig) -> Result<embassy_net::Config, Error> {
    match &network.addressing {
        Addressing::Static(s) => {
            let prefix = s.prefix_len().map_err(Error::InvalidNetwork)?;
            let mut dns_servers = Vec::new();
            // capacity is at least one
            let _ = dns_servers.push(s.dns_server);
            Ok(embassy_net::Config::ipv4_static(StaticConfigV4 {
                address: Ipv4Cidr::new(s.ip, prefix),
                gateway: Some(s.gateway),
                dns_servers,
            }))
        }
        Addressing::Dhcp => {
            let mut dhcp_config = embassy_net::DhcpConfig::default();
            dhcp_config.hostname = Some(
                String::<MAX_HOSTNAME_LEN>::from_str(network.hostname)
                    .map_err(|_| Error::HostnameTooLong)?,
            );
            Ok(embassy_net::Config::dhcpv4(dhcp_config))
        }
    }
}

impl Wifi {
    pub async fn new(
        network: &NetworkConfig,
        wifi: peripherals::WIFI<'static>,
        timer: TimgTimer<'static>,
        rng: Rng,
        spawner: Spawner,
    ) -> Result<Self, Error> {
        let init = ESP_WIFI_CTRL
            .init(esp_wifi::init(timer, rng.clone()).map_err(|_| Error::WifiInitFailed)?);
        let (controller, interfaces) =
            esp_wifi::wifi::new(init, wifi).map_err(|_| Error::WifiInitFailed)?;

        network
            .check_station_mac(MacAddress::new(interfaces.sta.mac_address()))
            .map_err(Error::InvalidNetwork)?;

        let config = stack_config(network)?;
        let seed = (rng.random() as u64) << 32 | rng.random() as u64;

        let resources = RESOURCES.init(StackResources::new());
        let (stack, runner) = embassy_net::new(interfaces.sta, config, resources, seed);

        spawner
            .spawn(connection(controller))
            .map_err(|_| Error::TaskSpawnFailed)?;
        spawner
            .spawn(net_task(runner))
            .map_err(|_| Error::TaskSpawnFailed)?;

        Ok(Self { stack })
    }

    pub async fn connect(&self) -> Result<(), Error> {
        info!("Waiting for network stack to be ready...");
        loop {
            if self.stack.is_link_up() && self.stack.is_config_up() {
                break;
            }
            Timer::after(Duration::from_millis(NET_POLL_INTERVAL_MS)).await;
        }

        info!("Waiting to get IP address...");
        loop {
            if let Some(config) = self.stack.config_v4() {
                info!("Got IP: {}", config.address);
                break;
            }
            Timer::after(Duration::from_millis(NET_POLL_INTERVAL_MS)).await;
        }

        Ok(())
    }
}

#[embassy_executor::task]
async fn connection(mut controller: WifiController<'static>) {
    info!(
        "Start connection task, device capabilities: {:?}",
        controller.capabilities()
    );
    loop {
        if esp_wifi::wifi::wifi_state() == WifiState::StaConnected {
            // wait until we're no longer connected
            controller.wait_for_event(WifiEvent::StaDisconnected).await;
            Timer::after(Duration::from_millis(WIFI_RECONNECT_DELAY_MS)).await
        }

        if !matches!(controller.is_started(), Ok(true)) {
            info!("Connecting to wifi with SSID: {:?}", CONFIG.wifi_ssid);
            let client_config = Configuration::Client(ClientConfiguration {
                ssid: CONFIG.wifi_ssid.into(),
                password: CONFIG.wifi_psk.into(),
                ..Default::default()
            });
            if let Err(e) = controller.set_configuration(&client_config) {
                log::error!("Failed to set WiFi config: {:?}. Retrying...", e);
                Timer::after(Duration::from_millis(WIFI_RECONNECT_DELAY_MS)).await;
                continue;
            }
            info!("Starting wifi");
            if let Err(e) = controller.start_async().await {
                log::error!("Failed to start WiFi: {:?}. Retrying...", e);
                Timer::after(Duration::from_millis(WIFI_RECONNECT_DELAY_MS)).await;
                continue;
            }
            info!("Wifi started!");
        }

        info!("About to connect to {:?}...", CONFIG.wifi_ssid);
        match with_timeout(
            Duration::from_secs(WIFI_CONNECT_TIMEOUT_SECS),
            controller.connect_async(),
        )
        .await
        {
            Ok(Ok(_)) => info!("Wifi connected!"),
            Ok(Err(e)) => {
                info!("Failed to connect to wifi: {e:?}");
                Timer::after(Duration::from_millis(WIFI_RECONNECT_DELAY_MS)).await
            }
            Err(_) => {
                info!("Wifi connection timed out");
                Timer::after(Duration::from_millis(WIFI_RECONNECT_DELAY_MS)).await
            }
        }
    }
}

#[embassy_executor::task]
async fn net_task(mut runner: Runner<'static, WifiDevice<'static>>) {
    runner.run().await
}
