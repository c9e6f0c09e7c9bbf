#![no_std]
#![no_main]

use embassy_executor::Spawner;
use embassy_net::Stack;
use embassy_time::{Duration, Timer};

use esp_alloc as _;
use esp_backtrace as _;
use esp_hal::{rng::Rng, timer::timg::TimerGroup};
use esp_println::logger::init_logger;

use uv_furnace::config::CONFIG;
use uv_furnace::constants::{HEAP_SIZE, HEARTBEAT_INTERVAL_SECS, VERSION};
use uv_furnace::debug_println;
use uv_furnace::features::FEATURES;
use uv_furnace::network::NetworkConfig;

mod wifi;

use wifi::Wifi;

esp_bootloader_esp_idf::esp_app_desc!();

#[esp_hal_embassy::main]
async fn main(spawner: Spawner) {
    init_logger(if FEATURES.debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    });

    let peripherals = esp_hal::init(esp_hal::Config::default());

    let rng = Rng::new(peripherals.RNG);

    esp_alloc::heap_allocator!(size: HEAP_SIZE);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    let timg1 = TimerGroup::new(peripherals.TIMG1);

    esp_hal_embassy::init(timg0.timer0);

    log::info!("UV furnace controller v{}", VERSION);
    FEATURES.log_summary();

    if let Some(influxdb) = &CONFIG.influxdb {
        log::info!(
            "InfluxDB target: {}:{}/{} ({})",
            influxdb.host,
            influxdb.port,
            influxdb.database,
            influxdb.measurement
        );
    }
    if let Some(blynk) = &CONFIG.blynk {
        log::info!("Blynk server: {}:{}", blynk.host, blynk.port);
    }

    let network = NetworkConfig::from_build();
    network.log_summary();
    if let Err(e) = network.validate() {
        log::error!("Invalid network configuration: {}", e);
        halt().await;
    }

    let wifi = match Wifi::new(&network, peripherals.WIFI, timg1.timer0, rng, spawner).await {
        Ok(wifi) => wifi,
        Err(e) => {
            log::error!("Wi-Fi initialisation failed: {}", e);
            halt().await
        }
    };

    if let Err(e) = wifi.connect().await {
        log::error!("Wi-Fi connection failed: {}", e);
        halt().await;
    }

    spawner.spawn(heartbeat(wifi.stack)).ok();
}

#[embassy_executor::task]
#[cfg_attr(not(feature = "debug"), allow(unused_variables, unused_assignments))]
async fn heartbeat(stack: Stack<'static>) {
    let mut beats: u32 = 0;
    loop {
        beats = beats.wrapping_add(1);
        debug_println!(
            "heartbeat {}: link={} ip={:?}",
            beats,
            if stack.is_link_up() { "up" } else { "down" },
            stack.config_v4().map(|c| c.address)
        );
        Timer::after(Duration::from_secs(HEARTBEAT_INTERVAL_SECS)).await;
    }
}

async fn halt() -> ! {
    loop {
        Timer::after(Duration::from_secs(HEARTBEAT_INTERVAL_SECS)).await;
    }
}
