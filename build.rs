use std::{env, error::Error, fs, path::Path};

use serde::Deserialize;

#[path = "src/parse.rs"]
mod parse;

use parse::{feature_section, non_empty, parse_ipv4, parse_mac};

#[derive(Deserialize)]
struct RawConfig {
    hostname: String,
    mac: String,
    wifi_ssid: String,
    wifi_psk: String,
    static_ip: Option<RawStaticIp>,
    influxdb: Option<RawInfluxDb>,
    blynk: Option<RawBlynk>,
}

#[derive(Deserialize)]
struct RawStaticIp {
    ip: String,
    dns_server: String,
    gateway: String,
    subnet: String,
}

#[derive(Deserialize)]
struct RawInfluxDb {
    host: String,
    port: u16,
    database: String,
    measurement: String,
    token: Option<String>,
}

#[derive(Deserialize)]
struct RawBlynk {
    auth_token: String,
    host: String,
    port: u16,
}

fn feature_enabled(name: &str) -> bool {
    env::var_os(format!("CARGO_FEATURE_{}", name.to_uppercase().replace('-', "_"))).is_some()
}

fn ipv4_literal(field: &str, s: &str) -> Result<String, Box<dyn Error>> {
    let addr = parse_ipv4(s).map_err(|e| format!("{field} {s:?} {e}"))?;
    let [a, b, c, d] = addr.octets();
    Ok(format!("Ipv4Addr::new({a}, {b}, {c}, {d})"))
}

fn section<T>(feature: &str, table: &str, section: Option<T>) -> Result<Option<T>, Box<dyn Error>> {
    feature_section(feature_enabled(feature), section)
        .map_err(|e| format!("feature `{feature}`: [{table}] {e} in cfg.toml").into())
}

fn main() -> Result<(), Box<dyn Error>> {
    // Tell Cargo to rerun if toml changes
    println!("cargo:rerun-if-changed=cfg.toml");
    println!("cargo:rerun-if-changed=src/parse.rs");

    // Read and parse
    let toml_str = fs::read_to_string("cfg.toml")?;
    let raw: RawConfig = toml::from_str(&toml_str)?;

    let mac = parse_mac(&raw.mac).map_err(|e| format!("mac {:?} {e}", raw.mac))?;

    let influxdb = match section("influxdb", "influxdb", raw.influxdb)? {
        Some(db) => format!(
            "Some(InfluxDbConfig {{ host: {:?}, port: {}, database: {:?}, measurement: {:?}, token: {:?} }})",
            db.host, db.port, db.database, db.measurement, db.token
        ),
        None => "None".into(),
    };

    let blynk = match section("blynk", "blynk", raw.blynk)? {
        Some(b) => format!(
            "Some(BlynkConfig {{ auth_token: {:?}, host: {:?}, port: {} }})",
            non_empty(&b.auth_token).map_err(|e| format!("blynk.auth_token {e}"))?,
            b.host,
            b.port
        ),
        None => "None".into(),
    };

    // Static addressing is only emitted when the feature is on, so nothing can
    // reference it in a DHCP build.
    let static_ip = match section("static-ip", "static_ip", raw.static_ip)? {
        Some(s) => format!(
            r#"
        #[cfg(feature = "static-ip")]
        pub const STATIC_IP: StaticIpConfig = StaticIpConfig {{
            ip: {ip},
            dns_server: {dns},
            gateway: {gw},
            subnet: {mask},
        }};
    "#,
            ip = ipv4_literal("static_ip.ip", &s.ip)?,
            dns = ipv4_literal("static_ip.dns_server", &s.dns_server)?,
            gw = ipv4_literal("static_ip.gateway", &s.gateway)?,
            mask = ipv4_literal("static_ip.subnet", &s.subnet)?,
        ),
        None => String::new(),
    };

    // Generate Rust code
    let code = format!(
        r#"
        pub const CONFIG: Config = Config {{
            hostname: {host:?},
            mac: MacAddress::new({mac:?}),
            wifi_ssid: {ssid:?},
            wifi_psk: {psk:?},
            influxdb: {influxdb},
            blynk: {blynk},
        }};
        {static_ip}
    "#,
        host = raw.hostname,
        ssid = raw.wifi_ssid,
        psk = raw.wifi_psk,
    );

    let out_dir = env::var("OUT_DIR")?;
    let dest_path = Path::new(&out_dir).join("config.rs");
    fs::write(dest_path, code)?;
    Ok(())
}
