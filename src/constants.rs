/// Current firmware version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Size of the heap in DRAM (internal memory)
pub const HEAP_SIZE: usize = 72 * 1024;

/// Longest hostname accepted by the DHCP client option
pub const MAX_HOSTNAME_LEN: usize = 32;

/// Capacity of the pending debug line; longer lines are emitted in chunks
pub const DEBUG_LINE_CAPACITY: usize = 128;
/// Log target used for debug stream records
pub const DEBUG_LOG_TARGET: &str = "debug_stream";

/// Seconds to wait for the access point before retrying
pub const WIFI_CONNECT_TIMEOUT_SECS: u64 = 30;
/// Delay between Wi-Fi reconnection attempts
pub const WIFI_RECONNECT_DELAY_MS: u64 = 5000;
/// Poll interval while waiting for link and IPv4 configuration
pub const NET_POLL_INTERVAL_MS: u64 = 500;

/// Interval between link heartbeats on the debug stream
pub const HEARTBEAT_INTERVAL_SECS: u64 = 60;
