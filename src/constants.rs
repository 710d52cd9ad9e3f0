//! Application-wide constants
//!
//! Centralized constants to avoid duplication and ensure consistency.

// =============================================================================
// Setpoint
// =============================================================================

/// Lowest raw setpoint accepted as a ceiling (15.0 °C)
pub const RAW_MIN: u8 = 30;

/// Highest raw setpoint accepted as a ceiling (65.0 °C)
pub const RAW_MAX: u8 = 130;

/// Default static ceiling (45.0 °C)
pub const DEFAULT_MAX_CH_RAW: u8 = 90;

/// Default idle threshold (10.0 °C)
pub const DEFAULT_IDLE_CH_RAW: u8 = 20;

// =============================================================================
// Ramping
// =============================================================================

/// Default ramp step (+2.0 °C)
pub const DEFAULT_RAMP_STEP_RAW: u8 = 4;

/// Default ramp interval (seconds)
pub const DEFAULT_RAMP_INTERVAL_SECS: u64 = 30;

// =============================================================================
// Serial
// =============================================================================

/// Default serial device (HGI80-compatible FTDI gateway)
pub const DEFAULT_SERIAL_DEVICE: &str =
    "/dev/serial/by-id/usb-FTDI_FT232R_USB_UART_A50285BI-if00-port0";

/// Default baud rate for evofw3 / HGI80 gateways
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Serial read timeout (milliseconds)
pub const SERIAL_READ_TIMEOUT_MS: u64 = 100;

/// Serial read buffer size
pub const SERIAL_BUFFER_SIZE: usize = 256;

/// Longest line held back waiting for a newline
pub const MAX_LINE_LENGTH: usize = 4096;

// =============================================================================
// MQTT
// =============================================================================

/// Default broker host
pub const DEFAULT_MQTT_HOST: &str = "localhost";

/// Default broker port
pub const DEFAULT_MQTT_PORT: u16 = 1883;

/// Topic carrying the ceiling override
pub const DEFAULT_MQTT_TOPIC: &str = "evohome/mitm/max_ch_raw";

/// Override staleness timeout (seconds)
pub const DEFAULT_MQTT_TIMEOUT_SECS: u64 = 1800;

/// MQTT keep-alive (seconds)
pub const MQTT_KEEP_ALIVE_SECS: u64 = 60;

/// Delay between MQTT reconnection attempts (seconds)
pub const MQTT_RECONNECT_DELAY_SECS: u64 = 5;

/// Request channel capacity for the MQTT client
pub const MQTT_CHANNEL_CAPACITY: usize = 10;

// =============================================================================
// Timing
// =============================================================================

/// Pause after a failsafe pass-through (milliseconds)
pub const FAILSAFE_PAUSE_MS: u64 = 50;

/// Interval between debug statistics summaries (seconds)
pub const STATS_LOG_INTERVAL_SECS: u64 = 300;

// =============================================================================
// Files
// =============================================================================

/// Default options file (add-on options location)
pub const DEFAULT_OPTIONS_FILE: &str = "/data/options.json";
