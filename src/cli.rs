//! Command-line interface definition using clap
//!
//! Provides structured argument parsing with automatic help generation.

use crate::constants::DEFAULT_OPTIONS_FILE;
use clap::Parser;
use std::path::PathBuf;

// =============================================================================
// CLI Definition
// =============================================================================

/// Transparent evohome CH setpoint limiter for a RAMSES II gateway
#[derive(Parser, Debug)]
#[command(name = "evohome-mitm")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Options file (JSON, or TOML when ending in .toml)
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_OPTIONS_FILE)]
    pub config: PathBuf,

    /// Serial device to use (overrides config)
    #[arg(long, value_name = "PORT")]
    pub port: Option<String>,

    /// Disable the MQTT override listener
    #[arg(long)]
    pub no_mqtt: bool,

    /// Enable verbose debug output
    #[arg(short, long)]
    pub verbose: bool,
}

// =============================================================================
// Tests
// =============================================================================
