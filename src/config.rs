//! Configuration management for the card generator.
//!
//! This module provides:
//! - Command-line arguments via clap, with a `serve` and a `render` command
//! - Environment variable fallbacks for every server option
//! - [`Settings`], the immutable configuration resolved once at startup and
//!   handed to the HTTP layer
//!
//! # Environment Variables
//!
//! - `CARDGEN_HOST` - Server bind address (default: 0.0.0.0)
//! - `CARDGEN_PORT` - Server port (default: 8000)
//! - `DEBUG` - Debug mode, enabled only by the exact value `on` (default: on)
//! - `SECRET_KEY` - Process secret (default: 32 random bytes, per process)
//! - `ALLOWED_HOSTS` - Comma-separated allowed `Host` values (default: *)
//! - `CARDGEN_CACHE_TTL` - Seconds a rendered card stays cached (default: 3600)
//! - `CARDGEN_CACHE_CAPACITY` - Card cache size in bytes (default: 64MB)
//! - `CARDGEN_CACHE_SWEEP_INTERVAL` - Seconds between expiry sweeps (default: 60)
//! - `CARDGEN_CORS_ORIGINS` - Allowed CORS origins (comma-separated)

use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hasher};
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use clap::{Args, Parser, Subcommand};
use sha2::{Digest, Sha256};

use crate::card::{CardFormat, DEFAULT_CARD_CACHE_CAPACITY, MAX_CACHE_TTL};
use crate::server::AllowedHosts;

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 8000;

/// Default value of the debug switch.
pub const DEFAULT_DEBUG: &str = "on";

/// Value of `DEBUG` that turns debug mode on.
pub const DEBUG_ON: &str = "on";

/// Default allowed hosts (any).
pub const DEFAULT_ALLOWED_HOSTS: &str = "*";

/// Default card cache TTL in seconds (1 hour).
pub const DEFAULT_CACHE_TTL_SECS: u64 = 3600;

/// Default interval between cache expiry sweeps, in seconds.
pub const DEFAULT_CACHE_SWEEP_INTERVAL_SECS: u64 = 60;

/// Length of a generated secret key in bytes.
pub const SECRET_KEY_BYTES: usize = 32;

// =============================================================================
// CLI Arguments
// =============================================================================

/// Card Generator - placeholder card images over HTTP.
#[derive(Parser, Debug, Clone)]
#[command(name = "cardgen")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn into_command(self) -> Command {
        self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the HTTP server.
    Serve(ServeConfig),

    /// Render a single card to a file or stdout.
    Render(RenderConfig),
}

/// Options for the `serve` command.
#[derive(Args, Debug, Clone)]
pub struct ServeConfig {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "CARDGEN_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "CARDGEN_PORT")]
    pub port: u16,

    /// Debug mode switch. Only the exact value `on` enables it.
    ///
    /// Debug mode logs at debug level and includes error details in 500
    /// responses.
    #[arg(long, default_value = DEFAULT_DEBUG, env = "DEBUG")]
    pub debug: String,

    /// Process secret. A random one is generated when unset, so it changes
    /// on every restart.
    #[arg(long, env = "SECRET_KEY", hide_env_values = true)]
    pub secret_key: Option<String>,

    /// Host names this server answers to (comma-separated).
    ///
    /// `*` matches any host; a leading dot (`.example.com`) matches the
    /// domain and all of its subdomains.
    #[arg(
        long,
        default_value = DEFAULT_ALLOWED_HOSTS,
        env = "ALLOWED_HOSTS",
        value_delimiter = ','
    )]
    pub allowed_hosts: Vec<String>,

    // =========================================================================
    // Cache Configuration
    // =========================================================================
    /// Seconds a rendered card stays in the server cache. Also used as the
    /// Cache-Control max-age.
    #[arg(long, default_value_t = DEFAULT_CACHE_TTL_SECS, env = "CARDGEN_CACHE_TTL")]
    pub cache_ttl: u64,

    /// Maximum total size of cached cards in bytes.
    #[arg(long, default_value_t = DEFAULT_CARD_CACHE_CAPACITY, env = "CARDGEN_CACHE_CAPACITY")]
    pub cache_capacity: usize,

    /// Seconds between sweeps that drop expired cards.
    #[arg(
        long,
        default_value_t = DEFAULT_CACHE_SWEEP_INTERVAL_SECS,
        env = "CARDGEN_CACHE_SWEEP_INTERVAL"
    )]
    pub cache_sweep_interval: u64,

    // =========================================================================
    // HTTP Configuration
    // =========================================================================
    /// Allowed CORS origins (comma-separated).
    ///
    /// If not specified, allows any origin.
    #[arg(long, env = "CARDGEN_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    /// Hide the showcase links on the homepage.
    #[arg(long, default_value_t = false)]
    pub no_showcase: bool,

    // =========================================================================
    // Logging Configuration
    // =========================================================================
    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl ServeConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.cache_ttl == 0 {
            return Err("cache_ttl must be greater than 0".to_string());
        }

        if self.cache_ttl > MAX_CACHE_TTL.as_secs() {
            return Err(format!(
                "cache_ttl must be at most {} seconds (1 year)",
                MAX_CACHE_TTL.as_secs()
            ));
        }

        if self.cache_capacity == 0 {
            return Err("cache_capacity must be greater than 0".to_string());
        }

        if self.cache_sweep_interval == 0 {
            return Err("cache_sweep_interval must be greater than 0".to_string());
        }

        if self.allowed_hosts.iter().all(|h| h.trim().is_empty()) {
            return Err(
                "At least one allowed host is required. Set --allowed-hosts or ALLOWED_HOSTS"
                    .to_string(),
            );
        }

        if let Some(ref key) = self.secret_key {
            if key.is_empty() {
                return Err("SECRET_KEY must not be empty when set".to_string());
            }
        }

        Ok(())
    }

    /// Whether debug mode is on.
    pub fn debug_enabled(&self) -> bool {
        self.debug == DEBUG_ON
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Resolve the immutable runtime settings.
    ///
    /// Generates a secret key when none was configured. Call
    /// [`validate`](Self::validate) first.
    pub fn into_settings(self) -> Settings {
        let debug = self.debug_enabled();
        let (secret_key, secret_key_generated) = match self.secret_key {
            Some(key) => (key, false),
            None => (generate_secret_key(), true),
        };

        Settings {
            debug,
            secret_key,
            secret_key_generated,
            allowed_hosts: AllowedHosts::new(self.allowed_hosts),
            cache_ttl: Duration::from_secs(self.cache_ttl),
            cache_capacity: self.cache_capacity,
            cache_sweep_interval: Duration::from_secs(self.cache_sweep_interval),
            cors_origins: self.cors_origins,
            showcase: !self.no_showcase,
            enable_tracing: !self.no_tracing,
        }
    }
}

/// Options for the `render` command.
#[derive(Args, Debug, Clone)]
pub struct RenderConfig {
    /// Card height in pixels (1-1024).
    #[arg(long)]
    pub height: String,

    /// Card width in pixels (1-1024).
    #[arg(long)]
    pub width: String,

    /// Output format.
    #[arg(short, long, default_value_t = CardFormat::Png)]
    pub format: CardFormat,

    /// Output path, or `-` for stdout.
    ///
    /// Defaults to `card-{height}x{width}.{ext}` in the current directory.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl RenderConfig {
    /// The path to write to, `None` meaning stdout.
    pub fn output_path(&self, height: u32, width: u32) -> Option<PathBuf> {
        match &self.output {
            Some(path) if path.as_os_str() == "-" => None,
            Some(path) => Some(path.clone()),
            None => Some(PathBuf::from(format!(
                "card-{}x{}.{}",
                height,
                width,
                self.format.extension()
            ))),
        }
    }
}

// =============================================================================
// Settings
// =============================================================================

/// Immutable runtime configuration, built once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub debug: bool,
    pub secret_key: String,

    /// Whether `secret_key` was generated rather than configured
    pub secret_key_generated: bool,

    pub allowed_hosts: AllowedHosts,
    pub cache_ttl: Duration,
    pub cache_capacity: usize,
    pub cache_sweep_interval: Duration,
    pub cors_origins: Option<Vec<String>>,
    pub showcase: bool,
    pub enable_tracing: bool,
}

/// Generate a hex-encoded secret of [`SECRET_KEY_BYTES`] random bytes.
///
/// Randomness comes from the standard library's per-process hasher keys,
/// mixed with the clock and process id.
pub fn generate_secret_key() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();

    let mut digest = Sha256::new();
    digest.update(nanos.to_le_bytes());
    digest.update(std::process::id().to_le_bytes());
    for round in 0u64..4 {
        let mut hasher = RandomState::new().build_hasher();
        hasher.write_u64(round);
        hasher.write_u128(nanos);
        digest.update(hasher.finish().to_le_bytes());
    }

    let key = digest.finalize();
    debug_assert_eq!(key.len(), SECRET_KEY_BYTES);
    hex::encode(key)
}

// =============================================================================
// Tests
// =============================================================================
