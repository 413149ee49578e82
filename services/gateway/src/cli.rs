//! Command-line flags and config source assembly.

use clap::Parser;
use rust_common::{ConsulKvSource, EnvSource, JsonFileSource, LayeredSource, PlatformError, StaticSource};
use std::path::{Path, PathBuf};

/// Environment file read at startup when present.
pub const ENV_FILE: &str = ".env";

/// Load `path` into the process environment. Variables that are already set
/// keep their values.
///
/// Returns `false` when the file does not exist.
///
/// # Errors
///
/// Returns an error when the file exists but cannot be read or parsed.
pub fn load_env_file(path: &Path) -> Result<bool, dotenvy::Error> {
    match dotenvy::from_path(path) {
        Ok(()) => Ok(true),
        Err(e) if e.not_found() => Ok(false),
        Err(e) => Err(e),
    }
}

/// Browser-facing gateway of the cinema platform.
#[derive(Debug, Clone, Parser)]
#[command(name = "gateway-service", version, about)]
pub struct Args {
    /// Consul agent to read `service/web/*` keys from
    #[arg(long, env = "CONSUL_ADDR")]
    pub consul_addr: Option<String>,

    /// JSON config file
    #[arg(long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Override a key, e.g. `--set service/web/port=:8000`
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub overrides: Vec<String>,
}

impl Args {
    /// Stack the configured sources: flags, then file, then Consul, then
    /// the environment.
    ///
    /// # Errors
    ///
    /// Returns an error for a malformed `--set`, an unreadable config file,
    /// or an unusable Consul address.
    pub fn config_source(&self) -> Result<LayeredSource, PlatformError> {
        let mut layered = LayeredSource::new().with_layer(StaticSource::from_assignments(&self.overrides)?);
        if let Some(path) = &self.config_file {
            layered = layered.with_layer(JsonFileSource::load(path)?);
        }
        if let Some(addr) = &self.consul_addr {
            layered = layered.with_layer(ConsulKvSource::new(addr)?);
        }
        Ok(layered.with_layer(EnvSource))
    }
}
