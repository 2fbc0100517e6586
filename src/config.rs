use std::path::Path;
use std::{fs, io};

use anyhow::{Context, Result};
use log::warn;
use serde::de::DeserializeOwned;

pub trait CommonConfig {
    fn default() -> Self;
    fn complete(&mut self) -> Result<()>;
}

/// Reads and validates a TOML config file. A missing file yields the
/// defaults.
pub fn load_config<T>(path: impl AsRef<Path>) -> Result<T>
where
    T: CommonConfig + DeserializeOwned,
{
    let path = path.as_ref();
    let mut cfg: T = match fs::read_to_string(path) {
        Ok(s) => toml::from_str(&s)
            .with_context(|| format!("parse config toml: {}", path.display()))?,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            warn!("Config file {} not found, using defaults", path.display());
            T::default()
        }
        Err(err) => {
            return Err(err).context(format!("read config file: {}", path.display()));
        }
    };

    cfg.complete().context("validate config")?;
    Ok(cfg)
}

/// Like [`load_config`], but from a string.
pub fn parse_config<T>(s: &str) -> Result<T>
where
    T: CommonConfig + DeserializeOwned,
{
    let mut cfg: T = toml::from_str(s).context("parse config toml")?;
    cfg.complete().context("validate config")?;
    Ok(cfg)
}

/// See: [`shellexpand::full`].
pub fn expandenv(name: &str, s: impl AsRef<str>) -> Result<String> {
    let s =
        shellexpand::full(s.as_ref()).with_context(|| format!("expand env value for '{name}'"))?;
    Ok(s.to_string())
}
