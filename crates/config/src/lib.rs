//! Layered configuration for the compression middleware.
//!
//! Values are merged, later sources winning:
//!
//! 1. Built-in defaults (zstd at the default level)
//! 2. An optional configuration file, TOML, YAML or JSON by extension
//! 3. Environment variables prefixed with `SPILL_`, where `_` separates
//!    nesting levels (`SPILL_COMPRESSION_ALGORITHM=s2`)
//!
//! Algorithm and level accept the same names and numeric selectors as
//! [`Algorithm`] and [`Level`] themselves, so an unsupported codec is
//! rejected while loading rather than when the first stream is opened.

pub mod error;
mod selector;

use crate::error::{ErrorKind, Result};
use exn::{OptionExt, ResultExt};
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use spill_compress::{Algorithm, Codec, Level};
use std::path::{Path, PathBuf};

/// Prefix of the environment variables read by [`Config::load`].
pub const ENV_PREFIX: &str = "SPILL_";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub compression: CompressionConfig,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressionConfig {
    #[serde(with = "selector")]
    pub algorithm: Algorithm,
    #[serde(with = "selector")]
    pub level: Level,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self { algorithm: Algorithm::Zstd, level: Level::Default }
    }
}

impl Config {
    /// Merge defaults, the given file (if any) and the environment.
    ///
    /// An explicitly named file must exist.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        Self::extract(Self::figment(file)?)
    }

    /// Like [`load`](Self::load), reading the per-user configuration file
    /// when there is one.
    pub fn discover() -> Result<Self> {
        let file = Self::default_path().filter(|path| path.is_file());
        tracing::debug!(file = ?file, "discovering configuration");
        Self::load(file.as_deref())
    }

    /// `<config dir>/spill/config.toml`, or `None` when the platform has no
    /// home directory.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "spill").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// The provider stack behind [`load`](Self::load).
    pub fn figment(file: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = file {
            if !path.is_file() {
                exn::bail!(ErrorKind::Load);
            }
            let extension = path.extension().and_then(|ext| ext.to_str()).ok_or_raise(|| ErrorKind::Load)?;
            figment = match extension.to_ascii_lowercase().as_str() {
                "toml" => figment.merge(Toml::file(path)),
                "yaml" | "yml" => figment.merge(Yaml::file(path)),
                "json" => figment.merge(Json::file(path)),
                _ => exn::bail!(ErrorKind::Load),
            };
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("_")))
    }

    pub fn extract(figment: Figment) -> Result<Self> {
        let config: Config = figment.extract().or_raise(|| ErrorKind::Invalid)?;
        tracing::debug!(codec = %config.codec(), "loaded configuration");
        Ok(config)
    }

    /// The configured codec adapter.
    #[must_use]
    pub fn codec(&self) -> Codec {
        Codec::new(self.compression.algorithm).with_level(self.compression.level)
    }
}
