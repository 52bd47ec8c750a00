//! Engine configuration, read from TOML.
//!
//! ```toml
//! [gating]
//! free-modules = 10
//!
//! [gating.kind-limits]
//! video = 0
//! carousel = 2
//! ```

use cardstack_model::ModuleKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

/// Errors raised while reading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("unknown module kind in gating limits: {0}")]
    UnknownKind(String),
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub gating: GatingConfig,
}

/// Thresholds past which a card needs its owner to hold a paid plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct GatingConfig {
    /// Modules a card may hold on the free plan.
    pub free_modules: usize,
    /// Per-kind allowance on the free plan, keyed by kind name.
    pub kind_limits: BTreeMap<String, usize>,
}

impl Default for GatingConfig {
    fn default() -> Self {
        Self {
            free_modules: 10,
            kind_limits: BTreeMap::from([(ModuleKind::Video.as_str().to_string(), 0)]),
        }
    }
}

impl GatingConfig {
    /// Free-plan allowance for `kind`, `None` when only the total applies.
    pub fn kind_limit(&self, kind: ModuleKind) -> Option<usize> {
        self.kind_limits.get(kind.as_str()).copied()
    }

    /// Returns why a card holding `kinds` needs a subscription, or `None`
    /// when the free plan covers it.
    pub fn requires_subscription(&self, kinds: &[ModuleKind]) -> Option<String> {
        if kinds.len() > self.free_modules {
            return Some(format!(
                "cards with more than {} modules need a subscription",
                self.free_modules
            ));
        }

        let mut counts: BTreeMap<ModuleKind, usize> = BTreeMap::new();
        for kind in kinds {
            *counts.entry(*kind).or_default() += 1;
        }
        counts.into_iter().find_map(|(kind, count)| {
            let limit = self.kind_limit(kind)?;
            (count > limit).then(|| {
                format!("more than {limit} {kind} module(s) need a subscription")
            })
        })
    }

    fn check_kinds(&self) -> Result<(), ConfigError> {
        for name in self.kind_limits.keys() {
            name.parse::<ModuleKind>()
                .map_err(|_| ConfigError::UnknownKind(name.clone()))?;
        }
        Ok(())
    }
}

impl EngineConfig {
    /// Parses a TOML document strictly.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.gating.check_kinds()?;
        Ok(config)
    }

    /// Loads configuration from `path`.
    /// Falls back to defaults with a warning when the file is missing or invalid.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            info!("No engine config at {:?}, using defaults", path);
            return Self::default();
        }

        match std::fs::read_to_string(path)
            .map_err(ConfigError::from)
            .and_then(|contents| Self::from_toml_str(&contents))
        {
            Ok(config) => {
                info!("Loaded engine config from {:?}", path);
                config
            }
            Err(e) => {
                warn!("Failed to load engine config {:?}: {}. Using defaults.", path, e);
                Self::default()
            }
        }
    }
}
