//! Configuration System for Particle Magic
//! Engine limits, spawn timing, default effect and the overridable profile table

use std::path::Path;

use anyhow::{ensure, Context};
use serde::{Deserialize, Serialize};

use crate::presets::{EffectKind, ProfileRegistry};
use crate::spawn::SpawnSettings;

// ============================================================================
// Engine Configuration
// ============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Hard cap on live particles; spawns beyond it are dropped
    pub max_particles: usize,
    /// Minimum seconds between bursts
    pub spawn_cooldown: f64,
    pub fingertip_size_divisor: f32,
    pub default_effect: EffectKind,
    /// Fixed RNG seed for reproducible runs; entropy when absent
    pub seed: Option<u64>,
    pub profiles: ProfileRegistry,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_particles: 800,
            spawn_cooldown: 0.035,
            fingertip_size_divisor: 6.0,
            default_effect: EffectKind::Fire,
            seed: None,
            profiles: ProfileRegistry::default(),
        }
    }
}

impl EngineConfig {
    pub fn spawn_settings(&self) -> SpawnSettings {
        SpawnSettings {
            cooldown: self.spawn_cooldown,
            fingertip_size_divisor: self.fingertip_size_divisor,
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(self.max_particles > 0, "max_particles must be at least 1");
        ensure!(
            self.spawn_cooldown.is_finite() && self.spawn_cooldown >= 0.0,
            "spawn_cooldown must be a non-negative number of seconds"
        );
        ensure!(
            self.fingertip_size_divisor.is_finite() && self.fingertip_size_divisor > 0.0,
            "fingertip_size_divisor must be positive"
        );
        self.profiles.validate()
    }

    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("writing config to {}", path.display()))?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        let config: Self = serde_json::from_str(&json)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }
}
