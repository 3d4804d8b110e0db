//! Effect Presets for Particle Magic
//! Per-effect tunables: spawn ranges, palettes, glow, decay and motion model

use std::fmt;
use std::str::FromStr;

use anyhow::{bail, ensure};
use glam::Vec2;
use image::Rgb;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::particles::Phase;

// ============================================================================
// Effect kinds
// ============================================================================

/// Available particle effect styles
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectKind {
    #[default]
    Fire,
    Ice,
    Lightning,
    Energy,
    Portal,
    Nebula,
}

impl EffectKind {
    /// All effects, in key order ('1' through '6')
    pub const ALL: [EffectKind; 6] = [
        Self::Fire,
        Self::Ice,
        Self::Lightning,
        Self::Energy,
        Self::Portal,
        Self::Nebula,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Fire => "fire",
            Self::Ice => "ice",
            Self::Lightning => "lightning",
            Self::Energy => "energy",
            Self::Portal => "portal",
            Self::Nebula => "nebula",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Fire => "Rising embers with sideways flicker",
            Self::Ice => "Falling frost that drifts and settles",
            Self::Lightning => "Short-lived sparks with violent jitter",
            Self::Energy => "Crackling magenta charge with trails",
            Self::Portal => "Swirling vortex pulled towards the frame centre",
            Self::Nebula => "Slow cosmic spiral with glowing trails",
        }
    }

    /// Keyboard shortcut mapping used by interactive hosts
    pub fn from_key(key: char) -> Option<Self> {
        let index = key.to_digit(10)?.checked_sub(1)? as usize;
        Self::ALL.get(index).copied()
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Next effect in key order, wrapping around
    pub fn next(&self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EffectKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        match Self::ALL.iter().find(|kind| kind.name() == wanted) {
            Some(kind) => Ok(*kind),
            None => bail!("unknown effect '{}'", s),
        }
    }
}

// ============================================================================
// Motion models
// ============================================================================

/// Velocity rule applied once per frame before integration
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MotionModel {
    /// Constant vertical bias, horizontal damping and horizontal wobble
    Drift { gravity: f32, damping: f32, wobble: f32 },
    /// Random kick on both axes, then damping on both axes
    Jitter { kick: f32, damping: f32 },
    /// Pull towards the frame centre plus a rotating tangential push
    Spiral { pull: f32, push: f32, spin: f32 },
}

impl MotionModel {
    /// Compute the velocity for the next frame. Spiral phases advance in `phase`.
    pub fn next_velocity(
        &self,
        pos: Vec2,
        vel: Vec2,
        phase: &mut Phase,
        center: Vec2,
        rng: &mut impl Rng,
    ) -> Vec2 {
        match *self {
            Self::Drift {
                gravity,
                damping,
                wobble,
            } => {
                let vx = vel.x * damping + sample(rng, (-wobble, wobble));
                Vec2::new(vx, vel.y + gravity)
            }
            Self::Jitter { kick, damping } => {
                let kx = sample(rng, (-kick, kick));
                let ky = sample(rng, (-kick, kick));
                (vel + Vec2::new(kx, ky)) * damping
            }
            Self::Spiral { pull, push, spin } => {
                phase.spiral_angle += spin;
                phase.angle += phase.rotation_speed;

                // +1 keeps the pull finite at the centre
                let offset = pos - center;
                let dist = offset.length() + 1.0;
                let inward = offset / dist * pull;
                let swirl = Vec2::new(phase.spiral_angle.cos(), phase.spiral_angle.sin()) * push;

                vel - inward + swirl
            }
        }
    }
}

/// Uniform draw over an inclusive range; tolerates reversed and empty ranges
pub fn sample(rng: &mut impl Rng, range: (f32, f32)) -> f32 {
    let (lo, hi) = if range.0 <= range.1 {
        range
    } else {
        (range.1, range.0)
    };
    if lo == hi {
        return lo;
    }
    rng.gen_range(lo..=hi)
}

// ============================================================================
// Profiles
// ============================================================================

/// Largest accepted glow sigma; the kernel spans 6 sigma per pass
pub const MAX_BLUR_RADIUS: f32 = 64.0;

/// Largest accepted glow disc scale
pub const MAX_GLOW_MULTIPLIER: f32 = 16.0;

/// Largest accepted particle radius
pub const MAX_RADIUS: f32 = 256.0;

fn default_glow_multiplier() -> f32 {
    3.5
}

/// Complete tunable set for one effect
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EffectProfile {
    pub velocity_x: (f32, f32),
    pub velocity_y: (f32, f32),
    /// Lifetime in seconds-equivalent units, consumed by `life_decay` per frame
    pub life: (f32, f32),
    pub radius: (f32, f32),
    pub palette: Vec<[u8; 3]>,
    #[serde(default = "default_glow_multiplier")]
    pub glow_multiplier: f32,
    /// Gaussian sigma applied to the glow layer
    pub blur_radius: f32,
    pub life_decay: f32,
    /// Multiplicative radius shrink per frame
    pub radius_decay: f32,
    pub motion: MotionModel,
    #[serde(default)]
    pub trail: bool,
    /// Pure white hot-spot instead of an intensity-scaled grey one
    #[serde(default)]
    pub white_core: bool,
    pub burst: usize,
    pub fingertip_burst: usize,
}

impl EffectProfile {
    pub fn fire() -> Self {
        Self {
            velocity_x: (-4.0, 4.0),
            velocity_y: (-18.0, -10.0),
            life: (1.2, 3.0),
            radius: (8.0, 30.0),
            palette: vec![
                [255, 100, 0],
                [255, 140, 0],
                [255, 180, 0],
                [255, 220, 0],
                [255, 255, 0],
            ],
            glow_multiplier: 4.5,
            blur_radius: 16.0,
            life_decay: 0.018,
            radius_decay: 0.97,
            motion: MotionModel::Drift {
                gravity: -0.5,
                damping: 0.98,
                wobble: 0.3,
            },
            trail: false,
            white_core: false,
            burst: 14,
            fingertip_burst: 4,
        }
    }

    pub fn ice() -> Self {
        Self {
            velocity_x: (-6.0, 6.0),
            velocity_y: (-14.0, -5.0),
            life: (1.5, 2.8),
            radius: (6.0, 24.0),
            palette: vec![
                [220, 220, 255],
                [255, 255, 255],
                [200, 200, 255],
                [255, 255, 240],
                [255, 240, 220],
            ],
            glow_multiplier: 3.5,
            blur_radius: 14.0,
            life_decay: 0.018,
            radius_decay: 0.97,
            motion: MotionModel::Drift {
                gravity: 0.25,
                damping: 0.95,
                wobble: 0.2,
            },
            trail: false,
            white_core: false,
            burst: 14,
            fingertip_burst: 4,
        }
    }

    pub fn lightning() -> Self {
        Self {
            velocity_x: (-15.0, 15.0),
            velocity_y: (-15.0, 15.0),
            life: (0.2, 0.7),
            radius: (2.0, 10.0),
            palette: vec![
                [255, 255, 255],
                [220, 255, 255],
                [200, 240, 255],
                [255, 200, 220],
                [255, 180, 255],
            ],
            glow_multiplier: 4.0,
            blur_radius: 12.0,
            life_decay: 0.04,
            radius_decay: 0.9,
            motion: MotionModel::Jitter {
                kick: 2.0,
                damping: 0.9,
            },
            trail: true,
            white_core: true,
            burst: 18,
            fingertip_burst: 5,
        }
    }

    pub fn energy() -> Self {
        Self {
            velocity_x: (-10.0, 10.0),
            velocity_y: (-10.0, 10.0),
            life: (1.2, 2.5),
            radius: (5.0, 18.0),
            palette: vec![
                [255, 0, 255],
                [220, 0, 220],
                [255, 50, 255],
                [200, 0, 200],
                [180, 0, 180],
            ],
            glow_multiplier: 4.0,
            blur_radius: 12.0,
            life_decay: 0.04,
            radius_decay: 0.9,
            motion: MotionModel::Jitter {
                kick: 1.2,
                damping: 0.95,
            },
            trail: true,
            white_core: true,
            burst: 18,
            fingertip_burst: 5,
        }
    }

    pub fn portal() -> Self {
        Self {
            velocity_x: (-7.0, 7.0),
            velocity_y: (-7.0, 7.0),
            life: (2.5, 4.5),
            radius: (10.0, 30.0),
            palette: vec![
                [120, 0, 220],
                [220, 50, 180],
                [255, 120, 120],
                [180, 0, 255],
                [255, 80, 200],
            ],
            glow_multiplier: 4.0,
            blur_radius: 22.0,
            life_decay: 0.018,
            radius_decay: 0.97,
            motion: MotionModel::Spiral {
                pull: 0.15,
                push: 0.5,
                spin: 0.1,
            },
            trail: false,
            white_core: false,
            burst: 14,
            fingertip_burst: 4,
        }
    }

    pub fn nebula() -> Self {
        Self {
            velocity_x: (-6.0, 6.0),
            velocity_y: (-6.0, 6.0),
            life: (2.5, 4.5),
            radius: (10.0, 30.0),
            palette: vec![
                [255, 50, 200],
                [200, 100, 255],
                [255, 100, 100],
                [200, 150, 255],
                [255, 80, 150],
            ],
            glow_multiplier: 4.0,
            blur_radius: 22.0,
            life_decay: 0.018,
            radius_decay: 0.97,
            motion: MotionModel::Spiral {
                pull: 0.15,
                push: 0.5,
                spin: 0.1,
            },
            trail: true,
            white_core: false,
            burst: 14,
            fingertip_burst: 4,
        }
    }

    /// Pick a palette entry at random
    pub fn sample_color(&self, rng: &mut impl Rng) -> Rgb<u8> {
        if self.palette.is_empty() {
            return Rgb([255, 255, 255]);
        }
        Rgb(self.palette[rng.gen_range(0..self.palette.len())])
    }

    pub fn validate(&self, kind: EffectKind) -> anyhow::Result<()> {
        for (label, (lo, hi)) in [
            ("velocity_x", self.velocity_x),
            ("velocity_y", self.velocity_y),
            ("life", self.life),
            ("radius", self.radius),
        ] {
            ensure!(
                lo.is_finite() && hi.is_finite() && lo <= hi,
                "{kind}: {label} range ({lo}, {hi}) must be finite and ordered"
            );
            // uniform sampling needs a representable span
            ensure!(
                (hi - lo).is_finite(),
                "{kind}: {label} range ({lo}, {hi}) is too wide"
            );
        }
        ensure!(self.life.0 > 0.0, "{kind}: life range must be positive");
        ensure!(
            self.radius.0 > 0.0 && self.radius.1 <= MAX_RADIUS,
            "{kind}: radius range must lie in (0, {MAX_RADIUS}]"
        );
        ensure!(!self.palette.is_empty(), "{kind}: palette is empty");
        ensure!(
            (0.0..=MAX_GLOW_MULTIPLIER).contains(&self.glow_multiplier),
            "{kind}: glow_multiplier must lie in [0, {MAX_GLOW_MULTIPLIER}]"
        );
        ensure!(
            (0.0..=MAX_BLUR_RADIUS).contains(&self.blur_radius),
            "{kind}: blur_radius must lie in [0, {MAX_BLUR_RADIUS}]"
        );
        ensure!(
            self.life_decay.is_finite() && self.life_decay > 0.0,
            "{kind}: life_decay must be positive"
        );
        ensure!(
            self.radius_decay > 0.0 && self.radius_decay <= 1.0,
            "{kind}: radius_decay must lie in (0, 1]"
        );
        ensure!(self.burst > 0, "{kind}: burst must be at least 1");
        Ok(())
    }
}

/// One profile per effect, complete by construction
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileRegistry {
    pub fire: EffectProfile,
    pub ice: EffectProfile,
    pub lightning: EffectProfile,
    pub energy: EffectProfile,
    pub portal: EffectProfile,
    pub nebula: EffectProfile,
}

impl Default for ProfileRegistry {
    fn default() -> Self {
        Self {
            fire: EffectProfile::fire(),
            ice: EffectProfile::ice(),
            lightning: EffectProfile::lightning(),
            energy: EffectProfile::energy(),
            portal: EffectProfile::portal(),
            nebula: EffectProfile::nebula(),
        }
    }
}

impl ProfileRegistry {
    pub fn profile_for(&self, kind: EffectKind) -> &EffectProfile {
        match kind {
            EffectKind::Fire => &self.fire,
            EffectKind::Ice => &self.ice,
            EffectKind::Lightning => &self.lightning,
            EffectKind::Energy => &self.energy,
            EffectKind::Portal => &self.portal,
            EffectKind::Nebula => &self.nebula,
        }
    }

    pub fn profile_for_mut(&mut self, kind: EffectKind) -> &mut EffectProfile {
        match kind {
            EffectKind::Fire => &mut self.fire,
            EffectKind::Ice => &mut self.ice,
            EffectKind::Lightning => &mut self.lightning,
            EffectKind::Energy => &mut self.energy,
            EffectKind::Portal => &mut self.portal,
            EffectKind::Nebula => &mut self.nebula,
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        for kind in EffectKind::ALL {
            self.profile_for(kind).validate(kind)?;
        }
        Ok(())
    }
}
