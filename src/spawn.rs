//! Spawn Control for Particle Magic
//! Hand anchors, the tracker boundary and cooldown-gated burst spawning

use glam::Vec2;
use rand::Rng;

use crate::particles::{Particle, ParticleSystem};
use crate::postprocess::FrameBuffer;
use crate::presets::{EffectKind, ProfileRegistry};

/// Palm anchor: spawn origin plus a size that scales jitter
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Anchor {
    pub pos: Vec2,
    pub size: f32,
}

impl Anchor {
    pub fn new(x: f32, y: f32, size: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size,
        }
    }
}

/// Everything a hand tracker reports for one frame
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HandAnchors {
    pub palm: Option<Anchor>,
    /// Secondary spawn points such as fingertips
    pub fingertips: Vec<Vec2>,
}

impl HandAnchors {
    pub fn palm(anchor: Anchor) -> Self {
        Self {
            palm: Some(anchor),
            fingertips: Vec::new(),
        }
    }

    pub fn with_fingertips(mut self, tips: impl IntoIterator<Item = Vec2>) -> Self {
        self.fingertips.extend(tips);
        self
    }
}

/// Source of hand anchors, typically a pose or hand tracker looking at the frame
pub trait AnchorSource {
    /// `None` when no hand is visible
    fn detect(&mut self, frame: &FrameBuffer) -> Option<HandAnchors>;
}

/// Spawn settings shared by every effect
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnSettings {
    /// Seconds that must pass between bursts
    pub cooldown: f64,
    /// Fingertip particles use the palm size divided by this, floored
    pub fingertip_size_divisor: f32,
}

impl Default for SpawnSettings {
    fn default() -> Self {
        Self {
            cooldown: 0.035,
            fingertip_size_divisor: 6.0,
        }
    }
}

/// Rate-limited burst spawner
#[derive(Debug)]
pub struct SpawnController {
    settings: SpawnSettings,
    last_spawn_time: Option<f64>,
}

impl SpawnController {
    pub fn new(settings: SpawnSettings) -> Self {
        Self {
            settings,
            last_spawn_time: None,
        }
    }

    pub fn settings(&self) -> &SpawnSettings {
        &self.settings
    }

    pub fn last_spawn_time(&self) -> Option<f64> {
        self.last_spawn_time
    }

    /// Whether a burst may fire at `now` (seconds on the caller's clock)
    pub fn ready(&self, now: f64) -> bool {
        match self.last_spawn_time {
            Some(last) => now - last > self.settings.cooldown,
            None => true,
        }
    }

    /// Spawn a burst at the palm and a smaller one at each fingertip,
    /// using the profile registered for `effect`.
    ///
    /// Returns the number of spawn requests issued, including any the
    /// system dropped because it was full.
    pub fn maybe_spawn(
        &mut self,
        anchors: Option<&HandAnchors>,
        now: f64,
        effect: EffectKind,
        profiles: &ProfileRegistry,
        system: &mut ParticleSystem,
        rng: &mut impl Rng,
    ) -> usize {
        let Some(hand) = anchors else {
            return 0;
        };
        let Some(palm) = hand.palm else {
            return 0;
        };
        if !self.ready(now) {
            return 0;
        }

        let profile = profiles.profile_for(effect);
        let mut requested = 0;

        for _ in 0..profile.burst {
            system.spawn(Particle::spawn(palm.pos, palm.size, effect, profile, rng));
            requested += 1;
        }

        let tip_size = (palm.size / self.settings.fingertip_size_divisor).floor();
        for tip in &hand.fingertips {
            for _ in 0..profile.fingertip_burst {
                system.spawn(Particle::spawn(*tip, tip_size, effect, profile, rng));
                requested += 1;
            }
        }

        self.last_spawn_time = Some(now);
        requested
    }
}
