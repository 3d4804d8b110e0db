//! Particle Engine Facade for Particle Magic
//! Owns the population, spawn gate, active effect and RNG, and drives one frame per call

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::compositor::Compositor;
use crate::config::EngineConfig;
use crate::particles::ParticleSystem;
use crate::postprocess::FrameBuffer;
use crate::presets::{EffectKind, EffectProfile, ProfileRegistry};
use crate::spawn::{AnchorSource, HandAnchors, SpawnController};

/// Which effect new particles use. Switching is a hard reset of the population.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActiveEffect {
    current: EffectKind,
}

impl ActiveEffect {
    pub fn new(initial: EffectKind) -> Self {
        Self { current: initial }
    }

    pub fn current(&self) -> EffectKind {
        self.current
    }

    /// Returns true when the request changed the effect
    pub fn request(&mut self, kind: EffectKind) -> bool {
        if kind == self.current {
            return false;
        }
        self.current = kind;
        true
    }
}

/// Snapshot of engine population for overlays and logs
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EngineStats {
    pub frame: u64,
    pub population: usize,
    pub capacity: usize,
    pub effect: EffectKind,
}

pub struct ParticleEngine<R: Rng = StdRng> {
    profiles: ProfileRegistry,
    system: ParticleSystem,
    spawner: SpawnController,
    active: ActiveEffect,
    compositor: Compositor,
    rng: R,
    frame: u64,
}

impl ParticleEngine<StdRng> {
    /// Engine for a `width` x `height` frame, seeded from the config or from entropy
    pub fn new(width: u32, height: u32, config: EngineConfig) -> anyhow::Result<Self> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(width, height, config, rng)
    }
}

impl<R: Rng> ParticleEngine<R> {
    pub fn with_rng(width: u32, height: u32, config: EngineConfig, rng: R) -> anyhow::Result<Self> {
        config.validate()?;

        log::info!(
            "Particle engine {}x{}: capacity {}, cooldown {:.3}s, effect {}",
            width,
            height,
            config.max_particles,
            config.spawn_cooldown,
            config.default_effect
        );

        Ok(Self {
            system: ParticleSystem::new(width as f32, height as f32, config.max_particles),
            spawner: SpawnController::new(config.spawn_settings()),
            active: ActiveEffect::new(config.default_effect),
            compositor: Compositor::new(),
            profiles: config.profiles,
            rng,
            frame: 0,
        })
    }

    pub fn effect(&self) -> EffectKind {
        self.active.current()
    }

    pub fn profile(&self) -> &EffectProfile {
        self.profiles.profile_for(self.active.current())
    }

    pub fn profiles(&self) -> &ProfileRegistry {
        &self.profiles
    }

    pub fn system(&self) -> &ParticleSystem {
        &self.system
    }

    pub fn system_mut(&mut self) -> &mut ParticleSystem {
        &mut self.system
    }

    pub fn spawner(&self) -> &SpawnController {
        &self.spawner
    }

    /// Switch effects, clearing every live particle. No-op for the current effect.
    pub fn switch_effect(&mut self, kind: EffectKind) -> bool {
        if !self.active.request(kind) {
            return false;
        }
        self.system.clear();
        log::info!("Switched to {} effect", kind);
        true
    }

    /// Spawn for this frame's anchors, simulate, and draw into `frame`.
    ///
    /// `now` is in seconds on any monotonic clock. Returns the number of
    /// spawn requests made this frame.
    pub fn step(
        &mut self,
        anchors: Option<&HandAnchors>,
        now: f64,
        frame: &mut FrameBuffer,
    ) -> usize {
        let effect = self.active.current();
        let requested = self.spawner.maybe_spawn(
            anchors,
            now,
            effect,
            &self.profiles,
            &mut self.system,
            &mut self.rng,
        );

        self.compositor
            .render_frame(&mut self.system, &self.profiles, effect, frame, &mut self.rng);
        self.frame += 1;

        log::debug!(
            "frame {}: {} spawned, {}/{} live",
            self.frame,
            requested,
            self.system.len(),
            self.system.capacity()
        );
        requested
    }

    /// Ask `source` for anchors in `frame`, then run `step`
    pub fn run_frame<S: AnchorSource + ?Sized>(
        &mut self,
        source: &mut S,
        now: f64,
        frame: &mut FrameBuffer,
    ) -> usize {
        let anchors = source.detect(frame);
        self.step(anchors.as_ref(), now, frame)
    }

    pub fn stats(&self) -> EngineStats {
        EngineStats {
            frame: self.frame,
            population: self.system.len(),
            capacity: self.system.capacity(),
            effect: self.active.current(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spawn::Anchor;

    fn engine(effect: EffectKind) -> ParticleEngine {
        let config = EngineConfig {
            default_effect: effect,
            seed: Some(5),
            ..EngineConfig::default()
        };
        ParticleEngine::new(320, 240, config).unwrap()
    }

    #[test]
    fn test_active_effect_transitions() {
        let mut active = ActiveEffect::new(EffectKind::Fire);
        assert!(!active.request(EffectKind::Fire));
        assert!(active.request(EffectKind::Portal));
        assert_eq!(active.current(), EffectKind::Portal);
    }

    #[test]
    fn test_switch_clears_population() {
        let mut engine = engine(EffectKind::Fire);
        let hand = HandAnchors::palm(Anchor::new(160.0, 200.0, 60.0));
        let mut frame = FrameBuffer::new(320, 240);
        for i in 0..5 {
            engine.step(Some(&hand), i as f64 * 0.1, &mut frame);
        }
        assert!(engine.system().len() > 0);

        assert!(engine.switch_effect(EffectKind::Nebula));
        assert_eq!(engine.system().len(), 0);
        assert_eq!(engine.effect(), EffectKind::Nebula);
    }

    #[test]
    fn test_switch_to_same_effect_keeps_particles() {
        let mut engine = engine(EffectKind::Ice);
        let hand = HandAnchors::palm(Anchor::new(160.0, 120.0, 60.0));
        let mut frame = FrameBuffer::new(320, 240);
        engine.step(Some(&hand), 0.0, &mut frame);
        let before = engine.system().len();

        assert!(!engine.switch_effect(EffectKind::Ice));
        assert_eq!(engine.system().len(), before);
    }

    #[test]
    fn test_spawned_particles_use_active_effect() {
        let mut engine = engine(EffectKind::Fire);
        engine.switch_effect(EffectKind::Energy);
        let hand = HandAnchors::palm(Anchor::new(160.0, 120.0, 30.0));
        let mut frame = FrameBuffer::new(320, 240);

        assert_eq!(engine.step(Some(&hand), 0.0, &mut frame), 18);
        assert!(engine
            .system()
            .particles()
            .iter()
            .all(|p| p.effect() == EffectKind::Energy));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = EngineConfig {
            max_particles: 0,
            ..EngineConfig::default()
        };
        assert!(ParticleEngine::new(320, 240, config).is_err());
    }

    #[test]
    fn test_stats() {
        let mut engine = engine(EffectKind::Lightning);
        let mut frame = FrameBuffer::new(320, 240);
        engine.step(None, 0.0, &mut frame);
        let stats = engine.stats();
        assert_eq!(stats.frame, 1);
        assert_eq!(stats.population, 0);
        assert_eq!(stats.capacity, 800);
        assert_eq!(stats.effect, EffectKind::Lightning);
    }
}
