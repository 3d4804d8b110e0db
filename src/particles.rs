//! Particle Engine for Particle Magic
//! Particle state, per-effect update and draw, and the bounded population

use std::collections::VecDeque;
use std::f32::consts::TAU;

use glam::Vec2;
use image::Rgb;
use rand::Rng;

use crate::postprocess::{fill_circle, scale_color, FrameBuffer, GlowLayer};
use crate::presets::{sample, EffectKind, EffectProfile, ProfileRegistry};

/// Most recent positions kept per trailing particle
pub const TRAIL_LENGTH: usize = 8;

/// Distance outside the frame a particle may travel before it is culled
pub const CULL_MARGIN: f32 = 50.0;

/// Particles below this radius are culled
pub const MIN_RADIUS: f32 = 0.3;

/// Phase and angle state used by the spiral motion model
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Phase {
    /// Reserved for pulsing effects; not read by the physics
    pub pulse: f32,
    pub angle: f32,
    pub rotation_speed: f32,
    pub spiral_angle: f32,
}

impl Phase {
    pub fn random(rng: &mut impl Rng) -> Self {
        Self {
            pulse: rng.gen_range(0.0..TAU),
            angle: rng.gen_range(0.0..TAU),
            rotation_speed: sample(rng, (-0.3, 0.3)),
            spiral_angle: 0.0,
        }
    }
}

/// Bounded history of recent positions, oldest first
#[derive(Clone, Debug, Default)]
pub struct Trail {
    points: VecDeque<Vec2>,
}

impl Trail {
    pub fn new() -> Self {
        Self {
            points: VecDeque::with_capacity(TRAIL_LENGTH),
        }
    }

    pub fn push(&mut self, point: Vec2) {
        if self.points.len() == TRAIL_LENGTH {
            self.points.pop_front();
        }
        self.points.push_back(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Vec2> + '_ {
        self.points.iter()
    }
}

/// Individual particle data
#[derive(Clone, Debug)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub color: Rgb<u8>,
    pub life: f32,
    pub max_life: f32,
    effect: EffectKind,
    pub trail: Trail,
    pub phase: Phase,
}

impl Particle {
    pub fn new(
        pos: Vec2,
        vel: Vec2,
        radius: f32,
        color: Rgb<u8>,
        life: f32,
        effect: EffectKind,
        phase: Phase,
    ) -> Self {
        Self {
            pos,
            vel,
            radius,
            color,
            life,
            max_life: life,
            effect,
            trail: Trail::new(),
            phase,
        }
    }

    /// Create a particle around `origin`, jittered by up to `size / 3` per axis,
    /// with velocity, life, radius and colour drawn from the profile
    pub fn spawn(
        origin: Vec2,
        size: f32,
        effect: EffectKind,
        profile: &EffectProfile,
        rng: &mut impl Rng,
    ) -> Self {
        let offset = size / 3.0;
        let pos = Vec2::new(
            origin.x + sample(rng, (-offset, offset)),
            origin.y + sample(rng, (-offset, offset)),
        );
        let vel = Vec2::new(
            sample(rng, profile.velocity_x),
            sample(rng, profile.velocity_y),
        );
        let life = sample(rng, profile.life);
        let radius = sample(rng, profile.radius);
        let color = profile.sample_color(rng);
        let phase = Phase::random(rng);

        Self::new(pos, vel, radius, color, life, effect, phase)
    }

    pub fn effect(&self) -> EffectKind {
        self.effect
    }

    /// Remaining lifetime fraction used to scale every drawn colour
    pub fn intensity(&self) -> f32 {
        if self.max_life > 0.0 {
            self.life / self.max_life
        } else {
            0.0
        }
    }

    /// Advance one frame: steer, integrate, decay, record trail
    pub fn update(&mut self, profile: &EffectProfile, center: Vec2, rng: &mut impl Rng) {
        self.vel = profile
            .motion
            .next_velocity(self.pos, self.vel, &mut self.phase, center, rng);

        self.pos += self.vel;
        self.life -= profile.life_decay;
        self.radius *= profile.radius_decay;

        if profile.trail {
            self.trail.push(self.pos);
        }
    }

    pub fn is_alive(&self, width: f32, height: f32) -> bool {
        self.life > 0.0
            && self.radius > MIN_RADIUS
            && self.pos.x >= -CULL_MARGIN
            && self.pos.x < width + CULL_MARGIN
            && self.pos.y >= -CULL_MARGIN
            && self.pos.y < height + CULL_MARGIN
    }

    /// Draw trail, glow disc, core and hot centre
    pub fn render(
        &self,
        profile: &EffectProfile,
        frame: &mut FrameBuffer,
        glow: &mut FrameBuffer,
    ) {
        let intensity = self.intensity();

        let count = self.trail.len() as f32;
        for (i, point) in self.trail.iter().enumerate() {
            let along = i as f32 / count;
            let color = scale_color(self.color, along * intensity * 0.6);
            let radius = ((self.radius * 0.6 * along) as i32).max(1);
            fill_circle(frame, *point, radius, color);
        }

        let glow_radius = (self.radius * profile.glow_multiplier) as i32;
        fill_circle(
            glow,
            self.pos,
            glow_radius,
            scale_color(self.color, intensity * 0.7),
        );

        fill_circle(
            frame,
            self.pos,
            (self.radius as i32).max(1),
            scale_color(self.color, intensity),
        );

        let hot = if profile.white_core {
            Rgb([255, 255, 255])
        } else {
            scale_color(Rgb([255, 255, 255]), intensity)
        };
        fill_circle(frame, self.pos, ((self.radius * 0.5) as i32).max(1), hot);
    }
}

/// Bounded particle population
pub struct ParticleSystem {
    particles: Vec<Particle>,
    capacity: usize,
    width: f32,
    height: f32,
}

impl ParticleSystem {
    pub fn new(width: f32, height: f32, capacity: usize) -> Self {
        Self {
            particles: Vec::with_capacity(capacity),
            capacity,
            width,
            height,
        }
    }

    /// Add a particle unless the population is full; returns whether it was kept
    pub fn spawn(&mut self, particle: Particle) -> bool {
        if self.particles.len() >= self.capacity {
            return false;
        }
        self.particles.push(particle);
        true
    }

    /// Step every particle, then drop the ones that died this frame
    pub fn update_all(&mut self, profiles: &ProfileRegistry, rng: &mut impl Rng) {
        let center = self.center();
        for p in &mut self.particles {
            p.update(profiles.profile_for(p.effect), center, rng);
        }

        let (width, height) = (self.width, self.height);
        self.particles.retain(|p| p.is_alive(width, height));
    }

    /// Draw every particle, then bloom the glow layer with the active effect's blur
    pub fn render_all(
        &self,
        frame: &mut FrameBuffer,
        profiles: &ProfileRegistry,
        active: EffectKind,
    ) {
        let mut glow = GlowLayer::new(frame.width(), frame.height());
        for p in &self.particles {
            p.render(profiles.profile_for(p.effect), frame, glow.canvas());
        }
        glow.composite(frame, profiles.profile_for(active).blur_radius);
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    pub fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    /// Get read-only access to particles for rendering
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }
}
