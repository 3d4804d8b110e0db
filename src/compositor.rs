//! Compositor for Particle Magic
//! Runs the per-frame simulate-then-draw pass over a caller-owned frame

use rand::Rng;

use crate::particles::ParticleSystem;
use crate::postprocess::FrameBuffer;
use crate::presets::{EffectKind, ProfileRegistry};

/// Frame compositor: physics and culling, then trails, cores and bloom.
///
/// Holds no state; the glow layer is allocated fresh for every frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct Compositor;

impl Compositor {
    pub fn new() -> Self {
        Self
    }

    /// Render a complete frame into `frame`
    pub fn render_frame(
        &self,
        system: &mut ParticleSystem,
        profiles: &ProfileRegistry,
        active: EffectKind,
        frame: &mut FrameBuffer,
        rng: &mut impl Rng,
    ) {
        system.update_all(profiles, rng);
        system.render_all(frame, profiles, active);
    }
}
