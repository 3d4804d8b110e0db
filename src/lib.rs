//! Particle Magic
//! Hand-driven particle effects: six effect styles, burst spawning at tracked
//! hand anchors, frame-stepped simulation and additive glow compositing.

pub mod compositor;
pub mod config;
pub mod engine;
pub mod particles;
pub mod postprocess;
pub mod presets;
pub mod spawn;

pub use compositor::Compositor;
pub use config::EngineConfig;
pub use engine::{ActiveEffect, EngineStats, ParticleEngine};
pub use particles::{Particle, ParticleSystem, Phase, Trail};
pub use postprocess::FrameBuffer;
pub use presets::{EffectKind, EffectProfile, MotionModel, ProfileRegistry};
pub use spawn::{Anchor, AnchorSource, HandAnchors, SpawnController, SpawnSettings};
