//! Particle Magic - headless demo
//! Drives the engine with a scripted hand, cycles through every effect and
//! writes the last frame to a PNG.
//!
//! Usage: particle-magic [config.json] [output.png]

use std::f32::consts::TAU;

use anyhow::Context;
use glam::Vec2;
use image::Rgb;

use particle_magic::{
    Anchor, AnchorSource, EffectKind, EngineConfig, FrameBuffer, HandAnchors, ParticleEngine,
};

const WIDTH: u32 = 640;
const HEIGHT: u32 = 480;
const FPS: f64 = 30.0;
const FRAMES_PER_EFFECT: u64 = 90;

/// Stand-in for a hand tracker: a palm circling the frame with five fingertips
struct OrbitingHand {
    frame: u64,
}

impl AnchorSource for OrbitingHand {
    fn detect(&mut self, frame: &FrameBuffer) -> Option<HandAnchors> {
        self.frame += 1;

        // drop out briefly each lap like a tracker losing the hand
        if self.frame % 120 >= 110 {
            return None;
        }

        let center = Vec2::new(frame.width() as f32 / 2.0, frame.height() as f32 / 2.0);
        let t = self.frame as f32 / 120.0 * TAU;
        let palm = center + Vec2::new(t.cos() * 140.0, t.sin() * 90.0);
        let size = 60.0 + (t * 2.0).sin() * 15.0;

        let tips = (0..5).map(|i| {
            let spread = (i as f32 - 2.0) * 0.35;
            palm + Vec2::new(spread.sin(), -spread.cos()) * size * 1.2
        });

        Some(HandAnchors::palm(Anchor::new(palm.x, palm.y, size)).with_fingertips(tips))
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => EngineConfig::load(&path)?,
        None => EngineConfig::default(),
    };
    let output = args.next().unwrap_or_else(|| "particle_magic.png".to_string());

    let mut engine = ParticleEngine::new(WIDTH, HEIGHT, config)?;
    let mut hand = OrbitingHand { frame: 0 };
    let mut frame = FrameBuffer::new(WIDTH, HEIGHT);

    let total = FRAMES_PER_EFFECT * EffectKind::ALL.len() as u64;
    for i in 0..total {
        if i > 0 && i % FRAMES_PER_EFFECT == 0 {
            // same path as the '1'..'6' hotkeys of an interactive host
            let key = char::from_digit(engine.effect().next().index() as u32 + 1, 10);
            if let Some(kind) = key.and_then(EffectKind::from_key) {
                engine.switch_effect(kind);
            }
        }

        for pixel in frame.pixels_mut() {
            *pixel = Rgb([8, 8, 16]);
        }
        engine.run_frame(&mut hand, i as f64 / FPS, &mut frame);

        if i % 30 == 0 {
            let stats = engine.stats();
            log::info!(
                "frame {:>4} | {:<9} | particles {}/{}",
                stats.frame,
                stats.effect.name(),
                stats.population,
                stats.capacity
            );
        }
    }

    frame
        .save(&output)
        .with_context(|| format!("saving frame to {}", output))?;
    println!("Wrote {}", output);
    Ok(())
}
