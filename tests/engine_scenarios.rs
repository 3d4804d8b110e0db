//! End-to-end frame scenarios against the public engine API.

use glam::Vec2;
use image::Rgb;
use rand::rngs::StdRng;
use rand::SeedableRng;

use particle_magic::{
    Anchor, AnchorSource, EffectKind, EngineConfig, FrameBuffer, HandAnchors, Particle,
    ParticleEngine, ParticleSystem, Phase, ProfileRegistry, SpawnController, SpawnSettings,
};

// Frame-level invariants hold at any resolution; a small frame keeps the blur cheap
const W: u32 = 160;
const H: u32 = 120;

fn seeded(effect: EffectKind) -> ParticleEngine {
    let config = EngineConfig {
        default_effect: effect,
        seed: Some(1234),
        ..EngineConfig::default()
    };
    ParticleEngine::new(W, H, config).unwrap()
}

#[test]
fn fire_burst_at_palm() {
    let registry = ProfileRegistry::default();
    let mut spawner = SpawnController::new(SpawnSettings::default());
    let mut system = ParticleSystem::new(640.0, 480.0, 800);
    let mut rng = StdRng::seed_from_u64(9);
    let hand = HandAnchors::palm(Anchor::new(100.0, 100.0, 60.0));

    let n = spawner.maybe_spawn(
        Some(&hand),
        5.0,
        EffectKind::Fire,
        &registry,
        &mut system,
        &mut rng,
    );

    assert_eq!(n, 14);
    assert_eq!(system.len(), 14);
    for p in system.particles() {
        assert_eq!(p.effect(), EffectKind::Fire);
        assert!((80.0..=120.0).contains(&p.pos.x));
        assert!((80.0..=120.0).contains(&p.pos.y));
        assert!((-18.0..=-10.0).contains(&p.vel.y));
        assert!((1.2..=3.0).contains(&p.life));
        assert_eq!(p.intensity(), 1.0);
    }
}

#[test]
fn full_population_drops_spawns_then_culls() {
    let registry = ProfileRegistry::default();
    let mut rng = StdRng::seed_from_u64(10);
    let mut system = ParticleSystem::new(640.0, 480.0, 800);

    let doomed = |pos: Vec2| {
        Particle::new(
            pos,
            Vec2::ZERO,
            10.0,
            Rgb([255, 100, 0]),
            0.01,
            EffectKind::Fire,
            Phase::default(),
        )
    };
    for i in 0..800 {
        assert!(system.spawn(doomed(Vec2::new((i % 640) as f32, 240.0))));
    }
    for _ in 0..14 {
        assert!(!system.spawn(doomed(Vec2::new(10.0, 10.0))));
    }
    assert_eq!(system.len(), 800);

    system.update_all(&registry, &mut rng);
    assert_eq!(system.len(), 0);
}

#[test]
fn cooldown_with_simulated_clock() {
    let mut engine = seeded(EffectKind::Lightning);
    let hand = HandAnchors::palm(Anchor::new(80.0, 60.0, 60.0));
    let mut frame = FrameBuffer::new(W, H);

    assert_eq!(engine.step(Some(&hand), 1.0, &mut frame), 18);
    assert_eq!(engine.step(Some(&hand), 1.01, &mut frame), 0);
    assert_eq!(engine.step(Some(&hand), 1.03, &mut frame), 0);
    assert_eq!(engine.step(Some(&hand), 1.05, &mut frame), 18);
    assert_eq!(engine.step(None, 2.0, &mut frame), 0);
}

#[test]
fn population_never_exceeds_capacity() {
    let config = EngineConfig {
        max_particles: 50,
        spawn_cooldown: 0.0,
        seed: Some(77),
        default_effect: EffectKind::Portal,
        ..EngineConfig::default()
    };
    let mut engine = ParticleEngine::new(W, H, config).unwrap();
    let tips = (0..5).map(|i| Vec2::new(40.0 + i as f32 * 20.0, 30.0));
    let hand = HandAnchors::palm(Anchor::new(80.0, 60.0, 60.0)).with_fingertips(tips);
    let mut frame = FrameBuffer::new(W, H);

    for i in 0..40 {
        engine.step(Some(&hand), i as f64, &mut frame);
        assert!(engine.system().len() <= 50);
    }
    assert_eq!(engine.stats().capacity, 50);
}

#[test]
fn switching_always_empties() {
    let mut engine = seeded(EffectKind::Fire);
    let hand = HandAnchors::palm(Anchor::new(80.0, 90.0, 60.0));
    let mut frame = FrameBuffer::new(W, H);

    let mut now = 0.0;
    for kind in EffectKind::ALL.iter().cycle().skip(1).take(8) {
        for _ in 0..6 {
            engine.step(Some(&hand), now, &mut frame);
            now += 0.05;
        }
        assert!(engine.system().len() > 0);
        assert!(engine.switch_effect(*kind));
        assert_eq!(engine.system().len(), 0);
    }
}

#[test]
fn long_run_respects_particle_invariants() {
    for kind in EffectKind::ALL {
        let mut engine = seeded(kind);
        let hand = HandAnchors::palm(Anchor::new(80.0, 60.0, 60.0))
            .with_fingertips([Vec2::new(60.0, 30.0), Vec2::new(100.0, 30.0)]);
        let mut frame = FrameBuffer::new(W, H);

        for i in 0..60 {
            engine.step(Some(&hand), i as f64 / 30.0, &mut frame);
            let (w, h) = engine.system().size();
            for p in engine.system().particles() {
                assert_eq!(p.effect(), kind);
                assert!(p.is_alive(w, h));
                assert!(p.life > 0.0 && p.life <= p.max_life);
                assert!(p.radius > 0.3);
                assert!(p.trail.len() <= 8);
                if !engine.profile().trail {
                    assert!(p.trail.is_empty());
                }
            }
        }
    }
}

struct FixedHand(Option<HandAnchors>);

impl AnchorSource for FixedHand {
    fn detect(&mut self, _frame: &FrameBuffer) -> Option<HandAnchors> {
        self.0.clone()
    }
}

#[test]
fn run_frame_queries_source_and_draws() {
    let mut engine = seeded(EffectKind::Nebula);
    let mut frame = FrameBuffer::new(W, H);

    let mut lost = FixedHand(None);
    assert_eq!(engine.run_frame(&mut lost, 0.0, &mut frame), 0);
    assert!(frame.pixels().all(|p| p.0 == [0, 0, 0]));

    let mut hand = FixedHand(Some(HandAnchors::palm(Anchor::new(80.0, 60.0, 60.0))));
    assert_eq!(engine.run_frame(&mut hand, 1.0, &mut frame), 14);
    assert!(frame.pixels().any(|p| p.0 != [0, 0, 0]));
    assert_eq!(engine.stats().frame, 2);
}

#[test]
fn config_file_drives_engine() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("engine.json");

    let mut config = EngineConfig::default();
    config.default_effect = EffectKind::Ice;
    config.profiles.ice.burst = 3;
    config.seed = Some(4);
    config.save(&path).unwrap();

    let mut engine = ParticleEngine::new(200, 200, EngineConfig::load(&path).unwrap()).unwrap();
    let hand = HandAnchors::palm(Anchor::new(100.0, 100.0, 30.0));
    let mut frame = FrameBuffer::new(200, 200);
    assert_eq!(engine.step(Some(&hand), 0.0, &mut frame), 3);
    assert_eq!(engine.effect(), EffectKind::Ice);
}
