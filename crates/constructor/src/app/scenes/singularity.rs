use rand::Rng;
use reality_engine::{JourneyStore, MarkerKind, Scene, SceneMarker, SceneWorld, Vec3};

use super::util::{hsl_to_rgb, point, random_direction, seeded_rng};

const MAX_PARTICLES: usize = 20_000;
const SEED: u64 = 0x5EED_0001;
const EXPANSION_RATE: f32 = 15.0;
const DRAG_PER_TICK: f32 = 0.98;
const FADE_PER_SECOND: f32 = 0.2;
const COLLAPSED_SIZE: f32 = 2.5;
const EXPANDED_SIZE: f32 = 0.3;
/// Before ignition every particle sits at the origin, so a small sample carries the look.
const COLLAPSED_SAMPLE: usize = 48;
const IGNITION_RADIUS: f32 = 2.5;

struct Particle {
    position: Vec3,
    velocity: Vec3,
    color: [u8; 3],
}

/// Stage 0: a collapsed particle cloud that blows outward once the journey ignites.
pub(crate) struct SingularityScene {
    budget: usize,
    particles: Vec<Particle>,
    opacity: f32,
    elapsed_since_ignition: f32,
}

impl SingularityScene {
    pub(crate) fn new(point_budget: usize) -> Self {
        Self {
            budget: point_budget.clamp(1, MAX_PARTICLES),
            particles: Vec::new(),
            opacity: 1.0,
            elapsed_since_ignition: 0.0,
        }
    }

    fn spawn_particles(&mut self) {
        let mut rng = seeded_rng(SEED);
        self.particles = (0..self.budget)
            .map(|_| {
                let speed = rng.gen_range(0.5..3.5);
                let color = hsl_to_rgb(
                    rng.gen_range(0.6..0.75),
                    0.8,
                    rng.gen_range(0.5..1.0),
                );
                Particle {
                    position: Vec3::ZERO,
                    velocity: random_direction(&mut rng) * speed,
                    color,
                }
            })
            .collect();
        self.opacity = 1.0;
        self.elapsed_since_ignition = 0.0;
    }

    fn write_world(&self, journey: &JourneyStore, world: &mut SceneWorld) {
        world.clear_points();
        world.clear_markers();

        if !journey.is_exploded() {
            world.extend_points(
                self.particles
                    .iter()
                    .take(COLLAPSED_SAMPLE)
                    .map(|particle| point(particle.position, COLLAPSED_SIZE, particle.color, 0.5)),
            );
            world.push_marker(SceneMarker {
                kind: MarkerKind::Ignition,
                position: Vec3::ZERO,
                radius: IGNITION_RADIUS,
                color: [255, 244, 220],
            });
            return;
        }

        if self.opacity <= 0.0 {
            return;
        }
        world.extend_points(
            self.particles
                .iter()
                .map(|particle| point(particle.position, EXPANDED_SIZE, particle.color, self.opacity)),
        );
    }
}

impl Scene for SingularityScene {
    fn load(&mut self, journey: &JourneyStore, world: &mut SceneWorld) {
        self.spawn_particles();
        world.set_background([0, 0, 0]);
        self.write_world(journey, world);
    }

    fn update(&mut self, fixed_dt_seconds: f32, journey: &JourneyStore, world: &mut SceneWorld) {
        if journey.is_exploded() {
            let step = fixed_dt_seconds * EXPANSION_RATE;
            for particle in &mut self.particles {
                particle.position = particle.position + particle.velocity * step;
                particle.velocity = particle.velocity * DRAG_PER_TICK;
            }
            self.opacity = (self.opacity - fixed_dt_seconds * FADE_PER_SECOND).max(0.0);
            self.elapsed_since_ignition += fixed_dt_seconds;
        } else if self.elapsed_since_ignition > 0.0 {
            // Re-armed without a scene switch; collapse back to the origin.
            self.spawn_particles();
        }
        self.write_world(journey, world);
    }

    fn unload(&mut self, _world: &mut SceneWorld) {
        self.particles.clear();
    }

    fn debug_title(&self, journey: &JourneyStore) -> Option<String> {
        Some(format!(
            "Constructor of Reality | {} | particles {} | glow {:.2}",
            journey.stage().title(),
            self.particles.len(),
            self.opacity
        ))
    }
}
