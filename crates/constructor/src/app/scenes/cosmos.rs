use std::collections::VecDeque;
use std::f32::consts::TAU;

use rand::Rng;
use reality_engine::{FactorId, JourneyStore, Scene, SceneWorld, Vec3};

use super::util::{
    ellipse_points, factor_marker, point, polarity_color, random_direction, rgb, seeded_rng,
};

const SEED: u64 = 0x5EED_0002;
const BACKGROUND: [u8; 3] = [2, 3, 10];
const MAX_STARS: usize = 1_500;
const ORBIT_RING_SAMPLES: usize = 96;

const MOON_ORBIT_RADIUS: f32 = 5.5;
const MOON_SPEED: f32 = 1.0;
const MOON_START_ANGLE: f32 = 1.2;
const COMET_RADIUS_X: f32 = 70.0;
const COMET_RADIUS_Z: f32 = 45.0;
const COMET_TILT: f32 = 0.35;
const COMET_SPEED: f32 = 0.42;
const COMET_REVERSED_SPEED: f32 = 0.06;
const COMET_TAIL_LENGTH: usize = 200;
const GRAVITY_RING_MAX_SCALE: f32 = 2.5;
const GRAVITY_RING_MIN_SCALE: f32 = 1.0;
const GRAVITY_RING_SAMPLES: usize = 32;
const FLOAT_BOB_AMPLITUDE: f32 = 2.0;
const FLOAT_BOB_RATE: f32 = 0.6;

struct Orbit {
    factor: FactorId,
    radius_x: f32,
    radius_z: f32,
    speed: f32,
    angle: f32,
    size: f32,
    color: [u8; 3],
    reversed_color: [u8; 3],
    ring_color: [u8; 3],
}

impl Orbit {
    fn position(&self) -> Vec3 {
        Vec3::new(
            self.angle.cos() * self.radius_x,
            0.0,
            self.angle.sin() * self.radius_z,
        )
    }
}

struct FloatingFactor {
    factor: FactorId,
    anchor: Vec3,
    color: [u8; 3],
    reversed_color: [u8; 3],
}

struct Nebula {
    center: Vec3,
    size: f32,
    color: [u8; 3],
}

const NEBULAE: [Nebula; 3] = [
    Nebula {
        center: Vec3::new(-60.0, 20.0, -40.0),
        size: 35.0,
        color: rgb(0x4422ff),
    },
    Nebula {
        center: Vec3::new(80.0, -15.0, 30.0),
        size: 28.0,
        color: rgb(0xff3300),
    },
    Nebula {
        center: Vec3::new(10.0, 40.0, -80.0),
        size: 40.0,
        color: rgb(0x00aaff),
    },
];

const FLOATING_FACTORS: [FloatingFactor; 3] = [
    FloatingFactor {
        factor: FactorId::Void,
        anchor: Vec3::new(-75.0, 12.0, -20.0),
        color: rgb(0x6644ff),
        reversed_color: rgb(0xffaa00),
    },
    FloatingFactor {
        factor: FactorId::Infinity,
        anchor: Vec3::new(85.0, -8.0, 25.0),
        color: rgb(0x00ccff),
        reversed_color: rgb(0xff4488),
    },
    FloatingFactor {
        factor: FactorId::Symbiosis,
        anchor: Vec3::new(-30.0, 22.0, -55.0),
        color: rgb(0x33ff99),
        reversed_color: rgb(0x88bb33),
    },
];

/// Stage 1: the solar system with the sun, three planets, the moon, a comet and
/// three free-floating factors.
pub(crate) struct CosmosScene {
    star_budget: usize,
    stars: Vec<(Vec3, f32)>,
    orbits: [Orbit; 3],
    moon_angle: f32,
    comet_angle: f32,
    comet_tail: VecDeque<Vec3>,
    gravity_ring_scale: f32,
    clock: f32,
}

impl CosmosScene {
    pub(crate) fn new(point_budget: usize) -> Self {
        Self {
            star_budget: (point_budget / 3).min(MAX_STARS),
            stars: Vec::new(),
            orbits: initial_orbits(),
            moon_angle: MOON_START_ANGLE,
            comet_angle: 0.0,
            comet_tail: VecDeque::with_capacity(COMET_TAIL_LENGTH),
            gravity_ring_scale: GRAVITY_RING_MAX_SCALE,
            clock: 0.0,
        }
    }

    fn earth(&self) -> &Orbit {
        &self.orbits[1]
    }

    fn comet_position(&self) -> Vec3 {
        let raw_z = self.comet_angle.sin() * COMET_RADIUS_Z;
        Vec3::new(
            self.comet_angle.cos() * COMET_RADIUS_X,
            raw_z * COMET_TILT.sin(),
            raw_z * COMET_TILT.cos(),
        )
    }

    fn moon_position(&self) -> Vec3 {
        self.earth().position()
            + Vec3::new(
                self.moon_angle.cos() * MOON_ORBIT_RADIUS,
                (self.moon_angle * 0.4).sin() * 0.6,
                self.moon_angle.sin() * MOON_ORBIT_RADIUS,
            )
    }

    fn floating_position(&self, factor: &FloatingFactor) -> Vec3 {
        let bob = (self.clock * FLOAT_BOB_RATE + factor.anchor.x).sin() * FLOAT_BOB_AMPLITUDE;
        factor.anchor + Vec3::new(0.0, bob, 0.0)
    }

    /// Gravity pulls the ring inward; reversed, it pushes outward. Both loop.
    fn advance_gravity_ring(&mut self, dt: f32, reversed: bool) {
        if reversed {
            self.gravity_ring_scale += dt;
            if self.gravity_ring_scale > GRAVITY_RING_MAX_SCALE {
                self.gravity_ring_scale = GRAVITY_RING_MIN_SCALE;
            }
        } else {
            self.gravity_ring_scale -= dt;
            if self.gravity_ring_scale < GRAVITY_RING_MIN_SCALE {
                self.gravity_ring_scale = GRAVITY_RING_MAX_SCALE;
            }
        }
    }

    fn gravity_ring_opacity(&self, reversed: bool) -> f32 {
        let span = GRAVITY_RING_MAX_SCALE - GRAVITY_RING_MIN_SCALE;
        let alpha = if reversed {
            (GRAVITY_RING_MAX_SCALE - self.gravity_ring_scale) / span
        } else {
            (self.gravity_ring_scale - GRAVITY_RING_MIN_SCALE) / span
        };
        (alpha * 0.2).clamp(0.0, 0.2)
    }

    fn write_world(&self, journey: &JourneyStore, world: &mut SceneWorld) {
        world.clear_points();
        world.clear_markers();

        world.extend_points(
            self.stars
                .iter()
                .map(|(position, opacity)| point(*position, 1.2, [255, 255, 255], *opacity)),
        );
        for nebula in &NEBULAE {
            world.push_point(point(nebula.center, nebula.size, nebula.color, 0.05));
        }

        let sun_reversed = journey.is_reversed(FactorId::Sun);
        let pulse = 1.0 + (self.clock * 1.3).sin() * if sun_reversed { 0.02 } else { 0.07 };
        let (sun_core, sun_glow, sun_opacity) = if sun_reversed {
            (rgb(0xdd6633), rgb(0x661100), 0.35)
        } else {
            (rgb(0xffcc00), rgb(0xff9900), 1.0)
        };
        world.push_point(point(Vec3::ZERO, 6.0, sun_core, sun_opacity));
        world.push_point(point(Vec3::ZERO, 14.0 * pulse, sun_glow, 0.18 * sun_opacity));
        world.push_marker(factor_marker(FactorId::Sun, Vec3::ZERO, 3.0, sun_core));

        for orbit in &self.orbits {
            world.extend_points(ellipse_points(
                Vec3::ZERO,
                orbit.radius_x,
                orbit.radius_z,
                ORBIT_RING_SAMPLES,
                orbit.ring_color,
                0.15,
            ));
            let color = polarity_color(journey, orbit.factor, orbit.color, orbit.reversed_color);
            let position = orbit.position();
            world.push_point(point(position, orbit.size * 2.0, color, 0.9));
            world.push_marker(factor_marker(orbit.factor, position, orbit.size, color));
        }

        let earth = self.earth().position();
        let gravity_reversed = journey.is_reversed(FactorId::Gravity);
        let ring_color = if gravity_reversed {
            rgb(0xff4422)
        } else {
            rgb(0x4488ff)
        };
        let ring_radius = 1.5 * self.gravity_ring_scale;
        let ring_opacity = self.gravity_ring_opacity(gravity_reversed);
        world.extend_points((0..GRAVITY_RING_SAMPLES).map(|index| {
            let angle = index as f32 / GRAVITY_RING_SAMPLES as f32 * TAU;
            point(
                earth + Vec3::new(angle.cos() * ring_radius, angle.sin() * ring_radius, 0.0),
                0.2,
                ring_color,
                ring_opacity,
            )
        }));

        let tides_color = polarity_color(journey, FactorId::Tides, rgb(0x88ccff), rgb(0x2266aa));
        world.push_marker(factor_marker(
            FactorId::Tides,
            earth + Vec3::new(0.0, -2.4, 0.0),
            0.6,
            tides_color,
        ));

        let moon = self.moon_position();
        let moon_reversed = journey.is_reversed(FactorId::Moonlight);
        let moon_color = if moon_reversed {
            rgb(0x88aacc)
        } else {
            rgb(0xffffaa)
        };
        world.push_point(point(moon, 0.84, rgb(0xbbbbaa), 1.0));
        if !moon_reversed {
            world.push_point(point(moon, 1.1, rgb(0xffffee), 0.3));
        }
        world.push_marker(factor_marker(FactorId::Moonlight, moon, 0.42, moon_color));

        let comet_reversed = journey.is_reversed(FactorId::Acceleration);
        let tail_color = if comet_reversed {
            rgb(0x4466aa)
        } else {
            rgb(0xaaddff)
        };
        let tail_len = self.comet_tail.len().max(1) as f32;
        world.extend_points(self.comet_tail.iter().enumerate().map(|(index, position)| {
            point(*position, 0.55, tail_color, 0.65 * (1.0 - index as f32 / tail_len))
        }));
        let comet = self.comet_position();
        world.push_point(point(comet, 1.4, [255, 255, 255], 1.0));
        let halo = if comet_reversed {
            rgb(0x2244aa)
        } else {
            rgb(0x88ccff)
        };
        world.push_marker(factor_marker(FactorId::Acceleration, comet, 1.5, halo));

        for factor in &FLOATING_FACTORS {
            let color = polarity_color(journey, factor.factor, factor.color, factor.reversed_color);
            let position = self.floating_position(factor);
            world.push_point(point(position, 7.0, color, 0.08));
            world.push_marker(factor_marker(factor.factor, position, 2.0, color));
        }
    }
}

fn initial_orbits() -> [Orbit; 3] {
    [
        Orbit {
            factor: FactorId::Heating,
            radius_x: 13.0,
            radius_z: 9.0,
            speed: 0.55,
            angle: 0.5,
            size: 0.8,
            color: rgb(0xffaa44),
            reversed_color: rgb(0x88aacc),
            ring_color: rgb(0xaaaaaa),
        },
        Orbit {
            factor: FactorId::Gravity,
            radius_x: 22.0,
            radius_z: 16.0,
            speed: 0.30,
            angle: 2.1,
            size: 1.5,
            color: rgb(0x44aaff),
            reversed_color: rgb(0xff6644),
            ring_color: rgb(0x4488ff),
        },
        Orbit {
            factor: FactorId::Freezing,
            radius_x: 33.0,
            radius_z: 24.0,
            speed: 0.22,
            angle: 4.2,
            size: 1.1,
            color: rgb(0xcc9988),
            reversed_color: rgb(0xaaddff),
            ring_color: rgb(0xcc4422),
        },
    ]
}

impl Scene for CosmosScene {
    fn load(&mut self, journey: &JourneyStore, world: &mut SceneWorld) {
        let mut rng = seeded_rng(SEED);
        self.stars = (0..self.star_budget)
            .map(|_| {
                let distance = rng.gen_range(300.0..600.0);
                (random_direction(&mut rng) * distance, rng.gen_range(0.4..1.0))
            })
            .collect();
        self.orbits = initial_orbits();
        self.moon_angle = MOON_START_ANGLE;
        self.comet_angle = 0.0;
        self.comet_tail.clear();
        self.gravity_ring_scale = GRAVITY_RING_MAX_SCALE;
        self.clock = 0.0;
        world.set_background(BACKGROUND);
        self.write_world(journey, world);
    }

    fn update(&mut self, fixed_dt_seconds: f32, journey: &JourneyStore, world: &mut SceneWorld) {
        let dt = fixed_dt_seconds;
        self.clock += dt;
        for orbit in &mut self.orbits {
            orbit.angle = (orbit.angle + dt * orbit.speed).rem_euclid(TAU);
        }
        self.moon_angle += dt * MOON_SPEED;

        let comet_speed = if journey.is_reversed(FactorId::Acceleration) {
            COMET_REVERSED_SPEED
        } else {
            COMET_SPEED
        };
        self.comet_angle = (self.comet_angle + dt * comet_speed).rem_euclid(TAU);
        self.comet_tail.push_front(self.comet_position());
        self.comet_tail.truncate(COMET_TAIL_LENGTH);

        self.advance_gravity_ring(dt, journey.is_reversed(FactorId::Gravity));
        self.write_world(journey, world);
    }

    fn unload(&mut self, _world: &mut SceneWorld) {
        self.stars.clear();
        self.comet_tail.clear();
    }

    fn debug_title(&self, journey: &JourneyStore) -> Option<String> {
        Some(format!(
            "Constructor of Reality | {} | camera {:.1}",
            journey.stage().title(),
            journey.camera().distance
        ))
    }
}
