use std::f32::consts::PI;

use rand::rngs::StdRng;
use rand::Rng;
use reality_engine::{FactorId, JourneyStore, Scene, SceneWorld, Vec3};

use super::util::{factor_marker, point, polarity_color, rgb, seeded_rng};

const SEED: u64 = 0x5EED_0004;
const BACKGROUND: [u8; 3] = [4, 0, 10];
const NEURONS: usize = 80;
const NETWORK_EXTENT: f32 = 10.0;
const LINK_DISTANCE: f32 = 6.0;
const LINK_SAMPLES: usize = 3;
const NETWORK_SPIN: f32 = 0.05;
const SHELL_POINTS: usize = 24;

const DOMINANTA_HOME: Vec3 = Vec3::new(0.0, 5.0, 5.0);
const ABSTRACTION_HOME: Vec3 = Vec3::new(5.0, -5.0, -5.0);
const MUTATION_HOME: Vec3 = Vec3::new(-5.0, -3.0, 3.0);
const INTERFERENCE_HOME: Vec3 = Vec3::new(-4.0, 6.0, -6.0);
const ABSTRACTION_RISE: f32 = 0.3;
const ABSTRACTION_FALL: f32 = 0.5;

fn rotated_x(v: Vec3, angle: f32) -> Vec3 {
    let (sin, cos) = angle.sin_cos();
    Vec3::new(v.x, v.y * cos - v.z * sin, v.y * sin + v.z * cos)
}

fn rotated_z(v: Vec3, angle: f32) -> Vec3 {
    let (sin, cos) = angle.sin_cos();
    Vec3::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos, v.z)
}

/// Euler XYZ: z first, then y, then x.
fn rotated_xyz(v: Vec3, angles: Vec3) -> Vec3 {
    rotated_x(rotated_z(v, angles.z).rotated_y(angles.y), angles.x)
}

fn scaled(v: Vec3, scale: Vec3) -> Vec3 {
    Vec3::new(v.x * scale.x, v.y * scale.y, v.z * scale.z)
}

fn unit_shell(count: usize) -> Vec<Vec3> {
    let golden = PI * (3.0 - 5.0f32.sqrt());
    (0..count)
        .map(|index| {
            let y = 1.0 - 2.0 * (index as f32 + 0.5) / count as f32;
            let ring = (1.0 - y * y).max(0.0).sqrt();
            let theta = golden * index as f32;
            Vec3::new(theta.cos() * ring, y, theta.sin() * ring)
        })
        .collect()
}

/// A factor body inside the network: its own offset, spin and per-axis scale.
#[derive(Debug, Clone, Copy)]
struct Body {
    position: Vec3,
    rotation: Vec3,
    scale: Vec3,
}

impl Body {
    const fn at(position: Vec3) -> Self {
        Self {
            position,
            rotation: Vec3::ZERO,
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

/// Stage 4: a slowly turning neural network with four factor bodies.
pub(crate) struct MicroScene {
    link_budget: usize,
    neurons: Vec<Vec3>,
    links: Vec<(usize, usize)>,
    shell: Vec<Vec3>,
    network_angle: f32,
    dominanta: Body,
    abstraction: Body,
    mutation: Body,
    interference: Body,
    noise: StdRng,
    clock: f32,
}

impl MicroScene {
    pub(crate) fn new(point_budget: usize) -> Self {
        Self {
            link_budget: point_budget / LINK_SAMPLES,
            neurons: Vec::new(),
            links: Vec::new(),
            shell: unit_shell(SHELL_POINTS),
            network_angle: 0.0,
            dominanta: Body::at(DOMINANTA_HOME),
            abstraction: Body::at(ABSTRACTION_HOME),
            mutation: Body::at(MUTATION_HOME),
            interference: Body::at(INTERFERENCE_HOME),
            noise: seeded_rng(SEED ^ 0xFF),
            clock: 0.0,
        }
    }

    fn network_scale(&self) -> f32 {
        1.0 + self.clock.sin() * 0.05
    }

    /// Maps a point in network space to the world, following the network's spin and breathing.
    fn to_world(&self, local: Vec3) -> Vec3 {
        let angles = Vec3::new(self.network_angle, self.network_angle, 0.0);
        rotated_xyz(local * self.network_scale(), angles)
    }

    fn animate_bodies(&mut self, dt: f32, journey: &JourneyStore) {
        if journey.is_reversed(FactorId::Dominanta) {
            let noise = 1.0 + self.noise.gen_range(-0.025..0.025);
            self.dominanta.scale = Vec3::new(noise, noise, noise);
        } else {
            let beat = 1.0 + (self.clock * 8.0).sin() * 0.15;
            self.dominanta.scale = Vec3::new(beat, beat, beat);
        }

        let abstraction = &mut self.abstraction;
        if journey.is_reversed(FactorId::Abstraction) {
            abstraction.position.y -= dt * ABSTRACTION_FALL;
            if abstraction.position.y < -NETWORK_EXTENT {
                abstraction.position.y = NETWORK_EXTENT;
            }
            abstraction.rotation.z = 0.0;
        } else {
            abstraction.position.y += dt * ABSTRACTION_RISE;
            if abstraction.position.y > NETWORK_EXTENT {
                abstraction.position.y = -NETWORK_EXTENT;
            }
            abstraction.rotation.z += dt * 0.2;
        }

        if journey.is_reversed(FactorId::Mutation) {
            self.mutation.rotation = Vec3::ZERO;
            self.mutation.scale = Vec3::new(1.0, 1.0, 1.0);
        } else {
            self.mutation.rotation =
                self.mutation.rotation + Vec3::new(dt * 1.5, dt * 0.7, dt * 0.3);
            let deform = 1.0 + (self.clock * 4.0).sin() * 0.3;
            let deform_y = 1.0 + (self.clock * 3.0).cos() * 0.2;
            self.mutation.scale = Vec3::new(deform, deform_y, deform);
        }

        // Interference ripples outward; reversed, it flattens into a still disc.
        if journey.is_reversed(FactorId::InterferenceNeuro) {
            self.interference.scale = Vec3::new(1.0, 0.2, 1.0);
        } else {
            let ripple = 1.0 + (self.clock * 2.5).sin().abs() * 0.4;
            self.interference.scale = Vec3::new(ripple, ripple, ripple);
            self.interference.rotation.y += dt * 0.6;
        }
    }

    fn write_body(
        &self,
        world: &mut SceneWorld,
        id: FactorId,
        body: &Body,
        radius: f32,
        color: [u8; 3],
    ) {
        world.extend_points(self.shell.iter().map(|unit| {
            let local = body.position + rotated_xyz(scaled(*unit * radius, body.scale), body.rotation);
            point(self.to_world(local), 0.35, color, 0.85)
        }));
        let extent = body.scale.x.max(body.scale.y).max(body.scale.z);
        world.push_marker(factor_marker(
            id,
            self.to_world(body.position),
            radius * extent,
            color,
        ));
    }

    fn write_world(&self, journey: &JourneyStore, world: &mut SceneWorld) {
        world.clear_points();
        world.clear_markers();

        let synapses = self.links.iter().flat_map(|&(a, b)| {
            let (from, to) = (self.neurons[a], self.neurons[b]);
            (1..=LINK_SAMPLES).map(move |step| {
                let t = step as f32 / (LINK_SAMPLES + 1) as f32;
                self.to_world(from + (to - from) * t)
            })
        });
        world.extend_points(synapses.map(|position| point(position, 0.15, rgb(0xaa00ff), 0.3)));

        world.extend_points(self.neurons.iter().enumerate().map(|(index, neuron)| {
            let color = if index % 5 == 0 {
                rgb(0x00ffff)
            } else {
                [255, 255, 255]
            };
            point(self.to_world(*neuron), 0.4, color, 0.8)
        }));

        let dominanta = polarity_color(journey, FactorId::Dominanta, rgb(0xff0055), rgb(0x555555));
        self.write_body(world, FactorId::Dominanta, &self.dominanta, 1.2, dominanta);
        let abstraction =
            polarity_color(journey, FactorId::Abstraction, rgb(0x00ffbb), rgb(0x888888));
        self.write_body(world, FactorId::Abstraction, &self.abstraction, 1.0, abstraction);
        let mutation = polarity_color(journey, FactorId::Mutation, rgb(0xff8800), rgb(0x666666));
        self.write_body(world, FactorId::Mutation, &self.mutation, 1.3, mutation);
        let interference = polarity_color(
            journey,
            FactorId::InterferenceNeuro,
            rgb(0xff66ff),
            rgb(0x666688),
        );
        self.write_body(
            world,
            FactorId::InterferenceNeuro,
            &self.interference,
            1.1,
            interference,
        );
    }
}

fn build_links(neurons: &[Vec3], budget: usize) -> Vec<(usize, usize)> {
    let mut links = Vec::new();
    for a in 0..neurons.len() {
        for b in (a + 1)..neurons.len() {
            if links.len() >= budget {
                return links;
            }
            if (neurons[a] - neurons[b]).length() < LINK_DISTANCE {
                links.push((a, b));
            }
        }
    }
    links
}

impl Scene for MicroScene {
    fn load(&mut self, journey: &JourneyStore, world: &mut SceneWorld) {
        let mut rng = seeded_rng(SEED);
        self.neurons = (0..NEURONS)
            .map(|_| {
                Vec3::new(
                    rng.gen_range(-NETWORK_EXTENT..NETWORK_EXTENT),
                    rng.gen_range(-NETWORK_EXTENT..NETWORK_EXTENT),
                    rng.gen_range(-NETWORK_EXTENT..NETWORK_EXTENT),
                )
            })
            .collect();
        self.links = build_links(&self.neurons, self.link_budget);
        self.network_angle = 0.0;
        self.clock = 0.0;
        self.dominanta = Body::at(DOMINANTA_HOME);
        self.abstraction = Body::at(ABSTRACTION_HOME);
        self.mutation = Body::at(MUTATION_HOME);
        self.interference = Body::at(INTERFERENCE_HOME);
        world.set_background(BACKGROUND);
        self.write_world(journey, world);
    }

    fn update(&mut self, fixed_dt_seconds: f32, journey: &JourneyStore, world: &mut SceneWorld) {
        self.clock += fixed_dt_seconds;
        self.network_angle += fixed_dt_seconds * NETWORK_SPIN;
        self.animate_bodies(fixed_dt_seconds, journey);
        self.write_world(journey, world);
    }

    fn unload(&mut self, _world: &mut SceneWorld) {
        self.neurons.clear();
        self.links.clear();
    }

    fn debug_title(&self, journey: &JourneyStore) -> Option<String> {
        Some(format!(
            "Constructor of Reality | {} | neurons {} | synapses {}",
            journey.stage().title(),
            self.neurons.len(),
            self.links.len()
        ))
    }
}
