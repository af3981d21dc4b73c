use std::f32::consts::{PI, TAU};

use rand::Rng;
use reality_engine::journey::Easing;
use reality_engine::{FactorId, JourneyStore, Scene, SceneWorld, Stage, Vec3};

use super::util::{
    factor_marker, point, polarity_color, random_direction, rgb, seeded_rng, sph, ScalarTween,
    HALF_PI,
};

const SEED: u64 = 0x5EED_0003;
const BACKGROUND: [u8; 3] = [1, 2, 8];
const RADIUS: f32 = 10.0;
const CENTER: Vec3 = Vec3::new(0.0, -7.0, 0.0);
const MARKER_ORBIT: f32 = RADIUS + 2.5;
const MARKER_RADIUS: f32 = 0.7;
const TURN_SECONDS: f32 = 2.2;
const MAX_SURFACE_POINTS: usize = 2_400;
const MAX_STARS: usize = 800;
const WAR_SPARKS: usize = 40;
const AURORA_SAMPLES: usize = 48;
const SKY_RATE: f32 = 0.15;

const REVERSED_MARKER: [u8; 3] = rgb(0x88ccff);
const WAR_COLOR: [u8; 3] = rgb(0xff3333);
const WAR_REVERSED_COLOR: [u8; 3] = rgb(0xaaffaa);

/// Where a factor sits on the globe, as multiples of a quarter turn from the pole.
struct Anchor {
    factor: FactorId,
    phi_scale: f32,
    theta: f32,
    color: [u8; 3],
}

const fn anchor(factor: FactorId, phi_scale: f32, theta: f32, color: u32) -> Anchor {
    Anchor {
        factor,
        phi_scale,
        theta,
        color: rgb(color),
    }
}

const NATURE_ANCHORS: [Anchor; 12] = [
    anchor(FactorId::Ocean, 1.0, 0.0, 0x44aaff),
    anchor(FactorId::Tectonics, 0.6, 0.7, 0xcc9944),
    anchor(FactorId::Photosynthesis, 1.4, -0.7, 0x44cc44),
    anchor(FactorId::Wildlife, 0.5, -0.9, 0xcc8844),
    anchor(FactorId::Migration, 1.5, 0.9, 0xaaddff),
    anchor(FactorId::Atmosphere, 0.8, 1.3, 0xddddff),
    anchor(FactorId::Aurora, 1.2, -1.3, 0x00ffcc),
    anchor(FactorId::DayNight, 0.3, 0.2, 0xffdd88),
    anchor(FactorId::SunEnergy, 1.7, 0.3, 0xffaa00),
    anchor(FactorId::MoonPhase, 1.0, 1.8, 0xaabbdd),
    anchor(FactorId::StarField, 0.7, -1.7, 0xffffff),
    anchor(FactorId::Interference, 1.6, -1.8, 0xff88ff),
];

// The civilization side faces away from the nature side.
const CIVILIZATION_ANCHORS: [Anchor; 7] = [
    anchor(FactorId::War, 1.0, PI, 0xff3333),
    anchor(FactorId::Progress, 0.6, PI + 0.7, 0x88ccff),
    anchor(FactorId::Ecology, 1.4, PI - 0.7, 0x88ffaa),
    anchor(FactorId::Urbanization, 0.5, PI - 0.9, 0xaaaacc),
    anchor(FactorId::Trade, 1.5, PI + 0.9, 0xffcc44),
    anchor(FactorId::Culture, 0.8, PI + 1.5, 0xffaaff),
    anchor(FactorId::Energy, 1.2, PI - 1.5, 0xff8844),
];

struct SurfacePoint {
    local: Vec3,
    is_ocean: bool,
}

/// Stages 2 and 3: one globe whose nature side or civilization side is turned
/// toward the camera.
pub(crate) struct PlanetScene {
    surface_budget: usize,
    star_budget: usize,
    surface: Vec<SurfacePoint>,
    stars: Vec<Vec3>,
    war_sparks: Vec<Vec3>,
    rotation: ScalarTween,
    clock: f32,
}

impl PlanetScene {
    pub(crate) fn new(point_budget: usize) -> Self {
        Self {
            surface_budget: (point_budget / 2).min(MAX_SURFACE_POINTS),
            star_budget: (point_budget / 4).min(MAX_STARS),
            surface: Vec::new(),
            stars: Vec::new(),
            war_sparks: Vec::new(),
            rotation: ScalarTween::settled(0.0),
            clock: 0.0,
        }
    }

    fn facing_for(stage: Stage) -> f32 {
        if stage == Stage::Civilization {
            PI
        } else {
            0.0
        }
    }

    fn to_world(&self, local: Vec3) -> Vec3 {
        CENTER + local.rotated_y(self.rotation.value())
    }

    fn write_world(&self, journey: &JourneyStore, world: &mut SceneWorld) {
        world.clear_points();
        world.clear_markers();

        self.write_sky(journey, world);
        self.write_globe(journey, world);

        let stage = journey.stage();
        let anchors: &[Anchor] = match stage {
            Stage::Nature => &NATURE_ANCHORS,
            Stage::Civilization => &CIVILIZATION_ANCHORS,
            _ => &[],
        };
        for anchor in anchors {
            let (normal, reversed) = if anchor.factor == FactorId::War {
                (WAR_COLOR, WAR_REVERSED_COLOR)
            } else {
                (anchor.color, REVERSED_MARKER)
            };
            let color = polarity_color(journey, anchor.factor, normal, reversed);
            let local = sph(MARKER_ORBIT, HALF_PI * anchor.phi_scale, anchor.theta);
            world.push_marker(factor_marker(
                anchor.factor,
                self.to_world(local),
                MARKER_RADIUS,
                color,
            ));
        }
    }

    fn write_sky(&self, journey: &JourneyStore, world: &mut SceneWorld) {
        let t = self.clock * SKY_RATE;
        let star_spin = if journey.is_reversed(FactorId::StarField) {
            t * 0.2
        } else {
            0.0
        };
        world.extend_points(
            self.stars
                .iter()
                .map(|star| point(star.rotated_y(star_spin), 0.6, [255, 255, 255], 0.6)),
        );

        let sun_opacity = if journey.is_reversed(FactorId::SunEnergy) {
            0.3
        } else {
            1.0
        };
        let sun = Vec3::new(t.cos() * 25.0, 5.0, t.sin() * 25.0);
        world.push_point(point(sun, 4.0, rgb(0xffccaa), sun_opacity));

        let moon = Vec3::new((t + PI).cos() * 20.0, -5.0, (t + PI).sin() * 20.0);
        world.push_point(point(moon, 2.4, rgb(0x888899), 1.0));
        if !journey.is_reversed(FactorId::MoonPhase) {
            world.push_point(point(moon, 4.0, rgb(0xaaddff), 0.12));
        }
    }

    fn write_globe(&self, journey: &JourneyStore, world: &mut SceneWorld) {
        let ocean = polarity_color(journey, FactorId::Ocean, rgb(0x1a5fb4), rgb(0x6b5a44));
        let land = polarity_color(journey, FactorId::Photosynthesis, rgb(0x3c8a3c), rgb(0x8a7a55));
        let swell = 1.0 + (self.clock * 2.0).sin() * 0.005;
        world.extend_points(self.surface.iter().map(|surface| {
            let (local, color) = if surface.is_ocean {
                (surface.local * swell, ocean)
            } else {
                (surface.local, land)
            };
            point(self.to_world(local), 0.55, color, 0.9)
        }));

        let atmosphere_reversed = journey.is_reversed(FactorId::Atmosphere);
        let (haze, haze_opacity) = if atmosphere_reversed {
            (rgb(0xffaa88), 0.05)
        } else {
            (rgb(0x4488ff), 0.12)
        };
        world.extend_points(self.surface.iter().step_by(6).map(|surface| {
            let shell = surface.local * ((RADIUS + 0.4) / RADIUS);
            point(self.to_world(shell), 0.9, haze, haze_opacity)
        }));

        if !journey.is_reversed(FactorId::Aurora) {
            for (pole, spin) in [(9.8f32, 0.5f32), (-9.8, -0.4)] {
                let phase = self.clock * spin;
                let ring = 3.0 * (1.0 + self.clock.sin() * 0.05);
                world.extend_points((0..AURORA_SAMPLES).map(|index| {
                    let angle = index as f32 / AURORA_SAMPLES as f32 * TAU + phase;
                    let local = Vec3::new(angle.cos() * ring, pole, angle.sin() * ring);
                    point(self.to_world(local), 0.5, rgb(0x00ffcc), 0.3)
                }));
            }
        }

        if !journey.is_reversed(FactorId::War) {
            let flicker = 0.6 + (self.clock * 5.0).sin() * 0.3;
            world.extend_points(
                self.war_sparks
                    .iter()
                    .map(|spark| point(self.to_world(*spark), 0.3, rgb(0xff4400), flicker)),
            );
        }
    }
}

/// Fibonacci lattice on the sphere; a cheap banded pattern marks ocean and land.
fn build_surface(count: usize) -> Vec<SurfacePoint> {
    let golden = PI * (3.0 - 5.0f32.sqrt());
    (0..count)
        .map(|index| {
            let y = 1.0 - 2.0 * (index as f32 + 0.5) / count as f32;
            let ring = (1.0 - y * y).max(0.0).sqrt();
            let theta = golden * index as f32;
            let local = Vec3::new(theta.cos() * ring, y, theta.sin() * ring) * RADIUS;
            let continent = (theta * 1.7).sin() * (y * 3.1).cos() + (theta * 0.6 + y).sin() * 0.5;
            SurfacePoint {
                local,
                is_ocean: continent < 0.2,
            }
        })
        .collect()
}

impl Scene for PlanetScene {
    fn load(&mut self, journey: &JourneyStore, world: &mut SceneWorld) {
        let mut rng = seeded_rng(SEED);
        self.surface = build_surface(self.surface_budget);
        self.stars = (0..self.star_budget)
            .map(|_| random_direction(&mut rng) * rng.gen_range(80.0..150.0))
            .collect();
        self.war_sparks = (0..WAR_SPARKS)
            .map(|_| {
                sph(
                    RADIUS + 0.5,
                    rng.gen_range(0.4..2.4),
                    PI + rng.gen_range(-1.1..1.1),
                )
            })
            .collect();
        self.clock = 0.0;
        self.rotation = ScalarTween::settled(0.0);
        self.rotation
            .retarget(Self::facing_for(journey.stage()), TURN_SECONDS, Easing::Power2InOut);
        world.set_background(BACKGROUND);
        self.write_world(journey, world);
    }

    fn update(&mut self, fixed_dt_seconds: f32, journey: &JourneyStore, world: &mut SceneWorld) {
        self.clock += fixed_dt_seconds;
        self.rotation
            .retarget(Self::facing_for(journey.stage()), TURN_SECONDS, Easing::Power2InOut);
        self.rotation.tick(fixed_dt_seconds);
        self.write_world(journey, world);
    }

    fn unload(&mut self, _world: &mut SceneWorld) {
        self.surface.clear();
        self.stars.clear();
        self.war_sparks.clear();
    }

    fn debug_title(&self, journey: &JourneyStore) -> Option<String> {
        Some(format!(
            "Constructor of Reality | {} | turn {:.2}/{:.2}",
            journey.stage().title(),
            self.rotation.value(),
            self.rotation.target()
        ))
    }
}

#[cfg(test)]
mod tests {
    use reality_engine::MarkerKind;

    use super::*;

    fn journey_at(stage: i64) -> JourneyStore {
        let mut journey = JourneyStore::default();
        journey.set_stage(stage);
        journey
    }

    fn marker(world: &SceneWorld, id: FactorId) -> Option<reality_engine::SceneMarker> {
        world
            .markers()
            .iter()
            .copied()
            .find(|marker| marker.kind == MarkerKind::Factor(id))
    }

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-3
    }

    #[test]
    fn nature_side_shows_only_nature_markers() {
        let journey = journey_at(2);
        let mut scene = PlanetScene::new(2_000);
        let mut world = SceneWorld::default();
        scene.load(&journey, &mut world);

        let expected = journey.registry().ids_for_stage(Stage::Nature);
        assert_eq!(world.markers().len(), expected.len());
        assert!(marker(&world, FactorId::War).is_none());

        let ocean = marker(&world, FactorId::Ocean).expect("ocean");
        assert!(close(ocean.position, Vec3::new(MARKER_ORBIT, -7.0, 0.0)));
    }

    #[test]
    fn civilization_turns_the_globe_half_a_revolution() {
        let mut journey = journey_at(2);
        let mut scene = PlanetScene::new(0);
        let mut world = SceneWorld::default();
        scene.load(&journey, &mut world);

        journey.set_stage(3);
        scene.update(1.1, &journey, &mut world);
        assert_eq!(scene.rotation.target(), PI);
        assert!(scene.rotation.value() > 0.0 && scene.rotation.value() < PI);
        assert_eq!(
            world.markers().len(),
            journey.registry().ids_for_stage(Stage::Civilization).len()
        );

        scene.update(TURN_SECONDS, &journey, &mut world);
        let war = marker(&world, FactorId::War).expect("war");
        assert!(close(war.position, Vec3::new(MARKER_ORBIT, -7.0, 0.0)));
    }

    #[test]
    fn loading_straight_into_civilization_animates_the_turn() {
        let journey = journey_at(3);
        let mut scene = PlanetScene::new(0);
        let mut world = SceneWorld::default();
        scene.load(&journey, &mut world);

        assert_eq!(scene.rotation.value(), 0.0);
        assert!(!scene.rotation.is_finished());
    }

    #[test]
    fn war_marker_uses_warning_colors() {
        let mut journey = journey_at(3);
        let mut scene = PlanetScene::new(0);
        let mut world = SceneWorld::default();
        scene.load(&journey, &mut world);
        assert_eq!(marker(&world, FactorId::War).expect("war").color, WAR_COLOR);

        journey.set_active_factor(FactorId::War);
        journey.toggle_active();
        journey.set_active_factor(FactorId::Trade);
        journey.toggle_active();
        scene.update(0.0, &journey, &mut world);

        assert_eq!(
            marker(&world, FactorId::War).expect("war").color,
            WAR_REVERSED_COLOR
        );
        assert_eq!(
            marker(&world, FactorId::Trade).expect("trade").color,
            REVERSED_MARKER
        );
    }

    #[test]
    fn reversed_war_and_aurora_hide_their_effects() {
        let mut journey = journey_at(3);
        let mut scene = PlanetScene::new(0);
        let mut world = SceneWorld::default();
        scene.load(&journey, &mut world);
        let with_effects = world.point_count();

        journey.set_active_factor(FactorId::War);
        journey.toggle_active();
        journey.set_active_factor(FactorId::Aurora);
        journey.toggle_active();
        scene.update(0.0, &journey, &mut world);

        assert_eq!(
            with_effects - world.point_count(),
            WAR_SPARKS + 2 * AURORA_SAMPLES
        );
    }

    #[test]
    fn surface_budget_is_capped() {
        let scene = PlanetScene::new(1_000_000);
        assert_eq!(scene.surface_budget, MAX_SURFACE_POINTS);
        assert_eq!(build_surface(300).len(), 300);
    }
}
