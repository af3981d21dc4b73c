use std::ops::{Add, Mul, Sub};

use tracing::debug;

use super::rendering::{Projector, MARKER_MAX_RADIUS_PX, MARKER_MIN_RADIUS_PX};
use crate::journey::{FactorId, JourneyStore, Stage};

/// Extra screen-space slack around markers when picking.
const PICK_SLOP_PX: f32 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneKey {
    Singularity,
    Cosmos,
    Planet,
    Micro,
}

impl SceneKey {
    pub const ALL: [SceneKey; 4] = [
        SceneKey::Singularity,
        SceneKey::Cosmos,
        SceneKey::Planet,
        SceneKey::Micro,
    ];

    /// Nature and Civilization share one planet scene.
    pub fn for_stage(stage: Stage) -> Self {
        match stage {
            Stage::Singularity => SceneKey::Singularity,
            Stage::Cosmos => SceneKey::Cosmos,
            Stage::Nature | Stage::Civilization => SceneKey::Planet,
            Stage::Micro => SceneKey::Micro,
        }
    }

    const fn index(self) -> usize {
        match self {
            SceneKey::Singularity => 0,
            SceneKey::Cosmos => 1,
            SceneKey::Planet => 2,
            SceneKey::Micro => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);
    pub const UP: Vec3 = Vec3::new(0.0, 1.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn dot(self, other: Vec3) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Vec3) -> Vec3 {
        Vec3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }

    pub fn normalized_or(self, fallback: Vec3) -> Vec3 {
        let length = self.length();
        if length <= f32::EPSILON || !length.is_finite() {
            return fallback;
        }
        self * (1.0 / length)
    }

    /// Rotation about the +Y axis, right-handed.
    pub fn rotated_y(self, angle_radians: f32) -> Vec3 {
        let (sin, cos) = angle_radians.sin_cos();
        Vec3::new(
            self.x * cos + self.z * sin,
            self.y,
            -self.x * sin + self.z * cos,
        )
    }
}

impl Add for Vec3 {
    type Output = Vec3;

    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;

    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;

    fn mul(self, rhs: f32) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// Additively blended point sprite. `size` is a diameter in world units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScenePoint {
    pub position: Vec3,
    pub size: f32,
    pub color: [u8; 3],
    pub opacity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    Factor(FactorId),
    /// The pre-ignition singularity; clicking it triggers the explosion.
    Ignition,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneMarker {
    pub kind: MarkerKind,
    pub position: Vec3,
    pub radius: f32,
    pub color: [u8; 3],
}

#[derive(Debug, Clone, Default)]
pub struct SceneWorld {
    points: Vec<ScenePoint>,
    markers: Vec<SceneMarker>,
    background: [u8; 3],
}

impl SceneWorld {
    pub fn clear(&mut self) {
        self.points.clear();
        self.markers.clear();
        self.background = [0, 0, 0];
    }

    pub fn points(&self) -> &[ScenePoint] {
        &self.points
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    pub fn clear_points(&mut self) {
        self.points.clear();
    }

    pub fn push_point(&mut self, point: ScenePoint) {
        self.points.push(point);
    }

    pub fn extend_points(&mut self, points: impl IntoIterator<Item = ScenePoint>) {
        self.points.extend(points);
    }

    pub fn markers(&self) -> &[SceneMarker] {
        &self.markers
    }

    pub fn clear_markers(&mut self) {
        self.markers.clear();
    }

    pub fn push_marker(&mut self, marker: SceneMarker) {
        self.markers.push(marker);
    }

    pub fn background(&self) -> [u8; 3] {
        self.background
    }

    pub fn set_background(&mut self, color: [u8; 3]) {
        self.background = color;
    }

    /// Frontmost marker whose projected disc contains the cursor.
    pub fn pick_marker(&self, projector: &Projector, cursor_px: Vec2) -> Option<MarkerKind> {
        self.markers
            .iter()
            .filter_map(|marker| {
                let projected = projector.project(marker.position)?;
                let radius_px = marker_radius_px(marker.radius, projected.pixels_per_unit);
                let dx = projected.screen.x - cursor_px.x;
                let dy = projected.screen.y - cursor_px.y;
                let reach = radius_px + PICK_SLOP_PX;
                (dx * dx + dy * dy <= reach * reach).then_some((projected.depth, marker.kind))
            })
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, kind)| kind)
    }
}

pub(crate) fn marker_radius_px(radius_world: f32, pixels_per_unit: f32) -> f32 {
    (radius_world * pixels_per_unit).clamp(MARKER_MIN_RADIUS_PX, MARKER_MAX_RADIUS_PX)
}

/// Scenes read journey state every tick and write what should be drawn into
/// their world. They never mutate the journey.
pub trait Scene {
    fn load(&mut self, journey: &JourneyStore, world: &mut SceneWorld);
    fn update(&mut self, fixed_dt_seconds: f32, journey: &JourneyStore, world: &mut SceneWorld);
    fn unload(&mut self, world: &mut SceneWorld);
    fn debug_title(&self, _journey: &JourneyStore) -> Option<String> {
        None
    }
}

pub struct SceneSet {
    pub singularity: Box<dyn Scene>,
    pub cosmos: Box<dyn Scene>,
    pub planet: Box<dyn Scene>,
    pub micro: Box<dyn Scene>,
}

struct SceneRuntime {
    scene: Box<dyn Scene>,
    world: SceneWorld,
    is_loaded: bool,
}

impl SceneRuntime {
    fn new(scene: Box<dyn Scene>) -> Self {
        Self {
            scene,
            world: SceneWorld::default(),
            is_loaded: false,
        }
    }

    fn load(&mut self, journey: &JourneyStore) {
        let (scene, world) = (&mut self.scene, &mut self.world);
        scene.load(journey, world);
        self.is_loaded = true;
    }

    fn unload(&mut self) {
        if !self.is_loaded {
            return;
        }
        let (scene, world) = (&mut self.scene, &mut self.world);
        scene.unload(world);
        self.world.clear();
        self.is_loaded = false;
    }
}

/// Exactly one scene is mounted at a time; switching unloads the previous one.
pub(crate) struct SceneMachine {
    runtimes: [SceneRuntime; 4],
    active_scene: SceneKey,
}

impl SceneMachine {
    pub(crate) fn new(scenes: SceneSet, active_scene: SceneKey) -> Self {
        Self {
            runtimes: [
                SceneRuntime::new(scenes.singularity),
                SceneRuntime::new(scenes.cosmos),
                SceneRuntime::new(scenes.planet),
                SceneRuntime::new(scenes.micro),
            ],
            active_scene,
        }
    }

    pub(crate) fn active_scene(&self) -> SceneKey {
        self.active_scene
    }

    pub(crate) fn load_active(&mut self, journey: &JourneyStore) {
        let runtime = self.active_runtime_mut();
        if runtime.is_loaded {
            return;
        }
        runtime.load(journey);
    }

    /// Mounts the scene for the journey's stage. Returns whether a switch happened.
    pub(crate) fn sync_to_stage(&mut self, journey: &JourneyStore) -> bool {
        let next_scene = SceneKey::for_stage(journey.stage());
        if next_scene == self.active_scene {
            return false;
        }

        self.active_runtime_mut().unload();
        self.active_scene = next_scene;
        self.active_runtime_mut().load(journey);
        debug!(scene = ?next_scene, "scene_mounted");
        true
    }

    /// Unloads and loads the active scene again, dropping all of its state.
    pub(crate) fn reload_active(&mut self, journey: &JourneyStore) {
        let runtime = self.active_runtime_mut();
        runtime.unload();
        runtime.load(journey);
    }

    pub(crate) fn update_active(&mut self, fixed_dt_seconds: f32, journey: &JourneyStore) {
        let runtime = self.active_runtime_mut();
        let (scene, world) = (&mut runtime.scene, &mut runtime.world);
        scene.update(fixed_dt_seconds, journey, world);
    }

    pub(crate) fn active_world(&self) -> &SceneWorld {
        &self.runtimes[self.active_scene.index()].world
    }

    pub(crate) fn debug_title_active(&self, journey: &JourneyStore) -> Option<String> {
        self.runtimes[self.active_scene.index()]
            .scene
            .debug_title(journey)
    }

    pub(crate) fn shutdown_all(&mut self) {
        for runtime in &mut self.runtimes {
            runtime.unload();
        }
    }

    #[cfg(test)]
    fn is_loaded(&self, key: SceneKey) -> bool {
        self.runtimes[key.index()].is_loaded
    }

    fn active_runtime_mut(&mut self) -> &mut SceneRuntime {
        &mut self.runtimes[self.active_scene.index()]
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::app::rendering::Viewport;
    use crate::journey::OrbitCamera;

    #[derive(Default)]
    struct Counters {
        loads: u32,
        unloads: u32,
        updates: u32,
    }

    struct CountingScene {
        counters: Rc<RefCell<Counters>>,
    }

    impl Scene for CountingScene {
        fn load(&mut self, _journey: &JourneyStore, world: &mut SceneWorld) {
            self.counters.borrow_mut().loads += 1;
            world.push_point(ScenePoint {
                position: Vec3::ZERO,
                size: 1.0,
                color: [255, 255, 255],
                opacity: 1.0,
            });
        }

        fn update(&mut self, _fixed_dt_seconds: f32, _journey: &JourneyStore, _world: &mut SceneWorld) {
            self.counters.borrow_mut().updates += 1;
        }

        fn unload(&mut self, _world: &mut SceneWorld) {
            self.counters.borrow_mut().unloads += 1;
        }
    }

    fn counting_set() -> (SceneSet, Vec<Rc<RefCell<Counters>>>) {
        let counters = (0..4)
            .map(|_| Rc::new(RefCell::new(Counters::default())))
            .collect::<Vec<_>>();
        let scene = |index: usize| -> Box<dyn Scene> {
            Box::new(CountingScene {
                counters: Rc::clone(&counters[index]),
            })
        };
        let set = SceneSet {
            singularity: scene(0),
            cosmos: scene(1),
            planet: scene(2),
            micro: scene(3),
        };
        (set, counters)
    }

    fn marker(kind: MarkerKind, position: Vec3) -> SceneMarker {
        SceneMarker {
            kind,
            position,
            radius: 0.5,
            color: [255, 255, 255],
        }
    }

    #[test]
    fn nature_and_civilization_share_the_planet_scene() {
        assert_eq!(SceneKey::for_stage(Stage::Nature), SceneKey::Planet);
        assert_eq!(SceneKey::for_stage(Stage::Civilization), SceneKey::Planet);
        assert_eq!(SceneKey::for_stage(Stage::Micro), SceneKey::Micro);
    }

    #[test]
    fn stage_change_unloads_previous_scene_and_clears_its_world() {
        let (set, counters) = counting_set();
        let mut machine = SceneMachine::new(set, SceneKey::Singularity);
        let mut journey = JourneyStore::default();
        machine.load_active(&journey);

        journey.set_stage(1);
        assert!(machine.sync_to_stage(&journey));

        assert_eq!(machine.active_scene(), SceneKey::Cosmos);
        assert_eq!(counters[0].borrow().unloads, 1);
        assert_eq!(counters[1].borrow().loads, 1);
        assert!(!machine.is_loaded(SceneKey::Singularity));
        assert_eq!(machine.active_world().point_count(), 1);
    }

    #[test]
    fn moving_between_planet_stages_keeps_the_scene_mounted() {
        let (set, counters) = counting_set();
        let mut journey = JourneyStore::default();
        journey.set_stage(2);
        let mut machine = SceneMachine::new(set, SceneKey::for_stage(journey.stage()));
        machine.load_active(&journey);

        journey.advance();
        assert!(!machine.sync_to_stage(&journey));
        assert_eq!(counters[2].borrow().loads, 1);
        assert_eq!(counters[2].borrow().unloads, 0);
    }

    #[test]
    fn returning_to_a_scene_mounts_it_fresh() {
        let (set, counters) = counting_set();
        let mut machine = SceneMachine::new(set, SceneKey::Singularity);
        let mut journey = JourneyStore::default();
        machine.load_active(&journey);

        journey.set_stage(1);
        machine.sync_to_stage(&journey);
        journey.retreat();
        machine.sync_to_stage(&journey);

        assert_eq!(counters[0].borrow().loads, 2);
        assert_eq!(counters[0].borrow().unloads, 1);
    }

    #[test]
    fn only_active_scene_is_updated_and_shutdown_unloads_it() {
        let (set, counters) = counting_set();
        let mut machine = SceneMachine::new(set, SceneKey::Singularity);
        let journey = JourneyStore::default();
        machine.load_active(&journey);

        machine.update_active(1.0 / 60.0, &journey);
        machine.update_active(1.0 / 60.0, &journey);
        machine.shutdown_all();

        assert_eq!(counters[0].borrow().updates, 2);
        assert_eq!(counters[1].borrow().updates, 0);
        assert_eq!(counters[0].borrow().unloads, 1);
        assert_eq!(counters[1].borrow().unloads, 0);
    }

    #[test]
    fn reload_replays_load() {
        let (set, counters) = counting_set();
        let mut machine = SceneMachine::new(set, SceneKey::Singularity);
        let journey = JourneyStore::default();
        machine.load_active(&journey);

        machine.reload_active(&journey);

        assert_eq!(counters[0].borrow().loads, 2);
        assert_eq!(machine.active_world().point_count(), 1);
    }

    #[test]
    fn pick_prefers_frontmost_marker_under_cursor() {
        let projector = Projector::new(
            &OrbitCamera {
                distance: 20.0,
                ..OrbitCamera::default()
            },
            Viewport {
                width: 800,
                height: 600,
            },
        );
        let mut world = SceneWorld::default();
        world.push_marker(marker(MarkerKind::Factor(FactorId::Sun), Vec3::new(0.0, 0.0, -5.0)));
        world.push_marker(marker(MarkerKind::Factor(FactorId::Gravity), Vec3::new(0.0, 0.0, 5.0)));
        world.push_marker(marker(MarkerKind::Factor(FactorId::Tides), Vec3::new(8.0, 0.0, 0.0)));

        let center = Vec2 { x: 400.0, y: 300.0 };
        assert_eq!(
            world.pick_marker(&projector, center),
            Some(MarkerKind::Factor(FactorId::Gravity))
        );
        assert_eq!(world.pick_marker(&projector, Vec2 { x: 10.0, y: 10.0 }), None);
    }

    #[test]
    fn vector_helpers_behave() {
        let x = Vec3::new(1.0, 0.0, 0.0);
        assert_eq!(x.cross(Vec3::UP), Vec3::new(0.0, 0.0, 1.0));
        let turned = x.rotated_y(std::f32::consts::FRAC_PI_2);
        assert!(turned.x.abs() < 1e-6);
        assert!((turned.z + 1.0).abs() < 1e-6);
        assert_eq!(Vec3::ZERO.normalized_or(Vec3::UP), Vec3::UP);
    }
}
