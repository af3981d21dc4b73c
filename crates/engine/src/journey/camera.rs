use serde::{Deserialize, Serialize};
use tracing::debug;

use super::stage::Stage;

pub const INITIAL_CAMERA_DISTANCE: f32 = 5.0;
pub const CAMERA_FOV_Y_DEGREES: f32 = 60.0;
pub const EXPLOSION_PULLBACK_DISTANCE: f32 = 50.0;
pub const EXPLOSION_PULLBACK_SECONDS: f32 = 4.0;
const PITCH_LIMIT_RADIANS: f32 = 1.45;
const DOLLY_BASE: f32 = 0.95;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    Linear,
    Power2Out,
    Power2InOut,
    Power3Out,
}

impl Easing {
    pub fn apply(self, t: f32) -> f32 {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 1.0 };
        match self {
            Easing::Linear => t,
            Easing::Power2Out => 1.0 - (1.0 - t).powi(3),
            Easing::Power2InOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) * 0.5
                }
            }
            Easing::Power3Out => 1.0 - (1.0 - t).powi(4),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OrbitConfig {
    pub min_distance: f32,
    pub max_distance: f32,
    pub zoom_speed: f32,
    /// Radians per pixel of drag.
    pub rotate_speed: f32,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            min_distance: 5.0,
            max_distance: 200.0,
            zoom_speed: 0.6,
            rotate_speed: 0.005,
        }
    }
}

/// Camera orbiting the origin; the scene renderer reads it every frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OrbitCamera {
    pub distance: f32,
    pub yaw: f32,
    pub pitch: f32,
    pub fov_y_degrees: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            distance: INITIAL_CAMERA_DISTANCE,
            yaw: 0.0,
            pitch: 0.0,
            fov_y_degrees: CAMERA_FOV_Y_DEGREES,
        }
    }
}

impl OrbitCamera {
    /// Positive delta (scroll down) moves the camera away.
    pub fn dolly(&mut self, delta_y: f32, config: &OrbitConfig) {
        if delta_y == 0.0 || !delta_y.is_finite() {
            return;
        }
        let scale = DOLLY_BASE.powf(config.zoom_speed);
        let next = if delta_y > 0.0 {
            self.distance / scale
        } else {
            self.distance * scale
        };
        self.distance = next.clamp(config.min_distance, config.max_distance);
    }

    pub fn rotate(&mut self, dx_px: f32, dy_px: f32, config: &OrbitConfig) {
        if !dx_px.is_finite() || !dy_px.is_finite() {
            return;
        }
        self.yaw -= dx_px * config.rotate_speed;
        self.pitch =
            (self.pitch + dy_px * config.rotate_speed).clamp(-PITCH_LIMIT_RADIANS, PITCH_LIMIT_RADIANS);
    }
}

/// Authored camera move for one (from, to) stage pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraEdge {
    pub from: Stage,
    pub to: Stage,
    /// Distance the camera jumps to before tweening.
    pub snap_from: Option<f32>,
    pub target_distance: f32,
    pub duration_seconds: f32,
    pub easing: Easing,
}

pub const CAMERA_EDGES: [CameraEdge; 5] = [
    CameraEdge {
        from: Stage::Singularity,
        to: Stage::Cosmos,
        snap_from: None,
        target_distance: 25.0,
        duration_seconds: 1.2,
        easing: Easing::Power2Out,
    },
    CameraEdge {
        from: Stage::Cosmos,
        to: Stage::Nature,
        snap_from: None,
        target_distance: 15.0,
        duration_seconds: 1.5,
        easing: Easing::Power2InOut,
    },
    CameraEdge {
        from: Stage::Nature,
        to: Stage::Cosmos,
        snap_from: None,
        target_distance: 25.0,
        duration_seconds: 1.2,
        easing: Easing::Power2InOut,
    },
    CameraEdge {
        from: Stage::Civilization,
        to: Stage::Micro,
        snap_from: Some(80.0),
        target_distance: 25.0,
        duration_seconds: 1.5,
        easing: Easing::Power2Out,
    },
    CameraEdge {
        from: Stage::Micro,
        to: Stage::Civilization,
        snap_from: Some(10.0),
        target_distance: 15.0,
        duration_seconds: 1.5,
        easing: Easing::Power2Out,
    },
];

pub fn find_edge(from: Stage, to: Stage) -> Option<&'static CameraEdge> {
    CAMERA_EDGES
        .iter()
        .find(|edge| edge.from == from && edge.to == to)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum TweenPurpose {
    StageEdge { from: Stage, to: Stage },
    ExplosionPullback,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DistanceTween {
    pub purpose: TweenPurpose,
    pub start: f32,
    pub target: f32,
    pub duration_seconds: f32,
    pub elapsed_seconds: f32,
    pub easing: Easing,
}

impl DistanceTween {
    pub fn progress(&self) -> f32 {
        if self.duration_seconds <= 0.0 {
            return 1.0;
        }
        (self.elapsed_seconds / self.duration_seconds).clamp(0.0, 1.0)
    }

    pub fn value(&self) -> f32 {
        let eased = self.easing.apply(self.progress());
        self.start + (self.target - self.start) * eased
    }

    pub fn is_finished(&self) -> bool {
        self.progress() >= 1.0
    }
}

/// Owns the single in-flight camera tween; a new one always replaces the old.
#[derive(Debug, Clone, Default)]
pub struct CameraDirector {
    tween: Option<DistanceTween>,
}

impl CameraDirector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_tween(&self) -> Option<&DistanceTween> {
        self.tween.as_ref()
    }

    pub fn is_animating(&self) -> bool {
        self.tween.is_some()
    }

    /// Stops any in-flight tween, then issues the authored one if the edge has it.
    /// Returns whether an animation was issued.
    pub fn on_stage_changed(&mut self, from: Stage, to: Stage, camera: &mut OrbitCamera) -> bool {
        if from == to {
            return false;
        }
        self.cancel();
        let Some(edge) = find_edge(from, to) else {
            debug!(from = ?from, to = ?to, "camera_edge_unauthored");
            return false;
        };

        if let Some(snap) = edge.snap_from {
            camera.distance = snap;
        }
        self.replace(
            DistanceTween {
                purpose: TweenPurpose::StageEdge { from, to },
                start: camera.distance,
                target: edge.target_distance,
                duration_seconds: edge.duration_seconds,
                elapsed_seconds: 0.0,
                easing: edge.easing,
            },
        );
        true
    }

    pub fn start_explosion_pullback(&mut self, camera: &OrbitCamera) {
        self.replace(DistanceTween {
            purpose: TweenPurpose::ExplosionPullback,
            start: camera.distance,
            target: EXPLOSION_PULLBACK_DISTANCE,
            duration_seconds: EXPLOSION_PULLBACK_SECONDS,
            elapsed_seconds: 0.0,
            easing: Easing::Power3Out,
        });
    }

    /// Advances the tween and writes the distance; returns the purpose of a tween
    /// that completed during this tick.
    pub fn tick(&mut self, dt_seconds: f32, camera: &mut OrbitCamera) -> Option<TweenPurpose> {
        let tween = self.tween.as_mut()?;
        tween.elapsed_seconds += dt_seconds.max(0.0);
        camera.distance = tween.value();
        if !tween.is_finished() {
            return None;
        }
        let purpose = tween.purpose;
        self.tween = None;
        Some(purpose)
    }

    pub fn cancel(&mut self) {
        self.tween = None;
    }

    fn replace(&mut self, tween: DistanceTween) {
        if let Some(previous) = self.tween.replace(tween) {
            debug!(
                replaced = ?previous.purpose,
                by = ?tween.purpose,
                "camera_tween_replaced"
            );
        }
    }
}
