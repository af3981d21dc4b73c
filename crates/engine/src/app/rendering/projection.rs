use crate::app::{Vec2, Vec3};
use crate::journey::OrbitCamera;

pub const NEAR_PLANE: f32 = 0.1;
pub const FAR_PLANE: f32 = 2_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedPoint {
    pub screen: Vec2,
    pub depth: f32,
    /// Screen pixels covered by one world unit at this depth.
    pub pixels_per_unit: f32,
}

/// Perspective projection for an orbit camera looking at the origin.
#[derive(Debug, Clone, Copy)]
pub struct Projector {
    eye: Vec3,
    right: Vec3,
    up: Vec3,
    forward: Vec3,
    focal_px: f32,
    half_width: f32,
    half_height: f32,
}

impl Projector {
    pub fn new(camera: &OrbitCamera, viewport: Viewport) -> Self {
        let eye = orbit_eye(camera);
        let forward = (Vec3::ZERO - eye).normalized_or(Vec3::new(0.0, 0.0, -1.0));
        let right = forward.cross(Vec3::UP).normalized_or(Vec3::new(1.0, 0.0, 0.0));
        let up = right.cross(forward);

        let half_height = viewport.height as f32 * 0.5;
        let half_fov = (camera.fov_y_degrees.clamp(1.0, 179.0) * 0.5).to_radians();
        Self {
            eye,
            right,
            up,
            forward,
            focal_px: half_height / half_fov.tan(),
            half_width: viewport.width as f32 * 0.5,
            half_height,
        }
    }

    pub fn eye(&self) -> Vec3 {
        self.eye
    }

    /// `None` for points outside the near/far range.
    pub fn project(&self, world: Vec3) -> Option<ProjectedPoint> {
        let relative = world - self.eye;
        let depth = relative.dot(self.forward);
        if !(NEAR_PLANE..=FAR_PLANE).contains(&depth) {
            return None;
        }
        let pixels_per_unit = self.focal_px / depth;
        Some(ProjectedPoint {
            screen: Vec2 {
                x: self.half_width + relative.dot(self.right) * pixels_per_unit,
                y: self.half_height - relative.dot(self.up) * pixels_per_unit,
            },
            depth,
            pixels_per_unit,
        })
    }
}

fn orbit_eye(camera: &OrbitCamera) -> Vec3 {
    let (sin_pitch, cos_pitch) = camera.pitch.sin_cos();
    let (sin_yaw, cos_yaw) = camera.yaw.sin_cos();
    Vec3::new(
        camera.distance * cos_pitch * sin_yaw,
        camera.distance * sin_pitch,
        camera.distance * cos_pitch * cos_yaw,
    )
}
