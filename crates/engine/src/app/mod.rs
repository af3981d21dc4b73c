mod input;
mod interaction;
mod loop_runner;
mod metrics;
mod rendering;
mod scene;

pub use input::{InputAction, InputSnapshot, LINE_DELTA_PX};
pub use loop_runner::{run_app, run_app_with_metrics, AppError, LoopConfig};
pub use metrics::{LoopMetricsSnapshot, MetricsHandle};
pub use rendering::{
    ProjectedPoint, Projector, Renderer, Viewport, FAR_PLANE, MARKER_MAX_RADIUS_PX,
    MARKER_MIN_RADIUS_PX, NEAR_PLANE,
};
pub use scene::{
    MarkerKind, Scene, SceneKey, SceneMarker, ScenePoint, SceneSet, SceneWorld, Vec2, Vec3,
};
pub(crate) use rendering::OverlayData;
