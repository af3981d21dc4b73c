mod hud;
mod projection;
mod renderer;
mod text;

pub(crate) use hud::OverlayData;
pub use projection::{ProjectedPoint, Projector, Viewport, FAR_PLANE, NEAR_PLANE};
pub use renderer::Renderer;

/// Radius drawn for a factor marker before perspective scaling is clamped.
pub const MARKER_MIN_RADIUS_PX: f32 = 6.0;
pub const MARKER_MAX_RADIUS_PX: f32 = 40.0;
