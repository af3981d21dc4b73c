pub mod app;
pub mod journey;

pub use app::{
    run_app, run_app_with_metrics, AppError, InputAction, InputSnapshot, LoopConfig,
    LoopMetricsSnapshot, MarkerKind, MetricsHandle, Projector, Renderer, Scene, SceneKey,
    SceneMarker, ScenePoint, SceneSet, SceneWorld, Vec2, Vec3, Viewport,
};
pub use journey::{
    FactorEntry, FactorId, FactorRegistry, JourneyConfig, JourneySnapshot, JourneyStore,
    RegistryError, Stage,
};
