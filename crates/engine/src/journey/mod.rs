mod camera;
mod commands;
mod debounce;
mod deferred;
mod factors;
mod reversal;
mod stage;
mod store;

pub use camera::{
    find_edge, CameraDirector, CameraEdge, DistanceTween, Easing, OrbitCamera, OrbitConfig,
    TweenPurpose, CAMERA_EDGES, CAMERA_FOV_Y_DEGREES, EXPLOSION_PULLBACK_DISTANCE,
    EXPLOSION_PULLBACK_SECONDS, INITIAL_CAMERA_DISTANCE,
};
pub use commands::{
    apply_command, tokenize_line, CommandEffect, CommandParseError, CommandRegistry,
    JourneyCommand,
};
pub use debounce::{
    DebounceConfig, IgnoreReason, Modifiers, ScrollDebouncer, ScrollDecision, WheelEvent,
};
pub use deferred::{CommitOutcome, DeferredCommit, DeferredCommits};
pub use factors::{FactorEntry, FactorId, FactorRegistry, RegistryError};
pub use reversal::ReversalStore;
pub use stage::{Stage, StageMachine, Transition, STAGE_COUNT};
pub use store::{
    DetailPanel, JourneyConfig, JourneyCounters, JourneySnapshot, JourneyStore, ScrollOutcome,
    DEFAULT_POINT_BUDGET,
};
