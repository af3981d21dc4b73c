use std::path::PathBuf;

use reality_engine::{FactorRegistry, JourneyStore, LoopConfig, SceneSet};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::config::resolve_config_from_env;
use super::scenes;

pub(crate) const USAGE: &str = "usage: constructor-of-reality [--script <file>]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LaunchMode {
    Windowed,
    Script(PathBuf),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum ArgsError {
    #[error("missing value for {0}")]
    MissingValue(&'static str),
    #[error("unknown argument '{0}'")]
    Unknown(String),
}

pub(crate) struct AppWiring {
    pub(crate) mode: LaunchMode,
    pub(crate) config: LoopConfig,
    pub(crate) journey: JourneyStore,
    pub(crate) scenes: SceneSet,
}

pub(crate) fn build_app(args: impl IntoIterator<Item = String>) -> Result<AppWiring, ArgsError> {
    let mode = parse_launch_mode(args)?;
    init_tracing();
    info!(mode = ?mode, "=== Constructor of Reality Startup ===");

    let file = resolve_config_from_env();
    let journey = JourneyStore::new(file.journey, FactorRegistry::builtin());
    let scenes = scenes::build_scene_set(file.journey.point_budget);
    let config = LoopConfig {
        max_render_fps: file.max_render_fps,
        overlay_visible: file.show_overlay,
        ..LoopConfig::default()
    };

    Ok(AppWiring {
        mode,
        config,
        journey,
        scenes,
    })
}

pub(crate) fn parse_launch_mode(
    args: impl IntoIterator<Item = String>,
) -> Result<LaunchMode, ArgsError> {
    let mut mode = LaunchMode::Windowed;
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--script" => {
                let path = args.next().ok_or(ArgsError::MissingValue("--script"))?;
                mode = LaunchMode::Script(PathBuf::from(path));
            }
            _ => return Err(ArgsError::Unknown(arg)),
        }
    }
    Ok(mode)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
