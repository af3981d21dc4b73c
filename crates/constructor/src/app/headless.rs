use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use reality_engine::journey::{apply_command, CommandEffect, CommandParseError, CommandRegistry};
use reality_engine::JourneyStore;
use thiserror::Error;
use tracing::{debug, info};

/// Simulation step used while a script waits; matches the windowed tick rate.
const SCRIPT_TICK: Duration = Duration::from_nanos(16_666_667);

#[derive(Debug, Error)]
pub(crate) enum ScriptError {
    #[error("failed to read script '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: CommandParseError,
    },
    #[error("failed to encode snapshot: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to write script output: {0}")]
    Output(#[source] std::io::Error),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ScriptSummary {
    pub commands: usize,
    pub dumps: usize,
    pub simulated: Duration,
}

/// Monotonic clock that only moves when the script waits.
#[derive(Debug, Clone, Copy)]
struct SimulatedClock {
    origin: Instant,
    elapsed: Duration,
}

impl SimulatedClock {
    fn new() -> Self {
        Self {
            origin: Instant::now(),
            elapsed: Duration::ZERO,
        }
    }

    fn now(&self) -> Instant {
        self.origin + self.elapsed
    }

    fn advance(&mut self, step: Duration) {
        self.elapsed = self.elapsed.saturating_add(step);
    }
}

pub(crate) fn run_script_file(
    path: &Path,
    journey: &mut JourneyStore,
    out: &mut impl Write,
) -> Result<ScriptSummary, ScriptError> {
    let source = fs::read_to_string(path).map_err(|source| ScriptError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), "script_started");
    run_script(&source, journey, out)
}

/// Runs every command in order against `journey`. Parsing stops at the first bad line.
pub(crate) fn run_script(
    source: &str,
    journey: &mut JourneyStore,
    out: &mut impl Write,
) -> Result<ScriptSummary, ScriptError> {
    let registry = CommandRegistry::with_journey_builtins();
    let mut clock = SimulatedClock::new();
    let mut summary = ScriptSummary::default();

    for (index, raw_line) in source.lines().enumerate() {
        let line = index + 1;
        let command = registry
            .parse_line(raw_line)
            .map_err(|source| ScriptError::Parse { line, source })?;
        let Some(command) = command else {
            continue;
        };
        summary.commands += 1;

        match apply_command(journey, &command, clock.now()) {
            CommandEffect::Wait(duration) => simulate(journey, &mut clock, duration),
            CommandEffect::Dump(snapshot) => {
                let json = serde_json::to_string(&snapshot).map_err(ScriptError::Encode)?;
                writeln!(out, "{json}").map_err(ScriptError::Output)?;
                summary.dumps += 1;
            }
            CommandEffect::Help => {
                for help_line in registry.help_lines() {
                    writeln!(out, "{help_line}").map_err(ScriptError::Output)?;
                }
            }
            effect => debug!(line, effect = ?effect, "script_command_applied"),
        }
    }

    summary.simulated = clock.elapsed;
    info!(
        commands = summary.commands,
        dumps = summary.dumps,
        simulated_ms = summary.simulated.as_millis() as u64,
        stage = ?journey.stage(),
        "script_finished"
    );
    Ok(summary)
}

fn simulate(journey: &mut JourneyStore, clock: &mut SimulatedClock, duration: Duration) {
    let mut remaining = duration;
    while !remaining.is_zero() {
        let step = remaining.min(SCRIPT_TICK);
        clock.advance(step);
        remaining -= step;
        if let Some(transition) = journey.tick(step.as_secs_f32()) {
            debug!(to = ?transition.to, "script_deferred_commit_applied");
        }
    }
}
