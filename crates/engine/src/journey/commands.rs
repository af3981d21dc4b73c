use std::collections::HashMap;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::warn;

use super::debounce::{Modifiers, WheelEvent};
use super::stage::Transition;
use super::store::{JourneySnapshot, JourneyStore, ScrollOutcome};

#[derive(Debug, Clone, PartialEq)]
pub enum JourneyCommand {
    Wheel { event: WheelEvent },
    Advance,
    Retreat,
    Ignite,
    Stage { index: i64 },
    Select { key: String },
    Toggle,
    Close,
    Wait { duration: Duration },
    Restart,
    Dump,
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}. usage: {usage}")]
pub struct CommandParseError {
    pub reason: String,
    pub usage: String,
}

impl CommandParseError {
    fn new(reason: impl Into<String>, usage: &str) -> Self {
        Self {
            reason: reason.into(),
            usage: usage.to_string(),
        }
    }
}

type ParseFn = dyn Fn(&[String]) -> Result<JourneyCommand, CommandParseError> + Send + Sync;

pub struct CommandSpec {
    name: String,
    help: String,
    arg_schema: String,
    parse: Box<ParseFn>,
}

pub struct CommandRegistry {
    specs: Vec<CommandSpec>,
    lookup_by_lower_name: HashMap<String, usize>,
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::with_journey_builtins()
    }
}

type BuiltinParse = fn(&[String]) -> Result<JourneyCommand, CommandParseError>;

const BUILTINS: &[(&str, &str, &str, BuiltinParse)] = &[
    ("help", "List commands", "", parse_help_command),
    (
        "wheel",
        "Feed one wheel event",
        "<delta_y:f32> [ctrl|meta]",
        parse_wheel_command,
    ),
    ("advance", "Move one stage deeper", "", parse_advance_command),
    ("retreat", "Move one stage back", "", parse_retreat_command),
    ("ignite", "Trigger the explosion", "", parse_ignite_command),
    ("stage", "Jump to a stage", "<index:i64>", parse_stage_command),
    ("select", "Open a factor", "<factor_key:string>", parse_select_command),
    ("toggle", "Flip the open factor", "", parse_toggle_command),
    ("close", "Close the detail panel", "", parse_close_command),
    ("wait", "Advance the clock", "<ms:u64>", parse_wait_command),
    ("restart", "Restart the journey", "", parse_restart_command),
    ("dump", "Print a state snapshot", "", parse_dump_command),
];

impl CommandRegistry {
    pub fn new() -> Self {
        Self {
            specs: Vec::new(),
            lookup_by_lower_name: HashMap::new(),
        }
    }

    pub fn with_journey_builtins() -> Self {
        let mut registry = Self::new();
        for (name, help, arg_schema, parse) in BUILTINS {
            if let Err(reason) = registry.register(*name, *help, *arg_schema, *parse) {
                warn!(command = *name, reason = %reason, "builtin_command_rejected");
            }
        }
        registry
    }

    pub fn register<F>(
        &mut self,
        name: impl Into<String>,
        help: impl Into<String>,
        arg_schema: impl Into<String>,
        parse: F,
    ) -> Result<(), String>
    where
        F: Fn(&[String]) -> Result<JourneyCommand, CommandParseError> + Send + Sync + 'static,
    {
        let name = name.into();
        if name.trim().is_empty() {
            return Err("command name cannot be empty".to_string());
        }
        let lower = name.to_ascii_lowercase();
        if self.lookup_by_lower_name.contains_key(&lower) {
            return Err(format!("duplicate command registration: {name}"));
        }

        self.specs.push(CommandSpec {
            name,
            help: help.into(),
            arg_schema: arg_schema.into(),
            parse: Box::new(parse),
        });
        self.lookup_by_lower_name.insert(lower, self.specs.len() - 1);
        Ok(())
    }

    pub fn lookup(&self, input_name: &str) -> Option<&CommandSpec> {
        let lower = input_name.to_ascii_lowercase();
        let index = self.lookup_by_lower_name.get(&lower)?;
        self.specs.get(*index)
    }

    /// Registration order.
    pub fn help_lines(&self) -> Vec<String> {
        self.specs
            .iter()
            .map(|spec| {
                if spec.arg_schema.is_empty() {
                    format!("{} - {}", spec.name, spec.help)
                } else {
                    format!("{} {} - {}", spec.name, spec.arg_schema, spec.help)
                }
            })
            .collect()
    }

    /// Blank lines and `#` comments parse to `None`.
    pub fn parse_line(&self, raw_line: &str) -> Result<Option<JourneyCommand>, CommandParseError> {
        let trimmed = raw_line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(None);
        }

        let tokens = tokenize_line(trimmed).map_err(|reason| CommandParseError::new(reason, "help"))?;
        let Some((command_name, args)) = tokens.split_first() else {
            return Ok(None);
        };
        let Some(spec) = self.lookup(command_name) else {
            return Err(CommandParseError::new(
                format!("unknown command '{command_name}'"),
                "help",
            ));
        };

        (spec.parse)(args).map(Some)
    }
}

/// What a command did to the store; the caller owns clock and output.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandEffect {
    Scrolled(ScrollOutcome),
    Transitioned(Option<Transition>),
    Selected { known: bool },
    Toggled(Option<bool>),
    Closed,
    Wait(Duration),
    Restarted,
    Dump(Box<JourneySnapshot>),
    Help,
}

pub fn apply_command(store: &mut JourneyStore, command: &JourneyCommand, now: Instant) -> CommandEffect {
    match command {
        JourneyCommand::Wheel { event } => CommandEffect::Scrolled(store.handle_wheel(*event, now)),
        JourneyCommand::Advance => CommandEffect::Transitioned(store.advance()),
        JourneyCommand::Retreat => CommandEffect::Transitioned(store.retreat()),
        JourneyCommand::Ignite => CommandEffect::Transitioned(store.trigger_explosion()),
        JourneyCommand::Stage { index } => CommandEffect::Transitioned(store.set_stage(*index)),
        JourneyCommand::Select { key } => CommandEffect::Selected {
            known: store.select_factor_key(key),
        },
        JourneyCommand::Toggle => CommandEffect::Toggled(store.toggle_active()),
        JourneyCommand::Close => {
            store.clear_active();
            CommandEffect::Closed
        }
        JourneyCommand::Wait { duration } => CommandEffect::Wait(*duration),
        JourneyCommand::Restart => {
            store.restart_journey();
            CommandEffect::Restarted
        }
        JourneyCommand::Dump => CommandEffect::Dump(Box::new(store.snapshot())),
        JourneyCommand::Help => CommandEffect::Help,
    }
}

pub fn tokenize_line(line: &str) -> Result<Vec<String>, String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut pending = false;

    for ch in line.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                pending = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if pending {
                    tokens.push(std::mem::take(&mut current));
                    pending = false;
                }
            }
            _ => {
                current.push(ch);
                pending = true;
            }
        }
    }

    if in_quotes {
        return Err("unterminated quoted string".to_string());
    }
    if pending {
        tokens.push(current);
    }
    Ok(tokens)
}

fn parse_help_command(args: &[String]) -> Result<JourneyCommand, CommandParseError> {
    require_no_args(args, "help")?;
    Ok(JourneyCommand::Help)
}

fn parse_wheel_command(args: &[String]) -> Result<JourneyCommand, CommandParseError> {
    const USAGE: &str = "wheel <delta_y> [ctrl|meta]";
    let (delta, modifier) = match args {
        [delta] => (delta, None),
        [delta, modifier] => (delta, Some(modifier)),
        _ => {
            return Err(CommandParseError::new(
                "expected <delta_y> and an optional modifier",
                USAGE,
            ))
        }
    };

    let delta_y = delta
        .parse::<f32>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| CommandParseError::new(format!("invalid delta '{delta}' (expected f32)"), USAGE))?;

    let modifiers = match modifier.map(|value| value.to_ascii_lowercase()) {
        None => Modifiers::NONE,
        Some(value) if value == "ctrl" => Modifiers {
            ctrl: true,
            meta: false,
        },
        Some(value) if value == "meta" => Modifiers {
            ctrl: false,
            meta: true,
        },
        Some(value) => {
            return Err(CommandParseError::new(
                format!("unknown modifier '{value}' (expected ctrl|meta)"),
                USAGE,
            ))
        }
    };

    Ok(JourneyCommand::Wheel {
        event: WheelEvent::new(delta_y).with_modifiers(modifiers),
    })
}

fn parse_advance_command(args: &[String]) -> Result<JourneyCommand, CommandParseError> {
    require_no_args(args, "advance")?;
    Ok(JourneyCommand::Advance)
}

fn parse_retreat_command(args: &[String]) -> Result<JourneyCommand, CommandParseError> {
    require_no_args(args, "retreat")?;
    Ok(JourneyCommand::Retreat)
}

fn parse_ignite_command(args: &[String]) -> Result<JourneyCommand, CommandParseError> {
    require_no_args(args, "ignite")?;
    Ok(JourneyCommand::Ignite)
}

fn parse_stage_command(args: &[String]) -> Result<JourneyCommand, CommandParseError> {
    let [raw] = args else {
        return Err(CommandParseError::new(
            "expected exactly one argument <index>",
            "stage <index>",
        ));
    };
    let index = raw.parse::<i64>().map_err(|_| {
        CommandParseError::new(format!("invalid stage index '{raw}' (expected i64)"), "stage <index>")
    })?;
    Ok(JourneyCommand::Stage { index })
}

fn parse_select_command(args: &[String]) -> Result<JourneyCommand, CommandParseError> {
    let [key] = args else {
        return Err(CommandParseError::new(
            "expected exactly one argument <factor_key>",
            "select <factor_key>",
        ));
    };
    Ok(JourneyCommand::Select { key: key.clone() })
}

fn parse_toggle_command(args: &[String]) -> Result<JourneyCommand, CommandParseError> {
    require_no_args(args, "toggle")?;
    Ok(JourneyCommand::Toggle)
}

fn parse_close_command(args: &[String]) -> Result<JourneyCommand, CommandParseError> {
    require_no_args(args, "close")?;
    Ok(JourneyCommand::Close)
}

fn parse_wait_command(args: &[String]) -> Result<JourneyCommand, CommandParseError> {
    let [raw] = args else {
        return Err(CommandParseError::new(
            "expected exactly one argument <ms>",
            "wait <ms>",
        ));
    };
    let ms = raw.parse::<u64>().map_err(|_| {
        CommandParseError::new(format!("invalid duration '{raw}' (expected u64 ms)"), "wait <ms>")
    })?;
    Ok(JourneyCommand::Wait {
        duration: Duration::from_millis(ms),
    })
}

fn parse_restart_command(args: &[String]) -> Result<JourneyCommand, CommandParseError> {
    require_no_args(args, "restart")?;
    Ok(JourneyCommand::Restart)
}

fn parse_dump_command(args: &[String]) -> Result<JourneyCommand, CommandParseError> {
    require_no_args(args, "dump")?;
    Ok(JourneyCommand::Dump)
}

fn require_no_args(args: &[String], usage: &str) -> Result<(), CommandParseError> {
    if args.is_empty() {
        Ok(())
    } else {
        Err(CommandParseError::new("unexpected extra arguments", usage))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journey::debounce::IgnoreReason;
    use crate::journey::factors::FactorId;
    use crate::journey::stage::Stage;

    fn parse(line: &str) -> Result<Option<JourneyCommand>, CommandParseError> {
        CommandRegistry::with_journey_builtins().parse_line(line)
    }

    #[test]
    fn help_lists_commands_in_registration_order() {
        let lines = CommandRegistry::with_journey_builtins().help_lines();

        assert_eq!(lines.len(), BUILTINS.len());
        assert_eq!(lines[0], "help - List commands");
        assert_eq!(lines[1], "wheel <delta_y:f32> [ctrl|meta] - Feed one wheel event");
        assert_eq!(lines[11], "dump - Print a state snapshot");
    }

    #[test]
    fn blank_and_comment_lines_are_skipped() {
        assert_eq!(parse("   "), Ok(None));
        assert_eq!(parse("# warm up"), Ok(None));
    }

    #[test]
    fn names_are_case_insensitive() {
        assert_eq!(parse("ADVANCE"), Ok(Some(JourneyCommand::Advance)));
    }

    #[test]
    fn unknown_command_reports_clear_error() {
        let error = parse("nope").expect_err("unknown");
        assert_eq!(error.to_string(), "unknown command 'nope'. usage: help");
    }

    #[test]
    fn wheel_parses_delta_and_modifier() {
        assert_eq!(
            parse("wheel -120 meta"),
            Ok(Some(JourneyCommand::Wheel {
                event: WheelEvent::new(-120.0).with_modifiers(Modifiers {
                    ctrl: false,
                    meta: true,
                }),
            }))
        );
        assert!(parse("wheel 10 shift").is_err());
        assert!(parse("wheel NaN").is_err());
        assert!(parse("wheel").is_err());
    }

    #[test]
    fn bad_args_report_usage_hint() {
        let error = parse("wait soon").expect_err("bad wait");
        assert_eq!(
            error.to_string(),
            "invalid duration 'soon' (expected u64 ms). usage: wait <ms>"
        );
        assert!(parse("toggle now").is_err());
    }

    #[test]
    fn stage_accepts_out_of_range_indices_for_clamping() {
        assert_eq!(parse("stage -7"), Ok(Some(JourneyCommand::Stage { index: -7 })));
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry = CommandRegistry::with_journey_builtins();
        let result = registry.register("Toggle", "again", "", |_args: &[String]| Ok(JourneyCommand::Toggle));
        assert!(result.is_err());
    }

    #[test]
    fn tokenizer_handles_quotes_and_errors() {
        assert_eq!(
            tokenize_line("select \"dayNight\"  ").expect("tokens"),
            vec!["select", "dayNight"]
        );
        assert!(tokenize_line("select \"oops").is_err());
    }

    #[test]
    fn applied_script_walks_the_journey() {
        let registry = CommandRegistry::with_journey_builtins();
        let mut store = JourneyStore::default();
        let now = Instant::now();

        for line in ["stage 1", "select gravity", "toggle", "close", "select gravity"] {
            let command = registry.parse_line(line).expect("parse").expect("command");
            apply_command(&mut store, &command, now);
        }

        assert_eq!(store.stage(), Stage::Cosmos);
        assert_eq!(store.active_factor(), Some(FactorId::Gravity));
        assert!(store.is_reversed(FactorId::Gravity));
    }

    #[test]
    fn modifier_wheel_is_reported_as_dropped() {
        let mut store = JourneyStore::default();
        let command = parse("wheel 300 ctrl").expect("parse").expect("command");

        let effect = apply_command(&mut store, &command, Instant::now());

        assert_eq!(
            effect,
            CommandEffect::Scrolled(ScrollOutcome::Dropped(IgnoreReason::Modifier))
        );
    }

    #[test]
    fn unknown_factor_key_selects_nothing() {
        let mut store = JourneyStore::default();
        let command = parse("select phlogiston").expect("parse").expect("command");

        assert_eq!(
            apply_command(&mut store, &command, Instant::now()),
            CommandEffect::Selected { known: false }
        );
        assert_eq!(store.active_factor(), None);
    }
}
