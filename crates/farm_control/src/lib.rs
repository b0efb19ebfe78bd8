//! Command surface for the farm allocator: `enable`, `disable`, `runonce`,
//! `status`, `default <n>` and `threshold <n> <plant>...`.

use farm_core::{
    on_update, plant_name, run_once, AutofarmState, Clock, Constants, Event, EventEnvelope,
    PlantFlag, PlantId, WorldQuery,
};
use serde::{Deserialize, Serialize};

pub const USAGE: &str = concat!(
    "usage: autofarm [enable | disable | runonce | status | ",
    "default <n> | threshold <n> <plant>...]"
);

// ---------------------------------------------------------------------------
// Outcomes and errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandOutcome {
    Success,
    UsageError,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("{}", USAGE)]
    Usage,
    #[error("invalid threshold value '{0}'")]
    InvalidValue(String),
    #[error("Cannot find plant with id {0}")]
    UnknownPlant(String),
    #[error("required world state is not available")]
    MissingWorldState,
}

impl CommandError {
    pub fn outcome(&self) -> CommandOutcome {
        match self {
            CommandError::MissingWorldState => CommandOutcome::Failure,
            CommandError::Usage | CommandError::InvalidValue(_) | CommandError::UnknownPlant(_) => {
                CommandOutcome::UsageError
            }
        }
    }
}

/// Result of one command: its outcome plus the console lines it printed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandReply {
    pub outcome: CommandOutcome,
    pub output: Vec<String>,
}

impl CommandReply {
    fn success(output: Vec<String>) -> Self {
        Self {
            outcome: CommandOutcome::Success,
            output,
        }
    }

    fn error(err: &CommandError) -> Self {
        Self {
            outcome: err.outcome(),
            output: vec![err.to_string()],
        }
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutofarmCommand {
    Status,
    RunOnce,
    Enable,
    Disable,
    SetDefault(u32),
    SetThreshold { value: u32, plants: Vec<String> },
}

impl AutofarmCommand {
    /// Parses the words following `autofarm`. No words means `status`.
    pub fn parse<S: AsRef<str>>(args: &[S]) -> Result<Self, CommandError> {
        let args: Vec<&str> = args.iter().map(AsRef::as_ref).collect();
        match args.as_slice() {
            [] | ["status"] => Ok(AutofarmCommand::Status),
            ["runonce"] => Ok(AutofarmCommand::RunOnce),
            ["enable"] => Ok(AutofarmCommand::Enable),
            ["disable"] => Ok(AutofarmCommand::Disable),
            ["default", value] => Ok(AutofarmCommand::SetDefault(parse_value(value)?)),
            ["threshold", value, plants @ ..] if !plants.is_empty() => {
                Ok(AutofarmCommand::SetThreshold {
                    value: parse_value(value)?,
                    plants: plants.iter().map(ToString::to_string).collect(),
                })
            }
            _ => Err(CommandError::Usage),
        }
    }
}

fn parse_value(raw: &str) -> Result<u32, CommandError> {
    raw.parse()
        .map_err(|_| CommandError::InvalidValue(raw.to_string()))
}

// ---------------------------------------------------------------------------
// AutofarmController
// ---------------------------------------------------------------------------

/// Owns the engine state and routes commands and frame updates to it.
pub struct AutofarmController {
    state: AutofarmState,
    constants: Constants,
}

impl AutofarmController {
    /// Registers the command against `world`. Fails when the world lacks the
    /// state the engine reads, in which case the command is not available.
    pub fn register(world: &impl WorldQuery, constants: Constants) -> Result<Self, CommandError> {
        if !world.has_required_state() {
            return Err(CommandError::MissingWorldState);
        }
        Ok(Self {
            state: AutofarmState::new(&constants),
            constants,
        })
    }

    /// Like [`register`](Self::register), but resumes a previously saved
    /// engine state: switch, thresholds, last tally and event counter.
    pub fn restore(
        world: &impl WorldQuery,
        constants: Constants,
        state: AutofarmState,
    ) -> Result<Self, CommandError> {
        let mut controller = Self::register(world, constants)?;
        controller.state = state;
        Ok(controller)
    }

    pub fn state(&self) -> &AutofarmState {
        &self.state
    }

    pub fn constants(&self) -> &Constants {
        &self.constants
    }

    /// Per-frame hook; see [`farm_core::on_update`] for the gating rules.
    pub fn on_update<W: WorldQuery + Clock>(
        &mut self,
        world: &mut W,
    ) -> Option<Vec<EventEnvelope>> {
        on_update(&mut self.state, world, &self.constants)
    }

    pub fn execute<W: WorldQuery + Clock, S: AsRef<str>>(
        &mut self,
        args: &[S],
        world: &mut W,
    ) -> CommandReply {
        match AutofarmCommand::parse(args) {
            Ok(command) => self.apply(command, world),
            Err(err) => CommandReply::error(&err),
        }
    }

    pub fn apply<W: WorldQuery + Clock>(
        &mut self,
        command: AutofarmCommand,
        world: &mut W,
    ) -> CommandReply {
        match command {
            AutofarmCommand::Status => {
                CommandReply::success(status_report(&self.state, &*world).lines())
            }
            AutofarmCommand::RunOnce => {
                // Forced: ignores the frame interval, pause state and the enable switch.
                let events = run_once(&mut self.state, world);
                CommandReply::success(change_lines(&events, &*world))
            }
            AutofarmCommand::Enable => {
                self.state.set_enabled(true);
                CommandReply::success(vec![])
            }
            AutofarmCommand::Disable => {
                self.state.set_enabled(false);
                CommandReply::success(vec![])
            }
            AutofarmCommand::SetDefault(value) => {
                self.state.set_default_threshold(value);
                CommandReply::success(vec![])
            }
            AutofarmCommand::SetThreshold { value, plants } => {
                match self.set_thresholds(value, &plants, &*world) {
                    Ok(()) => CommandReply::success(vec![]),
                    Err(err) => CommandReply::error(&err),
                }
            }
        }
    }

    /// Applies `value` to each plant code in turn. Stops at the first unknown
    /// code; thresholds set before it stay set.
    fn set_thresholds(
        &mut self,
        value: u32,
        codes: &[String],
        world: &impl WorldQuery,
    ) -> Result<(), CommandError> {
        for code in codes {
            let code = code.to_uppercase();
            let plant = world
                .plant_raws()
                .iter()
                .find(|plant| plant.has(PlantFlag::Seed) && plant.code.0 == code)
                .ok_or_else(|| CommandError::UnknownPlant(code.clone()))?;
            self.state.set_threshold(plant.id, value);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Reporting
// ---------------------------------------------------------------------------

/// Console line for a crop change; `None` for other events.
pub fn change_line(event: &Event, world: &impl WorldQuery) -> Option<String> {
    let Event::CropChanged {
        plot_id, from, to, ..
    } = event
    else {
        return None;
    };
    Some(format!(
        "autofarm: changing farm #{plot_id} from {} to {}",
        plant_name(world, *from),
        plant_name(world, *to),
    ))
}

pub fn change_lines(events: &[EventEnvelope], world: &impl WorldQuery) -> Vec<String> {
    events
        .iter()
        .filter_map(|envelope| change_line(&envelope.event, world))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlantStatus {
    pub code: String,
    pub limit: u32,
    pub current: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusReport {
    pub enabled: bool,
    pub default_threshold: u32,
    pub plants: Vec<PlantStatus>,
}

impl StatusReport {
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.plants.len() + 2);
        lines.push(format!(
            "Autofarm is {}",
            if self.enabled { "Active." } else { "Stopped." }
        ));
        for plant in &self.plants {
            lines.push(format!(
                "{} limit {} current {}",
                plant.code, plant.limit, plant.current
            ));
        }
        lines.push(format!("Default: {}", self.default_threshold));
        lines
    }
}

/// Plants from the last tally, then overridden plants the tally did not
/// include (reported with a current count of zero).
pub fn status_report(state: &AutofarmState, world: &impl WorldQuery) -> StatusReport {
    let code = |id: PlantId| {
        world
            .plant(id)
            .map_or_else(|| format!("#{id}"), |plant| plant.code.to_string())
    };
    let tallied = state.last_counts().iter().map(|(id, count)| (*id, *count));
    let untallied = state
        .thresholds()
        .keys()
        .filter(|id| !state.last_counts().contains_key(id))
        .map(|id| (*id, 0));
    StatusReport {
        enabled: state.is_enabled(),
        default_threshold: state.default_threshold(),
        plants: tallied
            .chain(untallied)
            .map(|(id, current)| PlantStatus {
                code: code(id),
                limit: state.threshold(id),
                current,
            })
            .collect(),
    }
}
