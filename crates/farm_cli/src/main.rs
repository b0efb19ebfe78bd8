use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use farm_control::{change_lines, status_report, AutofarmController, CommandOutcome, CommandReply};
use farm_core::{Constants, Event, FortressState};
use farm_world::{
    advance_frame, build_initial_state, engine_state_path, load_content, load_engine_state,
    load_state, save_engine_state, save_state,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "farm_cli", about = "Fortress farm plot allocator CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Advance the fortress a fixed number of frames with the allocator attached.
    Run {
        #[arg(long)]
        frames: u64,
        /// Generate the fortress with this seed. Mutually exclusive with --state.
        #[arg(long, conflicts_with = "state_file")]
        seed: Option<u64>,
        /// Load the fortress from a JSON file. Mutually exclusive with --seed.
        /// Allocator settings saved beside it (`<name>.autofarm.json`) are resumed.
        #[arg(long = "state", conflicts_with = "seed")]
        state_file: Option<PathBuf>,
        #[arg(long, default_value = "./content")]
        content_dir: String,
        /// Print the status report every N frames (0 disables).
        #[arg(long, default_value_t = 10_000)]
        print_every: u64,
        /// Autofarm command applied before the first frame, e.g. `--command enable`.
        /// Repeatable; applied in order.
        #[arg(long = "command")]
        commands: Vec<String>,
        /// Write the final fortress to this file, and the allocator settings beside it.
        #[arg(long)]
        save: Option<PathBuf>,
    },
    /// Run one autofarm command against a saved fortress.
    ///
    /// Allocator settings (switch, thresholds) are kept in `<name>.autofarm.json`
    /// next to the state file. Without --write nothing is saved, so only the
    /// printed output of the command remains.
    Exec {
        #[arg(long = "state")]
        state_file: PathBuf,
        #[arg(long, default_value = "./content")]
        content_dir: String,
        /// Save plot changes and allocator settings back next to the state file.
        #[arg(long)]
        write: bool,
        /// Print the reply as JSON instead of console lines.
        #[arg(long)]
        json: bool,
        /// Command words, e.g. `runonce` or `threshold 30 MUSHROOM_HELMET_PLUMP`.
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
}

// ---------------------------------------------------------------------------
// Run loop
// ---------------------------------------------------------------------------

fn run(
    frames: u64,
    seed: Option<u64>,
    state_file: Option<&Path>,
    content_dir: &str,
    print_every: u64,
    commands: &[String],
    save: Option<&Path>,
) -> Result<()> {
    let content = load_content(content_dir)?;
    tracing::info!(
        plants = content.plants.len(),
        content_version = %content.content_version,
        "content loaded"
    );

    let mut state = if let Some(path) = state_file {
        load_state(path)?
    } else {
        let resolved_seed = seed.unwrap_or_else(rand::random);
        let mut rng = ChaCha8Rng::seed_from_u64(resolved_seed);
        build_initial_state(&content, resolved_seed, &mut rng)
    };

    let mut controller = resume_controller(&state, state_file, content.constants.clone())?;
    for command in commands {
        let words: Vec<&str> = command.split_whitespace().collect();
        let reply = controller.execute(words.as_slice(), &mut state);
        print_reply(&reply);
        if reply.outcome != CommandOutcome::Success {
            anyhow::bail!("command '{command}' failed");
        }
    }

    println!(
        "Starting fortress: frames={frames} seed={} plots={} plants={} content_version={}",
        state.meta.seed,
        state.plots.len(),
        state.plants.len(),
        content.content_version,
    );
    println!("{}", "-".repeat(80));

    let mut runs = 0u64;
    let mut changes = 0usize;
    for _ in 0..frames {
        advance_frame(&mut state);

        if let Some(events) = controller.on_update(&mut state) {
            runs += 1;
            for line in change_lines(&events, &state) {
                println!("{line}");
            }
            for envelope in &events {
                if let Event::RunCompleted { changed, .. } = envelope.event {
                    changes += changed;
                }
            }
        }

        if print_every > 0 && state.meta.frame_counter.is_multiple_of(print_every) {
            print_status(&state, &controller);
        }
    }

    println!("{}", "-".repeat(80));
    println!(
        "Done. {runs} allocator runs, {changes} plot changes. Final state at frame {}:",
        state.meta.frame_counter
    );
    print_status(&state, &controller);

    if let Some(path) = save {
        save_all(&state, &controller, path)?;
    }
    Ok(())
}

/// Registers the allocator, resuming settings saved beside `state_file`.
fn resume_controller(
    fortress: &FortressState,
    state_file: Option<&Path>,
    constants: Constants,
) -> Result<AutofarmController> {
    let saved = match state_file {
        Some(path) => load_engine_state(&engine_state_path(path))?,
        None => None,
    };
    let controller = match saved {
        Some(engine) => {
            tracing::info!("resuming saved allocator settings");
            AutofarmController::restore(fortress, constants, engine)
        }
        None => AutofarmController::register(fortress, constants),
    };
    controller.context("registering autofarm")
}

/// Saves the fortress to `path` and the allocator settings beside it.
fn save_all(fortress: &FortressState, controller: &AutofarmController, path: &Path) -> Result<()> {
    save_state(fortress, path)?;
    let engine_path = engine_state_path(path);
    save_engine_state(controller.state(), &engine_path)?;
    tracing::info!(
        path = %path.display(),
        engine = %engine_path.display(),
        "fortress saved"
    );
    Ok(())
}

fn print_status(state: &FortressState, controller: &AutofarmController) {
    let meta = &state.meta;
    let planted = state
        .plots
        .iter()
        .filter(|plot| plot.exists && plot.crop(meta.season).is_some())
        .count();
    println!(
        "[frame={frame:07} year={year} season={season} tick={tick:05}] planted={planted}/{plots}",
        frame = meta.frame_counter,
        year = meta.year,
        season = meta.season,
        tick = meta.season_tick,
        plots = state.plots.len(),
    );
    for line in status_report(controller.state(), state).lines() {
        println!("  {line}");
    }
}

fn print_reply(reply: &CommandReply) {
    for line in &reply.output {
        println!("{line}");
    }
}

// ---------------------------------------------------------------------------
// Single command
// ---------------------------------------------------------------------------

fn exec(
    state_file: &Path,
    content_dir: &str,
    write: bool,
    json: bool,
    args: &[String],
) -> Result<CommandOutcome> {
    let content = load_content(content_dir)?;
    let mut state = load_state(state_file)?;
    let mut controller = resume_controller(&state, Some(state_file), content.constants)?;

    let reply = controller.execute(args, &mut state);
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&reply).context("serializing reply")?
        );
    } else {
        print_reply(&reply);
    }

    if write && reply.outcome == CommandOutcome::Success {
        save_all(&state, &controller, state_file)?;
    }
    Ok(reply.outcome)
}

fn exit_code(outcome: CommandOutcome) -> ExitCode {
    match outcome {
        CommandOutcome::Success => ExitCode::SUCCESS,
        CommandOutcome::Failure => ExitCode::from(1),
        CommandOutcome::UsageError => ExitCode::from(2),
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            frames,
            seed,
            state_file,
            content_dir,
            print_every,
            commands,
            save,
        } => {
            run(
                frames,
                seed,
                state_file.as_deref(),
                &content_dir,
                print_every,
                &commands,
                save.as_deref(),
            )?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Exec {
            state_file,
            content_dir,
            write,
            json,
            args,
        } => {
            let outcome = exec(&state_file, &content_dir, write, json, &args)?;
            Ok(exit_code(outcome))
        }
    }
}
