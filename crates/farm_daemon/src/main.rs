mod routes;
mod state;
mod tick_loop;

use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use clap::Parser;
use farm_control::AutofarmController;
use farm_world::{
    build_initial_state, engine_state_path, load_content, load_engine_state, load_state,
};
use parking_lot::Mutex;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing_subscriber::EnvFilter;

use crate::routes::make_router_with_cors;
use crate::state::{AppState, SimState};
use crate::tick_loop::run_frame_loop;

#[derive(Parser)]
#[command(name = "farm_daemon", about = "Fortress farm allocator HTTP daemon")]
struct Args {
    /// Generate the fortress with this seed. Mutually exclusive with --state.
    #[arg(long, conflicts_with = "state_file")]
    seed: Option<u64>,
    /// Load the fortress from a JSON file. Mutually exclusive with --seed.
    /// Allocator settings saved beside it (`<name>.autofarm.json`) are resumed.
    #[arg(long = "state", conflicts_with = "seed")]
    state_file: Option<PathBuf>,
    #[arg(long, default_value = "./content")]
    content_dir: String,
    #[arg(long, default_value_t = 3001)]
    port: u16,
    /// Frames per second; 0 runs as fast as possible.
    #[arg(long, default_value_t = 100.0)]
    frames_per_sec: f64,
    /// Stop the frame loop after this many frames.
    #[arg(long)]
    max_frames: Option<u64>,
    /// Start with the allocator enabled.
    #[arg(long)]
    enable: bool,
    #[arg(long, default_value = "http://localhost:5173")]
    cors_origin: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();
    let content = load_content(&args.content_dir)?;

    let mut fortress = if let Some(path) = &args.state_file {
        load_state(path)?
    } else {
        let seed = args.seed.unwrap_or_else(rand::random);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        build_initial_state(&content, seed, &mut rng)
    };

    let saved = match &args.state_file {
        Some(path) => load_engine_state(&engine_state_path(path))?,
        None => None,
    };
    let mut controller = match saved {
        Some(engine) => AutofarmController::restore(&fortress, content.constants.clone(), engine),
        None => AutofarmController::register(&fortress, content.constants.clone()),
    }
    .context("registering autofarm")?;
    if args.enable {
        controller.execute(&["enable"], &mut fortress);
    }

    tracing::info!(
        seed = fortress.meta.seed,
        plots = fortress.plots.len(),
        plants = fortress.plants.len(),
        content_version = %content.content_version,
        enabled = controller.state().is_enabled(),
        "fortress ready"
    );

    let (event_tx, _) = tokio::sync::broadcast::channel(256);
    let paused = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        sim: Arc::new(Mutex::new(SimState {
            fortress,
            controller,
        })),
        event_tx: event_tx.clone(),
        frames_per_sec: args.frames_per_sec,
        paused: paused.clone(),
    };

    tokio::spawn(run_frame_loop(
        app_state.sim.clone(),
        event_tx,
        args.frames_per_sec,
        args.max_frames,
        paused,
    ));

    let cors_origin: HeaderValue = args
        .cors_origin
        .parse()
        .with_context(|| format!("invalid --cors-origin '{}'", args.cors_origin))?;
    let app = make_router_with_cors(app_state, cors_origin);

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!("listening on http://{addr}");
    axum::serve(listener, app).await.context("serving http")?;
    Ok(())
}
