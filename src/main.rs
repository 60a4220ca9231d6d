//! Replay a scenario of descriptor updates against the recording engine
//! and log the engine calls each update produces.
//!
//! ```text
//! viso-sync <scenario.json> [--options opts.toml]
//! ```
//!
//! Set `RUST_LOG=info` to see the calls.

use std::path::PathBuf;
use std::process::ExitCode;

use serde::Deserialize;
use viso_sync::engine::recording::{OpLog, RecordingEngine};
use viso_sync::engine::{EngineFactory, SceneEngine};
use viso_sync::error::SyncError;
use viso_sync::options::{InitOptions, SyncOptions};
use viso_sync::scene::{Color, ColorAssignment, StructureDescriptor};
use viso_sync::store::ViewerStore;

/// A scenario file: init overrides plus an ordered list of update cycles.
#[derive(Debug, Deserialize)]
struct Scenario {
    #[serde(default)]
    background: Option<Color>,
    #[serde(default)]
    default_color: Option<Color>,
    cycles: Vec<Cycle>,
}

#[derive(Debug, Deserialize)]
struct Cycle {
    descriptors: Vec<Option<StructureDescriptor>>,
    #[serde(default)]
    default_color: Option<Color>,
    /// Applied to every slot after the cycle, as a shared color assignment.
    #[serde(default)]
    shared_colors: Option<ColorAssignment>,
}

struct Args {
    scenario: PathBuf,
    options: Option<PathBuf>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args, SyncError> {
    let usage = || {
        SyncError::Scenario(
            "usage: viso-sync <scenario.json> [--options opts.toml]".to_owned(),
        )
    };
    let mut scenario = None;
    let mut options = None;
    while let Some(arg) = args.next() {
        if arg == "--options" {
            options = Some(PathBuf::from(args.next().ok_or_else(usage)?));
        } else if scenario.is_none() {
            scenario = Some(PathBuf::from(arg));
        } else {
            return Err(usage());
        }
    }
    Ok(Args {
        scenario: scenario.ok_or_else(usage)?,
        options,
    })
}

fn drain(ops: &OpLog) {
    log::debug!("{} engine calls", ops.len());
    for op in ops.take() {
        log::info!("  {op:?}");
    }
}

async fn replay<F: EngineFactory>(
    store: &mut ViewerStore<F>,
    scenario: &Scenario,
    ops: &OpLog,
) -> Result<(), SyncError>
where
    F::Engine: SceneEngine<Surface = (), Container = ()>,
{
    let opts = InitOptions {
        background: scenario.background,
        default_color: scenario.default_color,
    };
    store.init(&(), &(), opts).await?;
    log::info!("init");
    drain(ops);

    for (i, cycle) in scenario.cycles.iter().enumerate() {
        let outcome = store.sync(&cycle.descriptors, cycle.default_color).await;
        log::info!("cycle {i}: {outcome:?}");
        if let Some(colors) = &cycle.shared_colors {
            store
                .set_shared_color_assignment(Some(colors.clone()), None)
                .await;
        }
        drain(ops);
    }

    store.dispose();
    log::info!("dispose");
    drain(ops);
    Ok(())
}

fn run() -> Result<(), SyncError> {
    let args = parse_args(std::env::args().skip(1))?;
    let options = match &args.options {
        Some(path) => SyncOptions::load(path)?,
        None => SyncOptions::default(),
    };
    let text = std::fs::read_to_string(&args.scenario)?;
    let scenario: Scenario = serde_json::from_str(&text)
        .map_err(|e| SyncError::Scenario(e.to_string()))?;
    log::info!(
        "replaying {} cycles from {}",
        scenario.cycles.len(),
        args.scenario.display()
    );

    let ops = OpLog::default();
    let shared = ops.clone();
    let mut store = ViewerStore::with_options(
        move || RecordingEngine::with_log(shared.clone()),
        options,
    );
    pollster::block_on(replay(&mut store, &scenario, &ops))
}

fn main() -> ExitCode {
    env_logger::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
