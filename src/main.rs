use std::fs::File;
use std::process;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use block_sandbox::{
    config::SandboxConfig,
    engine::Engine,
    player::{Player, state::StageState},
    program::Program,
    types::{SpriteView, SwapAnnouncement},
};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

const RUN_USAGE: &str = "block-sandbox run <program.json> [--log <file>]";
const SIMULATE_USAGE: &str = "block-sandbox simulate <program.json> <millis> [--seed <n>]";

fn run() -> Result<()> {
    let mut args = std::env::args().skip(1);

    match args.next().as_deref() {
        Some("run") => {
            let path = args.next().context(RUN_USAGE)?;
            let log = flag_value(&mut args, "--log", RUN_USAGE)?;
            init_logging(log.as_deref())?;
            run_stage(&path)
        }
        Some("simulate") => {
            let path = args.next().context(SIMULATE_USAGE)?;
            let millis: u64 = args
                .next()
                .context(SIMULATE_USAGE)?
                .parse()
                .context("millis must be a whole number")?;
            let seed = flag_value(&mut args, "--seed", SIMULATE_USAGE)?
                .map(|s| s.parse::<u64>().context("seed must be a whole number"))
                .transpose()?;
            init_logging(None)?;
            simulate(&path, millis, seed)
        }
        _ => bail!(
            "Block Sandbox: sprite scripts on a terminal stage\n\nUsage:\n  {RUN_USAGE}\n  {SIMULATE_USAGE}"
        ),
    }
}

/// Parse an optional trailing `<flag> <value>` pair.
fn flag_value(args: &mut impl Iterator<Item = String>, flag: &str, usage: &str) -> Result<Option<String>> {
    match args.next() {
        None => Ok(None),
        Some(f) if f == flag => args.next().map(Some).context(usage.to_string()),
        Some(other) => bail!("Unexpected argument {other}\n\nUsage:\n  {usage}"),
    }
}

/// Logs go to stderr, or to `log_file` when the terminal is in use.
fn init_logging(log_file: Option<&str>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match log_file {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("Failed to create {path}"))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }
    Ok(())
}

fn run_stage(path: &str) -> Result<()> {
    let program = Program::open(path)?;
    let config = SandboxConfig::load();
    let engine = Engine::new(config.engine.clone());
    let state = StageState::new(program, config, engine);
    let mut player = Player::new(state);
    player.run()
}

#[derive(Serialize)]
struct SimulationReport<'a> {
    elapsed_ms: u64,
    ticks: u64,
    sprites: Vec<SpriteView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_swap: Option<&'a SwapAnnouncement>,
}

fn simulate(path: &str, millis: u64, seed: Option<u64>) -> Result<()> {
    let mut program = Program::open(path)?;
    let config = SandboxConfig::load().engine;
    let mut engine = match seed {
        Some(seed) => Engine::with_seed(config, seed),
        None => Engine::new(config),
    };
    let stage = program.source.stage;
    engine.set_viewport(stage.width, stage.height);

    engine.play(&mut program);
    engine.advance(Duration::from_millis(millis), &mut program);

    let report = SimulationReport {
        elapsed_ms: engine.elapsed().as_millis() as u64,
        ticks: engine.ticks(),
        sprites: engine.views(),
        last_swap: engine.last_swap(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
