//! # anchor_app: console host
//!
//! Runs the chrono anchor service against an in-memory world and feeds it
//! from stdin. A reader task forwards lines over a channel; the main task
//! owns the service and applies them one at a time.
//!
//! ## Startup Sequence
//!
//! 1. Parse arguments and initialise logging.
//! 2. Load (or create) the config file and build the service.
//! 3. Start the distortion scheduler and the world clock.
//! 4. Apply console lines until `quit`, end of input or Ctrl-C.

mod console;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anchor_core::{Location, Material, WorldId};
use anchor_runtime::{
    Action, AnchorService, BreakEvent, ClickedBlock, CommandSender, FileSource, Hand,
    InteractEvent, SimWorld, TokioTicker,
};
use anyhow::{Context, Result};
use clap::Parser;
use glam::IVec3;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use console::{ConsoleCommand, HELP, Held};

#[derive(Parser)]
#[command(name = "anchor_app", about = "Chrono anchors over an in-memory world")]
struct Args {
    /// Path to the JSON config file. Created with defaults if missing.
    #[arg(short, long, default_value = "chrono-anchors.json")]
    config: PathBuf,

    /// Milliseconds per simulation tick
    #[arg(short, long, default_value_t = 50)]
    tick_millis: u64,

    /// Name of the demo world
    #[arg(short, long, default_value = "world")]
    world: String,
}

/// The console operator holds every permission.
struct Console;

impl CommandSender for Console {
    fn has_permission(&self, _node: &str) -> bool {
        true
    }
}

type Service = AnchorService<TokioTicker, FileSource>;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("anchor_app=info".parse()?))
        .init();

    let args = Args::parse();
    let tick = Duration::from_millis(args.tick_millis.max(1));

    let sim = Arc::new(SimWorld::new());
    let world = sim.load_world(&args.world);
    info!(world = %args.world, id = %world, "world loaded");

    let ticker = TokioTicker::new(Handle::current(), tick);
    let source = FileSource::new(&args.config);
    let mut service = AnchorService::new(sim.clone(), ticker, source)
        .with_context(|| format!("loading {}", args.config.display()))?;
    service.enable();

    // Effects wear off on the same clock the scheduler runs on.
    let clock = tokio::spawn({
        let sim = Arc::clone(&sim);
        async move {
            let mut interval = tokio::time::interval(tick);
            loop {
                interval.tick().await;
                sim.advance(1);
            }
        }
    });

    let (tx, mut rx) = mpsc::channel::<String>(64);
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if tx.send(line).await.is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    warn!(error = %e, "failed to read console input");
                    break;
                }
            }
        }
    });

    println!("{HELP}");
    loop {
        tokio::select! {
            line = rx.recv() => {
                let Some(line) = line else {
                    info!("console input closed");
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<ConsoleCommand>() {
                    Ok(ConsoleCommand::Quit) => break,
                    Ok(command) => apply(&mut service, &sim, world, command)?,
                    Err(e) => println!("{e}"),
                }
            }
            result = tokio::signal::ctrl_c() => {
                result.context("listening for ctrl-c")?;
                info!("interrupt received");
                break;
            }
        }
    }

    clock.abort();
    service.shutdown();
    info!("chrono anchors shut down");
    Ok(())
}

/// Apply one console command and print its outcome.
fn apply(
    service: &mut Service,
    sim: &SimWorld,
    world: WorldId,
    command: ConsoleCommand,
) -> Result<()> {
    let at = |block: IVec3| Location::new(world, block.x, block.y, block.z);

    match command {
        ConsoleCommand::Place { block, material } => {
            sim.set_block(at(block), material);
            println!("placed {material} at {}", at(block));
        }
        ConsoleCommand::Click { block, held } => {
            let location = at(block);
            let held_item = match held {
                Held::ActivationItem => Some(service.config().activation_item),
                Held::Nothing => None,
                Held::Item(item) => Some(item),
            };
            let outcome = service.handle_interact(&InteractEvent {
                action: Action::RightClickBlock,
                hand: Hand::Main,
                clicked: Some(ClickedBlock {
                    location,
                    material: sim.block(&location),
                }),
                held_item,
            });
            match outcome.feedback {
                Some(feedback) => println!("{feedback}"),
                None => println!("nothing happens"),
            }
        }
        ConsoleCommand::Break { block } => {
            let location = at(block);
            let material = sim.block(&location);
            if material == Material::Air {
                println!("there is no block at {location}");
                return Ok(());
            }
            let feedback = service.handle_break(&BreakEvent { location, material });
            sim.set_block(location, Material::Air);
            match feedback {
                Some(feedback) => println!("{feedback}"),
                None => println!("broke {material} at {location}"),
            }
        }
        ConsoleCommand::Spawn { position, living } => {
            let id = sim.spawn_entity(world, position, living);
            println!("spawned {id} at {position}");
        }
        ConsoleCommand::Despawn { block } => {
            let removed = sim.despawn_at(&at(block));
            println!("removed {removed} entities at {}", at(block));
        }
        ConsoleCommand::Chronoanchor(args) => {
            let args: Vec<&str> = args.iter().map(String::as_str).collect();
            println!("{}", service.handle_command(&Console, &args));
        }
        ConsoleCommand::Status => {
            println!("{}", status(service, sim)?);
        }
        ConsoleCommand::Help => println!("{HELP}"),
        ConsoleCommand::Quit => {}
    }
    Ok(())
}

fn status(service: &Service, sim: &SimWorld) -> Result<String> {
    let mut anchors = service.registry().snapshot_all();
    anchors.sort_by_key(|anchor| (anchor.world, anchor.x(), anchor.y(), anchor.z()));
    let entities: Vec<_> = sim
        .entities()
        .into_iter()
        .map(|(id, entity)| serde_json::json!({ "id": id, "entity": entity }))
        .collect();
    let scheduler = service.scheduler();

    let report = serde_json::json!({
        "anchors": anchors,
        "config": service.config().as_ref(),
        "scheduler": {
            "running": scheduler.is_running(),
            "cycles_completed": scheduler.cycles_completed(),
            "cycles_panicked": scheduler.cycles_panicked(),
            "last_report": scheduler.last_report(),
        },
        "entities": entities,
        "logged_particle_bursts": sim.particle_bursts().len(),
    });
    serde_json::to_string_pretty(&report).context("serialising status")
}
