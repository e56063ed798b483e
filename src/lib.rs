// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod fs;
pub mod graph;
pub mod logging;
pub mod render;
pub mod store;
pub mod types;

use anyhow::{Result, anyhow, bail};
use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::cli::{CliArgs, Command};
use crate::config::load_or_default;
use crate::config::model::ConfigFile;
use crate::engine::{CoreEngine, EngineEvent, MindChain, Mutation, Runtime, SystemClock};
use crate::fs::RealFileSystem;
use crate::graph::task_lists::{blocked_tasks, current_tasks};
use crate::store::{JsonFileStore, Snapshot};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - snapshot loading / saving
/// - one-shot commands against the chain
/// - the long-running runtime (`watch`) with Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_or_default(&RealFileSystem, args.config.as_deref())?;
    let store_path = args.store.clone().unwrap_or_else(|| cfg.store_path.clone());
    let store = JsonFileStore::open(store_path);
    let now = Utc::now();

    match args.command {
        Command::Init { name, force } => {
            if store.exists() && !force {
                bail!(
                    "{:?} already exists; pass --force to overwrite it",
                    store.path()
                );
            }
            let chain = MindChain::new(name, cfg.priority);
            store.write_snapshot(&Snapshot::of_chain(&chain))?;
            println!("created {:?}", store.path());
        }
        Command::Show => {
            let chain = load_chain(&store, &cfg, now)?;
            print!("{}", render::format_graph(chain.graph(), chain.defaults()));
        }
        Command::Tasks => {
            let chain = load_chain(&store, &cfg, now)?;
            print!("{}", render::format_current(&current_tasks(chain.graph())));
        }
        Command::Blocked => {
            let chain = load_chain(&store, &cfg, now)?;
            print!("{}", render::format_blocked(&blocked_tasks(chain.graph())));
        }
        Command::Archive { id } => {
            let chain = load_chain(&store, &cfg, now)?;
            match id {
                Some(id) => {
                    let group = chain
                        .archive()
                        .get(id)
                        .ok_or_else(|| anyhow!("no finished group for node {id}"))?;
                    print!("{}", render::format_group(group));
                }
                None => print!("{}", render::format_archive(chain.archive())),
            }
        }
        Command::Watch => {
            let chain = load_chain(&store, &cfg, now)?;
            run_watch(chain, store, &cfg).await?;
        }
        command => {
            let mutation =
                mutation_for(&command).ok_or_else(|| anyhow!("{command:?} is not a mutation"))?;
            let mut chain = load_chain(&store, &cfg, now)?;
            chain.sweep_deadlines(now)?;
            let step = chain.apply(&mutation, now)?;
            store.write_snapshot(&Snapshot::of_chain(&chain))?;
            println!("{}", render::format_step(&step));
        }
    }

    Ok(())
}

/// Translate a mutating CLI command into an engine [`Mutation`].
pub fn mutation_for(command: &Command) -> Option<Mutation> {
    let mutation = match command {
        Command::AddChild { id, name } => Mutation::AddChild {
            node: *id,
            name: name.clone(),
        },
        Command::AddSibling { id, name } => Mutation::AddSibling {
            node: *id,
            name: name.clone(),
        },
        Command::Finish { id } => Mutation::Finish(*id),
        Command::Block { id, code } => Mutation::Block {
            node: *id,
            code: code.clone(),
        },
        Command::Unblock { id } => Mutation::Unblock(*id),
        Command::Priority { id, direction } => Mutation::ChangePriority {
            node: *id,
            direction: *direction,
        },
        Command::Rename { id, name } => Mutation::Rename {
            node: *id,
            name: name.clone(),
        },
        Command::Context { id, text } => Mutation::SetContext {
            node: *id,
            context: Some(text.clone()),
        },
        _ => return None,
    };
    Some(mutation)
}

fn load_chain(store: &JsonFileStore, cfg: &ConfigFile, now: DateTime<Utc>) -> Result<MindChain> {
    let snapshot = store.read_snapshot()?.ok_or_else(|| {
        anyhow!(
            "no chain at {:?}; run `mindchain init <name>` first",
            store.path()
        )
    })?;
    let chain = snapshot.restore(cfg.priority, now)?;
    debug!(nodes = chain.graph().len(), "chain loaded");
    Ok(chain)
}

async fn run_watch(chain: MindChain, store: JsonFileStore, cfg: &ConfigFile) -> Result<()> {
    let (tx, rx) = mpsc::channel::<EngineEvent>(64);

    // Ctrl-C → graceful shutdown.
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            eprintln!("failed to listen for Ctrl+C: {e}");
            return;
        }
        let _ = tx.send(EngineEvent::ShutdownRequested).await;
    });

    info!(path = ?store.path(), "watching chain; press Ctrl-C to stop");
    let runtime = Runtime::new(CoreEngine::new(chain), rx, store, SystemClock, cfg.timers);
    let chain = runtime.run().await?;

    print!("{}", render::format_current(&current_tasks(chain.graph())));
    Ok(())
}
