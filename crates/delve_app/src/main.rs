mod config;
mod input;
mod messages;
mod render;
mod turn;

use std::io;

use anyhow::{Context, Result};
use clap::Parser;
use config::Args;
use input::{InputSource, LineInput, ScriptedInput};
use tokio::sync::oneshot;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use turn::{RunSummary, TurnLoop};

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so they never interleave with the map on stdout.
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("delve_app=info".parse()?)
                .add_directive("delve_game=info".parse()?),
        )
        .init();

    let args = Args::parse();
    let level = args.level_text()?;
    let world_config = args.world_config()?;
    info!(
        level = %args.level.as_ref().map_or("built-in".into(), |p| p.display().to_string()),
        scripted = args.script.is_some(),
        turns = args.turns,
        "starting"
    );

    // The world is single-threaded, so it lives on one blocking thread for
    // the whole run. Only its quit handle crosses back to the runtime.
    let (quit_tx, quit_rx) = oneshot::channel();
    let script = args.script.clone();
    let max_turns = args.turns;
    let game = tokio::task::spawn_blocking(move || -> Result<RunSummary> {
        let input: Box<dyn InputSource> = match script {
            Some(keys) => Box::new(ScriptedInput::new(&keys)),
            None => Box::new(LineInput::new(io::stdin().lock())),
        };
        let mut turn_loop =
            TurnLoop::new(&level, world_config, input, io::stdout().lock(), max_turns)?;
        // The receiver only goes away if main is already unwinding.
        let _ = quit_tx.send(turn_loop.quit_handle());
        turn_loop.run()
    });

    if let Ok(quit) = quit_rx.await {
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("interrupted, stopping after the current turn");
                    quit.request();
                }
                Err(e) => warn!(%e, "ctrl-c handler unavailable"),
            }
        });
    }

    let summary = game.await.context("game thread panicked")??;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }
    Ok(())
}
