//! Cube Games - Unified CLI
//!
//! 3x3x3 tic-tac-toe in the terminal.

#![warn(missing_docs)]

mod cli;

use anyhow::{Result, bail};
use clap::Parser;
use cli::{Cli, Command};
use cube_games::{
    Event, GameConfig, GameController, GameRuntime, GameView, InMemoryChannel, Phase, SyncAdapter,
    TextView, gate_from_config,
};
use cube_tictactoe::{Difficulty, choose_move};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, instrument, warn};
use tracing_subscriber::EnvFilter;

/// Upper bound on duel loop iterations.
const DUEL_STEP_LIMIT: usize = 10_000;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    match cli.command {
        Command::Local => run_local(config).await,
        Command::Ai { difficulty } => {
            let difficulty = difficulty.unwrap_or(*config.default_difficulty());
            run_ai(config, difficulty).await
        }
        Command::Duel {
            host,
            guest,
            rounds,
            seed,
        } => run_duel(config, host, guest, rounds, seed).await,
    }
}

/// Reads the config file, or falls back to defaults when it is absent.
#[instrument]
fn load_config(path: &Path) -> Result<GameConfig> {
    if path.exists() {
        Ok(GameConfig::from_file(path)?)
    } else {
        info!("No config file, using defaults");
        Ok(GameConfig::default())
    }
}

/// Forwards stdin lines to the runtime as events.
fn spawn_stdin_reader(tx: mpsc::UnboundedSender<Event>) {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            let event = match lines.next_line().await {
                Ok(Some(line)) => match cli::parse_input(&line) {
                    Some(event) => event,
                    None => {
                        println!("Enter 'layer row col' (0-2 each), 'again', 'menu' or 'quit'");
                        continue;
                    }
                },
                Ok(None) => Event::Quit,
                Err(e) => {
                    warn!(error = %e, "Failed to read input");
                    Event::Quit
                }
            };
            let quit = event == Event::Quit;
            if tx.send(event).is_err() || quit {
                break;
            }
        }
    });
}

/// Run a local two-player game
async fn run_local(config: GameConfig) -> Result<()> {
    let mut runtime = GameRuntime::new(GameController::new(config), TextView::stdout());
    runtime.start_local();
    spawn_stdin_reader(runtime.sender());
    runtime.run().await;
    Ok(())
}

/// Run a game against the AI
async fn run_ai(config: GameConfig, difficulty: Difficulty) -> Result<()> {
    info!(%difficulty, "Starting AI game");
    let mut runtime = GameRuntime::new(GameController::new(config), TextView::stdout());
    runtime.start_ai(difficulty);
    spawn_stdin_reader(runtime.sender());
    runtime.run().await;
    Ok(())
}

/// View for the duel's second client; the host's view shows the game.
struct Silent;

impl GameView for Silent {
    fn render(&mut self, _controller: &GameController) {}
}

/// Play an online game between two in-process clients
#[instrument(skip(config))]
async fn run_duel(
    config: GameConfig,
    host: String,
    guest: String,
    rounds: u32,
    seed: u64,
) -> Result<()> {
    let difficulty = *config.default_difficulty();
    let gate = gate_from_config(&config);
    let config = GameConfig::instant().with_default_difficulty(difficulty);
    let channel = Arc::new(InMemoryChannel::new());

    let mut host_rt = GameRuntime::new(
        GameController::with_seed(config.clone(), seed),
        TextView::stdout(),
    )
    .with_adapter(SyncAdapter::new(channel.clone(), gate.clone(), None).with_seed(seed));
    let mut guest_rt = GameRuntime::new(GameController::with_seed(config, seed + 1), Silent)
        .with_adapter(SyncAdapter::new(channel, gate, None));

    let code = host_rt.create_room(&host).await?;
    guest_rt.join_room(code.as_str(), &guest).await?;
    info!(room = %code, "Duel started");

    let mut rng = StdRng::seed_from_u64(seed);
    let mut finished = 0;
    for _ in 0..DUEL_STEP_LIMIT {
        host_rt.settle().await;
        guest_rt.settle().await;

        if host_rt.controller().phase() == Phase::GameOver
            && guest_rt.controller().phase() == Phase::GameOver
        {
            finished += 1;
            if finished >= rounds {
                break;
            }
            host_rt.handle(Event::PlayAgain).await;
            continue;
        }

        if !play_turn(&mut host_rt, difficulty, &mut rng).await {
            play_turn(&mut guest_rt, difficulty, &mut rng).await;
        }
    }

    if finished < rounds {
        bail!("Duel did not finish {} rounds", rounds);
    }

    let tally = *host_rt.controller().tally();
    println!(
        "Final score: {host} {} - {} {guest} ({} draws)",
        tally.a_wins(),
        tally.b_wins(),
        tally.draws()
    );
    guest_rt.handle(Event::Quit).await;
    host_rt.handle(Event::Quit).await;
    Ok(())
}

/// Plays for this client if it is its turn. Returns whether a move was made.
async fn play_turn<V: GameView>(
    runtime: &mut GameRuntime<V>,
    difficulty: Difficulty,
    rng: &mut StdRng,
) -> bool {
    let controller = runtime.controller();
    let Some(session) = controller.session() else {
        return false;
    };
    let mark = *session.active_mark();
    if controller.phase() != Phase::Playing || *session.local_mark() != Some(mark) {
        return false;
    }
    let Some(coord) = choose_move(session.board(), mark, difficulty, mark.opponent(), rng) else {
        return false;
    };
    runtime.handle(Event::CellClicked(coord)).await;
    true
}
