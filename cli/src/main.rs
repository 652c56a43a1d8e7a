//! Console frontend for the Fanorona engine.
//!
//! Pits any two of {human, UCT agent, PUCT agent} against each other, with
//! the match either picked from an interactive menu or preselected with
//! `--mode`. Engine settings come from flags, `FANORONA_*` environment
//! variables or `fanorona.toml`.

use std::io::{self, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod game;
mod players;

use fanorona_core::Board;
use fanorona_mcts::{PuctAgent, PuctConfig, UctAgent, UctConfig, UniformEvaluator};

use crate::config::Config;
use crate::game::{Game, GameEnd};
use crate::players::{HumanPlayer, Player, PuctPlayer, UctPlayer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    HumanHuman,
    HumanAgent,
    AgentAgent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum AgentKind {
    /// Rollout MCTS bounded by wall-clock time.
    Uct,
    /// Evaluator-guided MCTS bounded by an iteration count.
    Puct,
}

#[derive(Debug, Parser)]
#[command(name = "fanorona", about = "Play Fanorona against MCTS agents")]
struct Cli {
    /// Match to play; omit for the interactive menu.
    #[arg(long, value_enum)]
    mode: Option<Mode>,

    /// Which search agent to field.
    #[arg(long, value_enum, default_value = "uct")]
    agent: AgentKind,

    /// Board width (5 or 9).
    #[arg(long)]
    width: Option<usize>,

    /// UCT think time per move, in milliseconds.
    #[arg(long)]
    think_ms: Option<u64>,

    /// PUCT simulations per move.
    #[arg(long)]
    simulations: Option<u32>,

    /// UCT exploration constant.
    #[arg(long)]
    exploration: Option<f64>,

    /// Seed for reproducible agent play.
    #[arg(long)]
    seed: Option<u64>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = config::load_config();
    apply_cli_overrides(&cli, &mut config);

    init_tracing(&config.logging.level);

    match cli.mode {
        Some(mode) => run_match(mode, cli.agent, cli.seed, &config),
        None => run_menu(cli.agent, cli.seed, &config),
    }
}

fn apply_cli_overrides(cli: &Cli, config: &mut Config) {
    if let Some(width) = cli.width {
        config.game.board_width = width;
    }
    if let Some(ms) = cli.think_ms {
        config.uct.decision_time_ms = ms;
    }
    if let Some(n) = cli.simulations {
        config.puct.num_simulations = n;
    }
    if let Some(c) = cli.exploration {
        config.uct.exploration_constant = c;
    }
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn run_menu(agent: AgentKind, seed: Option<u64>, config: &Config) -> Result<()> {
    println!("FANORONA");

    loop {
        println!();
        println!("MENU:");
        println!("[1] Human vs human");
        println!("[2] Human vs agent");
        println!("[3] Agent vs agent");
        println!("[4] Exit");

        match prompt_choice(4)? {
            1 => run_match(Mode::HumanHuman, agent, seed, config)?,
            2 => run_match(Mode::HumanAgent, agent, seed, config)?,
            3 => run_match(Mode::AgentAgent, agent, seed, config)?,
            _ => break,
        }
    }
    println!("Thanks for playing!");
    Ok(())
}

/// Read a 1-based menu selection, re-prompting until it parses and is in
/// range. The stdin lock is taken per read so games can use the console
/// in between.
fn prompt_choice(max: usize) -> Result<usize> {
    loop {
        print!("Option: ");
        io::stdout().flush()?;

        let mut line = String::new();
        let read = io::stdin()
            .read_line(&mut line)
            .context("reading menu choice")?;
        if read == 0 {
            anyhow::bail!("input closed at the menu");
        }
        match line.trim().parse::<usize>() {
            Ok(choice) if (1..=max).contains(&choice) => return Ok(choice),
            _ => println!("Invalid value. Please try again."),
        }
    }
}

fn run_match(mode: Mode, agent: AgentKind, seed: Option<u64>, config: &Config) -> Result<()> {
    let board = Board::new(config.game.board_width)?;
    let show_board = mode != Mode::AgentAgent;
    let mut game = Game::new(board, config.game.move_cap, show_board);

    let mut first = make_player(player_kind(mode, 0), agent, seed, config)?;
    let mut second = make_player(player_kind(mode, 1), agent, seed.map(|s| s ^ 1), config)?;

    let end = game.run(first.as_mut(), second.as_mut())?;
    println!("{}", game.board());
    match end {
        GameEnd::Won(side) => println!("Player {} wins!", side),
        GameEnd::Draw => println!("Draw."),
    }
    info!(?end, "game over");
    Ok(())
}

#[derive(Clone, Copy)]
enum PlayerKind {
    Human,
    Agent,
}

fn player_kind(mode: Mode, index: usize) -> PlayerKind {
    match (mode, index) {
        (Mode::HumanHuman, _) => PlayerKind::Human,
        (Mode::HumanAgent, 0) => PlayerKind::Human,
        (Mode::HumanAgent, _) => PlayerKind::Agent,
        (Mode::AgentAgent, _) => PlayerKind::Agent,
    }
}

fn make_player(
    kind: PlayerKind,
    agent: AgentKind,
    seed: Option<u64>,
    config: &Config,
) -> Result<Box<dyn Player>> {
    match kind {
        PlayerKind::Human => Ok(Box::new(HumanPlayer::console())),
        PlayerKind::Agent => match agent {
            AgentKind::Uct => {
                let uct_config = UctConfig {
                    exploration_constant: config.uct.exploration_constant,
                    decision_budget: Duration::from_millis(config.uct.decision_time_ms),
                    ..UctConfig::default()
                };
                let agent = match seed {
                    Some(seed) => UctAgent::with_seed(uct_config, seed)?,
                    None => UctAgent::new(uct_config)?,
                };
                Ok(Box::new(UctPlayer::new(agent)))
            }
            AgentKind::Puct => {
                let puct_config = PuctConfig::default()
                    .with_simulations(config.puct.num_simulations)
                    .with_c_puct(config.puct.c_puct);
                let evaluator = UniformEvaluator::new();
                let agent = match seed {
                    Some(seed) => PuctAgent::with_seed(puct_config, evaluator, seed)?,
                    None => PuctAgent::new(puct_config, evaluator)?,
                };
                Ok(Box::new(PuctPlayer::new(agent)))
            }
        },
    }
}
