//! tilechess - developer tooling for the engine.
//!
//! Runs perft counts, searches positions on the background scheduler and
//! prints positions with their derived state.

use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tilechess_core::Fen;
use tilechess_engine::{
    perft, perft_divide, submit_search, EngineConfig, JobScheduler, Position,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tilechess")]
#[command(about = "Perft, search and inspection for the tilechess engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Count the leaf nodes of the legal move tree
    Perft {
        /// Depth in plies
        depth: u32,
        /// Position to start from (defaults to the standard start)
        #[arg(long)]
        fen: Option<String>,
        /// Print the node count below every root move
        #[arg(long)]
        divide: bool,
    },
    /// Search for the best move on a background worker
    Bestmove {
        /// Position to search (defaults to the configured start)
        #[arg(long)]
        fen: Option<String>,
        /// Search depth (defaults to half the configured maximum)
        #[arg(short, long)]
        depth: Option<u8>,
        /// Path to the engine configuration
        #[arg(short, long, default_value = "engine.toml")]
        config: PathBuf,
    },
    /// Print a position with its FEN, hash, check state and legal moves
    Inspect {
        /// Position to inspect (defaults to the standard start)
        #[arg(long)]
        fen: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Perft { depth, fen, divide } => run_perft(fen.as_deref(), depth, divide),
        Commands::Bestmove { fen, depth, config } => run_bestmove(fen.as_deref(), depth, config),
        Commands::Inspect { fen } => run_inspect(fen.as_deref()),
    }
}

fn load_position(fen: Option<&str>) -> anyhow::Result<Position> {
    let fen = fen.unwrap_or(Fen::STARTPOS);
    Position::from_fen(fen).with_context(|| format!("invalid FEN '{fen}'"))
}

fn run_perft(fen: Option<&str>, depth: u32, divide: bool) -> anyhow::Result<()> {
    let mut position = load_position(fen)?;
    let start = Instant::now();

    if divide {
        let results = perft_divide(&mut position, depth);
        let mut total = 0u64;
        for (mv, nodes) in &results {
            println!("{mv}: {nodes}");
            total += nodes;
        }
        println!();
        println!("Moves: {}", results.len());
        println!("Nodes: {total}");
    } else {
        let stats = perft(&mut position, depth);
        println!("Nodes:       {}", stats.nodes);
        println!("Captures:    {}", stats.captures);
        println!("En passants: {}", stats.en_passants);
        println!("Castles:     {}", stats.castles);
        println!("Promotions:  {}", stats.promotions);
        println!("Checks:      {}", stats.checks);
    }

    let elapsed = start.elapsed();
    println!("Time:        {:.3}s", elapsed.as_secs_f64());
    Ok(())
}

fn run_bestmove(fen: Option<&str>, depth: Option<u8>, config_path: PathBuf) -> anyhow::Result<()> {
    let config = EngineConfig::load_from(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    let position = match fen {
        Some(_) => load_position(fen)?,
        None => config.start_position()?,
    };
    let depth = depth.unwrap_or_else(|| config.search_depth());

    let scheduler = JobScheduler::new(config.worker_threads());
    tracing::debug!(depth, fen = %position.to_fen(), "submitting search");
    let (tx, rx) = mpsc::channel();
    let start = Instant::now();
    submit_search(&scheduler, &position, depth, move |outcome| {
        let _ = tx.send(outcome);
    });
    let outcome = rx.recv().context("search worker stopped before reporting")?;
    let elapsed = start.elapsed();

    println!(
        "info depth {} score cp {} nodes {} time {}",
        outcome.depth,
        outcome.score,
        outcome.nodes,
        elapsed.as_millis()
    );
    match outcome.best_move {
        Some(mv) => println!("bestmove {mv}"),
        None => println!("bestmove (none)"),
    }
    Ok(())
}

fn run_inspect(fen: Option<&str>) -> anyhow::Result<()> {
    let position = load_position(fen)?;
    let legal = position.legal_moves();

    println!("{position}");
    println!();
    println!("FEN:   {}", position.to_fen());
    println!("Hash:  {:016x}", position.hash());
    println!("Turn:  {}", position.turn());
    println!("Check: {}", position.in_check());
    if legal.is_empty() {
        let state = if position.in_check() {
            "checkmate"
        } else {
            "stalemate"
        };
        println!("State: {state}");
    }
    let moves: Vec<String> = legal.iter().map(|m| m.to_uci()).collect();
    println!("Legal moves ({}): {}", moves.len(), moves.join(" "));
    Ok(())
}
