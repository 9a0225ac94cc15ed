mod utils;

use crate::utils::*;

use anyhow::{Context, Result};
use clap::Parser;
use fortune_common::{board::Board, move_::format_moves};
use fortune_solver::{BATCH_SIZE, SignatureMode, Solver};

use std::{
    io::{IsTerminal, Read, stdin},
    path::PathBuf,
};

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Deal a shuffled deck from this seed
    #[arg(short, long, value_name = "SEED")]
    seed: Option<u64>,
    /// Search steps taken between progress checks
    #[arg(short, long, default_value_t = BATCH_SIZE, value_name = "NUM")]
    batch: u64,
    /// Max search steps to take
    #[arg(short, long, default_value_t = 50_000_000, value_name = "NUM")]
    max_steps: u64,
    /// Detect cycles on the whole position instead of the tableau alone
    #[arg(long)]
    full_signature: bool,
    /// Preview initial game state without solving
    #[arg(short, long)]
    preview: bool,
    /// Print every move of the solution with the board it leads to
    #[arg(short, long)]
    replay: bool,
    /// Log search progress
    #[arg(short, long)]
    verbose: bool,
    /// Path to a layout file to solve
    file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let Cli {
        seed,
        batch,
        max_steps,
        full_signature,
        preview,
        replay,
        verbose,
        file,
    } = Cli::parse();
    init_logger(verbose)?;

    let board = if let Some(file) = file {
        let content = std::fs::read_to_string(&file)
            .with_context(|| format!("Failed to read {}", file.display()))?;
        Board::parse(&content).context("Failed to parse board")?
    } else if let Some(seed) = seed {
        Board::new_from_seed(seed)
    } else if !stdin().is_terminal() {
        let mut content = String::new();
        stdin()
            .read_to_string(&mut content)
            .context("Failed to read from stdin")?;
        Board::parse(&content).context("Failed to parse board")?
    } else {
        let seed = rand::random();
        log::info!("dealing seed {seed}");
        Board::new_from_seed(seed)
    };
    if preview {
        println!("{}\n\n{}", board.pretty_print(), board.to_layout_string());
        return Ok(());
    }

    let mode = if full_signature {
        SignatureMode::Full
    } else {
        SignatureMode::Tableau
    };
    let solver = Solver::try_new(board.clone(), mode)?.with_batch_size(batch);
    let result = do_solve(solver, max_steps, !verbose)?;
    if replay {
        print_replay(&board, &result.moves)?;
    } else {
        println!("{}", format_moves(&result.moves));
    }

    Ok(())
}
