use anyhow::{Context, Result};
use fortune_common::{
    board::Board,
    move_::{Move, describe_move},
};
use fortune_solver::{SolveResult, Solver};
use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, TermLogger, TerminalMode};

use std::{
    io::{IsTerminal, Write, stderr},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

const SPINNER_FRAMES: [char; 4] = ['|', '/', '-', '\\'];
const SPINNER_TICK: Duration = Duration::from_millis(100);

/// Logs go to stderr so that stdout only carries the board and the solution.
pub fn init_logger(verbose: bool) -> Result<()> {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let config = ConfigBuilder::new()
        .set_location_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Off)
        .set_thread_level(LevelFilter::Off)
        .build();
    TermLogger::init(level, config, TerminalMode::Stderr, ColorChoice::Auto)
        .context("Failed to initialize logger")
}

pub fn do_solve(mut solver: Solver, max_steps: u64, spinner: bool) -> Result<SolveResult> {
    println!("{}\n", solver.initial_board().pretty_print());
    let mut run = move || solver.solve(max_steps);
    let result = if spinner {
        with_spinner("Solving the game...", run)
    } else {
        run()
    }?;
    let elapsed_str = format_elapsed(result.elapsed);
    println!(
        "✓ Solved in {} Moves, Time: {elapsed_str}, Steps: {}\n",
        result.moves.len(),
        result.steps
    );
    Ok(result)
}

pub fn print_replay(board: &Board, moves: &[Move]) -> Result<()> {
    let mut board = board.clone();
    let total = moves.len();
    for (index, &mov) in moves.iter().enumerate() {
        println!("{:03}/{total:03} {}", index + 1, describe_move(&board, mov));
        board
            .perform_move(mov)
            .with_context(|| format!("Failed to replay {mov}"))?;
        println!("{}\n", board.pretty_print());
    }
    Ok(())
}

/// Runs `f` while a spinner turns on stderr. Does nothing special when
/// stderr isn't a terminal.
fn with_spinner<T, F: FnOnce() -> T>(message: &'static str, f: F) -> T {
    if !stderr().is_terminal() {
        return f();
    }

    let running = Arc::new(AtomicBool::new(true));
    let spinner = {
        let running = Arc::clone(&running);
        std::thread::spawn(move || {
            let mut out = stderr().lock();
            let _ = write!(out, "\x1b[?25l");
            for frame in SPINNER_FRAMES.iter().cycle() {
                if !running.load(Ordering::Relaxed) {
                    break;
                }
                let _ = write!(out, "\r{frame} {message}");
                let _ = out.flush();
                std::thread::sleep(SPINNER_TICK);
            }
            let _ = write!(out, "\r\x1b[2K\r\x1b[?25h");
            let _ = out.flush();
        })
    };

    let result = f();
    running.store(false, Ordering::Relaxed);
    let _ = spinner.join();
    result
}

fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    if secs < 90 {
        let ms = elapsed.subsec_millis();
        format!("{secs}.{ms:03}s")
    } else {
        let minutes = secs / 60;
        let secs = secs % 60;
        format!("{minutes}m {secs}s")
    }
}
