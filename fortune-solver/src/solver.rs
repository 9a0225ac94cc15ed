use super::*;

use ahash::AHashMap;
use anyhow::{Result, bail};
use std::time::{Duration, Instant};

pub const BATCH_SIZE: u64 = 100;
const PROGRESS_INTERVAL: u64 = 10_000;

pub fn solve(board: Board, max_steps: u64, mode: SignatureMode) -> Result<SolveResult> {
    Solver::try_new(board, mode)?.solve(max_steps)
}

/// Steps the search while keeping the positions along the committed history,
/// so that consecutive calls only replay the part of the path that changed.
#[derive(Debug, Clone)]
pub struct Solver {
    initial_board: Board,
    mode: SignatureMode,
    history: Vec<u8>,
    /// `boards[d]` is the position after the first `d` committed moves.
    boards: Vec<Board>,
    signatures: Vec<Signature>,
    visited: AHashMap<Signature, u32>,
    steps: u64,
    batch_size: u64,
}

impl Solver {
    pub fn new(board: Board) -> Self {
        Self::with_mode(board, SignatureMode::default())
    }

    /// Like [`Solver::with_mode`], but refuses a board that doesn't hold
    /// every card exactly once.
    pub fn try_new(board: Board, mode: SignatureMode) -> Result<Self> {
        if !board.is_valid() {
            bail!("Invalid initial board state.");
        }
        Ok(Self::with_mode(board, mode))
    }

    pub fn with_mode(board: Board, mode: SignatureMode) -> Self {
        let signature = mode.signature(&board);
        let mut visited = AHashMap::default();
        visited.insert(signature.clone(), 1);
        Self {
            initial_board: board.clone(),
            mode,
            history: Vec::new(),
            boards: vec![board],
            signatures: vec![signature],
            visited,
            steps: 0,
            batch_size: BATCH_SIZE,
        }
    }

    /// Advances taken between progress checks in [`Solver::solve`].
    pub fn with_batch_size(mut self, batch_size: u64) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn initial_board(&self) -> &Board {
        &self.initial_board
    }

    pub fn mode(&self) -> SignatureMode {
        self.mode
    }

    /// Number of steps taken so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Same as [`advance_with`] on this solver's initial board and mode.
    pub fn advance(&mut self, path: Path) -> Terminus {
        let (&candidate, history) = split_path(&path);
        self.sync(history);
        self.steps += 1;

        let board = &self.boards[self.boards.len() - 1];
        let visited = &self.visited;
        let outcome = trial(board, candidate, self.mode, |signature| {
            visited.contains_key(signature)
        });
        conclude(path, outcome)
    }

    /// Advances up to `n` times, stopping early once the search is over.
    pub fn step_batch(&mut self, terminus: Terminus, n: u64) -> Terminus {
        let mut terminus = terminus;
        for _ in 0..n {
            terminus = match terminus {
                Terminus::Exploring(path) => self.advance(path),
                done => return done,
            };
        }
        terminus
    }

    pub fn solve(&mut self, max_steps: u64) -> Result<SolveResult> {
        log::debug!(
            "solving with {:?} signatures, {} steps per batch",
            self.mode,
            self.batch_size
        );
        let timer = Instant::now();
        let start = self.steps;
        let mut terminus = Terminus::Exploring(new_path());
        let mut batches: u64 = 0;

        loop {
            let steps = self.steps - start;
            match terminus {
                Terminus::Win(path) => {
                    log::debug!("solved in {} moves after {steps} steps", path.len());
                    return Ok(SolveResult {
                        moves: path_moves(&path),
                        path,
                        steps,
                        elapsed: timer.elapsed(),
                    });
                }
                Terminus::Lose => {
                    log::debug!("search space exhausted after {steps} steps");
                    bail!("No solution found.");
                }
                Terminus::Exploring(path) => {
                    if steps >= max_steps {
                        bail!("Unable to solve the game; reached max steps {max_steps}.");
                    }
                    batches += 1;
                    if batches % PROGRESS_INTERVAL == 0 {
                        log::debug!(
                            "progress: {:>12} steps {:>4} deep {:8.0?}",
                            steps,
                            path.len(),
                            timer.elapsed()
                        );
                    }
                    let n = self.batch_size.min(max_steps - steps);
                    terminus = self.step_batch(Terminus::Exploring(path), n);
                }
            }
        }
    }

    fn sync(&mut self, history: &[u8]) {
        let common = self.common_prefix(history);

        while self.history.len() > common {
            self.history.pop();
            self.boards.pop();
            if let Some(signature) = self.signatures.pop() {
                self.forget(&signature);
            }
        }

        for (depth, &index) in history.iter().enumerate().skip(common) {
            let mut board = self.boards[depth].clone();
            replay_move(&mut board, depth, index);
            let signature = self.mode.signature(&board);
            *self.visited.entry(signature.clone()).or_default() += 1;
            self.history.push(index);
            self.boards.push(board);
            self.signatures.push(signature);
        }
    }

    /// Length of the prefix `history` shares with the cached one.
    ///
    /// Paths handed back by [`Solver::advance`] only change at the end, so the
    /// cached history is nearly always a prefix of the new one or the other
    /// way round. That case is settled with a single slice comparison; only a
    /// jump elsewhere in the tree falls back to walking frame by frame.
    fn common_prefix(&self, history: &[u8]) -> usize {
        let shared = self.history.len().min(history.len());
        if self.history[..shared] == history[..shared] {
            return shared;
        }
        self.history
            .iter()
            .zip(history)
            .take_while(|(a, b)| a == b)
            .count()
    }

    fn forget(&mut self, signature: &Signature) {
        if let Some(count) = self.visited.get_mut(signature) {
            *count -= 1;
            if *count == 0 {
                self.visited.remove(signature);
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct SolveResult {
    pub moves: Vec<Move>,
    pub path: Path,
    pub steps: u64,
    pub elapsed: Duration,
}
