//! A resumable depth-first solver for Fortune Solitaire.
//!
//! The search state is a plain path of move-table indices: every frame but the
//! last is a committed move, the last one is the candidate being tried. Each
//! call to [`advance`] consumes a path and returns the next one, so a driver
//! can run the search a few steps at a time and stop whenever it likes.
mod search;
mod solver;

pub use crate::search::{
    Path, SignatureMode, Terminus, advance, advance_with, new_path, path_moves, replay,
};
pub use crate::solver::{BATCH_SIZE, SolveResult, Solver, solve};

use crate::search::*;

use fortune_common::board::{Board, Signature};
use fortune_common::move_::Move;
