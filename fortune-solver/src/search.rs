use fortune_common::board::{Board, Signature};
use fortune_common::move_::{LAST_MOVE, Move};

use ahash::AHashSet;

/// Move-table indices: committed moves followed by the candidate on trial.
pub type Path = Vec<u8>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Terminus {
    Exploring(Path),
    /// The full move sequence that solved the puzzle.
    Win(Path),
    Lose,
}

impl Terminus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Terminus::Exploring(_))
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Terminus::Exploring(path) | Terminus::Win(path) => Some(path),
            Terminus::Lose => None,
        }
    }
}

/// The key used to recognise a position that was already on the path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SignatureMode {
    /// Tableau contents only; positions that differ in homes, Arcana or stow
    /// are considered the same.
    #[default]
    Tableau,
    /// The tableau plus homes, Arcana row and stow.
    Full,
}

impl SignatureMode {
    pub fn signature(self, board: &Board) -> Signature {
        match self {
            SignatureMode::Tableau => board.canonical_signature(),
            SignatureMode::Full => board.full_signature(),
        }
    }
}

pub fn new_path() -> Path {
    vec![0]
}

/// Advances the search by one step from `path`, rebuilding the current
/// position from `initial` every time.
pub fn advance(initial: &Board, path: Path) -> Terminus {
    advance_with(initial, path, SignatureMode::default())
}

pub fn advance_with(initial: &Board, path: Path, mode: SignatureMode) -> Terminus {
    let (&candidate, history) = split_path(&path);

    let mut board = initial.clone();
    let mut visited = AHashSet::new();
    visited.insert(mode.signature(&board));
    for (depth, &index) in history.iter().enumerate() {
        replay_move(&mut board, depth, index);
        visited.insert(mode.signature(&board));
    }

    let outcome = trial(&board, candidate, mode, |signature| {
        visited.contains(signature)
    });
    conclude(path, outcome)
}

/// The position reached after playing `moves` from `initial`.
pub fn replay(initial: &Board, moves: &[u8]) -> Board {
    let mut board = initial.clone();
    for (depth, &index) in moves.iter().enumerate() {
        replay_move(&mut board, depth, index);
    }
    board
}

pub fn path_moves(path: &[u8]) -> Vec<Move> {
    path.iter().map(|&index| Move::from_index(index)).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Trial {
    Solved,
    Descend,
    Rejected,
}

pub(crate) fn split_path(path: &[u8]) -> (&u8, &[u8]) {
    match path.split_last() {
        Some(split) => split,
        None => panic!("search path must hold at least one frame"),
    }
}

pub(crate) fn replay_move(board: &mut Board, depth: usize, index: u8) {
    let mov = Move::from_index(index);
    if let Err(err) = board.perform_move(mov) {
        panic!("search path is corrupt: move #{depth} ({mov}) can't be replayed: {err}");
    }
}

/// Tries the candidate move on `board`. A move is only worth descending into
/// when it is legal and leads to a position not yet seen on the path.
pub(crate) fn trial(
    board: &Board,
    candidate: u8,
    mode: SignatureMode,
    is_visited: impl Fn(&Signature) -> bool,
) -> Trial {
    let Ok(next) = board.clone().apply_move(Move::from_index(candidate)) else {
        return Trial::Rejected;
    };
    if is_visited(&mode.signature(&next)) {
        Trial::Rejected
    } else if next.is_solved() {
        Trial::Solved
    } else {
        Trial::Descend
    }
}

pub(crate) fn conclude(mut path: Path, outcome: Trial) -> Terminus {
    match outcome {
        Trial::Solved => Terminus::Win(path),
        Trial::Descend => {
            path.push(0);
            Terminus::Exploring(path)
        }
        Trial::Rejected => {
            let candidate = path.pop().unwrap_or(LAST_MOVE);
            if candidate < LAST_MOVE {
                path.push(candidate + 1);
                Terminus::Exploring(path)
            } else {
                backtrack(path)
            }
        }
    }
}

/// Drops the trailing frames whose candidates are all used up, then moves the
/// deepest remaining frame on to its next candidate.
///
/// Only the trailing run is dropped. An exhausted frame further up still has
/// live frames below it, and cutting back to it would skip their siblings.
fn backtrack(mut history: Path) -> Terminus {
    let exhausted = history
        .iter()
        .rev()
        .take_while(|&&frame| frame == LAST_MOVE)
        .count();
    history.truncate(history.len() - exhausted);
    match history.last_mut() {
        Some(frame) => {
            *frame += 1;
            Terminus::Exploring(history)
        }
        None => Terminus::Lose,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fortune_common::board::Column;
    use fortune_common::card::Card;
    use fortune_common::move_::{MOVES, MoveFrom, MoveTo};

    fn card(token: &str) -> Card {
        Card::parse(token).unwrap()
    }

    /// Everything on goal except the hearts above `hearts_top`; the listed
    /// columns hold the rest.
    fn endgame(hearts_top: &str, columns: &[&[&str]]) -> Board {
        let mut board = Board::new();
        for rank in 0..22 {
            board.arcana[rank as usize] = Card::arcana(rank);
        }
        board.homes = [
            Some(card(hearts_top)),
            Some(card("Kd")),
            Some(card("Kc")),
            Some(card("Ks")),
        ];
        for (i, tokens) in columns.iter().enumerate() {
            board.field[i] = Column::new(tokens.iter().map(|t| card(t)).collect());
        }
        board
    }

    fn run(initial: &Board, limit: usize) -> (Terminus, usize) {
        let mut terminus = Terminus::Exploring(new_path());
        for steps in 0..limit {
            terminus = match terminus {
                Terminus::Exploring(path) => advance(initial, path),
                done => return (done, steps),
            };
        }
        (terminus, limit)
    }

    #[test]
    fn test_single_move_win() {
        let column = ["Kh", "Qh", "Jh", "10h", "9h", "8h", "7h", "6h", "5h", "4h", "3h", "2h"];
        let board = endgame("Ah", &[&column]);
        assert!(board.is_valid());

        let terminus = advance(&board, new_path());
        assert_eq!(terminus, Terminus::Exploring(vec![1]));
        let terminus = advance(&board, vec![1]);
        assert_eq!(terminus, Terminus::Win(vec![1]));
        assert_eq!(MOVES[1].to_string(), "1→goal");
    }

    #[test]
    fn test_two_move_win() {
        let board = endgame("Jh", &[&["Kh"], &["Qh"]]);
        assert!(board.is_valid());

        let (terminus, steps) = run(&board, 100);
        assert_eq!(terminus, Terminus::Win(vec![2, 1]));
        assert_eq!(steps, 5);
        assert!(replay(&board, &[2, 1]).is_solved());
    }

    #[test]
    fn test_exhausted_search_loses() {
        // The Queen and Jack of hearts are missing, so the King can never leave.
        let board = endgame("10h", &[&["Kh"]]);
        let (terminus, steps) = run(&board, 10_000);
        assert_eq!(terminus, Terminus::Lose);
        assert!(steps > LAST_MOVE as usize, "{steps}");
    }

    #[test]
    fn test_conclude() {
        assert_eq!(conclude(vec![5, 9], Trial::Solved), Terminus::Win(vec![5, 9]));
        assert_eq!(
            conclude(vec![5, 9], Trial::Descend),
            Terminus::Exploring(vec![5, 9, 0])
        );
        assert_eq!(
            conclude(vec![5, 9], Trial::Rejected),
            Terminus::Exploring(vec![5, 10])
        );
    }

    #[test]
    fn test_backtrack_over_exhausted_frames() {
        let last = LAST_MOVE;
        assert_eq!(
            conclude(vec![3, 7, last], Trial::Rejected),
            Terminus::Exploring(vec![3, 8])
        );
        assert_eq!(
            conclude(vec![3, last, last], Trial::Rejected),
            Terminus::Exploring(vec![4])
        );
        assert_eq!(
            conclude(vec![3, last, 7, last], Trial::Rejected),
            Terminus::Exploring(vec![3, last, 8])
        );
        assert_eq!(conclude(vec![last, last, last], Trial::Rejected), Terminus::Lose);
        assert_eq!(conclude(vec![last], Trial::Rejected), Terminus::Lose);
    }

    #[test]
    fn test_trial() {
        let board = endgame("Jh", &[&["Kh"], &["Qh"]]);
        let never = |_: &Signature| false;
        let index = |from: MoveFrom, to: MoveTo| Move::new(from, to).index();

        let king_to_goal = index(MoveFrom::Column(0), MoveTo::Goal);
        let empty_to_goal = index(MoveFrom::Column(5), MoveTo::Goal);
        assert_eq!(trial(&board, king_to_goal, SignatureMode::Tableau, never), Trial::Rejected);
        assert_eq!(trial(&board, empty_to_goal, SignatureMode::Tableau, never), Trial::Rejected);

        let king_to_stow = index(MoveFrom::Column(0), MoveTo::Stow);
        assert_eq!(trial(&board, king_to_stow, SignatureMode::Tableau, never), Trial::Descend);
        assert_eq!(
            trial(&board, king_to_stow, SignatureMode::Tableau, |_| true),
            Trial::Rejected
        );

        // The Queen lands on the King and both cascade home.
        let queen_on_king = index(MoveFrom::Column(1), MoveTo::Column(0));
        assert_eq!(trial(&board, queen_on_king, SignatureMode::Full, never), Trial::Solved);
    }

    #[test]
    fn test_revisited_position_is_rejected() {
        // Moving the lone card to another column gives the same tableau.
        let board = endgame("10h", &[&["Kh"]]);
        let to_column = Move::new(MoveFrom::Column(0), MoveTo::Column(1)).index();
        assert!(board.is_move_legal(MOVES[to_column as usize]));
        assert_eq!(
            advance(&board, vec![to_column]),
            Terminus::Exploring(vec![to_column + 1])
        );
    }

    #[test]
    fn test_signature_mode() {
        // Stow to goal leaves the tableau as it was, so only the full
        // signature tells the two positions apart.
        let mut board = endgame("10h", &[&["Kh"]]);
        board.arcana[21] = None;
        board.stow = Card::arcana(21);

        assert_eq!(advance(&board, new_path()), Terminus::Exploring(vec![1]));
        assert_eq!(
            advance_with(&board, new_path(), SignatureMode::Full),
            Terminus::Exploring(vec![0, 0])
        );
    }

    #[test]
    fn test_terminus_accessors() {
        assert!(!Terminus::Exploring(new_path()).is_terminal());
        assert!(Terminus::Win(vec![1]).is_terminal());
        assert!(Terminus::Lose.is_terminal());
        assert_eq!(Terminus::Win(vec![1]).path(), Some(&vec![1]));
        assert_eq!(Terminus::Lose.path(), None);
        assert_eq!(path_moves(&[1, 25]), vec![MOVES[1], MOVES[25]]);
    }

    #[test]
    #[should_panic(expected = "at least one frame")]
    fn test_empty_path_panics() {
        advance(&Board::new(), Vec::new());
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_out_of_range_candidate_panics() {
        advance(&Board::new(), vec![LAST_MOVE + 1]);
    }

    #[test]
    #[should_panic(expected = "can't be replayed")]
    fn test_illegal_history_panics() {
        advance(&Board::new(), vec![1, 0]);
    }
}
