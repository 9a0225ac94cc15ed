use crate::board::{Board, TOTAL_COLUMNS};
use crate::card::Card;

use std::fmt;

pub const TOTAL_SOURCES: usize = TOTAL_COLUMNS + 1;
pub const TOTAL_TARGETS: usize = TOTAL_COLUMNS + 2;
pub const TOTAL_MOVES: usize = TOTAL_SOURCES * TOTAL_TARGETS;
pub const LAST_MOVE: u8 = (TOTAL_MOVES - 1) as u8;

/// Every move the search may try, with `to` varying slower (goal, columns,
/// stow) and `from` varying faster (stow, columns). Moves are referred to by
/// their index into this table everywhere else.
pub static MOVES: [Move; TOTAL_MOVES] = build_move_table();

const fn build_move_table() -> [Move; TOTAL_MOVES] {
    let mut moves = [Move::new(MoveFrom::Stow, MoveTo::Goal); TOTAL_MOVES];
    let mut i = 0;
    while i < TOTAL_MOVES {
        moves[i] = Move::new(
            MoveFrom::from_slot(i % TOTAL_SOURCES),
            MoveTo::from_slot(i / TOTAL_SOURCES),
        );
        i += 1;
    }
    moves
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveFrom {
    Stow,
    Column(u8),
}

impl MoveFrom {
    const fn from_slot(slot: usize) -> Self {
        match slot {
            0 => MoveFrom::Stow,
            _ => MoveFrom::Column((slot - 1) as u8),
        }
    }

    fn slot(self) -> usize {
        match self {
            MoveFrom::Stow => 0,
            MoveFrom::Column(c) => c as usize + 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveTo {
    Goal,
    Column(u8),
    Stow,
}

impl MoveTo {
    const fn from_slot(slot: usize) -> Self {
        match slot {
            0 => MoveTo::Goal,
            s if s == TOTAL_TARGETS - 1 => MoveTo::Stow,
            _ => MoveTo::Column((slot - 1) as u8),
        }
    }

    fn slot(self) -> usize {
        match self {
            MoveTo::Goal => 0,
            MoveTo::Column(c) => c as usize + 1,
            MoveTo::Stow => TOTAL_TARGETS - 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: MoveFrom,
    pub to: MoveTo,
}

impl Move {
    pub const fn new(from: MoveFrom, to: MoveTo) -> Self {
        Self { from, to }
    }

    /// Looks a move up in the move table.
    ///
    /// Panics when `index` is outside the table; indices only ever come from
    /// the table itself, so an out-of-range one is a caller bug.
    pub fn from_index(index: u8) -> Self {
        match MOVES.get(index as usize) {
            Some(mov) => *mov,
            None => panic!("move index {index} is out of range 0..={LAST_MOVE}"),
        }
    }

    pub fn index(&self) -> u8 {
        (self.to.slot() * TOTAL_SOURCES + self.from.slot()) as u8
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.from {
            MoveFrom::Stow => write!(f, "stow")?,
            MoveFrom::Column(c) => write!(f, "{}", c + 1)?,
        }
        match self.to {
            MoveTo::Goal => write!(f, "→goal"),
            MoveTo::Column(c) => write!(f, "→{}", c + 1),
            MoveTo::Stow => write!(f, "→stow"),
        }
    }
}

pub fn format_moves(moves: &[Move]) -> String {
    let list: Vec<String> = moves
        .iter()
        .map(|mov| {
            let from = match mov.from {
                MoveFrom::Stow => "S".to_string(),
                MoveFrom::Column(c) => format!("T{}", c + 1),
            };
            let to = match mov.to {
                MoveTo::Goal => "G".to_string(),
                MoveTo::Column(c) => format!("T{}", c + 1),
                MoveTo::Stow => "S".to_string(),
            };
            format!("{from}:{to}")
        })
        .collect();

    let mut output = String::new();
    let max_width = list.iter().map(|s| s.len()).max().unwrap_or_default() + 1;
    for chunk in list.chunks(10) {
        for cmd in chunk {
            output.push_str(&format!("{cmd:<width$}", width = max_width));
        }
        output.push('\n');
    }

    output
}

pub fn describe_move(board: &Board, mov: Move) -> String {
    let format_card =
        |card: Option<Card>| -> String { card.map(|c| c.to_string()).unwrap_or_default() };

    let from_card = format_card(board.source_card(mov.from));
    let from = match mov.from {
        MoveFrom::Stow => "(Stow)".to_string(),
        MoveFrom::Column(c) => format!("(Tableau{})", c + 1),
    };
    let to = match mov.to {
        MoveTo::Goal => "(Goal)".to_string(),
        MoveTo::Column(c) => {
            let to_card = format_card(board.field[c as usize].peek_top());
            format!("(Tableau{}) {to_card}", c + 1)
        }
        MoveTo::Stow => "(Stow)".to_string(),
    };
    format!("{from} {from_card} -> {to}").trim_end().to_string()
}
