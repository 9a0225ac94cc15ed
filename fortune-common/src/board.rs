use crate::card::{Card, Suit, TOTAL_ARCANA, TOTAL_CARDS, TOTAL_HOMES};
use crate::move_::{Move, MoveFrom, MoveTo};

use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};
use smallvec::SmallVec;
use thiserror::Error;

pub const TOTAL_COLUMNS: usize = 11;
pub const CENTER_COLUMN: usize = 5;

const COLUMN_SIZE: usize = 16;
const SIGNATURE_SIZE: usize = 128;
const SEPARATOR: u8 = u8::MAX;

/// Hashable key of a position, used by the search to detect cycles.
pub type Signature = SmallVec<[u8; SIGNATURE_SIZE]>;

/// Why a move was rejected by the rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("Can't move from stow: stow is empty")]
    EmptyStow,
    #[error("Can't move from column {}: column is empty", .0 + 1)]
    EmptyColumn(u8),
    #[error("Can't move to stow: stow is occupied")]
    StowOccupied,
    #[error("Can't move card to same space")]
    NoOpMove,
    #[error("Can't put {0} on goal")]
    IllegalGoalPlacement(Card),
    #[error("Can't put {card} on column {}", .column + 1)]
    IllegalColumnPlacement { card: Card, column: u8 },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Board {
    /// Goal row, one slot per Arcana rank.
    pub arcana: [Option<Card>; TOTAL_ARCANA],
    /// Top card of each standard home, indexed by suit. Homes always ascend
    /// from the Ace, so the top card determines the whole pile.
    pub homes: [Option<Card>; TOTAL_HOMES],
    pub stow: Option<Card>,
    pub field: [Column; TOTAL_COLUMNS],
}

impl Board {
    pub fn new() -> Self {
        Default::default()
    }

    /// Deals `deck` in order: standard aces go straight to their home, every
    /// other card is dealt round-robin into the columns, leaving the centre
    /// column empty.
    pub fn deal(deck: &[Card]) -> Self {
        let mut board = Board::new();
        let mut put: i32 = -1;
        for &card in deck {
            if !card.is_arcana() && card.rank() == 0 {
                board.homes[card.suit().index()] = Some(card);
                continue;
            }
            put += if put % TOTAL_COLUMNS as i32 == CENTER_COLUMN as i32 - 1 {
                2
            } else {
                1
            };
            board.field[put as usize % TOTAL_COLUMNS].push(card);
        }
        board
    }

    pub fn new_from_seed(seed: u64) -> Self {
        let mut deck = Card::deck();
        deck.shuffle(&mut StdRng::seed_from_u64(seed));
        Self::deal(&deck)
    }

    /// Number of cards in the home of a standard suit.
    pub fn home_len(&self, suit: Suit) -> usize {
        match self.homes.get(suit.index()) {
            Some(Some(top)) => top.rank() as usize + 1,
            _ => 0,
        }
    }

    pub fn arcana_count(&self) -> usize {
        self.arcana.iter().flatten().count()
    }

    /// The card a move from `from` would pick up.
    pub fn source_card(&self, from: MoveFrom) -> Option<Card> {
        match from {
            MoveFrom::Stow => self.stow,
            MoveFrom::Column(c) => self.field[c as usize].peek_top(),
        }
    }

    /// Validates `mov` against the rules and returns the card it would move.
    pub fn check_move(&self, mov: Move) -> Result<Card, MoveError> {
        let card = match mov.from {
            MoveFrom::Stow => self.stow.ok_or(MoveError::EmptyStow)?,
            MoveFrom::Column(c) => self.field[c as usize]
                .peek_top()
                .ok_or(MoveError::EmptyColumn(c))?,
        };
        match (mov.from, mov.to) {
            (MoveFrom::Stow, MoveTo::Stow) => return Err(MoveError::NoOpMove),
            (MoveFrom::Column(a), MoveTo::Column(b)) if a == b => {
                return Err(MoveError::NoOpMove);
            }
            _ => {}
        }
        match mov.to {
            MoveTo::Stow if self.stow.is_some() => Err(MoveError::StowOccupied),
            MoveTo::Stow => Ok(card),
            MoveTo::Goal if self.can_goal_card(card, mov.from == MoveFrom::Stow) => Ok(card),
            MoveTo::Goal => Err(MoveError::IllegalGoalPlacement(card)),
            MoveTo::Column(c) => match self.field[c as usize].peek_top() {
                Some(onto)
                    if onto.suit() != card.suit() || onto.rank().abs_diff(card.rank()) != 1 =>
                {
                    Err(MoveError::IllegalColumnPlacement { card, column: c })
                }
                _ => Ok(card),
            },
        }
    }

    pub fn is_move_legal(&self, mov: Move) -> bool {
        self.check_move(mov).is_ok()
    }

    /// Performs `mov` in place, followed by any automatic goal placements it
    /// unlocks. A rejected move leaves the board untouched.
    pub fn perform_move(&mut self, mov: Move) -> Result<(), MoveError> {
        let card = self.check_move(mov)?;
        self.take(mov.from);
        match mov.to {
            MoveTo::Goal => self.put_goal(card),
            MoveTo::Column(c) => self.field[c as usize].push(card),
            MoveTo::Stow => self.stow = Some(card),
        }
        self.auto_cascade(mov);
        Ok(())
    }

    /// Consumes a position and returns the one after `mov`.
    pub fn apply_move(mut self, mov: Move) -> Result<Self, MoveError> {
        self.perform_move(mov)?;
        Ok(self)
    }

    pub fn is_solved(&self) -> bool {
        self.arcana.iter().all(Option::is_some)
            && self
                .homes
                .iter()
                .all(|home| home.is_some_and(|card| card.is_king()))
            && self.field.iter().all(Column::is_empty)
    }

    /// Order-independent key of the tableau alone. Homes, Arcana and stow are
    /// not part of it, so two positions that differ only there collide.
    pub fn canonical_signature(&self) -> Signature {
        let mut columns: SmallVec<[&Column; TOTAL_COLUMNS]> = self.field.iter().collect();
        columns.sort_by(|a, b| {
            b.len()
                .cmp(&a.len())
                .then_with(|| a.cards.first().cmp(&b.cards.first()))
        });

        let mut signature = Signature::new();
        for column in columns {
            signature.extend(column.cards.iter().map(Card::id));
            signature.push(SEPARATOR);
        }
        signature
    }

    /// The tableau signature extended with homes, Arcana row and stow.
    pub fn full_signature(&self) -> Signature {
        let mut signature = self.canonical_signature();
        signature.extend(
            self.homes
                .iter()
                .map(|home| home.map_or(SEPARATOR, |card| card.id())),
        );
        signature.extend(self.arcana.iter().map(|slot| slot.is_some() as u8));
        signature.push(self.stow.map_or(SEPARATOR, |card| card.id()));
        signature
    }

    /// Whether every card of the deck is on the board exactly once.
    pub fn is_valid(&self) -> bool {
        let mut seen = [false; TOTAL_CARDS];
        let mut count = 0;
        let mut check_cards = |cards: &[Card]| -> bool {
            for &card in cards {
                let id = card.id() as usize;
                if seen[id] {
                    return false;
                }
                seen[id] = true;
                count += 1;
            }
            true
        };

        for (suit, home) in Suit::STANDARD.iter().zip(self.homes.iter()) {
            let Some(top) = home else {
                continue;
            };
            if top.suit() != *suit {
                return false;
            }
            let cards: Vec<_> = (0..=top.rank())
                .filter_map(|rank| Card::new(*suit, rank))
                .collect();
            if !check_cards(&cards) {
                return false;
            }
        }
        for (rank, slot) in self.arcana.iter().enumerate() {
            let Some(card) = slot else {
                continue;
            };
            if !card.is_arcana() || card.rank() as usize != rank || !check_cards(&[*card]) {
                return false;
            }
        }
        if let Some(card) = self.stow
            && !check_cards(&[card])
        {
            return false;
        }
        for column in &self.field {
            if !check_cards(&column.cards) {
                return false;
            }
        }
        count == TOTAL_CARDS
    }

    pub fn pretty_print(&self) -> String {
        let mut output = String::new();

        output.push_str("Arcana:");
        for slot in &self.arcana {
            match slot {
                Some(card) => output.push_str(&format!("{card:>4}")),
                None => output.push_str("   ·"),
            }
        }
        output.push('\n');

        output.push_str("Homes: ");
        for home in &self.homes {
            match home {
                Some(card) => output.push_str(&format!("{card:>4}")),
                None => output.push_str("   ·"),
            }
        }
        output.push('\n');

        if let Some(card) = self.stow {
            output.push_str(&format!("Stow:  {card:>4}\n"));
        }

        for i in 0..TOTAL_COLUMNS {
            output.push_str(&format!("{:>5}", i + 1));
        }
        let depth = self.field.iter().map(Column::len).max().unwrap_or_default();
        for row in 0..depth {
            output.push('\n');
            for column in &self.field {
                match column.cards.get(row) {
                    Some(card) => output.push_str(&format!("{card:>5}")),
                    None => output.push_str("     "),
                }
            }
        }

        output
    }

    fn take(&mut self, from: MoveFrom) {
        match from {
            MoveFrom::Stow => self.stow = None,
            MoveFrom::Column(c) => {
                self.field[c as usize].pop();
            }
        }
    }

    fn put_goal(&mut self, card: Card) {
        if card.is_arcana() {
            self.arcana[card.rank() as usize] = Some(card);
        } else {
            self.homes[card.suit().index()] = Some(card);
        }
    }

    fn can_goal_card(&self, card: Card, from_stow: bool) -> bool {
        if card.is_arcana() {
            let rank = Some(card.rank() as usize);
            let lowest = self.arcana.iter().position(Option::is_none);
            let highest = self.arcana.iter().rposition(Option::is_none);
            return rank == lowest || rank == highest;
        }
        if from_stow || self.stow.is_some() {
            return false;
        }
        match self.homes[card.suit().index()] {
            Some(top) => card.rank() == top.rank() + 1,
            None => card.rank() == 0,
        }
    }

    /// Sends the card sitting where `mov` left off to the goal for as long
    /// as that is legal. When `mov` itself went to the goal, that spot is
    /// the newly exposed card at its source.
    fn auto_cascade(&mut self, mov: Move) {
        let spot = match mov.to {
            MoveTo::Goal => mov.from,
            MoveTo::Column(c) => MoveFrom::Column(c),
            MoveTo::Stow => MoveFrom::Stow,
        };
        let follow_up = Move::new(spot, MoveTo::Goal);
        for _ in 0..TOTAL_CARDS {
            let Ok(card) = self.check_move(follow_up) else {
                break;
            };
            self.take(spot);
            self.put_goal(card);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Column {
    pub cards: SmallVec<[Card; COLUMN_SIZE]>,
}

impl Column {
    pub fn new(cards: Vec<Card>) -> Self {
        Self {
            cards: cards.into_iter().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn peek_top(&self) -> Option<Card> {
        self.cards.last().copied()
    }

    pub fn pop(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    pub fn push(&mut self, card: Card) {
        self.cards.push(card);
    }
}
