use anyhow::{Context, Result};
use std::fmt;

pub const TOTAL_HOMES: usize = 4;
pub const TOTAL_ARCANA: usize = 22;
pub const MAX_RANK: u8 = 13;
pub const STANDARD_CARDS: u8 = TOTAL_HOMES as u8 * MAX_RANK;
pub const TOTAL_CARDS: usize = STANDARD_CARDS as usize + TOTAL_ARCANA;

const SUITS: [char; 5] = ['♥', '♦', '♣', '♠', '⟡'];
const SUIT_LETTERS: [char; 4] = ['h', 'd', 'c', 's'];
const RANKS: [&str; MAX_RANK as usize] = [
    "A", "2", "3", "4", "5", "6", "7", "8", "9", "10", "J", "Q", "K",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Suit {
    Hearts,
    Diamonds,
    Clubs,
    Spades,
    Arcana,
}

impl Suit {
    pub const STANDARD: [Suit; TOTAL_HOMES] =
        [Suit::Hearts, Suit::Diamonds, Suit::Clubs, Suit::Spades];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn is_arcana(self) -> bool {
        self == Suit::Arcana
    }

    pub fn symbol(self) -> char {
        SUITS[self.index()]
    }

    /// Maps the trailing letter of a layout token to its suit.
    /// `G P S W` are alternate letters for the four standard suits.
    fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'h' | 'G' => Some(Suit::Hearts),
            'd' | 'P' => Some(Suit::Diamonds),
            'c' | 'S' => Some(Suit::Clubs),
            's' | 'W' => Some(Suit::Spades),
            'm' | 'M' | 'a' | 'A' => Some(Suit::Arcana),
            _ => None,
        }
    }
}

/// A card packed into a single id: `suit * 13 + rank` for the standard
/// suits, `52 + rank` for the Arcana.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Card(u8);

impl Card {
    pub fn new(suit: Suit, rank: u8) -> Option<Self> {
        match suit {
            Suit::Arcana if (rank as usize) < TOTAL_ARCANA => Some(Self(STANDARD_CARDS + rank)),
            Suit::Arcana => None,
            _ if rank < MAX_RANK => Some(Self(suit.index() as u8 * MAX_RANK + rank)),
            _ => None,
        }
    }

    pub fn new_with_id(id: u8) -> Option<Self> {
        ((id as usize) < TOTAL_CARDS).then_some(Self(id))
    }

    pub fn arcana(rank: u8) -> Option<Self> {
        Self::new(Suit::Arcana, rank)
    }

    /// The full ordered deck: hearts, diamonds, clubs, spades from Ace to King,
    /// then the Arcana from 0 to 21.
    pub fn deck() -> Vec<Card> {
        (0..TOTAL_CARDS as u8).map(Card).collect()
    }

    pub fn parse(token: &str) -> Result<Self> {
        let mut chars = token.chars();
        let letter = chars
            .next_back()
            .with_context(|| format!("Bad card: \"{token}\", empty token"))?;
        let prefix = chars.as_str();
        let suit = Suit::from_letter(letter)
            .with_context(|| format!("Bad card: \"{token}\", \"{letter}\" is not a suit"))?;
        let rank = if suit.is_arcana() {
            prefix.parse::<u8>().ok()
        } else {
            RANKS.iter().position(|&r| r == prefix).map(|r| r as u8)
        };
        rank.and_then(|rank| Self::new(suit, rank))
            .with_context(|| format!("Bad card: \"{token}\", \"{prefix}\" is not a rank"))
    }

    pub fn id(&self) -> u8 {
        self.0
    }

    pub fn suit(&self) -> Suit {
        if self.0 < STANDARD_CARDS {
            Suit::STANDARD[(self.0 / MAX_RANK) as usize]
        } else {
            Suit::Arcana
        }
    }

    pub fn rank(&self) -> u8 {
        if self.0 < STANDARD_CARDS {
            self.0 % MAX_RANK
        } else {
            self.0 - STANDARD_CARDS
        }
    }

    pub fn is_arcana(&self) -> bool {
        self.0 >= STANDARD_CARDS
    }

    pub fn is_king(&self) -> bool {
        !self.is_arcana() && self.rank() == MAX_RANK - 1
    }

    /// The token understood by the layout parser, e.g. `10h` or `7a`.
    pub fn to_token(&self) -> String {
        match self.suit() {
            Suit::Arcana => format!("{}a", self.rank()),
            suit => format!("{}{}", RANKS[self.rank() as usize], SUIT_LETTERS[suit.index()]),
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self.suit() {
            Suit::Arcana => format!("{}{}", self.rank(), Suit::Arcana.symbol()),
            suit => format!("{}{}", RANKS[self.rank() as usize], suit.symbol()),
        };
        f.pad(&text)
    }
}
