//! Cards, moves and the board rules of Fortune Solitaire.
pub mod board;
pub mod card;
mod layout;
pub mod move_;
