//! Text layout of a board.
//!
//! ```text
//! Ah Ad Ac As        <- top card of each home
//! 0 21               <- Arcana already on the goal row
//! 2h 3h , Kc 5m      <- tableau rows; `,` marks an empty cell
//! 4h , , Qc
//! ```
//!
//! Row `i`, token `j` is the `i`-th card from the bottom of column `j`.

use crate::board::{Board, TOTAL_COLUMNS};
use crate::card::Card;

use anyhow::{Context, Result, bail};

const EMPTY_CELL: &str = ",";

impl Board {
    pub fn parse(content: &str) -> Result<Self> {
        let mut board = Board::new();
        let mut lines = content.lines();
        let home_line = lines.next().unwrap_or_default();
        let arcana_line = lines.next().unwrap_or_default();

        for token in home_line.split_whitespace() {
            let card = Card::parse(token)
                .with_context(|| format!("Failed to parse home row '{home_line}'"))?;
            if card.is_arcana() {
                bail!("{card} can't be Arcana in the Home Row");
            }
            board.homes[card.suit().index()] = Some(card);
        }

        for token in arcana_line.split_whitespace() {
            let card = token
                .parse::<u8>()
                .ok()
                .and_then(Card::arcana)
                .with_context(|| format!("{token} is not an Arcana number"))?;
            board.arcana[card.rank() as usize] = Some(card);
        }

        for (i, row) in lines
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .enumerate()
        {
            let line_context = || format!("Failed to parse at '{row}'");
            let tokens: Vec<&str> = row.split_whitespace().collect();
            if tokens.len() > TOTAL_COLUMNS {
                bail!("{} is too many cards in row: {row}", tokens.len());
            }
            for (j, token) in tokens.into_iter().enumerate() {
                if token == EMPTY_CELL {
                    continue;
                }
                let card = Card::parse(token).with_context(line_context)?;
                let column = &mut board.field[j];
                if column.len() != i {
                    bail!("Column {} has an empty cell below {card}", j + 1);
                }
                column.push(card);
            }
        }

        Ok(board)
    }

    /// Serializes the board in the layout accepted by [`Board::parse`]. The
    /// stow is not part of the layout.
    pub fn to_layout_string(&self) -> String {
        let homes: Vec<String> = self.homes.iter().flatten().map(Card::to_token).collect();
        let arcana: Vec<String> = self
            .arcana
            .iter()
            .flatten()
            .map(|card| card.rank().to_string())
            .collect();
        let mut output = format!("{}\n{}", homes.join(" "), arcana.join(" "));

        let depth = self.field.iter().map(|c| c.len()).max().unwrap_or_default();
        for row in 0..depth {
            let cells: Vec<String> = self
                .field
                .iter()
                .map(|column| {
                    column
                        .cards
                        .get(row)
                        .map_or(EMPTY_CELL.to_string(), Card::to_token)
                })
                .collect();
            output.push('\n');
            output.push_str(&cells.join(" "));
        }

        output
    }
}
