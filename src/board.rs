use anyhow::{Context, Result, bail};
use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};

use std::fmt;

pub const DEFAULT_SIZE: usize = 6;
pub const MAX_SIZE: usize = 16;

pub type CardValue = u16;

/// A cell on the board. Ordering is row-major.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    pub row: u8,
    pub col: u8,
}

impl Position {
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }
}

impl From<(u8, u8)> for Position {
    fn from((row, col): (u8, u8)) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

/// The face values of an N×N Memory board, each value appearing exactly twice.
///
/// Immutable once built: the live game only changes what is visible or matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    size: usize,
    cells: Vec<CardValue>,
}

impl Board {
    pub fn new_from_seed(size: usize, seed: u64) -> Result<Self> {
        check_size(size)?;
        let total_pairs = (size * size) / 2;
        let mut values: Vec<CardValue> = (1..=total_pairs as CardValue)
            .chain(1..=total_pairs as CardValue)
            .collect();
        let mut rng = StdRng::seed_from_u64(seed);
        values.shuffle(&mut rng);
        Ok(Self {
            size,
            cells: values,
        })
    }

    pub fn from_rows(rows: Vec<Vec<CardValue>>) -> Result<Self> {
        let size = rows.len();
        check_size(size)?;
        let mut cells = Vec::with_capacity(size * size);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != size {
                bail!(
                    "Row {} has {} cells, expected {size}.",
                    i + 1,
                    row.len()
                );
            }
            cells.extend_from_slice(row);
        }
        let board = Self { size, cells };
        if !board.is_valid() {
            bail!("Every value must appear exactly twice.");
        }
        Ok(board)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mut rows: Vec<Vec<CardValue>> = vec![];
        for line in content
            .split('\n')
            .map(|v| v.trim())
            .filter(|l| !l.is_empty())
        {
            let line_context = || format!("Failed to parse at '{line}'");
            let row = line
                .split_whitespace()
                .map(|token| {
                    token
                        .parse::<CardValue>()
                        .with_context(|| format!("Invalid card value '{token}'"))
                })
                .collect::<Result<Vec<_>>>()
                .with_context(line_context)?;
            rows.push(row);
        }
        Self::from_rows(rows)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn total_pairs(&self) -> usize {
        self.cells.len() / 2
    }

    pub fn value_at(&self, pos: Position) -> CardValue {
        self.cells[pos.row as usize * self.size + pos.col as usize]
    }

    pub fn contains(&self, pos: Position) -> bool {
        (pos.row as usize) < self.size && (pos.col as usize) < self.size
    }

    pub fn all_positions(&self) -> impl Iterator<Item = Position> + '_ {
        let size = self.size as u8;
        (0..size).flat_map(move |row| (0..size).map(move |col| Position::new(row, col)))
    }

    pub fn is_valid(&self) -> bool {
        if self.size == 0 || self.size % 2 != 0 || self.cells.len() != self.size * self.size {
            return false;
        }
        let mut counts = rustc_hash::FxHashMap::<CardValue, u8>::default();
        for &value in &self.cells {
            *counts.entry(value).or_default() += 1;
        }
        counts.values().all(|&count| count == 2)
    }

    pub fn pretty_print(&self) -> String {
        let width = self
            .cells
            .iter()
            .map(|v| v.to_string().len())
            .max()
            .unwrap_or(1);
        self.cells
            .chunks(self.size)
            .map(|row| {
                row.iter()
                    .map(|v| format!("{v:>width$}"))
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Checks that `size` describes a playable board: non-empty, even, at most [`MAX_SIZE`].
pub fn check_size(size: usize) -> Result<()> {
    if size == 0 {
        bail!("Board is empty.");
    }
    if size > MAX_SIZE {
        bail!("Board size {size} exceeds the maximum of {MAX_SIZE}.");
    }
    if size % 2 != 0 {
        bail!("Board size must be even, got {size}.");
    }
    Ok(())
}
