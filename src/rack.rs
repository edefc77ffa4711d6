//! The game rack: a grid of slots filled from the bottom of each column
use crossterm::{
    cursor::MoveTo,
    style::{style, Attribute, Color, PrintStyledContent},
    QueueableCommand,
};

use std::fmt;
use std::io::{stdout, Write};
use std::ops::{Deref, DerefMut, Range};
use std::str::FromStr;

use crate::RackError;

/// One of the two sides in a game
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum Player {
    One,
    Two,
}

impl Player {
    pub fn opponent(self) -> Self {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    /// The conventional numeric id of the player, 1 or 2
    pub fn id(self) -> u8 {
        match self {
            Player::One => 1,
            Player::Two => 2,
        }
    }

    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Player::One),
            2 => Some(Player::Two),
            _ => None,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Player {}", self.id())
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum Cell {
    PlayerOne,
    PlayerTwo,
    Empty,
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn player(&self) -> Option<Player> {
        match self {
            Cell::PlayerOne => Some(Player::One),
            Cell::PlayerTwo => Some(Player::Two),
            Cell::Empty => None,
        }
    }

    fn symbol(&self) -> char {
        match self {
            Cell::PlayerOne => 'X',
            Cell::PlayerTwo => 'O',
            Cell::Empty => '.',
        }
    }
}

impl From<Player> for Cell {
    fn from(player: Player) -> Self {
        match player {
            Player::One => Cell::PlayerOne,
            Player::Two => Cell::PlayerTwo,
        }
    }
}

/// The four directions a line of four can run in
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum Direction {
    Vertical,
    Horizontal,
    /// bottom-left to top-right
    DiagonalUp,
    /// top-left to bottom-right
    DiagonalDown,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Vertical,
        Direction::Horizontal,
        Direction::DiagonalUp,
        Direction::DiagonalDown,
    ];

    /// (column, row) offset between consecutive slots of a quartet
    fn step(self) -> (isize, isize) {
        match self {
            Direction::Vertical => (0, 1),
            Direction::Horizontal => (1, 0),
            Direction::DiagonalUp => (1, 1),
            Direction::DiagonalDown => (1, -1),
        }
    }

    /// Column and row ranges of every valid quartet origin on a `width` x `height` rack
    fn origins(self, width: usize, height: usize) -> (Range<usize>, Range<usize>) {
        match self {
            Direction::Vertical => (0..width, 0..height.saturating_sub(3)),
            Direction::Horizontal => (0..width.saturating_sub(3), 0..height),
            Direction::DiagonalUp => (0..width.saturating_sub(3), 0..height.saturating_sub(3)),
            Direction::DiagonalDown => (0..width.saturating_sub(3), 3..height.max(3)),
        }
    }
}

/// A window of four consecutive slots, identified by its first slot and direction
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub struct Quartet {
    pub column: usize,
    pub row: usize,
    pub direction: Direction,
}

impl Quartet {
    /// The (column, row) coordinates of the four slots, starting at the origin
    pub fn cells(&self) -> [(usize, usize); 4] {
        let (dx, dy) = self.direction.step();
        let mut cells = [(0, 0); 4];
        for (i, cell) in cells.iter_mut().enumerate() {
            *cell = (
                (self.column as isize + dx * i as isize) as usize,
                (self.row as isize + dy * i as isize) as usize,
            );
        }
        cells
    }
}

/// A rack of `width` columns, each holding up to `height` discs
///
/// Discs always rest on the bottom of their column or on another disc;
/// `apply` and `retract` are the only ways to change the contents.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Rack {
    cells: Vec<Cell>, // cells are stored left-to-right, bottom-to-top
    heights: Vec<usize>,
    width: usize,
    height: usize,
}

impl Rack {
    pub fn new(width: usize, height: usize) -> Result<Self, RackError> {
        if width == 0 || height == 0 {
            return Err(RackError::InvalidDimensions { width, height });
        }
        Ok(Self {
            cells: vec![Cell::Empty; width * height],
            heights: vec![0; width],
            width,
            height,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// The contents of the slot at `column`, `row` (row 0 is the bottom)
    pub fn get(&self, column: usize, row: usize) -> Cell {
        self.cells[column + self.width * row]
    }

    /// The number of discs in `column`
    pub fn column_height(&self, column: usize) -> usize {
        self.heights[column]
    }

    pub fn is_full(&self, column: usize) -> bool {
        self.heights[column] >= self.height
    }

    pub fn legal_columns(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.width).filter(move |&column| !self.is_full(column))
    }

    pub fn has_legal_move(&self) -> bool {
        self.legal_columns().next().is_some()
    }

    pub fn num_discs(&self) -> usize {
        self.heights.iter().sum()
    }

    fn check_column(&self, column: usize) -> Result<(), RackError> {
        if column >= self.width {
            return Err(RackError::ColumnOutOfRange {
                column,
                width: self.width,
            });
        }
        Ok(())
    }

    /// Drops a disc for `player` into the lowest empty slot of `column`
    pub fn apply(&mut self, column: usize, player: Player) -> Result<(), RackError> {
        self.check_column(column)?;
        if self.is_full(column) {
            return Err(RackError::ColumnFull(column));
        }
        self.cells[column + self.width * self.heights[column]] = player.into();
        self.heights[column] += 1;
        Ok(())
    }

    /// Removes the topmost disc of `column`, returning whose it was
    pub fn retract(&mut self, column: usize) -> Result<Player, RackError> {
        self.check_column(column)?;
        if self.heights[column] == 0 {
            return Err(RackError::ColumnEmpty(column));
        }
        self.heights[column] -= 1;
        let idx = column + self.width * self.heights[column];
        let cell = std::mem::replace(&mut self.cells[idx], Cell::Empty);
        cell.player().ok_or(RackError::ColumnEmpty(column))
    }

    /// Applies a move that is retracted again when the returned guard is dropped
    pub fn place(&mut self, column: usize, player: Player) -> Result<Placement<'_>, RackError> {
        self.apply(column, player)?;
        Ok(Placement { rack: self, column })
    }

    /// Every quartet on the rack, in all four directions
    pub fn quartets(&self) -> impl Iterator<Item = Quartet> {
        let (width, height) = (self.width, self.height);
        Direction::ALL.into_iter().flat_map(move |direction| {
            let (columns, rows) = direction.origins(width, height);
            columns.flat_map(move |column| {
                rows.clone().map(move |row| Quartet {
                    column,
                    row,
                    direction,
                })
            })
        })
    }

    pub fn quartet_count(&self) -> usize {
        Direction::ALL
            .iter()
            .map(|direction| {
                let (columns, rows) = direction.origins(self.width, self.height);
                columns.len() * rows.len()
            })
            .sum()
    }

    /// The contents of the four slots of `quartet`
    pub fn quartet_cells(&self, quartet: &Quartet) -> [Cell; 4] {
        let mut cells = [Cell::Empty; 4];
        for (cell, (column, row)) in cells.iter_mut().zip(quartet.cells().iter()) {
            *cell = self.get(*column, *row);
        }
        cells
    }

    /// Checks whether the top disc of `column`, usually the move just made,
    /// completes four in a row for its owner, returning the winning quartet
    pub fn find_win(&self, column: usize) -> Option<Quartet> {
        if column >= self.width || self.heights[column] == 0 {
            return None;
        }
        let row = self.heights[column] - 1;
        let cell = self.get(column, row);

        for &direction in Direction::ALL.iter() {
            let (dx, dy) = direction.step();
            let (columns, rows) = direction.origins(self.width, self.height);
            // slide the window so that the disc is at each of its four positions
            for offset in 0..4isize {
                let origin_column = column as isize - dx * offset;
                let origin_row = row as isize - dy * offset;
                if origin_column < 0 || origin_row < 0 {
                    continue;
                }
                let (origin_column, origin_row) = (origin_column as usize, origin_row as usize);
                if !columns.contains(&origin_column) || !rows.contains(&origin_row) {
                    continue;
                }
                let quartet = Quartet {
                    column: origin_column,
                    row: origin_row,
                    direction,
                };
                if self.quartet_cells(&quartet).iter().all(|&c| c == cell) {
                    return Some(quartet);
                }
            }
        }
        None
    }

    /// Draws the rack to the terminal with coloured discs
    pub fn draw(&self) -> anyhow::Result<()> {
        let mut stdout = stdout();

        let cols: String = (1..=self.width).map(|x| (x % 10).to_string()).collect();
        stdout.queue(PrintStyledContent(style(cols + "\n")))?;
        for _ in 0..self.height {
            stdout.queue(PrintStyledContent(style("\n")))?;
        }
        stdout.flush()?;

        let (origin_x, origin_y) = crossterm::cursor::position()?;

        for (idx, cell) in self.cells.iter().enumerate() {
            let (pos_x, pos_y) = (
                origin_x + (idx % self.width) as u16,
                origin_y - (idx / self.width) as u16,
            );

            stdout
                .queue(MoveTo(pos_x, pos_y))?
                .queue(PrintStyledContent(
                    style("O")
                        .attribute(Attribute::Bold)
                        .on(Color::DarkBlue)
                        .with(match cell {
                            Cell::PlayerOne => Color::Red,
                            Cell::PlayerTwo => Color::Yellow,
                            Cell::Empty => Color::DarkBlue,
                        }),
                ))?;
        }
        stdout
            .queue(MoveTo(origin_x + self.width as u16, origin_y))?
            .queue(PrintStyledContent(style("\n")))?;
        stdout.flush()?;
        Ok(())
    }
}

/// Writes the rack one row per line, top row first, `X`/`O` for discs and `.` for empty slots
impl fmt::Display for Rack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in (0..self.height).rev() {
            let line: Vec<String> = (0..self.width)
                .map(|column| self.get(column, row).symbol().to_string())
                .collect();
            writeln!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}

impl FromStr for Rack {
    type Err = RackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut rows = Vec::new();
        for (idx, line) in s.lines().enumerate() {
            let mut row = Vec::new();
            for symbol in line.chars().filter(|c| !c.is_whitespace()) {
                row.push(match symbol {
                    'X' | 'x' => Cell::PlayerOne,
                    'O' | 'o' => Cell::PlayerTwo,
                    '.' => Cell::Empty,
                    found => return Err(RackError::UnknownCell { found, line: idx + 1 }),
                });
            }
            if !row.is_empty() {
                rows.push((idx + 1, row));
            }
        }

        let width = rows.first().map(|(_, row)| row.len()).ok_or(RackError::EmptyRack)?;
        for (line, row) in rows.iter() {
            if row.len() != width {
                return Err(RackError::RaggedRow {
                    line: *line,
                    found: row.len(),
                    expected: width,
                });
            }
        }

        let mut rack = Rack::new(width, rows.len())?;
        // the text lists the top row first
        for (row, (_, cells)) in rows.iter().rev().enumerate() {
            for (column, cell) in cells.iter().enumerate() {
                rack.cells[column + width * row] = *cell;
            }
        }
        for column in 0..width {
            let height = (0..rack.height)
                .take_while(|&row| !rack.get(column, row).is_empty())
                .count();
            if (height..rack.height).any(|row| !rack.get(column, row).is_empty()) {
                return Err(RackError::FloatingDisc(column));
            }
            rack.heights[column] = height;
        }
        Ok(rack)
    }
}

/// A move that is on the rack for as long as this guard lives
///
/// The guard dereferences to the rack, so the search can keep exploring
/// below it; dropping it retracts the disc on every exit path.
pub struct Placement<'a> {
    rack: &'a mut Rack,
    column: usize,
}

impl Placement<'_> {
    pub fn column(&self) -> usize {
        self.column
    }
}

impl Deref for Placement<'_> {
    type Target = Rack;

    fn deref(&self) -> &Self::Target {
        self.rack
    }
}

impl DerefMut for Placement<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.rack
    }
}

impl Drop for Placement<'_> {
    fn drop(&mut self) {
        let retracted = self.rack.retract(self.column);
        debug_assert!(retracted.is_ok(), "placed disc was already removed");
    }
}
