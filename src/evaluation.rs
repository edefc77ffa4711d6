//! Static evaluation of a rack by counting quartets

use crate::rack::{Cell, Player, Rack};

/// A position score, always from the point of view of one player
pub type Score = i64;

/// The value of a completed quartet, i.e. a won position
pub const WIN_SCORE: Score = 999_999_999;

/// Scores racks at the search horizon
pub trait Evaluator {
    /// Scores `rack` from the point of view of `perspective`; positive is good for them
    fn evaluate(&self, rack: &Rack, perspective: Player) -> Score;

    /// A magnitude strictly greater than any score `evaluate` can return for `rack`,
    /// used to open the alpha-beta window
    fn search_bound(&self, rack: &Rack) -> Score {
        WIN_SCORE.saturating_mul(rack.quartet_count() as Score + 1)
    }
}

/// Sums the value of every quartet on the rack
///
/// A quartet held only by one side is worth 1, 10, 100 or `WIN_SCORE` for
/// 1, 2, 3 or 4 discs, positive for the evaluating player and negative for
/// their opponent. Empty and contested quartets are worth nothing.
#[derive(Copy, Clone, Debug, Default)]
pub struct QuartetEvaluator;

impl Evaluator for QuartetEvaluator {
    fn evaluate(&self, rack: &Rack, perspective: Player) -> Score {
        rack.quartets()
            .map(|quartet| score_quartet(rack.quartet_cells(&quartet), perspective))
            .sum()
    }
}

/// The contribution of a single quartet to the evaluation
pub fn score_quartet(cells: [Cell; 4], perspective: Player) -> Score {
    let mine_cell = Cell::from(perspective);
    let mut mine = 0;
    let mut enemy = 0;
    for cell in cells.iter() {
        if *cell == mine_cell {
            mine += 1;
        } else if !cell.is_empty() {
            enemy += 1;
        }
    }

    let (sign, count) = match (mine, enemy) {
        (0, 0) => return 0,
        (_, 0) => (1, mine),
        (0, _) => (-1, enemy),
        // contested by both sides
        _ => return 0,
    };

    sign * match count {
        1 => 1,
        2 => 10,
        3 => 100,
        _ => WIN_SCORE,
    }
}
