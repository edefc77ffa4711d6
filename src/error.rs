use thiserror::Error;

/// Precondition violations and parse failures raised by the rack and the search
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RackError {
    #[error("invalid rack dimensions {width}x{height}, both must be at least 1")]
    InvalidDimensions { width: usize, height: usize },

    #[error("column {column} out of range, columns must be between 0 and {}", .width - 1)]
    ColumnOutOfRange { column: usize, width: usize },

    #[error("column {0} is full")]
    ColumnFull(usize),

    #[error("column {0} is empty, nothing to retract")]
    ColumnEmpty(usize),

    #[error("no legal move, every column is full")]
    NoLegalMove,

    #[error("the game is already over")]
    GameOver,

    #[error("could not parse '{found}' on line {line} as a rack cell")]
    UnknownCell { found: char, line: usize },

    #[error("line {line} has {found} cells, expected {expected}")]
    RaggedRow {
        line: usize,
        found: usize,
        expected: usize,
    },

    #[error("rack description contains no rows")]
    EmptyRack,

    #[error("column {0} has a disc above an empty slot")]
    FloatingDisc(usize),
}
