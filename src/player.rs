//! A computer player that searches a fixed number of plies ahead

use log::{debug, trace};

use crate::{evaluation::*, rack::*, RackError};

/// Whose disc is dropped at a node of the search tree
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Mover {
    /// the searching player, who maximises the score
    Me,
    /// their opponent, who minimises it
    Opponent,
}

impl Mover {
    fn next(self) -> Self {
        match self {
            Mover::Me => Mover::Opponent,
            Mover::Opponent => Mover::Me,
        }
    }
}

/// The outcome of a root search
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Analysis {
    /// The chosen column
    pub column: usize,
    /// The score of the chosen column, from the searching player's point of view
    pub score: Score,
    /// The score of every column searched at the root, `None` for columns
    /// that were full or not reached because an earlier column won outright
    pub column_scores: Vec<Option<Score>>,
    /// The number of moves tried during the search (for diagnostics only)
    pub node_count: usize,
}

/// An agent that picks moves with depth-limited alpha-beta search
///
/// # Notes
/// Each move is chosen by searching `difficulty` plies ahead, alternating
/// between the player's own moves (maximising) and the opponent's replies
/// (minimising). Positions at the horizon are scored with the player's
/// [`Evaluator`]. A move that completes four in a row ends its line
/// immediately and is scored on the spot.
///
/// The search drops and retracts discs on the caller's rack instead of
/// copying it, so the rack is borrowed mutably for the whole call and is
/// back in its original state when the call returns. The player itself
/// holds no board state and can be shared between threads that each search
/// their own rack.
#[derive(Clone, Debug)]
pub struct ComputerPlayer<E = QuartetEvaluator> {
    player: Player,
    max_depth: usize,
    prune: bool,
    evaluator: E,
}

impl ComputerPlayer {
    /// Creates a player for `player` that searches `difficulty` plies, with pruning enabled
    pub fn new(player: Player, difficulty: usize) -> Self {
        Self {
            player,
            max_depth: difficulty,
            prune: true,
            evaluator: QuartetEvaluator,
        }
    }
}

impl<E: Evaluator> ComputerPlayer<E> {
    /// Replaces the evaluation used at the search horizon
    pub fn with_evaluator<F: Evaluator>(self, evaluator: F) -> ComputerPlayer<F> {
        ComputerPlayer {
            player: self.player,
            max_depth: self.max_depth,
            prune: self.prune,
            evaluator,
        }
    }

    /// Turns alpha-beta pruning on or off. The chosen moves are the same either way.
    pub fn with_pruning(mut self, prune: bool) -> Self {
        self.prune = prune;
        self
    }

    pub fn player(&self) -> Player {
        self.player
    }

    pub fn difficulty(&self) -> usize {
        self.max_depth
    }

    pub fn prunes(&self) -> bool {
        self.prune
    }

    /// Picks the column to play on `rack`
    ///
    /// Fails with [`RackError::NoLegalMove`] if every column is full.
    pub fn pick_move(&self, rack: &mut Rack) -> Result<usize, RackError> {
        Ok(self.analyse(rack)?.column)
    }

    /// Searches every legal column at the root and reports the best one
    ///
    /// Ties go to the leftmost column. A column that wins on the spot is
    /// chosen without searching the remaining columns.
    pub fn analyse(&self, rack: &mut Rack) -> Result<Analysis, RackError> {
        let bound = self.evaluator.search_bound(rack);
        let mut node_count = 0;
        let mut column_scores = vec![None; rack.width()];
        let mut best: Option<(usize, Score)> = None;

        for column in 0..rack.width() {
            if rack.is_full(column) {
                continue;
            }
            let mut placed = rack.place(column, self.player)?;
            node_count += 1;

            if placed.find_win(column).is_some() {
                let score = self.evaluator.evaluate(&placed, self.player);
                column_scores[column] = Some(score);
                debug!(
                    "{} wins immediately in column {} ({} nodes)",
                    self.player, column, node_count
                );
                return Ok(Analysis {
                    column,
                    score,
                    column_scores,
                    node_count,
                });
            }

            // every root column gets the full window so its score is exact
            let score = self.search(
                &mut placed,
                Mover::Opponent,
                1,
                -bound,
                bound,
                &mut node_count,
            )?;
            drop(placed);

            trace!("{} column {} scores {}", self.player, column, score);
            column_scores[column] = Some(score);
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((column, score));
            }
        }

        let (column, score) = best.ok_or(RackError::NoLegalMove)?;
        debug!(
            "{} picks column {} with score {} at depth {} ({} nodes, pruning {})",
            self.player,
            column,
            score,
            self.max_depth,
            node_count,
            if self.prune { "on" } else { "off" }
        );
        Ok(Analysis {
            column,
            score,
            column_scores,
            node_count,
        })
    }

    /// Scores the position on `rack` after `depth` plies, with `mover` to play next
    ///
    /// Returns the score from the searching player's point of view.
    fn search(
        &self,
        rack: &mut Rack,
        mover: Mover,
        depth: usize,
        mut alpha: Score,
        mut beta: Score,
        node_count: &mut usize,
    ) -> Result<Score, RackError> {
        if depth >= self.max_depth {
            return Ok(self.evaluator.evaluate(rack, self.player));
        }

        let disc = match mover {
            Mover::Me => self.player,
            Mover::Opponent => self.player.opponent(),
        };

        let mut best: Option<Score> = None;
        for column in 0..rack.width() {
            if rack.is_full(column) {
                continue;
            }
            let mut placed = rack.place(column, disc)?;
            *node_count += 1;

            // don't search past a won position, a reply that also completes
            // a quartet would cancel the win out in the evaluation
            let score = if placed.find_win(column).is_some() {
                self.evaluator.evaluate(&placed, self.player)
            } else {
                self.search(&mut placed, mover.next(), depth + 1, alpha, beta, node_count)?
            };
            drop(placed);

            best = Some(match (mover, best) {
                (_, None) => score,
                (Mover::Me, Some(best)) => best.max(score),
                (Mover::Opponent, Some(best)) => best.min(score),
            });

            if self.prune {
                match mover {
                    Mover::Me => {
                        alpha = alpha.max(score);
                        // the opponent already has a better option elsewhere
                        if score >= beta {
                            break;
                        }
                    }
                    Mover::Opponent => {
                        beta = beta.min(score);
                        if score <= alpha {
                            break;
                        }
                    }
                }
            }
        }

        // no legal column: the rack filled up without a winner
        Ok(best.unwrap_or_else(|| self.evaluator.evaluate(rack, self.player)))
    }
}
