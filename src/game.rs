//! Turn-by-turn bookkeeping for a whole game

use log::info;
use rand::{seq::SliceRandom, Rng};

use crate::{evaluation::Evaluator, player::ComputerPlayer, rack::*, RackError};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GameState {
    Playing,
    PlayerOneWin,
    PlayerTwoWin,
    Draw,
}

impl GameState {
    pub fn is_over(&self) -> bool {
        !matches!(self, GameState::Playing)
    }
}

/// A game in progress: the rack, whose turn it is and the moves so far
#[derive(Clone, Debug)]
pub struct Game {
    rack: Rack,
    to_move: Player,
    moves: Vec<usize>,
    winning_quartet: Option<Quartet>,
    state: GameState,
}

impl Game {
    /// Starts a game on an empty `width` x `height` rack, player one to move
    pub fn new(width: usize, height: usize) -> Result<Self, RackError> {
        Ok(Self::from_rack(Rack::new(width, height)?, Player::One))
    }

    /// Continues a game from an existing rack
    pub fn from_rack(rack: Rack, to_move: Player) -> Self {
        let state = if rack.has_legal_move() {
            GameState::Playing
        } else {
            GameState::Draw
        };
        Self {
            rack,
            to_move,
            moves: Vec::new(),
            winning_quartet: None,
            state,
        }
    }

    /// Starts a game with `plies` uniformly random moves already played
    ///
    /// Stops early if a random move ends the game.
    pub fn random_opening<R: Rng + ?Sized>(
        width: usize,
        height: usize,
        plies: usize,
        rng: &mut R,
    ) -> Result<Self, RackError> {
        let mut game = Self::new(width, height)?;
        for _ in 0..plies {
            if game.state.is_over() {
                break;
            }
            let columns: Vec<usize> = game.rack.legal_columns().collect();
            let column = *columns.choose(rng).ok_or(RackError::NoLegalMove)?;
            game.play(column)?;
        }
        Ok(game)
    }

    pub fn rack(&self) -> &Rack {
        &self.rack
    }

    pub fn to_move(&self) -> Player {
        self.to_move
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    /// The columns played since the game started, in order
    pub fn moves(&self) -> &[usize] {
        &self.moves
    }

    pub fn winning_quartet(&self) -> Option<Quartet> {
        self.winning_quartet
    }

    /// Plays `column` for the player to move and updates the game state
    pub fn play(&mut self, column: usize) -> Result<GameState, RackError> {
        if self.state.is_over() {
            return Err(RackError::GameOver);
        }
        self.rack.apply(column, self.to_move)?;
        self.moves.push(column);

        if let Some(quartet) = self.rack.find_win(column) {
            self.winning_quartet = Some(quartet);
            self.state = match self.to_move {
                Player::One => GameState::PlayerOneWin,
                Player::Two => GameState::PlayerTwoWin,
            };
        } else if !self.rack.has_legal_move() {
            self.state = GameState::Draw;
        }
        self.to_move = self.to_move.opponent();

        Ok(self.state)
    }

    /// Asks whichever of `one` and `two` is to move for a move until the game ends
    pub fn self_play<E: Evaluator, F: Evaluator>(
        &mut self,
        one: &ComputerPlayer<E>,
        two: &ComputerPlayer<F>,
    ) -> Result<GameState, RackError> {
        while !self.state.is_over() {
            let column = match self.to_move {
                Player::One => one.pick_move(&mut self.rack)?,
                Player::Two => two.pick_move(&mut self.rack)?,
            };
            self.play(column)?;
        }
        info!(
            "game finished after {} moves: {:?}",
            self.moves.len(),
            self.state
        );
        Ok(self.state)
    }
}
