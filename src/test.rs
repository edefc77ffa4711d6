#[cfg(test)]
pub mod test {
    use anyhow::{anyhow, Result};
    use rand::{rngs::StdRng, SeedableRng};
    use rayon::prelude::*;

    use crate::evaluation::*;
    use crate::game::{Game, GameState};
    use crate::player::ComputerPlayer;
    use crate::rack::*;
    use crate::RackError;

    // a full 7x6 rack with no four in a row anywhere
    const DRAWN_RACK: &str = "
        X O X O X O X
        X O X O X O X
        O X O X O X O
        O X O X O X O
        X O X O X O X
        X O X O X O X
    ";

    /// Evaluates every position as equal
    struct Flat;

    impl Evaluator for Flat {
        fn evaluate(&self, _rack: &Rack, _perspective: Player) -> Score {
            0
        }
    }

    #[test]
    pub fn empty_rack_centre() -> Result<()> {
        let mut rack = Rack::new(7, 6)?;
        let ai = ComputerPlayer::new(Player::One, 1);
        let analysis = ai.analyse(&mut rack)?;

        assert_eq!(analysis.column, 3);
        // the centre bottom slot is in 7 quartets, the corner in 3
        assert_eq!(analysis.column_scores[3], Some(7));
        assert_eq!(analysis.column_scores[0], Some(3));
        assert_eq!(analysis.column_scores[6], Some(3));
        Ok(())
    }

    #[test]
    pub fn rack_restored_after_search() -> Result<()> {
        let mut rng = StdRng::seed_from_u64(7);
        for plies in [0, 5, 12, 25].iter() {
            let game = Game::random_opening(7, 6, *plies, &mut rng)?;
            let mut rack = game.rack().clone();
            for &prune in [true, false].iter() {
                let ai = ComputerPlayer::new(game.to_move(), 3).with_pruning(prune);
                if !rack.has_legal_move() {
                    continue;
                }
                let column = ai.pick_move(&mut rack)?;
                assert_eq!(&rack, game.rack());
                assert!(!rack.is_full(column));
            }
        }
        Ok(())
    }

    #[test]
    pub fn pruning_equivalence() -> Result<()> {
        // every position of a handful of random games, searched both ways
        (0..12u64).into_par_iter().try_for_each(|seed| -> Result<()> {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut game = Game::random_opening(7, 6, 2, &mut rng)?;
            let difficulty = 2 + (seed % 3) as usize;

            while !game.state().is_over() {
                let pruned = ComputerPlayer::new(game.to_move(), difficulty);
                let unpruned = pruned.clone().with_pruning(false);

                let mut rack = game.rack().clone();
                let with = pruned.analyse(&mut rack)?;
                let without = unpruned.analyse(&mut rack)?;

                if with.column != without.column {
                    return Err(anyhow!(
                        "seed {}: pruned chose {} but unpruned chose {} after {:?}",
                        seed,
                        with.column,
                        without.column,
                        game.moves()
                    ));
                }
                assert_eq!(with.column_scores, without.column_scores);
                assert!(with.node_count <= without.node_count);

                game.play(with.column)?;
            }
            Ok(())
        })
    }

    #[test]
    pub fn pruning_equivalence_large_rack() -> Result<()> {
        let mut pruned = Game::new(13, 8)?;
        let mut unpruned = pruned.clone();

        let players = |prune| {
            (
                ComputerPlayer::new(Player::One, 3).with_pruning(prune),
                ComputerPlayer::new(Player::Two, 3).with_pruning(prune),
            )
        };
        let (with, without) = (players(true), players(false));

        while !pruned.state().is_over() {
            let mut rack = pruned.rack().clone();
            let (a, b) = match pruned.to_move() {
                Player::One => (with.0.pick_move(&mut rack)?, without.0.pick_move(&mut rack)?),
                Player::Two => (with.1.pick_move(&mut rack)?, without.1.pick_move(&mut rack)?),
            };
            assert_eq!(a, b, "diverged after moves {:?}", pruned.moves());

            pruned.play(a)?;
            unpruned.play(b)?;
            assert_eq!(pruned.rack(), unpruned.rack());
        }
        Ok(())
    }

    #[test]
    pub fn full_rack_has_no_move() -> Result<()> {
        let mut rack: Rack = DRAWN_RACK.parse()?;
        assert!(!rack.has_legal_move());
        assert!((0..7).all(|column| rack.find_win(column).is_none()));

        let ai = ComputerPlayer::new(Player::One, 3);
        assert_eq!(ai.pick_move(&mut rack), Err(RackError::NoLegalMove));
        assert_eq!(rack, DRAWN_RACK.parse::<Rack>()?);
        Ok(())
    }

    #[test]
    pub fn immediate_win() -> Result<()> {
        let rack: Rack = "
            . . . . . . .
            . . . . . . .
            . . . . . . .
            . . . . . . .
            O O . . . . .
            X X X . . . O
        "
        .parse()?;

        for difficulty in 1..=5 {
            let ai = ComputerPlayer::new(Player::One, difficulty);
            assert_eq!(ai.pick_move(&mut rack.clone())?, 3);
        }
        Ok(())
    }

    #[test]
    pub fn blocks_opponent_win() -> Result<()> {
        let mut rack: Rack = "
            . . . . . . .
            . . . . . . .
            . . . . . . .
            . . . . . . .
            X X . . . . .
            O O O . . . .
        "
        .parse()?;

        for difficulty in 2..=4 {
            let ai = ComputerPlayer::new(Player::One, difficulty);
            assert_eq!(ai.pick_move(&mut rack)?, 3);
        }
        Ok(())
    }

    #[test]
    pub fn ties_go_left() -> Result<()> {
        let mut rack = Rack::new(5, 4)?;
        let ai = ComputerPlayer::new(Player::Two, 3).with_evaluator(Flat);
        assert_eq!(ai.pick_move(&mut rack)?, 0);

        for _ in 0..4 {
            rack.apply(0, Player::One)?;
        }
        assert!(rack.is_full(0));
        assert_eq!(ai.pick_move(&mut rack)?, 1);
        assert_eq!(ai.with_pruning(false).pick_move(&mut rack)?, 1);
        Ok(())
    }

    #[test]
    pub fn zero_difficulty_searches_one_ply() -> Result<()> {
        let mut rack = Rack::new(7, 6)?;
        assert_eq!(ComputerPlayer::new(Player::Two, 0).pick_move(&mut rack)?, 3);
        Ok(())
    }

    #[test]
    pub fn evaluation_symmetry() -> Result<()> {
        let mut rng = StdRng::seed_from_u64(42);
        for plies in 0..30 {
            let game = Game::random_opening(8, 7, plies, &mut rng)?;
            let one = QuartetEvaluator.evaluate(game.rack(), Player::One);
            let two = QuartetEvaluator.evaluate(game.rack(), Player::Two);
            assert_eq!(one, -two);
        }
        Ok(())
    }

    #[test]
    pub fn quartet_scores() {
        use Cell::*;

        assert_eq!(score_quartet([Empty; 4], Player::One), 0);
        assert_eq!(score_quartet([PlayerOne, Empty, Empty, Empty], Player::One), 1);
        assert_eq!(score_quartet([PlayerOne, PlayerOne, Empty, Empty], Player::One), 10);
        assert_eq!(score_quartet([PlayerOne, Empty, PlayerOne, PlayerOne], Player::One), 100);
        assert_eq!(score_quartet([PlayerOne; 4], Player::One), WIN_SCORE);
        assert_eq!(score_quartet([PlayerOne; 4], Player::Two), -WIN_SCORE);
        assert_eq!(score_quartet([Empty, PlayerTwo, PlayerTwo, Empty], Player::One), -10);
        assert_eq!(score_quartet([PlayerOne, PlayerTwo, PlayerOne, PlayerOne], Player::One), 0);
    }

    #[test]
    pub fn evaluate_sums_quartets() -> Result<()> {
        let mut rack = Rack::new(7, 6)?;
        assert_eq!(QuartetEvaluator.evaluate(&rack, Player::One), 0);

        rack.apply(3, Player::One)?;
        assert_eq!(QuartetEvaluator.evaluate(&rack, Player::One), 7);
        assert_eq!(QuartetEvaluator.evaluate(&rack, Player::Two), -7);

        // the second disc doubles up in the shared vertical and horizontal quartets
        rack.apply(3, Player::One)?;
        assert!(QuartetEvaluator.evaluate(&rack, Player::One) > 14);
        Ok(())
    }

    #[test]
    pub fn search_bound_exceeds_evaluation() -> Result<()> {
        let rack: Rack = "
            X X X X
            X X X X
            X X X X
            X X X X
        "
        .parse()?;
        // every quartet on the rack is won
        assert_eq!(
            QuartetEvaluator.evaluate(&rack, Player::One),
            WIN_SCORE * rack.quartet_count() as Score
        );
        assert!(QuartetEvaluator.search_bound(&rack) > QuartetEvaluator.evaluate(&rack, Player::One));
        Ok(())
    }

    #[test]
    pub fn quartet_enumeration() -> Result<()> {
        let rack = Rack::new(7, 6)?;
        assert_eq!(rack.quartet_count(), 69);
        assert_eq!(rack.quartets().count(), 69);

        let small = Rack::new(3, 8)?;
        assert_eq!(small.quartet_count(), 15);
        assert!(small
            .quartets()
            .all(|quartet| quartet.direction == Direction::Vertical));

        for quartet in Rack::new(13, 8)?.quartets() {
            for (column, row) in quartet.cells().iter() {
                assert!(*column < 13 && *row < 8);
            }
        }
        Ok(())
    }

    #[test]
    pub fn apply_and_retract() -> Result<()> {
        let mut rack = Rack::new(3, 2)?;

        rack.apply(1, Player::One)?;
        rack.apply(1, Player::Two)?;
        assert_eq!(rack.get(1, 0), Cell::PlayerOne);
        assert_eq!(rack.get(1, 1), Cell::PlayerTwo);
        assert!(rack.is_full(1));
        assert_eq!(rack.apply(1, Player::One), Err(RackError::ColumnFull(1)));
        assert_eq!(
            rack.apply(3, Player::One),
            Err(RackError::ColumnOutOfRange { column: 3, width: 3 })
        );

        assert_eq!(rack.retract(1)?, Player::Two);
        assert_eq!(rack.retract(1)?, Player::One);
        assert_eq!(rack.retract(1), Err(RackError::ColumnEmpty(1)));
        assert_eq!(rack, Rack::new(3, 2)?);

        assert_eq!(
            Rack::new(7, 0),
            Err(RackError::InvalidDimensions { width: 7, height: 0 })
        );
        Ok(())
    }

    #[test]
    pub fn placement_retracts_on_drop() -> Result<()> {
        let mut rack = Rack::new(4, 4)?;
        {
            let mut first = rack.place(2, Player::One)?;
            assert_eq!(first.column_height(2), 1);
            {
                let second = first.place(2, Player::Two)?;
                assert_eq!(second.get(2, 1), Cell::PlayerTwo);
                assert_eq!(second.column(), 2);
            }
            assert_eq!(first.column_height(2), 1);
        }
        assert_eq!(rack.column_height(2), 0);
        assert_eq!(rack, Rack::new(4, 4)?);
        Ok(())
    }

    #[test]
    pub fn win_detection() -> Result<()> {
        let cases = [
            (
                "
                . . . . .
                X . . . .
                X O . . .
                X O . . .
                X O . . .
                ",
                0,
                Direction::Vertical,
            ),
            (
                "
                . . . . .
                . . . . .
                . . . . .
                . O O O .
                . X X X X
                ",
                4,
                Direction::Horizontal,
            ),
            (
                "
                . . . . .
                . . . X .
                . . X O .
                . X O O .
                X O O X .
                ",
                3,
                Direction::DiagonalUp,
            ),
            (
                "
                . . . . .
                O . . . .
                X O . . .
                X X O . .
                X X X O .
                ",
                0,
                Direction::DiagonalDown,
            ),
        ];

        for (text, column, direction) in cases.iter() {
            let rack: Rack = text.parse()?;
            let quartet = rack
                .find_win(*column)
                .ok_or(anyhow!("no win found in column {}:\n{}", column, rack))?;
            assert_eq!(quartet.direction, *direction);
            let owner = rack.get(*column, rack.column_height(*column) - 1);
            assert!(rack.quartet_cells(&quartet).iter().all(|&cell| cell == owner));
        }

        let rack: Rack = "
            . . . . .
            . . . . .
            . . . . .
            O O O . .
            X X X . O
        "
        .parse()?;
        assert!((0..5).all(|column| rack.find_win(column).is_none()));
        Ok(())
    }

    #[test]
    pub fn rack_text_format() -> Result<()> {
        let text = "\
. . . .
. . . .
. O . .
X X O .
";
        let rack: Rack = text.parse()?;
        assert_eq!((rack.width(), rack.height()), (4, 4));
        assert_eq!(rack.column_height(0), 1);
        assert_eq!(rack.column_height(1), 2);
        assert_eq!(rack.get(1, 1), Cell::PlayerTwo);
        assert_eq!(rack.to_string(), text);

        assert_eq!(
            "X X\n. X\n".parse::<Rack>(),
            Err(RackError::FloatingDisc(0))
        );
        assert_eq!(
            ". .\nX\n".parse::<Rack>(),
            Err(RackError::RaggedRow {
                line: 2,
                found: 1,
                expected: 2
            })
        );
        assert_eq!(
            ". ?\n".parse::<Rack>(),
            Err(RackError::UnknownCell { found: '?', line: 1 })
        );
        assert_eq!("\n  \n".parse::<Rack>(), Err(RackError::EmptyRack));
        Ok(())
    }

    #[test]
    pub fn game_states() -> Result<()> {
        let mut game = Game::new(7, 6)?;
        for &column in [0, 1, 0, 1, 0, 1].iter() {
            assert_eq!(game.play(column)?, GameState::Playing);
        }
        assert_eq!(game.to_move(), Player::One);
        assert_eq!(game.play(0)?, GameState::PlayerOneWin);
        assert!(game.winning_quartet().is_some());
        assert_eq!(game.play(2), Err(RackError::GameOver));
        assert_eq!(game.moves(), &[0, 1, 0, 1, 0, 1, 0]);

        let drawn = Game::from_rack(DRAWN_RACK.parse()?, Player::One);
        assert_eq!(drawn.state(), GameState::Draw);
        Ok(())
    }

    #[test]
    pub fn self_play_finishes() -> Result<()> {
        let mut game = Game::new(13, 8)?;
        let one = ComputerPlayer::new(Player::One, 2);
        let two = ComputerPlayer::new(Player::Two, 2);
        let state = game.self_play(&one, &two)?;

        assert!(state.is_over());
        match state {
            GameState::PlayerOneWin | GameState::PlayerTwoWin => {
                assert!(game.winning_quartet().is_some())
            }
            _ => assert!(!game.rack().has_legal_move()),
        }
        Ok(())
    }
}
