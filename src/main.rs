use anyhow::{anyhow, ensure, Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::*;
use log::info;
use rand::{rngs::StdRng, SeedableRng};
use rayon::prelude::*;

use std::io::{stdin, stdout, Write};
use std::time::{Duration, Instant};

use quartet::{game::*, player::*, rack::*, *};

#[derive(Parser, Debug)]
#[command(author, version, about = "Connect 4 with a fixed-depth alpha-beta search player", long_about = None)]
struct Cli {
    /// Log search decisions (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play an interactive game, each side human or AI
    Play {
        #[command(flatten)]
        rack: RackArgs,
        /// Let the AI play player 1
        #[arg(long)]
        ai_one: bool,
        /// Let the AI play player 2
        #[arg(long)]
        ai_two: bool,
    },
    /// Let two AI players play each other and print the final rack
    SelfPlay {
        #[command(flatten)]
        rack: RackArgs,
        /// Disable alpha-beta pruning
        #[arg(long)]
        no_prune: bool,
    },
    /// Check that pruned and unpruned players pick the same moves over many games
    Compare {
        #[command(flatten)]
        rack: RackArgs,
        /// Number of games to play
        #[arg(long, default_value_t = 8)]
        games: u64,
        /// Random plies played before the players take over
        #[arg(long, default_value_t = 4)]
        opening: usize,
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
    /// Load a rack from a file, pick a move for it and print the result
    Pick {
        /// Rack file: one line per row, top row first, X/O for discs and . for empty
        file: std::path::PathBuf,
        /// The player to move, 1 or 2
        #[arg(long, default_value_t = 1)]
        player: u8,
        #[arg(long, default_value_t = DEFAULT_DIFFICULTY)]
        difficulty: usize,
    },
    /// Time a self-play game with and without pruning
    Bench {
        #[command(flatten)]
        rack: RackArgs,
    },
}

#[derive(Args, Debug, Clone, Copy)]
struct RackArgs {
    #[arg(long, default_value_t = DEFAULT_WIDTH)]
    width: usize,
    #[arg(long, default_value_t = DEFAULT_HEIGHT)]
    height: usize,
    /// Number of plies the AI searches
    #[arg(long, default_value_t = DEFAULT_DIFFICULTY)]
    difficulty: usize,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "warn" };
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, log_level),
    );
    if cli.verbose {
        builder.parse_filters(log_level);
    }
    builder.format_timestamp(None).init();

    match cli.command {
        Command::Play {
            rack,
            ai_one,
            ai_two,
        } => play(rack, (ai_one, ai_two)),
        Command::SelfPlay { rack, no_prune } => self_play(rack, !no_prune),
        Command::Compare {
            rack,
            games,
            opening,
            seed,
        } => compare(rack, games, opening, seed),
        Command::Pick {
            file,
            player,
            difficulty,
        } => pick(&file, player, difficulty),
        Command::Bench { rack } => bench(rack),
    }
}

fn play(args: RackArgs, ai_players: (bool, bool)) -> Result<()> {
    let mut game = Game::new(args.width, args.height)?;
    let players = (
        ComputerPlayer::new(Player::One, args.difficulty),
        ComputerPlayer::new(Player::Two, args.difficulty),
    );
    let stdin = stdin();

    println!("Welcome to Connect 4\n");

    // game loop
    loop {
        game.rack().draw().context("Failed to draw rack!")?;

        match game.state() {
            GameState::Playing => {
                let is_ai = match game.to_move() {
                    Player::One => ai_players.0,
                    Player::Two => ai_players.1,
                };
                let next_move = if is_ai {
                    println!("AI is thinking...");
                    stdout().flush()?;

                    // slow down play if both players are AI
                    if ai_players == (true, true) {
                        std::thread::sleep(Duration::new(1, 0));
                    }

                    let mut rack = game.rack().clone();
                    let analysis = match game.to_move() {
                        Player::One => players.0.analyse(&mut rack)?,
                        Player::Two => players.1.analyse(&mut rack)?,
                    };
                    println!(
                        "Best move: {} (score {})",
                        analysis.column + 1,
                        analysis.score
                    );
                    analysis.column + 1

                // human player
                } else {
                    print!("{} move input > ", game.to_move());
                    stdout().flush()?;
                    let mut input_str = String::new();
                    if stdin.read_line(&mut input_str)? == 0 {
                        return Err(anyhow!("input closed before the game finished"));
                    }

                    match input_str.trim().parse::<usize>() {
                        Ok(column @ 1..=usize::MAX) => column,
                        _ => {
                            println!("Invalid column: {}", input_str.trim());
                            continue;
                        }
                    }
                };

                if let Err(err) = game.play(next_move - 1) {
                    println!("Invalid move: {}", err);
                    // try the move again
                    continue;
                }
            }

            // end states
            GameState::PlayerOneWin => {
                println!("Player 1 wins!");
                break;
            }
            GameState::PlayerTwoWin => {
                println!("Player 2 wins!");
                break;
            }
            GameState::Draw => {
                println!("Draw!");
                break;
            }
        }
    }
    Ok(())
}

fn self_play(args: RackArgs, prune: bool) -> Result<()> {
    let mut game = Game::new(args.width, args.height)?;
    let one = ComputerPlayer::new(Player::One, args.difficulty).with_pruning(prune);
    let two = ComputerPlayer::new(Player::Two, args.difficulty).with_pruning(prune);

    let state = game.self_play(&one, &two)?;

    print!("{}", game.rack());
    println!("{:?} after {} moves", state, game.moves().len());
    Ok(())
}

/// Plays one game with a pruned and an unpruned player for each side in lock-step
///
/// Returns the number of moves compared.
fn compare_game(args: RackArgs, opening: usize, seed: u64) -> Result<usize> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut pruned = Game::random_opening(args.width, args.height, opening, &mut rng)?;
    let mut unpruned = pruned.clone();

    let players = |prune| {
        (
            ComputerPlayer::new(Player::One, args.difficulty).with_pruning(prune),
            ComputerPlayer::new(Player::Two, args.difficulty).with_pruning(prune),
        )
    };
    let (pruned_players, unpruned_players) = (players(true), players(false));

    let mut compared = 0;
    while !pruned.state().is_over() {
        let mut pruned_rack = pruned.rack().clone();
        let mut unpruned_rack = unpruned.rack().clone();
        let (pruned_move, unpruned_move) = match pruned.to_move() {
            Player::One => (
                pruned_players.0.pick_move(&mut pruned_rack)?,
                unpruned_players.0.pick_move(&mut unpruned_rack)?,
            ),
            Player::Two => (
                pruned_players.1.pick_move(&mut pruned_rack)?,
                unpruned_players.1.pick_move(&mut unpruned_rack)?,
            ),
        };
        ensure!(
            pruned_move == unpruned_move,
            "seed {}: pruned player chose column {} but unpruned chose {} after moves {:?}",
            seed,
            pruned_move,
            unpruned_move,
            pruned.moves()
        );

        pruned.play(pruned_move)?;
        unpruned.play(unpruned_move)?;
        ensure!(
            pruned.rack() == unpruned.rack(),
            "seed {}: racks diverged",
            seed
        );
        compared += 1;
    }
    Ok(compared)
}

fn compare(args: RackArgs, games: u64, opening: usize, seed: u64) -> Result<()> {
    let progress = ProgressBar::new(games);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("Comparing games: {bar:40.cyan/blue} {pos}/{len} ~{eta} remaining")
            .progress_chars("█▓▒░  "),
    );

    // every game owns its racks, so games can run on any thread
    let compared = (0..games)
        .into_par_iter()
        .map(|game| {
            let result = compare_game(args, opening, seed.wrapping_add(game));
            progress.inc(1);
            result
        })
        .collect::<Result<Vec<usize>>>()?;
    progress.finish_and_clear();

    println!(
        "{} games, {} moves compared, pruned and unpruned players agreed on every move",
        games,
        compared.iter().sum::<usize>()
    );
    Ok(())
}

fn pick(file: &std::path::Path, player_id: u8, difficulty: usize) -> Result<()> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("could not read rack file {}", file.display()))?;
    let mut rack: Rack = text.parse()?;
    let player = Player::from_id(player_id).ok_or(anyhow!(
        "invalid player id {}, must be 1 or 2",
        player_id
    ))?;

    print!("{}", rack);

    let ai = ComputerPlayer::new(player, difficulty);
    let column = ai.pick_move(&mut rack)?;
    rack.apply(column, player)?;

    println!("\n{} plays column {}\n", player, column);
    print!("{}", rack);
    Ok(())
}

/// Plays a full game, returning the time spent searching and the number of nodes searched
fn timed_game(args: RackArgs, prune: bool) -> Result<(Duration, usize)> {
    let mut game = Game::new(args.width, args.height)?;
    let players = (
        ComputerPlayer::new(Player::One, args.difficulty).with_pruning(prune),
        ComputerPlayer::new(Player::Two, args.difficulty).with_pruning(prune),
    );

    let mut time = Duration::default();
    let mut node_count = 0;
    while !game.state().is_over() {
        let mut rack = game.rack().clone();
        let start_time = Instant::now();
        let analysis = match game.to_move() {
            Player::One => players.0.analyse(&mut rack)?,
            Player::Two => players.1.analyse(&mut rack)?,
        };
        time += start_time.elapsed();
        node_count += analysis.node_count;
        game.play(analysis.column)?;
    }
    info!("benchmark game ended {:?}", game.state());
    Ok((time, node_count))
}

fn bench(args: RackArgs) -> Result<()> {
    for &prune in [true, false].iter() {
        let (time, posis) = timed_game(args, prune)?;
        println!(
            "Pruning {}\n Time: {:.6}s, No. of positions: {}, kpos/s: {:.1}",
            if prune { "on" } else { "off" },
            time.as_secs_f64(),
            posis,
            posis as f64 / (1000.0 * time.as_secs_f64())
        );
    }
    Ok(())
}
