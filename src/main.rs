mod board;
mod error;
mod input;
mod render;
mod solver;
mod token;

use std::io::{stdin, stdout};
use std::time::Duration;

use clap::{Parser, ValueEnum};
use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use board::Board;
use render::Renderer;
use token::Palette;

#[derive(ValueEnum, Debug, PartialEq, Eq, Clone, Copy)]
enum Mode {
    /// Deal both boards at random
    Shuffle,
    /// Type in both boards token by token
    Input,
}

/// Watch a board of coloured tokens sort itself into a goal arrangement.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Glyphs used to draw the tokens
    #[arg(short = 't', long, value_enum, default_value_t = Palette::Circles)]
    palette: Palette,

    /// How the starting and goal boards are built
    #[arg(short, long, value_enum, default_value_t = Mode::Shuffle)]
    mode: Mode,

    /// Delay between frames, in milliseconds
    #[arg(long, default_value_t = 10)]
    time: u64,

    /// Seed to use when shuffling the boards
    #[arg(short, long)]
    seed: Option<u64>,
}

fn build_board(mode: Mode, rng: &mut impl Rng) -> anyhow::Result<Board> {
    match mode {
        Mode::Shuffle => Ok(Board::with_rng(rng)),
        Mode::Input => Ok(input::read_board(&mut stdin().lock(), &mut stdout())?),
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args = Args::parse();
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut renderer = Renderer::new(stdout(), args.palette, Duration::from_millis(args.time));

    println!("SLIDING SORTING COLOURS");

    println!("---");
    println!("Starting Board");
    let mut current = build_board(args.mode, &mut rng)?;
    renderer.show(&current)?;

    println!("---");
    println!("Desired Board");
    let goal = build_board(args.mode, &mut rng)?;
    renderer.show(&goal)?;

    println!("Calculating...");
    renderer.show(&current)?;
    let moves = solver::solve(&mut current, &goal, &mut renderer);
    info!(moves, frames = renderer.steps(), "board solved");
    println!("Solved in {} moves", moves);

    Ok(())
}
