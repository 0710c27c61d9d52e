use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use engine::{prelude::*, Autoplay, Config, StepOutcome};
use util::Logos;

pub const GAME_NAME: &str = "delve";

#[derive(Parser, Debug)]
#[command(name = GAME_NAME, about = "Run a dungeon with everyone on autopilot")]
struct Args {
    #[arg(long, value_parser = |e: &str| Ok::<Logos, &str>(Logos::new(e)), help = "Game world seed")]
    seed: Option<Logos>,

    #[arg(long, default_value_t = 1000, help = "Maximum number of scheduler steps")]
    turns: usize,

    #[arg(long, help = "IDM file with dungeon parameters")]
    config: Option<PathBuf>,

    #[arg(long, help = "Print the player's level when the run ends")]
    show_map: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    let seed = args
        .seed
        .unwrap_or_else(|| Logos::sample(&mut rand::thread_rng(), 10));
    log::info!("seed: {seed}");

    let mut r = Runtime::new(&config, &seed)?;
    let mut input = Autoplay::default();

    let mut steps = 0;
    while steps < args.turns && !r.is_over() {
        let outcome = r.step(&mut input);
        steps += 1;
        for m in r.drain_msgs() {
            match m {
                Msg::Message(text) => println!("{text}"),
                Msg::Death(e) => log::debug!("{e} died"),
                Msg::Redraw => {}
            }
        }
        if outcome == StepOutcome::Idle {
            break;
        }
    }

    if r.is_over() {
        println!("The hero has fallen after {} turns.", r.turn());
    } else {
        log::info!("Stopped after {steps} steps, {} turns", r.turn());
    }

    if args.show_map {
        if let Some(level) = r.current_level() {
            println!("{level}:\n{}", r.render_level(level));
        }
    }

    Ok(())
}
