//! # TESSERA
//!
//! Runs the game loop headless and prints a summary.
//!
//! ## Usage
//!
//! ```bash
//! tessera [CONFIG.toml]
//! ```
//!
//! Without a config file every setting takes its default.

use std::process::ExitCode;

use tessera::components::Transform;
use tessera::{init_logging, EngineConfig, EngineResult, Game};

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    if args.iter().skip(1).any(|a| a == "--help" || a == "-h") {
        println!("Usage: tessera [CONFIG.toml]");
        return ExitCode::SUCCESS;
    }

    let config = match args.get(1) {
        Some(path) => match EngineConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("tessera: {path}: {e}");
                return ExitCode::FAILURE;
            }
        },
        None => EngineConfig::default(),
    };

    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("tessera: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: EngineConfig) -> EngineResult<()> {
    let history = init_logging(&config.logging)?;

    let mut game = Game::new(config);
    let (tank, _prop) = game.setup()?;
    let summary = game.run()?;

    let position = game.registry().get_component::<Transform>(tank)?.position;

    println!();
    println!("┌─ SUMMARY ───────────────────────────────────────────────────────┐");
    println!("│ Frames:          {}", summary.frames);
    println!("│ Simulated time:  {:.3} s", summary.elapsed);
    println!("│ Late frames:     {}", summary.late_frames);
    println!("│ Entities:        {}", game.registry().entity_count());
    println!("│ Tank position:   ({:.2}, {:.2})", position.x, position.y);
    println!("│ Log entries:     {} ({} errors)", history.len(), history.errors().len());
    println!("└─────────────────────────────────────────────────────────────────┘");
    Ok(())
}
