//! Binary entrypoint for the Globetrot CLI.
//!
//! Commands:
//! - `init` - write a starter `globetrot.toml`
//! - `check [--data <file>]` - load and validate world data
//! - `new [--goal <n>]` - create a game and print its id
//! - `join <game> <name> <colour>` - add a player before the start
//! - `start <game>` - shuffle the order and begin the first turn
//! - `play <game> <player> <command> [--options <text>]` - play one command
//! - `state <game>` / `export <game>` - print the state or the saved document
//! - `list` / `delete <game>` - manage saved games
//!
//! Results are printed as JSON. A refused play prints its error code and exits
//! with status 2.
use std::sync::Arc;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use log::{error, info};
use serde_json::json;

use globetrot::config::Config;
use globetrot::engine::{Command, World};
use globetrot::host::{GameHost, HostError, SaveStore};

#[derive(Parser)]
#[command(name = "globetrot")]
#[command(about = "Rule engine and game host for a travel board game")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "globetrot.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init,
    /// Validate world data and print a summary
    Check {
        /// World data file (defaults to the configured one)
        #[arg(short, long)]
        data: Option<String>,
    },
    /// Create a new game
    New {
        /// Souvenirs needed to win
        #[arg(short, long)]
        goal: Option<usize>,
    },
    /// Add a player to a game that has not started
    Join {
        game: String,
        name: String,
        colour: String,
    },
    /// Start a game
    Start { game: String },
    /// Play one command as the given player
    Play {
        game: String,
        player: String,
        command: String,
        /// Options payload; `cheat` runs it as a command
        #[arg(short, long)]
        options: Option<String>,
    },
    /// Print the state of a game
    State { game: String },
    /// Print the saved snapshot document of a game
    Export { game: String },
    /// List saved games
    List,
    /// Delete a saved game
    Delete { game: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let pre_config = match cli.command {
        Commands::Init => None,
        _ => Config::load(&cli.config).await.ok(),
    };
    init_logging(&pre_config, cli.verbose);

    match cli.command {
        Commands::Init => {
            Config::create_default(&cli.config).await?;
            info!("Configuration file created at {}", cli.config);
            println!("Created {}", cli.config);
        }
        Commands::Check { data } => {
            let path = match (data, &pre_config) {
                (Some(path), _) => path,
                (None, Some(cfg)) => cfg.game.data_file.clone(),
                (None, None) => return Err(anyhow!("no config at {} and no --data", cli.config)),
            };
            let world = World::load(&path)?;
            let summary = json!({
                "home": world.settings.home,
                "squares": world.squares.len(),
                "places": world.places.len(),
                "dots": world.dots.len(),
                "currencies": world.currencies.len(),
                "lucks": world.lucks.len(),
                "risks": world.risks.len(),
            });
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        command => {
            let config = match pre_config {
                Some(cfg) => cfg,
                None => Config::load(&cli.config).await?,
            };
            let host = open_host(&config)?;
            if let Err(e) = run(&host, &config, command).await {
                if let HostError::Play(play) = &e {
                    let body = json!({ "error": play.code(), "message": play.message() });
                    println!("{}", serde_json::to_string_pretty(&body)?);
                    std::process::exit(2);
                }
                error!("{}", e);
                return Err(e.into());
            }
        }
    }

    Ok(())
}

fn open_host(config: &Config) -> Result<GameHost> {
    let world = World::load(&config.game.data_file)
        .map_err(|e| anyhow!("Failed to load world {}: {}", config.game.data_file, e))?;
    let store = SaveStore::open(config.save_dir())?;
    Ok(GameHost::new(Arc::new(world), store).with_cheats(config.game.allow_cheats))
}

async fn run(host: &GameHost, config: &Config, command: Commands) -> Result<(), HostError> {
    match command {
        Commands::New { goal } => {
            let id = host.create_game(goal.or(config.game.goal)).await?;
            println!("{}", id);
        }
        Commands::Join { game, name, colour } => {
            host.add_player(&game, &name, &colour).await?;
            print_json(&host.state(&game).await?);
        }
        Commands::Start { game } => {
            host.start(&game).await?;
            print_json(&host.state(&game).await?);
        }
        Commands::Play {
            game,
            player,
            command,
            options,
        } => {
            let cmd = match options {
                Some(options) => Command::with_options(command, options),
                None => Command::new(command),
            };
            let result = host.play(&game, &player, &cmd).await?;
            print_json(&result);
        }
        Commands::State { game } => print_json(&host.state(&game).await?),
        Commands::Export { game } => println!("{}", host.export(&game).await?),
        Commands::List => {
            for id in host.list_games().await? {
                println!("{}", id);
            }
        }
        Commands::Delete { game } => {
            if !host.delete_game(&game).await? {
                return Err(HostError::NotFound(game));
            }
        }
        Commands::Init | Commands::Check { .. } => {}
    }
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => error!("cannot print result: {}", e),
    }
}

fn init_logging(config: &Option<Config>, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    // Verbosity flags override the configured level
    let base_level = match (verbosity, config) {
        (0, Some(cfg)) => cfg.log_level(),
        (0, None) => log::LevelFilter::Warn,
        (1, _) => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);

    let log_file = config
        .as_ref()
        .and_then(|cfg| cfg.logging.file.as_ref())
        .and_then(|file| {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(file)
                .ok()
        });

    if let Some(f) = log_file {
        let write_mutex = std::sync::Arc::new(std::sync::Mutex::new(f));
        // Only echo to the console when running in a terminal
        let is_tty = atty::is(atty::Stream::Stdout);

        builder.format(move |fmt, record| {
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            let line = format!("{} [{}] {}", ts, record.level(), record.args());
            if let Ok(mut guard) = write_mutex.lock() {
                let _ = writeln!(guard, "{}", line);
            }
            if is_tty {
                writeln!(fmt, "{}", line)
            } else {
                Ok(())
            }
        });
    } else {
        builder.format(|fmt, record| {
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            writeln!(fmt, "{} [{}] {}", ts, record.level(), record.args())
        });
    }
    let _ = builder.try_init();
}
