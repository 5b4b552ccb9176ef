//! Binary entrypoint for the xiuxian CLI.
//!
//! Commands:
//! - `init` - create a starter `config.toml` and seed the item catalog
//! - `run --player <id> <command...>` - execute one game command and print the reply
//! - `shell --player <id>` - read commands from stdin, one per line
//! - `status` - print database location and record counts
//!
//! See the library crate docs for module-level details: `simple_xiuxian::`.
use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use log::{info, warn};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use simple_xiuxian::config::Config;
use simple_xiuxian::xiuxian::{CommandProcessor, GameService, XiuxianStore, XiuxianStoreBuilder};

#[derive(Parser)]
#[command(name = "xiuxian")]
#[command(about = "A text cultivation game engine with a chat-style command interface")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration and seed the item catalog
    Init,
    /// Execute a single command as a player
    Run {
        /// Player identity
        #[arg(short, long)]
        player: String,
        /// Display name used when creating a character
        #[arg(short, long)]
        name: Option<String>,
        /// The command text, e.g. `修仙面板` or `购买 小还丹 2`
        #[arg(required = true, num_args = 1..)]
        words: Vec<String>,
    },
    /// Interactive session; `:as <id> [name]` switches the acting player
    Shell {
        #[arg(short, long)]
        player: String,
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Show database location and record counts
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Init => {
            init_logging(&None, cli.verbose);
            info!("Initializing new xiuxian configuration");
            Config::create_default(&cli.config).await?;
            info!("Configuration file created at {}", cli.config);
            let config = Config::load(&cli.config).await?;
            let store = open_store(&config).await?;
            info!(
                "Item catalog ready with {} entries at {}",
                store.list_items()?.len(),
                config.storage.db_path().display()
            );
        }
        Commands::Run {
            player,
            name,
            words,
        } => {
            let config = Config::load(&cli.config).await?;
            init_logging(&Some(config.clone()), cli.verbose);
            let processor = build_processor(&config).await?;
            let line = words.join(" ");
            let reply = processor.process(&player, name.as_deref().unwrap_or(&player), &line, Utc::now());
            println!("{}", reply);
        }
        Commands::Shell { player, name } => {
            let config = Config::load(&cli.config).await?;
            init_logging(&Some(config.clone()), cli.verbose);
            let processor = build_processor(&config).await?;
            run_shell(&processor, player, name).await?;
        }
        Commands::Status => {
            let config = Config::load(&cli.config).await?;
            init_logging(&Some(config.clone()), cli.verbose);
            let store = open_store(&config).await?;
            println!("World: {}", config.game.name);
            println!("Database: {}", config.storage.db_path().display());
            println!("Players: {}", store.list_players()?.len());
            println!("Items: {}", store.list_items()?.len());
            println!("Purchasable: {}", store.list_purchasable_items()?.len());
        }
    }

    Ok(())
}

async fn open_store(config: &Config) -> Result<XiuxianStore> {
    tokio::fs::create_dir_all(&config.storage.data_dir)
        .await
        .with_context(|| format!("creating data dir {}", config.storage.data_dir))?;
    let path = config.storage.db_path();
    XiuxianStoreBuilder::new(&path)
        .open()
        .with_context(|| format!("opening store at {}", path.display()))
}

async fn build_processor(config: &Config) -> Result<CommandProcessor> {
    let store = open_store(config).await?;
    let service = GameService::new(store, config.game.clone());
    Ok(CommandProcessor::new(service))
}

async fn run_shell(processor: &CommandProcessor, player: String, name: Option<String>) -> Result<()> {
    let mut player = player;
    let mut name = name.unwrap_or_else(|| player.clone());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    info!("Shell started as {}", simple_xiuxian::logutil::actor(&player, &name));

    loop {
        stdout.write_all(format!("{}> ", name).as_bytes()).await?;
        stdout.flush().await?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if matches!(line, ":q" | ":quit" | ":exit") {
            break;
        }
        if let Some(rest) = line.strip_prefix(":as") {
            let mut parts = rest.split_whitespace();
            match parts.next() {
                Some(id) => {
                    player = id.to_string();
                    name = parts.next().unwrap_or(id).to_string();
                    stdout.write_all(format!("now acting as {}\n", name).as_bytes()).await?;
                }
                None => {
                    warn!("`:as` needs a player id");
                    stdout.write_all(b"usage: :as <id> [name]\n").await?;
                }
            }
            continue;
        }
        let reply = processor.process(&player, &name, line, Utc::now());
        stdout.write_all(reply.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
    }
    Ok(())
}

fn init_logging(config: &Option<Config>, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    // CLI verbosity overrides the configured level
    let configured = config
        .as_ref()
        .and_then(|cfg| cfg.logging.level.parse::<log::LevelFilter>().ok())
        .unwrap_or(log::LevelFilter::Info);
    let base_level = match verbosity {
        0 => configured,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);

    let file = config
        .as_ref()
        .and_then(|cfg| cfg.logging.file.as_ref())
        .and_then(|path| {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .ok()
        });
    if let Some(f) = file {
        let write_mutex = std::sync::Arc::new(std::sync::Mutex::new(f));
        // Echo to the console only when someone is watching it
        let is_tty = atty::is(atty::Stream::Stderr);
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
            writeln!(
                fmt,
                "{} [{}] {}",
                chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ"),
                record.level(),
                record.args()
            )
        });
    }
    let _ = builder.try_init();
}
