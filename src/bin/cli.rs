//! LogKV CLI
//!
//! Command-line interface for a LogKV log file.

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use logkv::{Config, Store, SyncPolicy, TypedValue};
use tracing_subscriber::{fmt, EnvFilter};

/// LogKV CLI
#[derive(Parser, Debug)]
#[command(name = "logkv-cli")]
#[command(about = "CLI for the LogKV key-value store")]
#[command(version)]
struct Args {
    /// Log file
    #[arg(short, long, default_value = "./logkv.db")]
    file: PathBuf,

    /// fsync after every write
    #[arg(long)]
    fsync: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get {
        /// The key to get
        key: String,

        #[arg(long, value_enum, default_value_t = Kind::Auto)]
        key_type: Kind,
    },

    /// Set a key-value pair
    Put {
        /// The key to set
        key: String,

        /// The value to set
        value: String,

        #[arg(long, value_enum, default_value_t = Kind::Auto)]
        key_type: Kind,

        #[arg(long, value_enum, default_value_t = Kind::Auto)]
        value_type: Kind,
    },

    /// List all keys
    Keys,

    /// Count live keys
    Size,

    /// Replay the log read-only and print what recovery found
    Verify,
}

/// How to interpret a command-line argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Kind {
    /// Integer if it parses, then float, else text
    Auto,
    Int,
    Float,
    Text,
}

fn parse_value(raw: &str, kind: Kind) -> Result<TypedValue, String> {
    match kind {
        Kind::Auto => Ok(raw
            .parse::<i64>()
            .map(TypedValue::Int)
            .or_else(|_| raw.parse::<f64>().map(TypedValue::Float))
            .unwrap_or_else(|_| TypedValue::Text(raw.to_string()))),
        Kind::Int => raw
            .parse::<i64>()
            .map(TypedValue::Int)
            .map_err(|e| format!("'{}' is not an integer: {}", raw, e)),
        Kind::Float => raw
            .parse::<f64>()
            .map(TypedValue::Float)
            .map_err(|e| format!("'{}' is not a float: {}", raw, e)),
        Kind::Text => Ok(TypedValue::Text(raw.to_string())),
    }
}

fn run(args: Args) -> Result<(), String> {
    if let Commands::Verify = args.command {
        return verify(&args.file);
    }

    let sync_policy = if args.fsync {
        SyncPolicy::EveryWrite
    } else {
        SyncPolicy::Flush
    };
    let config = Config::builder()
        .path(&args.file)
        .sync_policy(sync_policy)
        .build();

    let mut store = Store::open(config).map_err(|e| e.to_string())?;

    match args.command {
        Commands::Get { key, key_type } => {
            let key = parse_value(&key, key_type)?;
            match store.get(&key).map_err(|e| e.to_string())? {
                Some(value) => println!("{}", value),
                None => println!("(nil)"),
            }
        }
        Commands::Put {
            key,
            value,
            key_type,
            value_type,
        } => {
            let key = parse_value(&key, key_type)?;
            let value = parse_value(&value, value_type)?;
            store.put(key, value).map_err(|e| e.to_string())?;
            println!("OK");
        }
        Commands::Keys => {
            let mut keys: Vec<String> = store.keys().iter().map(|k| k.to_string()).collect();
            keys.sort();
            for key in keys {
                println!("{}", key);
            }
        }
        Commands::Size => println!("{}", store.size()),
        Commands::Verify => {}
    }

    store.close().map_err(|e| e.to_string())
}

/// Replay the log read-only and print the report
fn verify(path: &Path) -> Result<(), String> {
    let report = Store::verify(path).map_err(|e| e.to_string())?;
    println!("records replayed: {}", report.records_replayed);
    println!("live keys:        {}", report.live_keys);
    println!("valid bytes:      {}", report.valid_len);
    println!("garbage bytes:    {}", report.garbage_bytes);
    println!("torn bytes:       {}", report.torn_bytes);
    Ok(())
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,logkv=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        process::exit(1);
    }
}
