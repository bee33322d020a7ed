//! Interactive client over the store facade
//!
//! Usage: `client [redis-url]`. Without an argument the URL comes from
//! `REDIS_URL`, falling back to local Redis.

use redis_facade::{HashRecord, StoreConfig, StoreFacade};
use std::env;
use std::io::{self, Write};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match env::args().nth(1) {
        Some(url) => StoreConfig::with_url(url),
        None => StoreConfig::from_env(),
    };

    println!("Connecting to {}...", config.url);
    let mut store = StoreFacade::new(&config);
    store.connect().await;
    if !store.is_connected() {
        return Err(format!("could not connect to {}", config.url).into());
    }
    println!("Connected! Type 'help' for available commands or 'quit' to exit.");

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        match input {
            "quit" | "exit" => {
                println!("Goodbye!");
                break;
            }
            "help" => print_help(),
            _ => handle_command(&mut store, input).await,
        }
    }

    store.close().await;
    Ok(())
}

async fn handle_command(store: &mut StoreFacade, input: &str) {
    let parts: Vec<&str> = input.split_whitespace().collect();

    match parts[0] {
        "set" => {
            if parts.len() != 3 {
                println!("Usage: set <key> <value>");
                return;
            }
            store.set_value(parts[1], parts[2]).await;
        }
        "get" => {
            if parts.len() != 2 {
                println!("Usage: get <key>");
                return;
            }
            match store.get_value(parts[1]).await {
                Some(value) => println!("{}", value),
                None => println!("(nil)"),
            }
        }
        "hset" => {
            if parts.len() < 4 || parts.len() % 2 != 0 {
                println!("Usage: hset <key> <field> <value> [<field> <value> ...]");
                return;
            }
            let record: HashRecord = parts[2..]
                .chunks(2)
                .map(|pair| (pair[0].to_string(), pair[1].to_string()))
                .collect();
            store.set_hash(parts[1], &record).await;
        }
        "hgetall" => {
            if parts.len() != 2 {
                println!("Usage: hgetall <key>");
                return;
            }
            let record = store.get_hash(parts[1]).await;
            if record.is_empty() {
                println!("(empty hash)");
            }
            let mut fields: Vec<_> = record.into_iter().collect();
            fields.sort();
            for (field, value) in fields {
                println!("{}: {}", field, value);
            }
        }
        other => {
            println!("Unknown command: {}. Type 'help' for available commands.", other);
        }
    }
}

fn print_help() {
    println!("Available commands:");
    println!("  set <key> <value>                  - Set a key-value pair");
    println!("  get <key>                          - Get value by key");
    println!("  hset <key> <field> <value> [...]   - Set hash fields");
    println!("  hgetall <key>                      - Get all hash fields");
    println!("  help                               - Show this help message");
    println!("  quit                               - Exit the client");
}
