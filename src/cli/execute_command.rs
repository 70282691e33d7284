use std::sync::Arc;

use crate::cli::{Cli, Commands};
use crate::config::Settings;
use crate::counter_engine::CounterStore;
use crate::server;
use crate::utils::{decode_hex, format_bytes};

/// Executes CLI commands against the counter store.
///
/// Loads the configuration named by the CLI, opens the store, and delegates
/// to the requested operation. Startup failures (unreadable configuration,
/// unmappable backing file) and operation failures print to stderr and exit
/// non-zero before anything is served.
pub fn execute_command(cli: &Cli) {
    let settings = Settings::load(&cli.config).unwrap_or_else(|e| {
        eprintln!("{e}");
        std::process::exit(1);
    });
    let schema = settings.schema().unwrap_or_else(|e| {
        eprintln!("{e}");
        std::process::exit(1);
    });
    let store = CounterStore::open(&settings.filename, settings.geometry, schema)
        .unwrap_or_else(|e| {
            eprintln!("Failed to open counter store: {e}");
            std::process::exit(1);
        });

    match &cli.command {
        Commands::Serve { listen } => {
            let listen = listen.as_deref().unwrap_or(&settings.listen);
            if let Err(e) = server::serve(Arc::new(store), listen) {
                eprintln!("Server failed: {e}");
                std::process::exit(1);
            }
        }

        Commands::Get { key } => {
            let raw_key = parse_key(key, &store);
            match store.snapshot(&raw_key, false) {
                Ok(totals) => {
                    let body = serde_json::to_string(&totals)
                        .expect("snapshot maps always serialize");
                    println!("{body}");
                }
                Err(e) => {
                    eprintln!("Error: {e}");
                    std::process::exit(1);
                }
            }
        }

        Commands::Set { key, values } => {
            let raw_key = parse_key(key, &store);
            let counters = parse_values(values);
            if let Err(e) = store.put(&raw_key, &counters) {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
            flush_or_exit(&store);
            println!("Stored '{key}'");
        }

        Commands::Incr { key, field, delta } => {
            let raw_key = parse_key(key, &store);
            let field_index = store
                .schema()
                .index_of(field)
                .or_else(|| store.schema().index_of_alias(field))
                .unwrap_or_else(|| {
                    eprintln!("Error: unknown field '{field}'");
                    std::process::exit(1);
                });
            if let Err(e) = store.increment(&raw_key, field_index, *delta) {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
            flush_or_exit(&store);
        }

        Commands::Del { key } => {
            let raw_key = parse_key(key, &store);
            if let Err(e) = store.delete(&raw_key) {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
            flush_or_exit(&store);
            eprintln!("Deleted key '{key}'");
        }

        Commands::Info => {
            let geometry = store.geometry();
            println!("\n{:=^50}", " COUNTER STORE INFO ");
            println!("{:<25} {:?}", "BACKING FILE:", store.path());
            println!("{:-<50}", "");
            println!("{:<25} {}", "SLOTS:", geometry.item_max_count);
            println!("{:<25} {} bytes", "SLOT SIZE:", geometry.slot_size());
            println!("{:<25} {}", "TABLE SIZE:", format_bytes(geometry.file_size() as u64));
            println!("{:<25} {}", "PROBE DEPTH:", geometry.max_search_depth);
            println!("{:<25} {}", "FIELDS:", store.schema().names().join(", "));
            println!("{:<25} {}", "OCCUPIED SLOTS:", store.count());
            println!("{:=<50}", "");
        }
    }
}

fn parse_key(hex_key: &str, store: &CounterStore) -> Vec<u8> {
    let expected = store.geometry().key_length;
    match decode_hex(hex_key) {
        Some(raw) if raw.len() == expected => raw,
        _ => {
            eprintln!(
                "Error: key must be {} hex characters ({} bytes)",
                expected * 2,
                expected
            );
            std::process::exit(1);
        }
    }
}

fn parse_values(values: &str) -> Vec<i32> {
    values
        .split(',')
        .map(|v| {
            v.trim().parse().unwrap_or_else(|_| {
                eprintln!("Error: counter values must be signed integers, got {v:?}");
                std::process::exit(1);
            })
        })
        .collect()
}

fn flush_or_exit(store: &CounterStore) {
    if let Err(e) = store.flush() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
