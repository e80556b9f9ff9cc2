//! # propcfg demo application
//!
//! A sample CLI tool that showcases how to integrate propcfg into a real
//! application. This is **not** a real app; it exists purely to demonstrate
//! and manually verify propcfg's features.
//!
//! ## Running
//!
//! ```sh
//! cargo run --example propcfg_demo -- --config demo.yaml show
//! cargo run --example propcfg_demo -- --config demo.yaml config list
//! ```
//!
//! ## Features demonstrated
//!
//! | Feature                  | How to exercise it                                                          |
//! |--------------------------|-----------------------------------------------------------------------------|
//! | Missing config tolerated | `cargo run --example propcfg_demo -- --config nope.yaml show`               |
//! | Derived sections         | Add `env:`, `secrets:`, `inputs:` to the config, then run `show`            |
//! | Env file ingestion       | `cargo run --example propcfg_demo -- --env-file .env env HOME`              |
//! | PATH merge over shell    | Add `env: {PATH: /opt/tools}` to the config, then run `show`                |
//! | Shell wins over .env     | `HOME=/x cargo run --example propcfg_demo -- --env-file .env env HOME`      |
//! | YAML passed as .env      | `cargo run --example propcfg_demo -- --env-file demo.yaml show`             |
//! | Concurrency flag         | `cargo run --example propcfg_demo -- --concurrency 0 show`                  |
//! | `config list`            | `cargo run --example propcfg_demo -- --config demo.yaml config list env`    |
//! | `config get`             | `cargo run --example propcfg_demo -- --config demo.yaml config get env.MODE` |
//! | `config query`           | `cargo run --example propcfg_demo -- --config demo.yaml config query 'nodes[0].id'` |
//! | `config set`             | `cargo run --example propcfg_demo -- --config demo.yaml config set 'nodes[2].id' parse` |

use std::collections::BTreeMap;

use clap::{Parser, Subcommand};

use propcfg::{
    ConfigArgs, LoadArgs, Loaded, concurrency_enabled, merge_env_maps, shell_env_map,
};

/// propcfg demo, a sample CLI app for showcasing propcfg integration.
#[derive(Parser, Debug)]
#[command(name = "propcfg-demo")]
struct Cli {
    #[command(flatten)]
    load: LoadArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the derived env / secrets / inputs sections and the concurrency switch.
    Show,
    /// Print an environment variable and where it came from.
    Env {
        /// Variable name.
        name: String,
    },
    /// Inspect or edit the configuration file (list, get, query, set).
    Config(ConfigArgs),
}

fn print_section(title: &str, entries: &BTreeMap<String, String>) {
    println!("[{title}]");
    if entries.is_empty() {
        println!("  (empty)");
        return;
    }
    let width = entries.keys().map(String::len).max().unwrap_or(0);
    for (key, value) in entries {
        println!("  {key:<width$}  {value}");
    }
}

fn show(loaded: &Loaded) {
    let config = &loaded.config;
    println!("config: {}", config.path().display());
    println!("concurrency: {}", concurrency_enabled());
    print_section("env", config.env());
    // Only key names for secrets.
    let secrets: BTreeMap<String, String> = config
        .secrets()
        .keys()
        .map(|k| (k.clone(), "<hidden>".to_string()))
        .collect();
    print_section("secrets", &secrets);
    print_section("inputs", config.inputs());
    // Config env over the shell, PATH merged.
    let effective = merge_env_maps(config.env(), &shell_env_map(std::env::vars()));
    let changed: BTreeMap<String, String> = effective
        .into_iter()
        .filter(|(key, _)| config.env().contains_key(key))
        .collect();
    print_section("effective env", &changed);
}

fn main() {
    let cli = Cli::parse();
    let loader = cli.load.into_loader();

    match cli.command {
        Commands::Show => {
            let loaded = loader.load().unwrap_or_else(|e| {
                eprintln!("Failed to load config:\n{e}");
                std::process::exit(1);
            });
            show(&loaded);
        }
        Commands::Env { name } => {
            let loaded = loader.load().unwrap_or_else(|e| {
                eprintln!("Failed to load config:\n{e}");
                std::process::exit(1);
            });
            match loaded.env_value(&name) {
                Some((value, origin)) => println!("{name}={value}  [{origin}]"),
                None => {
                    eprintln!("{name} is not set");
                    std::process::exit(1);
                }
            }
        }
        Commands::Config(args) => {
            let action = args.into_action();
            loader.handle_and_print(&action).unwrap_or_else(|e| {
                eprintln!("Config error:\n{e}");
                std::process::exit(1);
            });
        }
    }
}
