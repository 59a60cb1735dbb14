use anyhow::{anyhow, Context, Result};
use log::info;
use std::env;
use std::fs;

use dis_rust::*;

/// Configuration lue dans le répertoire courant quand `--config` est absent
const DEFAULT_CONFIG_PATH: &str = "dis-rust.toml";

const USAGE: &str = "usage: dis-rust [--config <fichier.toml>] [--legacy] [--stop-at-terminator] <fonctions.json>";

fn main() -> Result<()> {
    // Parser les arguments de ligne de commande
    let args: Vec<String> = env::args().collect();
    let mut config_path: Option<String> = None;
    let mut input_path: Option<String> = None;
    let mut legacy = false;
    let mut stop_at_terminator = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" if i + 1 < args.len() => {
                config_path = Some(args[i + 1].clone());
                i += 1;
            }
            "--legacy" => legacy = true,
            "--stop-at-terminator" => stop_at_terminator = true,
            "-h" | "--help" => {
                println!("{}", USAGE);
                return Ok(());
            }
            other => input_path = Some(other.to_string()),
        }
        i += 1;
    }

    let mut config = match &config_path {
        Some(path) => DisConfig::load_from_file(path)
            .with_context(|| format!("lecture de la configuration {}", path))?,
        None => DisConfig::load_or_default(DEFAULT_CONFIG_PATH),
    };
    if legacy {
        config.decode.schema_version = SchemaVersion::Legacy;
    }
    if stop_at_terminator {
        config.decode.boundary = BoundaryMode::Terminator;
    }

    // Initialiser le logging
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();
    info!("Dis Rust v{} ({})", VERSION, config.decode.schema_version);

    let input_path = input_path.ok_or_else(|| anyhow!("{}", USAGE))?;
    let json = fs::read_to_string(&input_path)
        .with_context(|| format!("lecture de {}", input_path))?;
    let functions = CodeFunction::parse_many(&json)
        .with_context(|| format!("fonctions invalides dans {}", input_path))?;

    let disassembler = Disassembler::from_config(&config)?;
    let results = disassembler.disassemble_all(&functions);

    for (function, result) in functions.iter().zip(results) {
        let text = result.with_context(|| format!("fonction {}", function.name))?;
        println!(":: {}", function.name);
        print!("{}", text);
        if function.foreign {
            println!();
        }
    }

    Ok(())
}
