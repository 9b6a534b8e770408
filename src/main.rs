use anyhow::{bail, Context, Result};
use std::env;
use std::path::{Path, PathBuf};

use whitelist_sync::{ReconciliationEngine, SteamCommunityClient, WhitelistConfig};

const USAGE: &str = "usage: whitelist-sync [generate|tidy-removals] [CONFIG.toml]";

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();

    let (command, config_path) = match args.as_slice() {
        [] => ("generate", None),
        [cmd] if cmd == "generate" || cmd == "tidy-removals" => (cmd.as_str(), None),
        [path] => ("generate", Some(PathBuf::from(path))),
        [cmd, path] => (cmd.as_str(), Some(PathBuf::from(path))),
        _ => bail!("{}", USAGE),
    };

    let config = load_config(config_path.as_deref())?;
    let client = SteamCommunityClient::new(&config).context("Failed to create HTTP client")?;
    let engine = ReconciliationEngine::new(config, Box::new(client));

    match command {
        "generate" => run_generate(&engine),
        "tidy-removals" => run_tidy(&engine),
        other => bail!("unknown command {:?}\n{}", other, USAGE),
    }
}

/// Config file if given, defaults anchored at the current directory otherwise
fn load_config(path: Option<&Path>) -> Result<WhitelistConfig> {
    match path {
        Some(path) => WhitelistConfig::from_file(path),
        None => {
            let cwd = env::current_dir().context("Failed to determine current directory")?;
            Ok(WhitelistConfig::default().resolve_paths(&cwd))
        }
    }
}

fn run_generate(engine: &ReconciliationEngine) -> Result<()> {
    let report = engine.run()?;

    println!("\n✅ {}", report.summary());
    println!(
        "📄 Sample output:\n{}",
        report.sample_line.as_deref().unwrap_or("(no entries)")
    );

    Ok(())
}

fn run_tidy(engine: &ReconciliationEngine) -> Result<()> {
    let count = engine.tidy_removals()?;

    println!(
        "🧹 {} removal entries in {}",
        count,
        engine.config().removals_file.display()
    );

    Ok(())
}
