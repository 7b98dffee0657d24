//! otmap - loads an OTBM world and prints what it contains
//!
//! Usage: `otmap [config.txt] [--json]`

use anyhow::Context;
use otmap_config::{WorldConfig, DEFAULT_CONFIG_FILE};
use otmap_world::WorldManager;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

struct Args {
    config_path: PathBuf,
    json: bool,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut args = Args {
        config_path: PathBuf::from(DEFAULT_CONFIG_FILE),
        json: false,
    };

    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--json" => args.json = true,
            flag if flag.starts_with("--") => anyhow::bail!("unknown option {}", flag),
            path => args.config_path = PathBuf::from(path),
        }
    }
    Ok(args)
}

fn main() -> anyhow::Result<()> {
    let args = parse_args()?;

    // Configuration is read first so its log level can seed the filter
    let loaded = WorldConfig::load_from_file(&args.config_path);
    let config = loaded.as_ref().cloned().unwrap_or_default();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("otmap starting up...");
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    match &loaded {
        Ok(_) => info!("✓ Configuration loaded from {}", args.config_path.display()),
        Err(e) => {
            warn!("Failed to load {}: {}", args.config_path.display(), e);
            warn!("   Using default configuration");
        }
    }
    config.display();

    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let manager = WorldManager::from_config(config);
    let world = manager
        .load_world()
        .with_context(|| format!("loading world '{}'", manager.config().map_name))?;

    let summary = world.read().summary();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("Map {}x{} (OTBM {}, items {})", summary.width, summary.height, summary.otbm_version, summary.items_version);
        for description in &summary.descriptions {
            println!("  {}", description);
        }
        println!("  tiles:          {}", summary.tiles);
        println!("  items:          {}", summary.items);
        println!("  towns:          {}", summary.towns);
        println!("  waypoints:      {}", summary.waypoints);
        println!("  houses:         {}", summary.houses);
        println!("  monster spawns: {}", summary.monster_spawns);
        println!("  npc spawns:     {}", summary.npc_spawns);
    }

    Ok(())
}
