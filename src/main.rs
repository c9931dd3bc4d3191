use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use realm_generator::export::{export_tiles_png, render_ascii};
use realm_generator::tiles::TileVariantRegistry;
use realm_generator::zone::{ZoneCache, ZoneGenerator};
use realm_generator::{generate_world, GenResult, GeneratorConfig, GridPos};

/// Pixels per tile in exported images
const EXPORT_CELL_SIZE: u32 = 6;

#[derive(Parser, Debug)]
#[command(name = "realm_generator")]
#[command(about = "Generate a biome world map with roads, rivers and settlements, plus detailed zones")]
struct Args {
    /// JSON configuration file (built-in defaults when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// World seed (overrides the config)
    #[arg(short, long)]
    seed: Option<u64>,

    /// World width in cells (overrides the config)
    #[arg(short = 'W', long)]
    width: Option<usize>,

    /// World height in cells (overrides the config)
    #[arg(short = 'H', long)]
    height: Option<usize>,

    /// Zone to generate as X,Y (repeatable)
    #[arg(short, long, value_parser = parse_pos)]
    zone: Vec<GridPos>,

    /// Write the world map to a PNG
    #[arg(long)]
    export_world: Option<PathBuf>,

    /// Write generated zones to PNG (coordinates appended when several)
    #[arg(long)]
    export_zone: Option<PathBuf>,

    /// Print the world and zones as ASCII
    #[arg(long)]
    ascii: bool,
}

fn parse_pos(s: &str) -> Result<GridPos, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y but got '{}'", s))?;
    let x = x.trim().parse::<i32>().map_err(|e| format!("bad X in '{}': {}", s, e))?;
    let y = y.trim().parse::<i32>().map_err(|e| format!("bad Y in '{}': {}", s, e))?;
    Ok(GridPos::new(x, y))
}

/// `zone.png` becomes `zone_3_4.png`
fn zone_path(base: &Path, pos: GridPos) -> PathBuf {
    let stem = base.file_stem().and_then(|s| s.to_str()).unwrap_or("zone");
    let ext = base.extension().and_then(|s| s.to_str()).unwrap_or("png");
    base.with_file_name(format!("{}_{}_{}.{}", stem, pos.x, pos.y, ext))
}

fn run(args: Args) -> GenResult<()> {
    let mut config = match &args.config {
        Some(path) => GeneratorConfig::load(path)?,
        None => GeneratorConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.world.seed = seed;
    }
    if let Some(width) = args.width {
        config.world.width = width;
    }
    if let Some(height) = args.height {
        config.world.height = height;
    }

    let tables = config.validate()?;
    let registry = TileVariantRegistry::new();
    let world = generate_world(&config, &tables, &registry)?;

    println!("Seeds: {}", world.seeds);
    println!("Map size: {}x{}", world.width, world.height);
    println!("Cities: {}", world.cities.len());
    println!("Road tiles: {} ({} bridges)", world.roads.len(), world.roads.bridges.len());
    println!("River cells: {}", world.rivers.len());

    if args.ascii {
        println!("{}", render_ascii(world.tiles(), &registry)?);
    }
    if let Some(path) = &args.export_world {
        export_tiles_png(world.tiles(), &registry, path, EXPORT_CELL_SIZE)?;
    }

    let mut zones = args.zone.clone();
    if zones.is_empty() && args.export_zone.is_some() {
        zones.extend(world.cities.first().copied());
    }

    let mut cache = ZoneCache::new(ZoneGenerator::new(&world, &config, &tables, &registry));
    for &pos in &zones {
        let zone = cache.get_or_generate(pos)?;
        println!(
            "Zone {} ({:?}){}",
            pos,
            zone.biome,
            if zone.fell_back { " [fallback]" } else { "" }
        );
        if args.ascii {
            println!("{}", render_ascii(zone.tiles(), &registry)?);
        }
        if let Some(base) = &args.export_zone {
            let path = if zones.len() > 1 { zone_path(base, pos) } else { base.clone() };
            export_tiles_png(zone.tiles(), &registry, path, EXPORT_CELL_SIZE)?;
        }
    }

    let stats = registry.stats();
    info!(
        variants = registry.len(),
        created = stats.created,
        hits = stats.hits,
        zones = cache.len(),
        "done"
    );
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("realm_generator=info")))
        .init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "generation failed");
            ExitCode::FAILURE
        }
    }
}
